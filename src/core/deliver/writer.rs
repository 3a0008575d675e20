//! Message file writing
//!
//! Serializes a built message for its target EMR and writes it into the
//! resolved import directory. Medical Director rejects 8-bit text, so its
//! rendering escapes every character above ASCII; the final write is
//! always single-byte Latin-1 for the legacy import readers.
//!
//! Silent records are acknowledged without touching the filesystem.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

use crate::core::message::wire::WireMessage;
use crate::domain::emr::EmrKind;
use crate::domain::errors::DeliveryError;
use crate::domain::record::ResultRecord;

/// Fixed filename prefix for delivered message files
const FILENAME_PREFIX: &str = "courier";

/// Outcome of writing one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivered {
    /// File written at the contained path
    Written(PathBuf),

    /// Record was silent; counted but not written
    Silent,
}

/// Write one record's message into the target directory
///
/// Creates the directory if it does not exist yet. Silent records skip
/// rendering and writing entirely.
///
/// # Errors
///
/// Returns [`DeliveryError::Escape`] when the message cannot be encoded
/// for the target EMR and [`DeliveryError::Write`] on filesystem failures.
pub async fn deliver(
    record: &ResultRecord,
    message: &WireMessage,
    target_dir: &Path,
    generated_at: DateTime<Utc>,
) -> Result<Delivered, DeliveryError> {
    if record.is_silent {
        return Ok(Delivered::Silent);
    }

    let rendered = render_for_emr(message, record.target_emr())?;
    let filename = message_filename(record, generated_at);

    tokio::fs::create_dir_all(target_dir)
        .await
        .map_err(|e| DeliveryError::Write(format!("{}: {e}", target_dir.display())))?;

    let path = target_dir.join(filename);
    tokio::fs::write(&path, latin1_bytes(&rendered))
        .await
        .map_err(|e| DeliveryError::Write(format!("{}: {e}", path.display())))?;

    Ok(Delivered::Written(path))
}

/// Serialize a message in the form its target EMR accepts
///
/// # Errors
///
/// Returns [`DeliveryError::Escape`] when the text cannot be represented
/// for the target EMR.
pub fn render_for_emr(message: &WireMessage, kind: &EmrKind) -> Result<String, DeliveryError> {
    let text = message.serialize();
    match kind {
        EmrKind::MedicalDirector => medical_director_escape(&text),
        _ => Ok(text),
    }
}

/// Filename for one record: prefix, patient id, observation text and the
/// generation timestamp in ticks, with whitespace removed and case folded
pub fn message_filename(record: &ResultRecord, generated_at: DateTime<Utc>) -> String {
    let identity = record.identity();
    let observation_text = record.observation.identifier_text.as_deref().unwrap_or("");
    let raw = format!(
        "{FILENAME_PREFIX}_{}_{}_{}.hl7",
        identity.patient_id,
        observation_text,
        generation_ticks(generated_at)
    );
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Generation timestamp in 100-nanosecond ticks since the Unix epoch
pub fn generation_ticks(generated_at: DateTime<Utc>) -> i64 {
    generated_at.timestamp() * 10_000_000 + i64::from(generated_at.timestamp_subsec_nanos()) / 100
}

/// Replaces every character above ASCII with `\'xx` (lowercase hex byte)
fn medical_director_escape(text: &str) -> Result<String, DeliveryError> {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        let code = c as u32;
        if code < 0x80 {
            escaped.push(c);
        } else if code <= 0xFF {
            escaped.push_str(&format!("\\'{code:02x}"));
        } else {
            return Err(DeliveryError::Escape(format!(
                "character U+{code:04X} has no single-byte form"
            )));
        }
    }
    Ok(escaped)
}

/// Latin-1 rendition of the text; characters outside the single-byte range
/// degrade to `?`
fn latin1_bytes(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            let code = c as u32;
            if code <= 0xFF {
                code as u8
            } else {
                b'?'
            }
        })
        .collect()
}
