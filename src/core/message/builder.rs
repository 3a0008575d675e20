//! Record-to-message construction
//!
//! Maps a [`ResultRecord`] into a fixed-segment [`WireMessage`]. Two
//! variants exist, selected per deployment: the observation result
//! (ORU^R01) and the referral (REF^I12). Both share the header, software
//! and patient segments; only the payload segments differ.
//!
//! Construction is deterministic: for the same record and the same
//! [`BuildContext`] the serialized output is byte-identical. The only
//! failure is a record missing one of its identity fields; every other
//! absent value degrades to an empty field.

use chrono::{DateTime, NaiveDateTime, Timelike, Utc};

use crate::config::{DeliveryConfig, MessageVariant};
use crate::domain::doctor::DoctorName;
use crate::domain::errors::DeliveryError;
use crate::domain::record::ResultRecord;

use super::wire::{Field, Hl7Encoding, Segment, WireMessage};

/// Receiving application stamped into MSH-5
pub const RECEIVING_APPLICATION: &str = "EMR";

/// Message control id; the legacy readers ignore it
pub const MESSAGE_CONTROL_ID: &str = "0000000";

/// Processing id (production)
pub const PROCESSING_ID: &str = "P";

/// Message structure version
pub const VERSION_ID: &str = "2.8.1";

/// Software identity stamped into message headers
#[derive(Debug, Clone)]
pub struct SoftwareInfo {
    pub product_name: String,
    pub organization: String,
    pub version: String,
    pub package_name: String,
}

impl SoftwareInfo {
    /// Builds the identity from delivery config plus compile-time metadata
    pub fn from_config(delivery: &DeliveryConfig) -> Self {
        Self {
            product_name: delivery.software_name.clone(),
            organization: delivery.software_organization.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            package_name: env!("CARGO_PKG_NAME").to_string(),
        }
    }
}

/// Per-batch construction context
///
/// `generated_at` is captured once per batch so every message of the batch
/// carries the same generation timestamp, and so tests can pin it.
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub software: SoftwareInfo,
    pub generated_at: DateTime<Utc>,
}

impl BuildContext {
    pub fn new(software: SoftwareInfo, generated_at: DateTime<Utc>) -> Self {
        Self {
            software,
            generated_at,
        }
    }
}

/// Formats a timestamp as `yyyyMMddHHmmss[.ffff]`
///
/// The fraction is in ten-thousandths of a second with trailing zeros
/// trimmed; a zero fraction drops the dot entirely.
pub fn hl7_timestamp(dt: NaiveDateTime) -> String {
    let base = dt.format("%Y%m%d%H%M%S").to_string();
    let fraction = (dt.nanosecond() % 1_000_000_000) / 100_000;
    if fraction == 0 {
        return base;
    }
    let mut digits = format!("{:04}", fraction);
    while digits.ends_with('0') {
        digits.pop();
    }
    format!("{base}.{digits}")
}

/// Builds the wire message for one record
///
/// # Errors
///
/// Returns [`DeliveryError::InvalidRecord`] when the patient id or the
/// observation identifier is missing or blank.
pub fn build_message(
    record: &ResultRecord,
    variant: MessageVariant,
    ctx: &BuildContext,
) -> Result<WireMessage, DeliveryError> {
    require_identity(record)?;

    let mut message = WireMessage::new();
    let encoding = *message.encoding();
    let generated = hl7_timestamp(ctx.generated_at.naive_utc());

    message.push_segment(msh_segment(ctx, variant, &generated, encoding));
    message.push_segment(sft_segment(ctx));

    match variant {
        MessageVariant::ObservationResult => {
            message.push_segment(pid_segment(record));
            message.push_segment(pv1_segment(record, ctx));
            message.push_segment(obr_segment(record, &generated));
            message.push_segment(obx_value_segment(record, ctx, &generated));
            message.push_segment(obx_text_segment(record, &generated));
        }
        MessageVariant::Referral => {
            message.push_segment(rf1_segment(record, &generated));
            message.push_segment(pid_segment(record));
            message.push_segment(pv1_segment(record, ctx));
            message.push_segment(nte_segment(record));
        }
    }

    message.push_segment(cti_segment(record));
    Ok(message)
}

fn require_identity(record: &ResultRecord) -> Result<(), DeliveryError> {
    if text(&record.patient.id).trim().is_empty() {
        return Err(DeliveryError::InvalidRecord(
            "record has no patient id".to_string(),
        ));
    }
    if text(&record.observation.identifier).trim().is_empty() {
        return Err(DeliveryError::InvalidRecord(
            "record has no observation identifier".to_string(),
        ));
    }
    Ok(())
}

fn msh_segment(
    ctx: &BuildContext,
    variant: MessageVariant,
    generated: &str,
    encoding: Hl7Encoding,
) -> Segment {
    let (code, trigger) = match variant {
        MessageVariant::ObservationResult => ("ORU", "R01"),
        MessageVariant::Referral => ("REF", "I12"),
    };

    let mut msh = Segment::new("MSH");
    msh.push(Field::Raw(encoding.delimiter_block())); // MSH-2 delimiters
    msh.push_value(&ctx.software.product_name); // MSH-3 sending application
    msh.push_value(&ctx.software.product_name); // MSH-4 sending facility
    msh.push_value(RECEIVING_APPLICATION); // MSH-5 receiving application
    msh.push_empty(); // MSH-6 receiving facility
    msh.push_value(generated); // MSH-7 date/time of message
    msh.push_empty(); // MSH-8 security
    msh.push_composite(vec![code.to_string(), trigger.to_string()]); // MSH-9 message type
    msh.push_value(MESSAGE_CONTROL_ID); // MSH-10
    msh.push_value(PROCESSING_ID); // MSH-11
    msh.push_value(VERSION_ID); // MSH-12
    msh
}

fn sft_segment(ctx: &BuildContext) -> Segment {
    let mut sft = Segment::new("SFT");
    sft.push_value(&ctx.software.organization); // SFT-1 vendor organization
    sft.push_value(&ctx.software.version); // SFT-2 software version
    sft.push_value(&ctx.software.product_name); // SFT-3 product name
    sft.push_empty(); // SFT-4 software binary id
    sft.push_value(&ctx.software.package_name); // SFT-5 product information
    sft.push_empty(); // SFT-6 install date
    sft
}

fn pid_segment(record: &ResultRecord) -> Segment {
    let mut pid = Segment::new("PID");
    pid.push_empty(); // PID-1 set id
    pid.push_empty(); // PID-2
    pid.push_value(text(&record.patient.id)); // PID-3 patient identifier
    pid.push_empty(); // PID-4
    pid.push_composite(vec![
        text(&record.patient.family_name).to_string(),
        text(&record.patient.given_name).to_string(),
    ]); // PID-5 patient name
    pid.push_empty(); // PID-6
    match record.patient.dob {
        Some(dob) => pid.push_value(hl7_timestamp(dob)), // PID-7 date of birth
        None => pid.push_empty(),
    }
    pid.push_value(text(&record.patient.sex)); // PID-8 sex
    pid.push_empty(); // PID-9
    pid.push_empty(); // PID-10
    pid.push_value(text(&record.patient.address)); // PID-11 address
    pid
}

fn pv1_segment(record: &ResultRecord, ctx: &BuildContext) -> Segment {
    let mut pv1 = Segment::new("PV1");
    pv1.push_empty(); // PV1-1 set id
    pv1.push_value("U"); // PV1-2 patient class (unknown)
    pv1.push_value(&ctx.software.product_name); // PV1-3 assigned location
    pv1.push_empty(); // PV1-4
    pv1.push_empty(); // PV1-5
    pv1.push_empty(); // PV1-6
    pv1.push(doctor_field(record)); // PV1-7 attending doctor
    pv1.push_empty(); // PV1-8
    pv1.push_empty(); // PV1-9
    pv1
}

fn obr_segment(record: &ResultRecord, generated: &str) -> Segment {
    let mut obr = Segment::new("OBR");
    obr.push_empty(); // OBR-1 set id
    obr.push_empty(); // OBR-2 placer order number
    obr.push_empty(); // OBR-3 filler order number
    obr.push(coded_observation_field(record)); // OBR-4 service identifier
    obr.push_empty(); // OBR-5 priority
    obr.push_empty(); // OBR-6 requested date/time
    match record.observation.observation_time {
        Some(time) => obr.push_value(hl7_timestamp(time)), // OBR-7 observation date/time
        None => obr.push_empty(),
    }
    for _ in 0..14 {
        obr.push_empty(); // OBR-8 .. OBR-21
    }
    obr.push_value(generated); // OBR-22 results report date/time
    obr.push_empty(); // OBR-23
    obr.push_empty(); // OBR-24
    obr.push_value("F"); // OBR-25 result status (final)
    obr
}

fn obx_value_segment(record: &ResultRecord, ctx: &BuildContext, generated: &str) -> Segment {
    let mut obx = Segment::new("OBX");
    obx.push_empty(); // OBX-1 set id
    obx.push_value("NM"); // OBX-2 value type (numeric)
    obx.push(coded_observation_field(record)); // OBX-3 observation identifier
    obx.push_empty(); // OBX-4 sub-id
    obx.push_value(text(&record.observation.value)); // OBX-5 value
    obx.push_value(text(&record.observation.units)); // OBX-6 units
    obx.push_value(text(&record.observation.reference_range)); // OBX-7 reference range
    obx.push_value(text(&record.observation.abnormal_flags)); // OBX-8 abnormal flags
    obx.push_empty(); // OBX-9
    obx.push_empty(); // OBX-10
    obx.push_value("F"); // OBX-11 result status (final)
    obx.push_empty(); // OBX-12
    obx.push_empty(); // OBX-13
    obx.push_value(generated); // OBX-14 date/time of observation
    obx.push_empty(); // OBX-15
    obx.push_empty(); // OBX-16
    obx.push_value(&ctx.software.product_name); // OBX-17 observation method
    obx.push_empty(); // OBX-18
    obx.push_value(generated); // OBX-19 date/time of analysis
    obx
}

fn obx_text_segment(record: &ResultRecord, generated: &str) -> Segment {
    let mut obx = Segment::new("OBX");
    obx.push_empty(); // OBX-1 set id
    obx.push_value("FT"); // OBX-2 value type (formatted text)
    obx.push_value("DS"); // OBX-3 observation identifier
    obx.push_empty(); // OBX-4 sub-id
    obx.push_value(text(&record.free_text)); // OBX-5 value
    for _ in 0..5 {
        obx.push_empty(); // OBX-6 .. OBX-10
    }
    obx.push_value("F"); // OBX-11 result status (final)
    obx.push_empty(); // OBX-12
    obx.push_empty(); // OBX-13
    obx.push_value(generated); // OBX-14 date/time of observation
    obx
}

fn rf1_segment(record: &ResultRecord, generated: &str) -> Segment {
    let mut rf1 = Segment::new("RF1");
    rf1.push_value("P"); // RF1-1 referral status (pending)
    rf1.push_value("R"); // RF1-2 referral priority (routine)
    rf1.push_value("MED"); // RF1-3 referral type (medical)
    rf1.push_empty(); // RF1-4 referral disposition
    rf1.push_empty(); // RF1-5 referral category
    rf1.push(coded_observation_field(record)); // RF1-6 originating referral identifier
    match record.observation.observation_time {
        Some(time) => rf1.push_value(hl7_timestamp(time)), // RF1-7 effective date
        None => rf1.push_empty(),
    }
    rf1.push_empty(); // RF1-8 expiration date
    rf1.push_value(generated); // RF1-9 process date
    rf1
}

fn nte_segment(record: &ResultRecord) -> Segment {
    let mut nte = Segment::new("NTE");
    nte.push_empty(); // NTE-1 set id
    nte.push_value("L"); // NTE-2 source of comment
    nte.push_value(text(&record.free_text)); // NTE-3 comment
    nte
}

fn cti_segment(record: &ResultRecord) -> Segment {
    let mut cti = Segment::new("CTI");
    cti.push_value(text(&record.clinical_trial.study_id)); // CTI-1 sponsor study id
    cti.push_composite(vec![
        text(&record.clinical_trial.study_phase_id).to_string(),
        text(&record.clinical_trial.study_phase_text).to_string(),
    ]); // CTI-2 study phase
    cti
}

/// PV1-7: `^family^given^other^^prefix`, or an empty field when the record
/// has no attending doctor at all
fn doctor_field(record: &ResultRecord) -> Field {
    let doctor_text = text(&record.visit.attending_doctor);
    if doctor_text.trim().is_empty() {
        return Field::Empty;
    }
    let name = DoctorName::parse(doctor_text);
    Field::composite(vec![
        String::new(),
        name.family_name,
        name.given_name,
        name.other_names,
        String::new(),
        name.prefix,
    ])
}

/// `identifier^identifierText^codingSystem`
fn coded_observation_field(record: &ResultRecord) -> Field {
    Field::composite(vec![
        text(&record.observation.identifier).to_string(),
        text(&record.observation.identifier_text).to_string(),
        record.observation.coding_system.hl7_code().to_string(),
    ])
}

fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}
