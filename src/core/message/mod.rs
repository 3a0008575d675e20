//! Message construction
//!
//! This module turns result records into serialized messages, including:
//! - The wire representation (segments, fields, delimiters, escaping)
//! - The fixed segment layouts for both message variants
//! - Timestamp formatting shared across segments

pub mod builder;
pub mod wire;

pub use builder::{build_message, hl7_timestamp, BuildContext, SoftwareInfo};
pub use wire::{Field, Hl7Encoding, Segment, WireMessage, SEGMENT_DELIMITER};
