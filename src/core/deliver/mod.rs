//! Message delivery
//!
//! This module places built messages on disk, including:
//! - Import directory resolution per EMR kind
//! - Per-EMR rendering and the single-byte file encoding
//! - Filename generation

pub mod directory;
pub mod writer;

pub use directory::{local_hostname, DirectoryResolver};
pub use writer::{deliver, message_filename, render_for_emr, Delivered};
