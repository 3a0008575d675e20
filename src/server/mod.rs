//! Framed TCP front end for pushed record batches
//!
//! - [`codec`] - MLLP-style frame codec
//! - [`stream`] - Accept loop and per-connection handler

pub mod codec;
pub mod stream;

pub use codec::FrameCodec;
pub use stream::{handle_connection, serve, serve_with_listener};
