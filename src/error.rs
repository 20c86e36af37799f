//! Error handling for Smacker decoding
//!
//! This module re-exports the error type used throughout the decoder.
//! It uses thiserror for ergonomic error handling and groups failures into
//! I/O, format and unsupported-feature errors.

pub use crate::common::Result;
pub use crate::common::SmackerError;
