//! Byte buffer primitives shared by the archive codec.
//!
//! [`Writer`] grows on demand and never fails; [`Reader`] checks every read
//! against the end of its input and reports [`BufferError`] instead of panicking.

mod reader;
mod writer;

pub use reader::Reader;
pub use writer::{is_float32, Writer};

use thiserror::Error;

/// Failure while reading from a [`Reader`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    #[error("unexpected end of buffer")]
    EndOfBuffer,
    #[error("invalid UTF-8")]
    InvalidUtf8,
}
