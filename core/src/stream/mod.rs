//! stream/mod.rs
//! Chunked compressed streams over `std::io`.
//!
//! Responsibilities:
//! - Frame wire format (`framing`)
//! - Compressing writer and decompressing reader
//!
//! Each stream owns its session and ends it on close.

pub mod framing;
pub mod reader;
pub mod writer;

pub use framing::FrameError;
pub use reader::DecompressorReader;
pub use writer::CompressorWriter;

use std::io;

pub(crate) fn closed_error() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "stream is closed")
}
