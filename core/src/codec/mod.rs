//! codec/mod.rs
//! Compression engines: configuration types, registry, software codecs and
//! the hardware accelerator seam.

pub mod accelerator;
pub mod deflate;
pub mod engine;
pub mod lz4;
pub mod registry;
pub mod types;
pub mod zstd;

pub use accelerator::{detect, Accelerator, EmulatedAccelerator};
pub use engine::{NativeCodec, SoftwareCodec};
pub use registry::{resolve, validate_level, CodecInfo};
pub use types::*;

use std::io::Read;

/// Copy a fully encoded frame into `dst`, or report the size it needs.
pub(crate) fn place_output(out: &[u8], consumed: usize, dst: &mut [u8]) -> Result<Transfer, NativeStatus> {
    if out.len() > dst.len() {
        return Err(NativeStatus::BufferError { needed: Some(out.len()) });
    }
    dst[..out.len()].copy_from_slice(out);
    Ok(Transfer { consumed, produced: out.len() })
}

/// Decode from `reader` into `dst`. Output that does not fit is a
/// `BufferError`; decoder failures are `DataError`. `dst` is written only
/// once the whole output is known to fit.
pub(crate) fn drain_into<R: Read>(reader: &mut R, dst: &mut [u8]) -> Result<usize, NativeStatus> {
    // one byte past dst is enough to tell "too small" from "exact fit"
    let mut out = Vec::new();
    reader
        .by_ref()
        .take(dst.len() as u64 + 1)
        .read_to_end(&mut out)
        .map_err(|e| NativeStatus::DataError(e.to_string()))?;
    if out.len() > dst.len() {
        return Err(NativeStatus::BufferError { needed: None });
    }
    dst[..out.len()].copy_from_slice(&out);
    Ok(out.len())
}
