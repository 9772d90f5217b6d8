//! codec/engine.rs
//! The engine boundary (`NativeCodec`) and the in-tree software engine.

use tracing::debug;

use crate::codec::registry::{create_backend, Backend};
use crate::codec::types::{CodecParams, NativeStatus, Transfer};

/// Opaque compression engine reached by a native context.
/// Every call reports a [`NativeStatus`] instead of panicking.
pub trait NativeCodec: Send {
    fn setup(&mut self, params: &CodecParams) -> Result<(), NativeStatus>;
    fn teardown(&mut self) -> Result<(), NativeStatus>;
    fn compress(&mut self, src: &[u8], dst: &mut [u8]) -> Result<Transfer, NativeStatus>;
    fn decompress(&mut self, src: &[u8], dst: &mut [u8]) -> Result<Transfer, NativeStatus>;
    /// Upper bound on compressed output for `src_len` input bytes.
    fn max_compressed_size(&self, src_len: usize) -> usize;
    fn set_checksum(&mut self, enabled: bool) -> Result<(), NativeStatus>;
}

/// Software engine backed by flate2, lz4_flex and zstd.
#[derive(Default)]
pub struct SoftwareCodec {
    backend: Option<Backend>,
}

impl SoftwareCodec {
    pub fn new() -> Self {
        Self { backend: None }
    }

    pub fn is_ready(&self) -> bool {
        self.backend.is_some()
    }

    fn backend(&mut self) -> Result<&mut Backend, NativeStatus> {
        self.backend
            .as_mut()
            .ok_or_else(|| NativeStatus::Failure("software engine not set up".into()))
    }
}

impl NativeCodec for SoftwareCodec {
    fn setup(&mut self, params: &CodecParams) -> Result<(), NativeStatus> {
        self.backend = Some(create_backend(params)?);
        debug!(algorithm = %params.algorithm, level = params.level, "software engine ready");
        Ok(())
    }

    fn teardown(&mut self) -> Result<(), NativeStatus> {
        self.backend = None;
        Ok(())
    }

    fn compress(&mut self, src: &[u8], dst: &mut [u8]) -> Result<Transfer, NativeStatus> {
        match self.backend()? {
            Backend::Deflate(c) => c.compress(src, dst),
            Backend::Lz4(c) => c.compress(src, dst),
            Backend::Zstd(c) => c.compress(src, dst),
        }
    }

    fn decompress(&mut self, src: &[u8], dst: &mut [u8]) -> Result<Transfer, NativeStatus> {
        match self.backend()? {
            Backend::Deflate(c) => c.decompress(src, dst),
            Backend::Lz4(c) => c.decompress(src, dst),
            Backend::Zstd(c) => c.decompress(src, dst),
        }
    }

    fn max_compressed_size(&self, src_len: usize) -> usize {
        match &self.backend {
            Some(Backend::Deflate(c)) => c.max_compressed_size(src_len),
            Some(Backend::Lz4(c)) => c.max_compressed_size(src_len),
            Some(Backend::Zstd(c)) => c.max_compressed_size(src_len),
            None => src_len,
        }
    }

    fn set_checksum(&mut self, enabled: bool) -> Result<(), NativeStatus> {
        match self.backend()? {
            Backend::Zstd(c) => c.set_checksum(enabled),
            _ => Err(NativeStatus::Failure("checksum flag is zstd-only".into())),
        }
    }
}
