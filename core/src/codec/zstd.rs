//! codec/zstd.rs
//! Single-frame zstd with an optional content checksum.

use zstd::stream::read::Decoder;
use zstd::zstd_safe::CParameter;

use crate::codec::types::{NativeStatus, Transfer};
use crate::codec::{drain_into, place_output};

pub struct ZstdCodec {
    compressor: zstd::bulk::Compressor<'static>,
    checksum: bool,
}

impl ZstdCodec {
    pub fn new(level: i32, checksum: bool) -> Result<Self, NativeStatus> {
        let mut compressor = zstd::bulk::Compressor::new(level)
            .map_err(|e| NativeStatus::Failure(format!("zstd init: {}", e)))?;
        compressor
            .set_parameter(CParameter::ChecksumFlag(checksum))
            .map_err(|e| NativeStatus::Failure(format!("zstd checksum flag: {}", e)))?;
        Ok(Self { compressor, checksum })
    }

    pub fn checksum(&self) -> bool {
        self.checksum
    }

    pub fn set_checksum(&mut self, enabled: bool) -> Result<(), NativeStatus> {
        self.compressor
            .set_parameter(CParameter::ChecksumFlag(enabled))
            .map_err(|e| NativeStatus::Failure(format!("zstd checksum flag: {}", e)))?;
        self.checksum = enabled;
        Ok(())
    }

    pub fn max_compressed_size(&self, n: usize) -> usize {
        zstd_safe::compress_bound(n)
    }

    pub fn compress(&mut self, src: &[u8], dst: &mut [u8]) -> Result<Transfer, NativeStatus> {
        let out = self
            .compressor
            .compress(src)
            .map_err(|e| NativeStatus::Failure(format!("zstd: {}", e)))?;
        place_output(&out, src.len(), dst)
    }

    pub fn decompress(&mut self, src: &[u8], dst: &mut [u8]) -> Result<Transfer, NativeStatus> {
        let mut input = src;
        let produced = {
            let mut dec = Decoder::with_buffer(&mut input)
                .map_err(|e| NativeStatus::Failure(format!("zstd init: {}", e)))?
                .single_frame();
            drain_into(&mut dec, dst)?
        };
        Ok(Transfer { consumed: src.len() - input.len(), produced })
    }
}
