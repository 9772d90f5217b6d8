//! codec/registry.rs
//! Per-algorithm capabilities and the software backend factory.

use crate::codec::deflate::DeflateCodec;
use crate::codec::lz4::Lz4Codec;
use crate::codec::types::{Algorithm, CodecParams};
use crate::codec::zstd::ZstdCodec;
use crate::codec::NativeStatus;
use crate::types::{QatError, Result};

pub struct CodecInfo {
    pub name: &'static str,
    pub min_level: i32,
    pub max_level: i32,
    pub default_level: i32,
    pub supports_checksum: bool,
    pub uses_data_format: bool,
}

pub fn resolve(algorithm: Algorithm) -> CodecInfo {
    match algorithm {
        Algorithm::Deflate => CodecInfo {
            name: "deflate",
            min_level: 1,
            max_level: 9,
            default_level: 6,
            supports_checksum: false,
            uses_data_format: true,
        },
        Algorithm::Lz4 => CodecInfo {
            name: "lz4",
            min_level: 1,
            max_level: 12,
            default_level: 6,
            supports_checksum: false,
            uses_data_format: false,
        },
        Algorithm::Zstd => CodecInfo {
            name: "zstd",
            min_level: 1,
            max_level: 12,
            default_level: 6,
            supports_checksum: true,
            uses_data_format: false,
        },
    }
}

pub fn validate_level(algorithm: Algorithm, level: i32) -> Result<()> {
    let info = resolve(algorithm);
    if level < info.min_level || level > info.max_level {
        return Err(QatError::InvalidArgument(format!(
            "invalid {} level {}, expected {}..={}",
            info.name, level, info.min_level, info.max_level
        )));
    }
    Ok(())
}

/// Software backend for one algorithm.
pub enum Backend {
    Deflate(DeflateCodec),
    Lz4(Lz4Codec),
    Zstd(ZstdCodec),
}

pub fn create_backend(params: &CodecParams) -> std::result::Result<Backend, NativeStatus> {
    if validate_level(params.algorithm, params.level).is_err() {
        return Err(NativeStatus::Failure(format!(
            "level {} rejected by {} engine",
            params.level, params.algorithm
        )));
    }
    match params.algorithm {
        Algorithm::Deflate => Ok(Backend::Deflate(DeflateCodec::new(params.level, params.data_format))),
        Algorithm::Lz4 => Ok(Backend::Lz4(Lz4Codec::new(params.level))),
        Algorithm::Zstd => ZstdCodec::new(params.level, params.checksum).map(Backend::Zstd),
    }
}
