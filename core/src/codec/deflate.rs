//! codec/deflate.rs
//! Deflate via flate2 in four container formats: raw, 4-byte length prefix,
//! gzip, and gzip with a `QZ` extra subfield carrying the source length.

use std::io::Write;

use byteorder::{ByteOrder, LittleEndian};
use flate2::{bufread, write::DeflateEncoder, Compression, GzBuilder};

use crate::codec::types::{DataFormat, NativeStatus, Transfer};
use crate::codec::{drain_into, place_output};
use crate::constants::{DEFLATE_4B_HEADER_LEN, GZIP_EXT_SUBFIELD_ID};

const GZIP_OVERHEAD: usize = 18; // 10 header + 8 trailer
const GZIP_EXT_OVERHEAD: usize = GZIP_OVERHEAD + 2 + 8; // XLEN + one 4-byte subfield

pub struct DeflateCodec {
    level: Compression,
    format: DataFormat,
}

impl DeflateCodec {
    pub fn new(level: i32, format: DataFormat) -> Self {
        let lvl = match level {
            1..=9 => Compression::new(level as u32),
            _ => Compression::default(),
        };
        Self { level: lvl, format }
    }

    pub fn format(&self) -> DataFormat {
        self.format
    }

    pub fn max_compressed_size(&self, n: usize) -> usize {
        let overhead = match self.format {
            DataFormat::DeflateRaw => 0,
            DataFormat::Deflate4B => DEFLATE_4B_HEADER_LEN,
            DataFormat::DeflateGzip => GZIP_OVERHEAD,
            DataFormat::DeflateGzipExt => GZIP_EXT_OVERHEAD,
        };
        n + (n >> 3) + 64 + overhead
    }

    pub fn compress(&self, src: &[u8], dst: &mut [u8]) -> Result<Transfer, NativeStatus> {
        let out = match self.format {
            DataFormat::DeflateRaw => self.raw(src)?,
            DataFormat::Deflate4B => {
                let body = self.raw(src)?;
                let mut out = vec![0u8; DEFLATE_4B_HEADER_LEN];
                LittleEndian::write_u32(&mut out, body.len() as u32);
                out.extend_from_slice(&body);
                out
            }
            DataFormat::DeflateGzip => {
                let enc = GzBuilder::new().write(Vec::with_capacity(src.len() / 2 + 32), self.level);
                finish_gzip(enc, src)?
            }
            DataFormat::DeflateGzipExt => {
                let mut extra = Vec::with_capacity(8);
                extra.extend_from_slice(&GZIP_EXT_SUBFIELD_ID);
                extra.extend_from_slice(&4u16.to_le_bytes());
                extra.extend_from_slice(&(src.len() as u32).to_le_bytes());
                let enc = GzBuilder::new()
                    .extra(extra)
                    .write(Vec::with_capacity(src.len() / 2 + 40), self.level);
                finish_gzip(enc, src)?
            }
        };
        place_output(&out, src.len(), dst)
    }

    pub fn decompress(&self, src: &[u8], dst: &mut [u8]) -> Result<Transfer, NativeStatus> {
        match self.format {
            DataFormat::DeflateRaw => {
                let mut input = src;
                let produced = {
                    let mut dec = bufread::DeflateDecoder::new(&mut input);
                    drain_into(&mut dec, dst)?
                };
                Ok(Transfer { consumed: src.len() - input.len(), produced })
            }
            DataFormat::Deflate4B => {
                if src.len() < DEFLATE_4B_HEADER_LEN {
                    return Err(NativeStatus::DataError("missing 4-byte length prefix".into()));
                }
                let body_len = LittleEndian::read_u32(&src[..DEFLATE_4B_HEADER_LEN]) as usize;
                let body = &src[DEFLATE_4B_HEADER_LEN..];
                if body_len > body.len() {
                    return Err(NativeStatus::DataError(format!(
                        "length prefix {} exceeds remaining input {}",
                        body_len,
                        body.len()
                    )));
                }
                let mut input = &body[..body_len];
                let produced = {
                    let mut dec = bufread::DeflateDecoder::new(&mut input);
                    drain_into(&mut dec, dst)?
                };
                Ok(Transfer { consumed: DEFLATE_4B_HEADER_LEN + body_len - input.len(), produced })
            }
            DataFormat::DeflateGzip => {
                let mut input = src;
                let produced = {
                    let mut dec = bufread::GzDecoder::new(&mut input);
                    drain_into(&mut dec, dst)?
                };
                Ok(Transfer { consumed: src.len() - input.len(), produced })
            }
            DataFormat::DeflateGzipExt => {
                let mut input = src;
                let produced = {
                    let mut dec = bufread::GzDecoder::new(&mut input);
                    let produced = drain_into(&mut dec, dst)?;
                    let declared = dec
                        .header()
                        .and_then(|h| h.extra())
                        .and_then(declared_length)
                        .ok_or_else(|| NativeStatus::DataError("missing QZ extra subfield".into()))?;
                    if declared != produced {
                        return Err(NativeStatus::DataError(format!(
                            "decoded {} bytes, header declares {}",
                            produced, declared
                        )));
                    }
                    produced
                };
                Ok(Transfer { consumed: src.len() - input.len(), produced })
            }
        }
    }

    fn raw(&self, src: &[u8]) -> Result<Vec<u8>, NativeStatus> {
        let mut enc = DeflateEncoder::new(Vec::with_capacity(src.len() / 2 + 16), self.level);
        enc.write_all(src)
            .map_err(|e| NativeStatus::Failure(format!("deflate: {}", e)))?;
        enc.finish()
            .map_err(|e| NativeStatus::Failure(format!("deflate: {}", e)))
    }
}

fn finish_gzip(mut enc: flate2::write::GzEncoder<Vec<u8>>, src: &[u8]) -> Result<Vec<u8>, NativeStatus> {
    enc.write_all(src)
        .map_err(|e| NativeStatus::Failure(format!("gzip: {}", e)))?;
    enc.finish()
        .map_err(|e| NativeStatus::Failure(format!("gzip: {}", e)))
}

/// Walk the gzip extra field for the `QZ` subfield and read its u32 length.
fn declared_length(extra: &[u8]) -> Option<usize> {
    let mut rest = extra;
    while rest.len() >= 4 {
        let id = [rest[0], rest[1]];
        let len = LittleEndian::read_u16(&rest[2..4]) as usize;
        let data = rest.get(4..4 + len)?;
        if id == GZIP_EXT_SUBFIELD_ID && len == 4 {
            return Some(LittleEndian::read_u32(data) as usize);
        }
        rest = &rest[4 + len..];
    }
    None
}
