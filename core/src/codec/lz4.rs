//! codec/lz4.rs
//! LZ4 block codec (lz4_flex) behind an 8-byte header:
//! `[u32 LE uncompressed len][u32 LE compressed len][block]`.

use byteorder::{ByteOrder, LittleEndian};
use lz4_flex::block::{compress_into, decompress_into, get_maximum_output_size};

use crate::codec::place_output;
use crate::codec::types::{NativeStatus, Transfer};
use crate::constants::LZ4_HEADER_LEN;

/// lz4_flex exposes a single block compressor, so the level is validated
/// by the registry but does not change the output.
pub struct Lz4Codec {
    level: i32,
}

impl Lz4Codec {
    pub fn new(level: i32) -> Self {
        Self { level }
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn max_compressed_size(&self, n: usize) -> usize {
        get_maximum_output_size(n) + LZ4_HEADER_LEN
    }

    pub fn compress(&self, src: &[u8], dst: &mut [u8]) -> Result<Transfer, NativeStatus> {
        let mut out = vec![0u8; self.max_compressed_size(src.len())];
        let n = compress_into(src, &mut out[LZ4_HEADER_LEN..])
            .map_err(|e| NativeStatus::Failure(format!("lz4: {}", e)))?;
        LittleEndian::write_u32(&mut out[0..4], src.len() as u32);
        LittleEndian::write_u32(&mut out[4..8], n as u32);
        out.truncate(LZ4_HEADER_LEN + n);
        place_output(&out, src.len(), dst)
    }

    pub fn decompress(&self, src: &[u8], dst: &mut [u8]) -> Result<Transfer, NativeStatus> {
        if src.len() < LZ4_HEADER_LEN {
            return Err(NativeStatus::DataError("input too short for lz4 header".into()));
        }
        let orig_len = LittleEndian::read_u32(&src[0..4]) as usize;
        let comp_len = LittleEndian::read_u32(&src[4..8]) as usize;
        let block = &src[LZ4_HEADER_LEN..];
        if comp_len > block.len() {
            return Err(NativeStatus::DataError(format!(
                "lz4 block length {} exceeds remaining input {}",
                comp_len,
                block.len()
            )));
        }
        if orig_len > dst.len() {
            return Err(NativeStatus::BufferError { needed: Some(orig_len) });
        }

        let n = decompress_into(&block[..comp_len], &mut dst[..orig_len])
            .map_err(|e| NativeStatus::DataError(format!("lz4: {}", e)))?;
        if n != orig_len {
            return Err(NativeStatus::DataError(format!(
                "lz4 decoded {} bytes, header declares {}",
                n, orig_len
            )));
        }
        Ok(Transfer { consumed: LZ4_HEADER_LEN + comp_len, produced: n })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_declares_both_lengths() {
        let codec = Lz4Codec::new(6);
        let src = b"abcabcabcabcabcabcabcabc".repeat(20);
        let mut dst = vec![0u8; codec.max_compressed_size(src.len())];
        let t = codec.compress(&src, &mut dst).unwrap();
        assert_eq!(LittleEndian::read_u32(&dst[0..4]) as usize, src.len());
        assert_eq!(LittleEndian::read_u32(&dst[4..8]) as usize + LZ4_HEADER_LEN, t.produced);
    }

    #[test]
    fn reports_needed_size() {
        let codec = Lz4Codec::new(1);
        let src = vec![1u8; 1000];
        let mut dst = vec![0u8; codec.max_compressed_size(src.len())];
        let t = codec.compress(&src, &mut dst).unwrap();
        let mut small = vec![0u8; 10];
        let err = codec.decompress(&dst[..t.produced], &mut small).unwrap_err();
        assert_eq!(err, NativeStatus::BufferError { needed: Some(1000) });
    }

    #[test]
    fn truncated_block_is_data_error() {
        let codec = Lz4Codec::new(1);
        let src = vec![5u8; 300];
        let mut dst = vec![0u8; codec.max_compressed_size(src.len())];
        let t = codec.compress(&src, &mut dst).unwrap();
        let mut out = vec![0u8; 300];
        let err = codec.decompress(&dst[..t.produced - 1], &mut out).unwrap_err();
        assert!(matches!(err, NativeStatus::DataError(_)));
    }
}
