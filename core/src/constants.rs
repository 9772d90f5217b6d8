//! constants.rs
//! Session defaults, engine limits and stream framing constants.

/// Default compression level (balanced), valid for every algorithm.
pub const DEFAULT_LEVEL: i32 = 6;

/// Default number of extra hardware submissions after a busy response.
pub const DEFAULT_RETRY_COUNT: u32 = 0;

/// Hardware buffer sizes accepted by the device queue.
pub const DEFAULT_HW_BUFFER_SIZE: usize = 64 * 1024; // 64 KiB
pub const MAX_HW_BUFFER_SIZE: usize = 512 * 1024; // 512 KiB

/// Defaults for the chunked streams when no buffer size is given.
pub const DEFAULT_STREAM_BUFFER_SIZE: usize = 64 * 1024; // 64 KiB

/// Upper limit for one decompressed frame held by the stream reader (32 MiB).
pub const MAX_CHUNK_SIZE: usize = 32 * 1024 * 1024;

/// Chunk frame header: one big-endian u32 payload length.
pub const FRAME_HEADER_LEN: usize = 4;

/// Engine format headers.
pub const DEFLATE_4B_HEADER_LEN: usize = 4;
pub const LZ4_HEADER_LEN: usize = 8;

/// Gzip extra-field subfield id written by the `DeflateGzipExt` format.
pub const GZIP_EXT_SUBFIELD_ID: [u8; 2] = *b"QZ";

/// Smallest scratch buffer handed out by the bridge pool.
pub const MIN_POOL_BUCKET: usize = 4096;

/// Set to `1` to expose the emulated accelerator through `detect()`.
pub const EMULATED_DEVICE_ENV: &str = "QAT_EMULATED_DEVICE";
