//! qat-core
//!
//! Session lifecycle and buffer bridging over a hardware (or software
//! fallback) compression engine, plus a length-prefixed chunked stream.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;

// Engines and the native side
pub mod codec;
pub mod native;
pub mod telemetry;

// Caller-facing layers
pub mod buffer;
pub mod session;
pub mod stream;

pub use types::{QatError, Result};

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::buffer::ByteBuffer;
    pub use crate::codec::{Algorithm, DataFormat, EmulatedAccelerator, HardwareBufferSize, Mode, PollingMode};
    pub use crate::session::{Session, SessionBuilder, SessionConfig, SessionState};
    pub use crate::stream::{CompressorWriter, DecompressorReader};
    pub use crate::telemetry::TelemetrySnapshot;
    pub use crate::types::{QatError, Result};
}
