//! session/mod.rs
//! Session lifecycle, configuration and the buffer adapter.

pub mod adapter;
pub mod config;
pub mod core;

pub use self::adapter::BufferView;
pub use self::config::{SessionBuilder, SessionConfig};
pub use self::core::{Session, SessionState};
