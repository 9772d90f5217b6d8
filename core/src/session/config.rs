//! session/config.rs
//! Session configuration and its builder.

use serde::{Deserialize, Serialize};

use crate::codec::{
    registry, Accelerator, Algorithm, CodecParams, DataFormat, HardwareBufferSize, Mode, PollingMode,
};
use crate::constants::{DEFAULT_LEVEL, DEFAULT_RETRY_COUNT};
use crate::session::Session;
use crate::types::{QatError, Result};

/// Everything a session is created from. Loadable from JSON; unknown
/// fields are rejected and missing ones take the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    pub algorithm: Algorithm,
    pub level: i32,
    pub mode: Mode,
    pub retry_count: u32,
    pub polling_mode: PollingMode,
    pub data_format: DataFormat,
    pub hardware_buffer_size: HardwareBufferSize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Deflate,
            level: DEFAULT_LEVEL,
            mode: Mode::Auto,
            retry_count: DEFAULT_RETRY_COUNT,
            polling_mode: PollingMode::Busy,
            data_format: DataFormat::DeflateGzipExt,
            hardware_buffer_size: HardwareBufferSize::Default64K,
        }
    }
}

impl SessionConfig {
    pub fn new(algorithm: Algorithm) -> Self {
        Self { algorithm, ..Self::default() }
    }

    pub fn validate(&self) -> Result<()> {
        registry::validate_level(self.algorithm, self.level)
    }

    pub fn from_json(s: &str) -> Result<Self> {
        let cfg: SessionConfig = serde_json::from_str(s)
            .map_err(|e| QatError::InvalidArgument(format!("session config: {}", e)))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| QatError::InvalidArgument(format!("session config: {}", e)))
    }

    pub fn codec_params(&self) -> CodecParams {
        CodecParams {
            algorithm: self.algorithm,
            level: self.level,
            data_format: self.data_format,
            polling_mode: self.polling_mode,
            hw_buffer_size: self.hardware_buffer_size.bytes(),
            checksum: false,
        }
    }
}

/// Fluent construction of a [`Session`]. Validation happens in `build()`.
#[derive(Default)]
pub struct SessionBuilder {
    config: SessionConfig,
    retry_error: Option<i64>,
    accelerator: Option<Box<dyn Accelerator>>,
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        self.config.algorithm = algorithm;
        self
    }

    pub fn level(mut self, level: i32) -> Self {
        self.config.level = level;
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.config.mode = mode;
        self
    }

    pub fn retry_count(mut self, retry_count: u32) -> Self {
        self.config.retry_count = retry_count;
        self.retry_error = None;
        self
    }

    /// Signed retry count as it arrives from foreign callers; negative values
    /// fail at `build()`.
    pub fn try_retry_count(mut self, retry_count: i64) -> Self {
        match u32::try_from(retry_count) {
            Ok(n) => {
                self.config.retry_count = n;
                self.retry_error = None;
            }
            Err(_) => self.retry_error = Some(retry_count),
        }
        self
    }

    pub fn polling_mode(mut self, polling_mode: PollingMode) -> Self {
        self.config.polling_mode = polling_mode;
        self
    }

    pub fn data_format(mut self, data_format: DataFormat) -> Self {
        self.config.data_format = data_format;
        self
    }

    pub fn hardware_buffer_size(mut self, size: HardwareBufferSize) -> Self {
        self.config.hardware_buffer_size = size;
        self
    }

    /// Use this device instead of probing the host.
    pub fn accelerator(mut self, accelerator: Box<dyn Accelerator>) -> Self {
        self.accelerator = Some(accelerator);
        self
    }

    /// The validated configuration, without creating a session.
    pub fn config(&self) -> Result<SessionConfig> {
        if let Some(n) = self.retry_error {
            return Err(QatError::InvalidArgument(format!("invalid retry count {}", n)));
        }
        self.config.validate()?;
        Ok(self.config)
    }

    pub fn build(self) -> Result<Session> {
        let config = self.config()?;
        match self.accelerator {
            Some(acc) => Session::with_accelerator(config, acc),
            None => Session::new(config),
        }
    }
}
