//! Window and runtime configuration

use std::time::Duration;

use trellis_wire::Encoding;
use trellis_wire::json::UnknownEncoding;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Encoding(#[from] UnknownEncoding),

    #[error("invalid window size {0:?}, expected WIDTHxHEIGHT")]
    WindowSize(String),
}

/// Settings for one window
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Wire encoding spoken with the native side
    pub encoding: Encoding,
    /// Round-trip timeout for worker transports
    pub timeout: Duration,
    /// `tracing` filter directive
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "Trellis".to_string(),
            width: 800,
            height: 600,
            encoding: Encoding::Binary,
            timeout: Duration::from_secs(5),
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Defaults overridden by `TRELLIS_ENCODING`, `TRELLIS_LOG` and
    /// `TRELLIS_WINDOW_SIZE`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`Config::from_env`] with a custom variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(encoding) = lookup("TRELLIS_ENCODING") {
            config.encoding = encoding.parse()?;
        }
        if let Some(filter) = lookup("TRELLIS_LOG") {
            config.log_filter = filter;
        }
        if let Some(size) = lookup("TRELLIS_WINDOW_SIZE") {
            (config.width, config.height) = parse_size(&size)?;
        }

        Ok(config)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }
}

fn parse_size(s: &str) -> Result<(u32, u32), ConfigError> {
    let err = || ConfigError::WindowSize(s.to_string());
    let (w, h) = s.trim().split_once(['x', 'X']).ok_or_else(err)?;
    let width = w.trim().parse().map_err(|_| err())?;
    let height = h.trim().parse().map_err(|_| err())?;
    if width == 0 || height == 0 {
        return Err(err());
    }
    Ok((width, height))
}
