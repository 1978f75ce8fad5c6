//! Tracing setup

use std::sync::Once;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::Config;

static INSTALLED: Once = Once::new();

/// Install a fmt subscriber filtered by `config.log_filter` (idempotent)
///
/// An unparsable filter falls back to `info`. Does nothing if another
/// global subscriber is already set.
pub fn init(config: &Config) {
    INSTALLED.call_once(|| {
        let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));

        let result = tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_filter(filter))
            .try_init();

        if result.is_err() {
            eprintln!("trellis: a tracing subscriber is already installed");
        }
    });
}
