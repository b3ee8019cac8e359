use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::core::types::Metric;

/// Unified error type for pitop.
#[derive(Error, Debug)]
pub enum SysmonError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to sample {metric}: {reason}")]
    Sampling { metric: Metric, reason: String },

    #[error("sampling {metric} timed out after {after:?}")]
    Timeout { metric: Metric, after: Duration },

    #[error("process scan failed: {0}")]
    Scan(String),

    #[error("no metrics available at startup: {0}")]
    Startup(String),

    #[error("sampler thread is gone")]
    SamplerGone,
}

impl SysmonError {
    pub fn sampling(metric: Metric, reason: impl Into<String>) -> Self {
        SysmonError::Sampling {
            metric,
            reason: reason.into(),
        }
    }
}

impl From<toml::de::Error> for SysmonError {
    fn from(e: toml::de::Error) -> Self {
        SysmonError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SysmonError>;
