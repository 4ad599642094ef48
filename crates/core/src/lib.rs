pub mod classification;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;

pub use classification::RiskLevel;
pub use config::{Config, ConfigError, Mode, NlConfig, ProviderConfig};
pub use context::PipelineContext;
pub use error::{Error, Result};
