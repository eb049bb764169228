pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use crate::adapters::{LocalStorage, ReqwestTransport};
pub use crate::config::app_config::AppConfig;
pub use crate::core::{etl::EtlEngine, input::InputSource, pipeline::RecordPipeline};
pub use crate::utils::error::{EtlError, Result};
