use crate::config::app_config::{DEFAULT_CONFIG_PATH, DEFAULT_SAMPLE};
use crate::core::input::InputSource;
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "ci-automation")]
#[command(about = "Validate and transform a JSON record from a file, an API or sample data")]
pub struct CliConfig {
    /// Path to a JSON file holding the input record
    #[arg(long, conflicts_with = "api")]
    pub input: Option<PathBuf>,

    /// API endpoint to query: a URL or a name from `api_endpoints`
    #[arg(long)]
    pub api: Option<String>,

    /// Path to the JSON configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Fail instead of using defaults when the configuration file is missing or malformed
    #[arg(long)]
    pub strict: bool,

    /// Entry of `test_data` used when neither --input nor --api is given
    #[arg(long, default_value = DEFAULT_SAMPLE, conflicts_with_all = ["input", "api"])]
    pub sample: String,
}

impl CliConfig {
    pub fn input_source(&self) -> Result<InputSource> {
        InputSource::select(
            self.input.clone(),
            self.api.clone(),
            Some(self.sample.clone()),
        )
    }
}
