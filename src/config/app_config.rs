use crate::domain::model::Record;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config.json";
pub const DEFAULT_SAMPLE: &str = "valid_sample";
pub const DEFAULT_LOG_FORMAT: &str = "{timestamp} - {name} - {level} - {message}";

/// Settings for every pipeline stage. Sections and keys missing from the
/// JSON file take the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_endpoints: HashMap<String, String>,
    pub test_data: HashMap<String, Record>,
    pub logging: LoggingConfig,
    pub processing: ProcessingConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    /// Template with `{timestamp}`, `{name}`, `{level}` and `{message}`,
    /// or `json` for one JSON object per line.
    pub format: String,
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    #[serde(alias = "WARN")]
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backoff {
    #[default]
    Fixed,
    Exponential,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    pub default_multiplier: Number,
    /// Total number of attempts for an API request.
    pub retries: u32,
    /// Per-request timeout in seconds.
    pub timeout: f64,
    /// Delay between attempts in seconds.
    pub retry_delay: f64,
    pub backoff: Backoff,
    /// Whether a record that fails validation makes the run exit non-zero.
    pub fail_on_invalid: bool,
    /// Target field -> field of the API response to copy it from.
    pub field_mapping: BTreeMap<String, String>,
    /// Values for fields an API response still lacks after mapping.
    pub field_defaults: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Reports are only written when a directory is configured.
    pub directory: Option<PathBuf>,
    pub format: OutputFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut api_endpoints = HashMap::new();
        api_endpoints.insert(
            "todos".to_string(),
            "https://jsonplaceholder.typicode.com/todos/1".to_string(),
        );

        let mut sample = Map::new();
        sample.insert("name".to_string(), Value::String("Sample".to_string()));
        sample.insert("value".to_string(), Value::Number(10.into()));
        let mut test_data = HashMap::new();
        test_data.insert(DEFAULT_SAMPLE.to_string(), Record::new(sample));

        Self {
            api_endpoints,
            test_data,
            logging: LoggingConfig::default(),
            processing: ProcessingConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: DEFAULT_LOG_FORMAT.to_string(),
            file: None,
        }
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            default_multiplier: Number::from(1),
            retries: 3,
            timeout: 30.0,
            retry_delay: 1.0,
            backoff: Backoff::Fixed,
            fail_on_invalid: true,
            field_mapping: BTreeMap::from([
                ("name".to_string(), "title".to_string()),
                ("value".to_string(), "id".to_string()),
            ]),
            field_defaults: BTreeMap::from([
                ("name".to_string(), Value::String("Unknown".to_string())),
                ("value".to_string(), Value::Number(0.into())),
            ]),
        }
    }
}

impl ProcessingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout).unwrap_or(Duration::from_secs(30))
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.retry_delay).unwrap_or(Duration::from_secs(1))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    File(PathBuf),
    Defaults,
}

/// A configuration plus what happened while loading it. Warnings are kept
/// here because logging is set up from the configuration itself.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub origin: ConfigOrigin,
    pub warnings: Vec<String>,
}

impl LoadedConfig {
    fn defaults(warning: String) -> Self {
        Self {
            config: AppConfig::default(),
            origin: ConfigOrigin::Defaults,
            warnings: vec![warning],
        }
    }
}

impl AppConfig {
    /// Loads the configuration file. A missing or syntactically broken file
    /// falls back to defaults unless `strict` is set. Values of the wrong
    /// type or out of range are always a `ConfigError`.
    pub fn load<P: AsRef<Path>>(path: P, strict: bool) -> Result<LoadedConfig> {
        let path = path.as_ref();

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if strict => {
                return Err(EtlError::config(format!(
                    "cannot read config file {}: {}",
                    path.display(),
                    e
                )));
            }
            Err(e) => {
                return Ok(LoadedConfig::defaults(format!(
                    "Config file not found: {} ({}), using defaults",
                    path.display(),
                    e
                )));
            }
        };

        let document = match Self::parse_document(&content) {
            Ok(document) => document,
            Err(e) if strict => return Err(e),
            Err(e) => {
                return Ok(LoadedConfig::defaults(format!(
                    "Invalid JSON in config file {}: {}, using defaults",
                    path.display(),
                    e
                )));
            }
        };

        let config = Self::from_document(document)?;
        Ok(LoadedConfig {
            config,
            origin: ConfigOrigin::File(path.to_path_buf()),
            warnings: Vec::new(),
        })
    }

    /// Parses and validates configuration from a JSON string.
    pub fn from_json_str(content: &str) -> Result<Self> {
        Self::from_document(Self::parse_document(content)?)
    }

    fn parse_document(content: &str) -> Result<Value> {
        let processed = Self::substitute_env_vars(content)?;
        serde_json::from_str(&processed)
            .map_err(|e| EtlError::config(format!("JSON parsing error: {}", e)))
    }

    fn from_document(document: Value) -> Result<Self> {
        let config: Self = serde_json::from_value(document)
            .map_err(|e| EtlError::config(format!("invalid configuration: {}", e)))?;
        config.validate_config()?;
        Ok(config)
    }

    /// Replaces `${VAR}` with the environment value; unknown names stay as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| EtlError::config(format!("env substitution pattern: {}", e)))?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        for (name, url) in &self.api_endpoints {
            validation::validate_url(&format!("api_endpoints.{}", name), url)?;
        }

        validation::validate_positive_number(
            "processing.retries",
            self.processing.retries as usize,
            1,
        )?;
        validation::validate_seconds("processing.timeout", self.processing.timeout, false)?;
        validation::validate_seconds("processing.retry_delay", self.processing.retry_delay, true)?;

        for (target, source) in &self.processing.field_mapping {
            validation::validate_non_empty_string("processing.field_mapping", target)?;
            validation::validate_non_empty_string("processing.field_mapping", source)?;
        }
        for target in self.processing.field_defaults.keys() {
            validation::validate_non_empty_string("processing.field_defaults", target)?;
        }

        if let Some(file) = &self.logging.file {
            validation::validate_path("logging.file", &file.to_string_lossy())?;
        }
        if let Some(directory) = &self.output.directory {
            validation::validate_path("output.directory", &directory.to_string_lossy())?;
        }

        Ok(())
    }

    pub fn endpoint(&self, name: &str) -> Option<&str> {
        self.api_endpoints.get(name).map(String::as_str)
    }

    pub fn sample(&self, name: &str) -> Result<&Record> {
        self.test_data
            .get(name)
            .ok_or_else(|| EtlError::config(format!("test_data has no sample named '{}'", name)))
    }

    pub fn multiplier(&self) -> &Number {
        &self.processing.default_multiplier
    }
}
