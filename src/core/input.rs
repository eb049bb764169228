use crate::config::app_config::{AppConfig, DEFAULT_SAMPLE};
use crate::core::retry::RetryPolicy;
use crate::core::{HttpTransport, Record, Result};
use crate::utils::error::EtlError;
use crate::utils::validation;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

/// Where the record of a run comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    File(PathBuf),
    /// A URL or the name of an entry in `api_endpoints`.
    Api(String),
    /// The name of an entry in `test_data`.
    Sample(String),
}

impl InputSource {
    /// Picks the source from the mutually exclusive `--input` / `--api`
    /// options, falling back to a named sample.
    pub fn select(input: Option<PathBuf>, api: Option<String>, sample: Option<String>) -> Result<Self> {
        match (input, api) {
            (Some(_), Some(_)) => Err(EtlError::config(
                "--input and --api are mutually exclusive",
            )),
            (Some(path), None) => Ok(InputSource::File(path)),
            (None, Some(target)) => Ok(InputSource::Api(target)),
            (None, None) => Ok(InputSource::Sample(
                sample.unwrap_or_else(|| DEFAULT_SAMPLE.to_string()),
            )),
        }
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSource::File(path) => write!(f, "file:{}", path.display()),
            InputSource::Api(target) => write!(f, "api:{}", target),
            InputSource::Sample(name) => write!(f, "sample:{}", name),
        }
    }
}

/// Turns an [`InputSource`] into exactly one [`Record`].
pub struct InputResolver<'a, T: HttpTransport> {
    config: &'a AppConfig,
    transport: &'a T,
    retry: RetryPolicy,
}

impl<'a, T: HttpTransport> InputResolver<'a, T> {
    pub fn new(config: &'a AppConfig, transport: &'a T) -> Self {
        Self {
            config,
            transport,
            retry: RetryPolicy::from_config(&config.processing),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub async fn resolve(&self, source: &InputSource) -> Result<Record> {
        match source {
            InputSource::File(path) => self.read_file(path),
            InputSource::Api(target) => self.fetch_api(target).await,
            InputSource::Sample(name) => {
                tracing::info!("No input given, using sample data '{}'", name);
                Ok(self.config.sample(name)?.clone())
            }
        }
    }

    fn read_file(&self, path: &Path) -> Result<Record> {
        tracing::info!("Processing file: {}", path.display());

        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                EtlError::input(format!("File not found: {}", path.display()))
            }
            _ => EtlError::input(format!("cannot read {}: {}", path.display(), e)),
        })?;

        let document: Value = serde_json::from_str(&content).map_err(|e| {
            EtlError::input(format!("Invalid JSON in file {}: {}", path.display(), e))
        })?;

        Record::from_value(document)
    }

    /// Looks the target up in `api_endpoints`, otherwise requires an http(s) URL.
    pub fn resolve_url(&self, target: &str) -> Result<String> {
        if let Some(url) = self.config.endpoint(target) {
            tracing::debug!("Using configured endpoint '{}': {}", target, url);
            return Ok(url.to_string());
        }

        validation::validate_url("--api", target).map_err(|e| {
            EtlError::input(format!(
                "'{}' is neither a configured endpoint nor a valid URL ({})",
                target, e
            ))
        })?;
        Ok(target.to_string())
    }

    async fn fetch_api(&self, target: &str) -> Result<Record> {
        let url = self.resolve_url(target)?;
        tracing::info!("Querying API: {}", url);

        let timeout = self.config.processing.timeout();
        let transport = self.transport;
        let url_ref = url.as_str();
        let response = self
            .retry
            .run(&format!("GET {}", url), move |attempt| async move {
                tracing::debug!("GET {} (attempt {})", url_ref, attempt);
                transport.get(url_ref, timeout).await.and_then(|response| {
                    if response.is_success() {
                        Ok(response)
                    } else {
                        Err(EtlError::input(format!(
                            "API request failed with status code: {}",
                            response.status
                        )))
                    }
                })
            })
            .await?;

        let document: Value = serde_json::from_str(&response.body).map_err(|e| {
            EtlError::input(format!("API response from {} is not valid JSON: {}", url, e))
        })?;

        let record = Self::first_object(document)?;
        Ok(self.apply_field_mapping(record))
    }

    /// An array response contributes its first object.
    fn first_object(document: Value) -> Result<Record> {
        match document {
            Value::Array(items) => {
                let first = items
                    .into_iter()
                    .next()
                    .ok_or_else(|| EtlError::input("API returned an empty array"))?;
                Record::from_value(first)
            }
            other => Record::from_value(other),
        }
    }

    /// Fills absent target fields from the response as received, then from
    /// `field_defaults`. Mappings never see each other's output.
    fn apply_field_mapping(&self, record: Record) -> Record {
        let processing = &self.config.processing;
        let response = record.data;
        let mut data = response.clone();

        for (target, source) in &processing.field_mapping {
            if response.contains_key(target) {
                continue;
            }
            if let Some(value) = response.get(source) {
                tracing::debug!("Mapped API field '{}' to '{}'", source, target);
                data.insert(target.clone(), value.clone());
            }
        }

        for (target, fallback) in &processing.field_defaults {
            if !data.contains_key(target) {
                tracing::warn!("API response has no '{}', using {}", target, fallback);
                data.insert(target.clone(), fallback.clone());
            }
        }
        Record::new(data)
    }
}
