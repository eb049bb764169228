use crate::adapters::storage::LocalStorage;
use crate::config::app_config::AppConfig;
use crate::core::input::{InputResolver, InputSource};
use crate::core::reporter::Reporter;
use crate::core::retry::RetryPolicy;
use crate::core::transformer::Transformer;
use crate::core::validator::Validator;
use crate::core::{
    HttpTransport, Pipeline, ProcessingResult, Record, Result, Storage, ValidationResult,
};
use crate::domain::schema::Schema;
use serde_json::Number;

/// The single-record pipeline: resolve input, validate, multiply, report.
pub struct RecordPipeline<T: HttpTransport, S: Storage> {
    config: AppConfig,
    source: InputSource,
    transport: T,
    storage: Option<S>,
    retry: RetryPolicy,
    validator: Validator,
    transformer: Transformer,
    reporter: Reporter,
}

impl<T: HttpTransport> RecordPipeline<T, LocalStorage> {
    /// Reports go to `output.directory` when one is configured.
    pub fn new(config: AppConfig, source: InputSource, transport: T) -> Self {
        let storage = config
            .output
            .directory
            .as_ref()
            .map(|dir| LocalStorage::new(dir.to_string_lossy()));

        Self {
            retry: RetryPolicy::from_config(&config.processing),
            validator: Validator::default(),
            transformer: Transformer::from_config(&config),
            reporter: Reporter::new(
                source.to_string(),
                config.multiplier().clone(),
                config.output.clone(),
            ),
            config,
            source,
            transport,
            storage,
        }
    }
}

impl<T: HttpTransport, S: Storage> RecordPipeline<T, S> {
    pub fn with_storage<S2: Storage>(self, storage: S2) -> RecordPipeline<T, S2> {
        RecordPipeline {
            config: self.config,
            source: self.source,
            transport: self.transport,
            storage: Some(storage),
            retry: self.retry,
            validator: self.validator,
            transformer: self.transformer,
            reporter: self.reporter,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.validator = Validator::new(schema);
        self
    }
}

#[async_trait::async_trait]
impl<T: HttpTransport, S: Storage> Pipeline for RecordPipeline<T, S> {
    async fn extract(&self) -> Result<Record> {
        InputResolver::new(&self.config, &self.transport)
            .with_retry_policy(self.retry.clone())
            .resolve(&self.source)
            .await
    }

    fn validate(&self, record: &Record) -> ValidationResult {
        self.validator.validate(record)
    }

    fn transform(&self, record: &Record) -> Result<Number> {
        self.transformer.apply(record)
    }

    fn report(
        &self,
        record: Record,
        processed: Option<Number>,
        validation: &ValidationResult,
    ) -> ProcessingResult {
        self.reporter.report(record, processed, validation)
    }

    async fn load(&self, result: &ProcessingResult) -> Result<Option<String>> {
        match &self.storage {
            Some(storage) => Ok(Some(self.reporter.write(storage, result).await?)),
            None => {
                tracing::debug!("No output directory configured, skipping report file");
                Ok(None)
            }
        }
    }
}
