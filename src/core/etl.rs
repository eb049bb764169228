use crate::core::{Pipeline, ProcessingResult};
use crate::utils::error::{EtlError, Result};

/// Exit code of a run whose record failed validation while
/// `processing.fail_on_invalid` is set.
pub const EXIT_VALIDATION_FAILURE: u8 = 3;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// Extract, validate, transform (valid records only), report, load.
    /// Errors are logged here before they propagate.
    pub async fn run(&self) -> Result<ProcessingResult> {
        tracing::info!("Starting pipeline run");

        let record = self
            .pipeline
            .extract()
            .await
            .inspect_err(|e| log_failure("input", e))?;
        tracing::debug!("Extracted record: {:?}", record.data);

        let validation = self.pipeline.validate(&record);
        let processed = if validation.is_valid() {
            Some(
                self.pipeline
                    .transform(&record)
                    .inspect_err(|e| log_failure("transform", e))?,
            )
        } else {
            None
        };

        let result = self.pipeline.report(record, processed, &validation);

        self.pipeline
            .load(&result)
            .await
            .inspect_err(|e| log_failure("report", e))?;

        Ok(result)
    }
}

fn log_failure(stage: &str, error: &EtlError) {
    tracing::error!("❌ {} stage failed: {}", stage, error);
    tracing::error!("💡 Suggestion: {}", error.recovery_suggestion());
}

/// Maps the outcome of [`EtlEngine::run`] to a process exit code.
pub fn exit_code(outcome: &Result<ProcessingResult>, fail_on_invalid: bool) -> u8 {
    match outcome {
        Ok(result) if result.is_success() => 0,
        Ok(_) if fail_on_invalid => EXIT_VALIDATION_FAILURE,
        Ok(_) => 0,
        Err(e) => e.exit_code(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Record, Status, ValidationResult};
    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::{json, Number};
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Records which stages ran.
    struct ScriptedPipeline {
        record: Option<serde_json::Value>,
        transformed: AtomicBool,
        loaded: AtomicBool,
    }

    impl ScriptedPipeline {
        fn new(record: Option<serde_json::Value>) -> Self {
            Self {
                record,
                transformed: AtomicBool::new(false),
                loaded: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl Pipeline for ScriptedPipeline {
        async fn extract(&self) -> Result<Record> {
            match &self.record {
                Some(value) => Record::from_value(value.clone()),
                None => Err(EtlError::input("File not found: missing.json")),
            }
        }

        fn validate(&self, record: &Record) -> ValidationResult {
            let mut result = ValidationResult::default();
            if record.value().is_none() {
                result.push("value", "missing required field");
            }
            result
        }

        fn transform(&self, record: &Record) -> Result<Number> {
            self.transformed.store(true, Ordering::SeqCst);
            Ok(record.value().cloned().unwrap_or_else(|| Number::from(0)))
        }

        fn report(
            &self,
            record: Record,
            processed: Option<Number>,
            validation: &ValidationResult,
        ) -> ProcessingResult {
            ProcessingResult {
                source: "test".to_string(),
                original: record,
                status: if validation.is_valid() {
                    Status::Success
                } else {
                    Status::Failure
                },
                processed_value: processed,
                multiplier: Number::from(1),
                error: None,
                violations: validation.descriptions(),
                processed_at: Utc::now(),
            }
        }

        async fn load(&self, _result: &ProcessingResult) -> Result<Option<String>> {
            self.loaded.store(true, Ordering::SeqCst);
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_run_success() {
        let engine = EtlEngine::new(ScriptedPipeline::new(Some(json!({"name": "a", "value": 3}))));
        let outcome = engine.run().await;

        assert!(outcome.as_ref().unwrap().is_success());
        assert!(engine.pipeline().transformed.load(Ordering::SeqCst));
        assert!(engine.pipeline().loaded.load(Ordering::SeqCst));
        assert_eq!(exit_code(&outcome, true), 0);
    }

    #[tokio::test]
    async fn test_invalid_record_skips_transform() {
        let engine = EtlEngine::new(ScriptedPipeline::new(Some(json!({"name": "a"}))));
        let outcome = engine.run().await;

        assert_eq!(outcome.as_ref().unwrap().status, Status::Failure);
        assert!(!engine.pipeline().transformed.load(Ordering::SeqCst));
        assert!(engine.pipeline().loaded.load(Ordering::SeqCst));
        assert_eq!(exit_code(&outcome, true), EXIT_VALIDATION_FAILURE);
        assert_eq!(exit_code(&outcome, false), 0);
    }

    #[tokio::test]
    async fn test_input_failure_propagates() {
        let engine = EtlEngine::new(ScriptedPipeline::new(None));
        let outcome = engine.run().await;

        assert!(outcome.as_ref().unwrap_err().is_input_error());
        assert!(!engine.pipeline().loaded.load(Ordering::SeqCst));
        assert_eq!(exit_code(&outcome, false), 2);
    }
}
