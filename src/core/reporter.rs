use crate::config::app_config::{OutputConfig, OutputFormat};
use crate::core::{ProcessingResult, Record, Result, Status, Storage, ValidationResult};
use crate::utils::error::EtlError;
use chrono::Utc;
use serde_json::{Number, Value};

const CSV_HEADER: [&str; 9] = [
    "source",
    "name",
    "original_value",
    "processed_value",
    "multiplier",
    "status",
    "error",
    "violations",
    "processed_at",
];

/// Builds the result of a run, logs its summary line and renders reports.
#[derive(Debug, Clone)]
pub struct Reporter {
    source: String,
    multiplier: Number,
    output: OutputConfig,
}

impl Reporter {
    pub fn new(source: impl Into<String>, multiplier: Number, output: OutputConfig) -> Self {
        Self {
            source: source.into(),
            multiplier,
            output,
        }
    }

    pub fn report(
        &self,
        record: Record,
        processed: Option<Number>,
        validation: &ValidationResult,
    ) -> ProcessingResult {
        let violations = validation.descriptions();
        let (status, error) = match (&processed, validation.is_valid()) {
            (Some(_), true) => (Status::Success, None),
            (_, false) => (
                Status::Failure,
                Some(format!("validation failed: {}", violations.join("; "))),
            ),
            (None, true) => (
                Status::Failure,
                Some("no transformed value was produced".to_string()),
            ),
        };

        let result = ProcessingResult {
            source: self.source.clone(),
            original: record,
            processed_value: processed,
            multiplier: self.multiplier.clone(),
            status,
            error,
            violations,
            processed_at: Utc::now(),
        };

        match (&result.status, &result.processed_value) {
            (Status::Success, Some(value)) => tracing::info!(
                "Processing complete for {}: {} -> {} (multiplier {})",
                result.source,
                display_field(&result.original, "value"),
                value,
                result.multiplier
            ),
            _ => tracing::error!(
                "Processing failed for {}: {}",
                result.source,
                result.error.as_deref().unwrap_or("unknown error")
            ),
        }

        result
    }

    pub fn render(&self, result: &ProcessingResult) -> Result<Vec<u8>> {
        match self.output.format {
            OutputFormat::Json => Ok(serde_json::to_vec_pretty(result)?),
            OutputFormat::Csv => {
                let mut writer = csv::Writer::from_writer(Vec::new());
                writer.write_record(CSV_HEADER)?;
                writer.write_record([
                    result.source.clone(),
                    display_field(&result.original, "name"),
                    display_field(&result.original, "value"),
                    result
                        .processed_value
                        .as_ref()
                        .map(ToString::to_string)
                        .unwrap_or_default(),
                    result.multiplier.to_string(),
                    result.status.to_string(),
                    result.error.clone().unwrap_or_default(),
                    result.violations.join("; "),
                    result.processed_at.to_rfc3339(),
                ])?;
                writer
                    .into_inner()
                    .map_err(|e| EtlError::processing(format!("CSV flush failed: {}", e)))
            }
        }
    }

    pub fn file_name(&self, result: &ProcessingResult) -> String {
        format!(
            "report_{}.{}",
            result.processed_at.format("%Y%m%d_%H%M%S"),
            self.output.format.extension()
        )
    }

    /// Writes the report through `storage` and returns where it landed.
    pub async fn write<S: Storage>(&self, storage: &S, result: &ProcessingResult) -> Result<String> {
        let data = self.render(result)?;
        let path = storage.write_file(&self.file_name(result), &data).await?;
        tracing::info!("Report saved to: {}", path);
        Ok(path)
    }
}

/// Text for a record field: strings unquoted, other JSON as written, empty if absent.
fn display_field(record: &Record, field: &str) -> String {
    match record.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}
