use crate::domain::model::{ProcessingResult, Record, ValidationResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Number;
use std::time::Duration;

/// Destination for report files. Returns the full path that was written.
pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One GET request; no retrying happens at this level.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Record>;
    fn validate(&self, record: &Record) -> ValidationResult;
    fn transform(&self, record: &Record) -> Result<Number>;
    fn report(
        &self,
        record: Record,
        processed: Option<Number>,
        validation: &ValidationResult,
    ) -> ProcessingResult;
    async fn load(&self, result: &ProcessingResult) -> Result<Option<String>>;
}
