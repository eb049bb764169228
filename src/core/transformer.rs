use crate::config::app_config::AppConfig;
use crate::core::{Record, Result};
use crate::utils::error::EtlError;
use serde_json::Number;

/// Multiplies a record's `value` by the configured multiplier.
#[derive(Debug, Clone)]
pub struct Transformer {
    multiplier: Number,
}

impl Transformer {
    pub fn new(multiplier: Number) -> Self {
        Self { multiplier }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.multiplier().clone())
    }

    pub fn apply(&self, record: &Record) -> Result<Number> {
        let value = record.value().ok_or_else(|| EtlError::ValidationError {
            message: "record has no numeric 'value' field".to_string(),
        })?;

        let product = multiply(value, &self.multiplier)?;
        tracing::debug!("Transformed value {} * {} = {}", value, self.multiplier, product);
        Ok(product)
    }
}

/// Integer operands stay exact; anything else, or an overflowing product,
/// is computed in floating point.
pub fn multiply(value: &Number, multiplier: &Number) -> Result<Number> {
    if let (Some(v), Some(m)) = (value.as_i64(), multiplier.as_i64()) {
        if let Some(product) = v.checked_mul(m) {
            return Ok(Number::from(product));
        }
    }

    let (Some(v), Some(m)) = (value.as_f64(), multiplier.as_f64()) else {
        return Err(EtlError::processing(format!(
            "cannot multiply {} by {}",
            value, multiplier
        )));
    };

    Number::from_f64(v * m).ok_or_else(|| {
        EtlError::processing(format!("{} * {} is not a finite number", value, multiplier))
    })
}
