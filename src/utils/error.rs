use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Input error: {message}")]
    InputError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

impl EtlError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn input(message: impl Into<String>) -> Self {
        Self::InputError {
            message: message.into(),
        }
    }

    pub fn processing(message: impl Into<String>) -> Self {
        Self::ProcessingError {
            message: message.into(),
        }
    }

    /// Only failures of the input source are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::InputError { .. } | Self::ApiError(_))
    }

    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. }
        )
    }

    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InputError { .. } | Self::ApiError(_))
    }

    /// Process exit code for a run that terminated with this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => 1,
            Self::InputError { .. } | Self::ApiError(_) => 2,
            Self::ValidationError { .. } => 3,
            Self::CsvError(_)
            | Self::IoError(_)
            | Self::SerializationError(_)
            | Self::ProcessingError { .. } => 4,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                "Check the configuration file for missing or mistyped values"
            }
            Self::InputError { .. } | Self::ApiError(_) => {
                "Verify the input path exists and contains a JSON object, or that the API is reachable"
            }
            Self::ValidationError { .. } => {
                "Make sure the record has a non-empty text 'name' and a non-negative numeric 'value'"
            }
            Self::IoError(_) => "Check file permissions and available disk space",
            Self::CsvError(_) | Self::SerializationError(_) | Self::ProcessingError { .. } => {
                "Re-run with --verbose to see the failing step"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
