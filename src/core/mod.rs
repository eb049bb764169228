pub mod etl;
pub mod input;
pub mod pipeline;
pub mod reporter;
pub mod retry;
pub mod transformer;
pub mod validator;

pub use crate::domain::model::{ProcessingResult, Record, Status, ValidationResult, Violation};
pub use crate::domain::ports::{HttpResponse, HttpTransport, Pipeline, Storage};
pub use crate::utils::error::Result;
