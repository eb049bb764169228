use crate::core::{Record, ValidationResult};
use crate::domain::model::json_type_name;
use crate::domain::schema::Schema;

/// Checks records against a [`Schema`]. Never fails: every problem is
/// collected into the returned [`ValidationResult`], one per field at most.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    schema: Schema,
}

impl Validator {
    pub fn new(schema: Schema) -> Self {
        Self { schema }
    }

    pub fn validate(&self, record: &Record) -> ValidationResult {
        let mut result = ValidationResult::default();

        for rule in &self.schema.fields {
            let Some(value) = record.get(&rule.name) else {
                result.push(&rule.name, "missing required field");
                continue;
            };

            if !rule.kind.matches(value) {
                result.push(
                    &rule.name,
                    format!(
                        "expected {}, found {}",
                        rule.kind.describe(),
                        json_type_name(value)
                    ),
                );
                continue;
            }

            if let Some(problem) = rule.constraints.iter().find_map(|c| c.check(value)) {
                result.push(&rule.name, problem);
            }
        }

        for violation in &result.violations {
            tracing::debug!("Validation violation: {}", violation);
        }
        result
    }
}
