//! Declarative description of what a valid record looks like.

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
}

impl FieldKind {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            FieldKind::Text => value.is_string(),
            FieldKind::Number => value.is_number(),
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Number => "number",
        }
    }
}

/// Extra checks applied once the type of a field is known to be right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    NonEmpty,
    NonNegative,
}

impl Constraint {
    /// Returns a description of the problem when the value breaks the constraint.
    pub fn check(&self, value: &Value) -> Option<String> {
        match self {
            Constraint::NonEmpty => match value.as_str() {
                Some(s) if s.trim().is_empty() => Some("must not be empty".to_string()),
                _ => None,
            },
            Constraint::NonNegative => match value.as_f64() {
                Some(n) if n < 0.0 => Some(format!("must not be negative (got {})", value)),
                _ => None,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldRule {
    pub name: String,
    pub kind: FieldKind,
    pub constraints: Vec<Constraint>,
}

impl FieldRule {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            constraints: Vec::new(),
        }
    }

    pub fn with(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }
}

#[derive(Debug, Clone)]
pub struct Schema {
    pub fields: Vec<FieldRule>,
}

impl Schema {
    pub fn new(fields: Vec<FieldRule>) -> Self {
        Self { fields }
    }
}

impl Default for Schema {
    /// `name`: non-empty text, `value`: non-negative number.
    fn default() -> Self {
        Self::new(vec![
            FieldRule::new("name", FieldKind::Text).with(Constraint::NonEmpty),
            FieldRule::new("value", FieldKind::Number).with(Constraint::NonNegative),
        ])
    }
}
