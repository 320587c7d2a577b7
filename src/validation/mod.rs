//! Declarative per-field validation of untrusted JSON payloads.
//!
//! A [`RuleSet`] lists the fields an endpoint accepts and the checks each must
//! pass. Evaluation visits every rule in declaration order and never stops
//! early across fields, so a rejected request reports all of its problems at
//! once. Within a single field only the first failing check is reported.

pub mod rules;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{json, Value};
use validator::{ValidateEmail, ValidateLength};

use crate::error::ApiError;

/// One violated rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A single check applied to a present field value
#[derive(Debug, Clone)]
pub enum Check {
    /// String whose character count lies within the bounds
    Text { min: u64, max: Option<u64> },
    /// JSON number or numeric string
    Number { positive: bool },
    /// JSON integer or integer string
    Integer,
    /// Calendar date formatted `YYYY-MM-DD`
    Date,
    Email,
    OneOf(&'static [&'static str]),
}

impl Check {
    pub fn text(min: u64, max: u64) -> Self {
        Check::Text {
            min,
            max: Some(max),
        }
    }

    pub fn min_text(min: u64) -> Self {
        Check::Text { min, max: None }
    }

    pub fn positive_number() -> Self {
        Check::Number { positive: true }
    }

    fn apply(&self, value: &Value) -> Result<(), String> {
        match self {
            Check::Text { min, max } => {
                let valid = match value {
                    Value::String(s) => s.validate_length(Some(*min), *max, None),
                    _ => false,
                };
                if valid {
                    return Ok(());
                }
                Err(match max {
                    Some(max) => format!("must be a string of {} to {} characters", min, max),
                    None => format!("must be a string of at least {} characters", min),
                })
            }
            Check::Number { positive } => match number_value(value) {
                Some(n) if !positive || n > 0.0 => Ok(()),
                Some(_) => Err("must be a positive number".to_string()),
                None => Err("must be a number".to_string()),
            },
            Check::Integer => integer_value(value)
                .map(|_| ())
                .ok_or_else(|| "must be an integer".to_string()),
            Check::Date => value
                .as_str()
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
                .map(|_| ())
                .ok_or_else(|| "must be a date (YYYY-MM-DD)".to_string()),
            Check::Email => match value {
                Value::String(s) if s.validate_email() => Ok(()),
                _ => Err("must be a valid email address".to_string()),
            },
            Check::OneOf(allowed) => match value.as_str() {
                Some(s) if allowed.contains(&s) => Ok(()),
                _ => Err(format!("must be one of: {}", allowed.join(", "))),
            },
        }
    }
}

/// Numeric value of a JSON number or a numeric string
pub fn number_value(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// Integral value of a JSON integer or an integer string
pub fn integer_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

#[derive(Debug, Clone)]
struct FieldRule {
    field: &'static str,
    required: bool,
    checks: Vec<Check>,
}

/// Ordered rules for one endpoint's payload
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<FieldRule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field must be present and non-null, then pass every check
    pub fn required(mut self, field: &'static str, checks: impl IntoIterator<Item = Check>) -> Self {
        self.rules.push(FieldRule {
            field,
            required: true,
            checks: checks.into_iter().collect(),
        });
        self
    }

    /// Field may be absent or null; when present it must pass every check
    pub fn optional(mut self, field: &'static str, checks: impl IntoIterator<Item = Check>) -> Self {
        self.rules.push(FieldRule {
            field,
            required: false,
            checks: checks.into_iter().collect(),
        });
        self
    }

    /// Collect every violation in rule order. Non-object payloads have no fields.
    pub fn evaluate(&self, payload: &Value) -> Vec<FieldError> {
        let mut errors = Vec::new();

        for rule in &self.rules {
            let value = payload.get(rule.field).filter(|v| !v.is_null());

            let Some(value) = value else {
                if rule.required {
                    errors.push(FieldError::new(rule.field, "is required"));
                }
                continue;
            };

            if let Some(message) = rule.checks.iter().find_map(|c| c.apply(value).err()) {
                errors.push(FieldError::new(rule.field, message));
            }
        }

        errors
    }

    /// Reject the payload with a joined ValidationError if any rule fails.
    /// Anything but a JSON object is an invalid body.
    pub fn check(&self, payload: &Value) -> Result<(), ApiError> {
        if !payload.is_object() {
            tracing::warn!("Rejected non-object payload");
            return Err(ApiError::invalid_body("request body must be a JSON object"));
        }

        let errors = self.evaluate(payload);
        if errors.is_empty() {
            return Ok(());
        }
        let err = ApiError::validation(errors);
        tracing::warn!("Validation failed: {}", err.message());
        Err(err)
    }
}

/// Validate a raw path segment as an integer id
pub fn parse_id(raw: &str) -> Result<i64, ApiError> {
    let payload = json!({ "id": raw });
    rules::path_id().check(&payload)?;
    integer_value(&payload["id"]).ok_or_else(|| {
        ApiError::validation(vec![FieldError::new("id", "must be an integer")])
    })
}
