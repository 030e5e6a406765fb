//! Validation error taxonomy.
//!
//! Every failure is a [`Violation`]: a [`FieldPath`] plus an [`ErrorKind`].
//! A [`ValidationError`] holds one violation (fail-fast) or all of them
//! (collect-all) and is never empty.

use super::path::FieldPath;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Shape of a JSON value, used in type-mismatch reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JsonType {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl JsonType {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The specific rule a present, well-typed value broke.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Constraint {
    MaxLength { max: usize, actual: usize },
    MinLength { min: usize, actual: usize },
    MaxItems { max: usize, actual: usize },
    MinItems { min: usize, actual: usize },
    OneOf { allowed: &'static [&'static str], found: String },
    Literal { expected: &'static str, found: String },
    Integer,
    NumericString { found: String },
    Url { reason: String },
    Email { found: String },
    ExactlyOneOf { fields: &'static [&'static str] },
    AtLeastOneOf { fields: &'static [&'static str] },
    /// A field that belongs to a different variant than the one selected.
    UnexpectedField { field: String },
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaxLength { max, actual } => {
                write!(f, "length {} exceeds maximum of {} characters", actual, max)
            }
            Self::MinLength { min, actual } => {
                write!(f, "length {} is below minimum of {} characters", actual, min)
            }
            Self::MaxItems { max, actual } => {
                write!(f, "{} items exceed maximum of {}", actual, max)
            }
            Self::MinItems { min, actual } => {
                write!(f, "{} items are below minimum of {}", actual, min)
            }
            Self::OneOf { allowed, found } => {
                write!(f, "`{}` is not one of [{}]", found, allowed.join(", "))
            }
            Self::Literal { expected, found } => {
                write!(f, "expected literal `{}`, found `{}`", expected, found)
            }
            Self::Integer => f.write_str("expected an integer"),
            Self::NumericString { found } => {
                write!(f, "`{}` is not a numeric string", found)
            }
            Self::Url { reason } => write!(f, "invalid URL: {}", reason),
            Self::Email { found } => write!(f, "`{}` is not an e-mail address", found),
            Self::ExactlyOneOf { fields } => {
                write!(f, "exactly one of [{}] must be present", fields.join(", "))
            }
            Self::AtLeastOneOf { fields } => {
                write!(f, "at least one of [{}] must be present", fields.join(", "))
            }
            Self::UnexpectedField { field } => {
                write!(f, "field `{}` is not allowed here", field)
            }
        }
    }
}

/// Why one candidate of an untagged union was rejected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateFailure {
    pub candidate: &'static str,
    pub violations: Vec<Violation>,
}

/// Error taxonomy.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ErrorKind {
    #[error("input is not valid JSON: {message}")]
    InvalidJson { message: String },
    #[error("missing required field")]
    MissingField,
    #[error("expected {expected}, found {found}")]
    TypeMismatch { expected: JsonType, found: JsonType },
    #[error("{constraint}")]
    ConstraintViolation { constraint: Constraint },
    #[error("{}", describe_unknown(.found.as_deref(), .expected))]
    UnknownUnionVariant {
        /// `None` when the discriminator itself is absent.
        found: Option<String>,
        expected: &'static [&'static str],
    },
    #[error("no candidate shape matched: {}", describe_candidates(.candidates))]
    UnionExhausted { candidates: Vec<CandidateFailure> },
}

impl ErrorKind {
    pub fn constraint(constraint: Constraint) -> Self {
        Self::ConstraintViolation { constraint }
    }
}

fn describe_unknown(found: Option<&str>, expected: &[&str]) -> String {
    match found {
        Some(found) => format!(
            "unknown variant `{}`, expected one of [{}]",
            found,
            expected.join(", ")
        ),
        None => format!("missing discriminator, expected one of [{}]", expected.join(", ")),
    }
}

fn describe_candidates(candidates: &[CandidateFailure]) -> String {
    candidates
        .iter()
        .map(|c| {
            let first = c
                .violations
                .first()
                .map(|v| v.to_string())
                .unwrap_or_else(|| "rejected".into());
            format!("{} ({})", c.candidate, first)
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// A single failure at a single location.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("{path}: {kind}")]
pub struct Violation {
    pub path: FieldPath,
    pub kind: ErrorKind,
}

/// Non-empty collection of violations returned by every decode/build entry point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    violations: Vec<Violation>,
}

impl ValidationError {
    pub(crate) fn from_violations(violations: Vec<Violation>) -> Self {
        debug_assert!(!violations.is_empty());
        Self { violations }
    }

    pub(crate) fn single(path: FieldPath, kind: ErrorKind) -> Self {
        Self {
            violations: vec![Violation { path, kind }],
        }
    }

    /// The first violation found, in document order.
    pub fn first(&self) -> &Violation {
        &self.violations[0]
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.violations.as_slice() {
            [only] => write!(f, "{}", only),
            all => {
                write!(f, "{} violations: ", all.len())?;
                for (i, v) in all.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    write!(f, "{}", v)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ValidationError {}
