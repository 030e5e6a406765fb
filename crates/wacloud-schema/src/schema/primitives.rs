//! Field-level validators shared by every schema.

use super::decoder::Decoder;
use super::report::{Constraint, JsonType};
use super::{Schema, WireEnum};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static e-mail pattern compiles");
}

/// A number the platform sends either as a JSON number or as a numeric string.
///
/// The original representation is kept so re-encoding is lossless.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Numeric {
    Number(serde_json::Number),
    Text(String),
}

impl Numeric {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl Decoder {
    pub fn str_ref<'v>(&mut self, value: &'v Value) -> Option<&'v str> {
        match value {
            Value::String(s) => Some(s.as_str()),
            other => {
                self.mismatch(JsonType::String, other);
                None
            }
        }
    }

    pub fn string(&mut self, value: &Value) -> Option<String> {
        self.str_ref(value).map(str::to_owned)
    }

    /// String whose length in characters lies within `min..=max`.
    pub fn bounded_string(&mut self, value: &Value, min: usize, max: usize) -> Option<String> {
        let s = self.str_ref(value)?;
        let actual = s.chars().count();
        if actual < min {
            self.report_constraint(Constraint::MinLength { min, actual });
            return None;
        }
        if actual > max {
            self.report_constraint(Constraint::MaxLength { max, actual });
            return None;
        }
        Some(s.to_owned())
    }

    pub fn non_empty_string(&mut self, value: &Value) -> Option<String> {
        self.bounded_string(value, 1, usize::MAX)
    }

    pub fn boolean(&mut self, value: &Value) -> Option<bool> {
        match value {
            Value::Bool(b) => Some(*b),
            other => {
                self.mismatch(JsonType::Bool, other);
                None
            }
        }
    }

    /// Integral JSON number. `3.0` is accepted, `3.5` is not.
    pub fn integer(&mut self, value: &Value) -> Option<i64> {
        let Value::Number(n) = value else {
            self.mismatch(JsonType::Number, value);
            return None;
        };
        if let Some(i) = n.as_i64() {
            return Some(i);
        }
        match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Some(f as i64),
            _ => {
                self.report_constraint(Constraint::Integer);
                None
            }
        }
    }

    pub fn number(&mut self, value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => n.as_f64().or_else(|| {
                self.report_constraint(Constraint::Integer);
                None
            }),
            other => {
                self.mismatch(JsonType::Number, other);
                None
            }
        }
    }

    /// Number or numeric string. Strings must parse as a finite number.
    pub fn numeric(&mut self, value: &Value) -> Option<Numeric> {
        match value {
            Value::Number(n) => Some(Numeric::Number(n.clone())),
            Value::String(s) => match s.trim().parse::<f64>() {
                Ok(f) if f.is_finite() => Some(Numeric::Text(s.clone())),
                _ => {
                    self.report_constraint(Constraint::NumericString { found: s.clone() });
                    None
                }
            },
            other => {
                self.mismatch(JsonType::Number, other);
                None
            }
        }
    }

    pub fn literal(&mut self, value: &Value, expected: &'static str) -> Option<String> {
        let s = self.str_ref(value)?;
        if s == expected {
            Some(s.to_owned())
        } else {
            self.report_constraint(Constraint::Literal {
                expected,
                found: s.to_owned(),
            });
            None
        }
    }

    /// Closed enum domain; unknown values are a `OneOf` constraint violation.
    pub fn wire_enum<E: WireEnum>(&mut self, value: &Value) -> Option<E> {
        let s = self.str_ref(value)?;
        E::from_wire(s).or_else(|| {
            self.report_constraint(Constraint::OneOf {
                allowed: E::VARIANTS,
                found: s.to_owned(),
            });
            None
        })
    }

    /// Absolute `http`/`https` URL.
    pub fn url(&mut self, value: &Value) -> Option<String> {
        let s = self.str_ref(value)?;
        match url::Url::parse(s) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Some(s.to_owned()),
            Ok(parsed) => {
                self.report_constraint(Constraint::Url {
                    reason: format!("unsupported scheme `{}`", parsed.scheme()),
                });
                None
            }
            Err(e) => {
                self.report_constraint(Constraint::Url {
                    reason: e.to_string(),
                });
                None
            }
        }
    }

    pub fn email(&mut self, value: &Value) -> Option<String> {
        let s = self.str_ref(value)?;
        if EMAIL_RE.is_match(s) {
            Some(s.to_owned())
        } else {
            self.report_constraint(Constraint::Email {
                found: s.to_owned(),
            });
            None
        }
    }
}

impl Schema for Numeric {
    fn decode(d: &mut Decoder, value: &Value) -> Option<Self> {
        d.numeric(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::report::ErrorKind;
    use crate::schema::DecodeMode;
    use serde_json::json;

    fn run<T>(f: impl FnOnce(&mut Decoder) -> Option<T>) -> Result<T, ErrorKind> {
        let mut d = Decoder::new(DecodeMode::FailFast);
        let out = f(&mut d);
        d.finish(out).map_err(|e| e.first().kind.clone())
    }

    #[test]
    fn test_bounded_string_counts_chars() {
        let v = json!("héllo");
        assert_eq!(run(|d| d.bounded_string(&v, 0, 5)), Ok("héllo".to_string()));
        assert_eq!(
            run(|d| d.bounded_string(&v, 0, 4)),
            Err(ErrorKind::constraint(Constraint::MaxLength { max: 4, actual: 5 }))
        );
    }

    #[test]
    fn test_non_empty_string() {
        assert_eq!(
            run(|d| d.non_empty_string(&json!(""))),
            Err(ErrorKind::constraint(Constraint::MinLength { min: 1, actual: 0 }))
        );
    }

    #[test]
    fn test_integer_rejects_fraction() {
        assert_eq!(run(|d| d.integer(&json!(42))), Ok(42));
        assert_eq!(run(|d| d.integer(&json!(42.0))), Ok(42));
        assert_eq!(
            run(|d| d.integer(&json!(42.5))),
            Err(ErrorKind::constraint(Constraint::Integer))
        );
        assert!(matches!(
            run(|d| d.integer(&json!("42"))),
            Err(ErrorKind::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_numeric_accepts_both_representations() {
        let n = run(|d| d.numeric(&json!(37.48))).unwrap();
        assert_eq!(n.as_f64(), Some(37.48));
        let s = run(|d| d.numeric(&json!("-122.14"))).unwrap();
        assert_eq!(s, Numeric::Text("-122.14".into()));
        assert_eq!(s.as_f64(), Some(-122.14));
        // original representation survives re-encoding
        assert_eq!(serde_json::to_value(&s).unwrap(), json!("-122.14"));
    }

    #[test]
    fn test_numeric_rejects_garbage() {
        assert_eq!(
            run(|d| d.numeric(&json!("north"))),
            Err(ErrorKind::constraint(Constraint::NumericString {
                found: "north".into()
            }))
        );
        assert!(matches!(
            run(|d| d.numeric(&json!(true))),
            Err(ErrorKind::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_literal() {
        assert!(run(|d| d.literal(&json!("whatsapp"), "whatsapp")).is_ok());
        assert!(matches!(
            run(|d| d.literal(&json!("messenger"), "whatsapp")),
            Err(ErrorKind::ConstraintViolation {
                constraint: Constraint::Literal { .. }
            })
        ));
    }

    #[test]
    fn test_url_requires_http_scheme() {
        assert!(run(|d| d.url(&json!("https://example.com/a.jpg"))).is_ok());
        assert!(matches!(
            run(|d| d.url(&json!("ftp://example.com/a.jpg"))),
            Err(ErrorKind::ConstraintViolation {
                constraint: Constraint::Url { .. }
            })
        ));
        assert!(matches!(
            run(|d| d.url(&json!("not a url"))),
            Err(ErrorKind::ConstraintViolation {
                constraint: Constraint::Url { .. }
            })
        ));
    }

    #[test]
    fn test_email_shape() {
        assert!(run(|d| d.email(&json!("ops@example.com"))).is_ok());
        assert_eq!(
            run(|d| d.email(&json!("ops.example.com"))),
            Err(ErrorKind::constraint(Constraint::Email {
                found: "ops.example.com".into()
            }))
        );
    }
}
