//! Path-tracking decoder state.
//!
//! A [`Decoder`] walks a `serde_json::Value` tree, keeps the current
//! [`FieldPath`] and records every [`Violation`] it meets. In
//! [`DecodeMode::FailFast`] it stops recording (and stops descending) after
//! the first one.

use super::path::{FieldPath, PathSegment};
use super::report::{Constraint, ErrorKind, JsonType, ValidationError, Violation};
use super::{Schema, WireEnum};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Error propagation policy for one decode call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeMode {
    /// Return on the first violation.
    #[default]
    FailFast,
    /// Walk the whole payload and return every violation.
    CollectAll,
}

pub type Object = Map<String, Value>;

#[derive(Debug)]
pub struct Decoder {
    mode: DecodeMode,
    path: FieldPath,
    violations: Vec<Violation>,
}

impl Decoder {
    pub fn new(mode: DecodeMode) -> Self {
        Self {
            mode,
            path: FieldPath::root(),
            violations: Vec::new(),
        }
    }

    pub fn mode(&self) -> DecodeMode {
        self.mode
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// True once a fail-fast decoder has recorded its violation.
    pub fn halted(&self) -> bool {
        self.mode == DecodeMode::FailFast && !self.violations.is_empty()
    }

    /// Record a violation at the current path.
    pub fn report(&mut self, kind: ErrorKind) {
        if self.halted() {
            return;
        }
        self.violations.push(Violation {
            path: self.path.clone(),
            kind,
        });
    }

    pub fn report_constraint(&mut self, constraint: Constraint) {
        self.report(ErrorKind::constraint(constraint));
    }

    pub fn mismatch(&mut self, expected: JsonType, found: &Value) {
        self.report(ErrorKind::TypeMismatch {
            expected,
            found: JsonType::of(found),
        });
    }

    pub fn at_key<T>(&mut self, key: &str, f: impl FnOnce(&mut Self) -> T) -> T {
        self.path.push(PathSegment::Key(key.to_string()));
        let out = f(self);
        self.path.pop();
        out
    }

    pub fn at_index<T>(&mut self, index: usize, f: impl FnOnce(&mut Self) -> T) -> T {
        self.path.push(PathSegment::Index(index));
        let out = f(self);
        self.path.pop();
        out
    }

    pub fn object<'v>(&mut self, value: &'v Value) -> Option<&'v Object> {
        match value {
            Value::Object(obj) => Some(obj),
            other => {
                self.mismatch(JsonType::Object, other);
                None
            }
        }
    }

    // ─── Fields ─────────────────────────────────────────────────────

    /// Decode a required member with `f`, reporting `MissingField` when absent.
    pub fn required<'v, T>(
        &mut self,
        obj: &'v Object,
        key: &str,
        f: impl FnOnce(&mut Self, &'v Value) -> Option<T>,
    ) -> Option<T> {
        if self.halted() {
            return None;
        }
        match obj.get(key) {
            Some(value) => self.at_key(key, |d| f(d, value)),
            None => {
                self.at_key(key, |d| d.report(ErrorKind::MissingField));
                None
            }
        }
    }

    /// Decode an optional member. The outer `None` means the member was
    /// present but invalid; `Some(None)` means it was absent.
    pub fn optional<'v, T>(
        &mut self,
        obj: &'v Object,
        key: &str,
        f: impl FnOnce(&mut Self, &'v Value) -> Option<T>,
    ) -> Option<Option<T>> {
        if self.halted() {
            return None;
        }
        match obj.get(key) {
            Some(value) => self.at_key(key, |d| f(d, value)).map(Some),
            None => Some(None),
        }
    }

    pub fn field<T: Schema>(&mut self, obj: &Object, key: &str) -> Option<T> {
        self.required(obj, key, |d, v| T::decode(d, v))
    }

    pub fn opt_field<T: Schema>(&mut self, obj: &Object, key: &str) -> Option<Option<T>> {
        self.optional(obj, key, |d, v| T::decode(d, v))
    }

    /// Report `UnexpectedField` for each listed key that is present.
    pub fn forbid(&mut self, obj: &Object, keys: &[&str]) -> Option<()> {
        let mut ok = true;
        for key in keys {
            if obj.contains_key(*key) {
                self.at_key(key, |d| {
                    d.report_constraint(Constraint::UnexpectedField {
                        field: key.to_string(),
                    })
                });
                ok = false;
            }
        }
        ok.then_some(())
    }

    /// Read a closed-set discriminator. Absent or unknown values are
    /// `UnknownUnionVariant`.
    pub fn discriminator<E: WireEnum>(&mut self, obj: &Object, key: &str) -> Option<E> {
        if self.halted() {
            return None;
        }
        self.at_key(key, |d| match obj.get(key) {
            None => {
                d.report(ErrorKind::UnknownUnionVariant {
                    found: None,
                    expected: E::VARIANTS,
                });
                None
            }
            Some(Value::String(s)) => {
                let tag = E::from_wire(s);
                if tag.is_none() {
                    d.report(ErrorKind::UnknownUnionVariant {
                        found: Some(s.clone()),
                        expected: E::VARIANTS,
                    });
                }
                tag
            }
            Some(other) => {
                d.mismatch(JsonType::String, other);
                None
            }
        })
    }

    // ─── Arrays ─────────────────────────────────────────────────────

    pub fn array<'v, T>(
        &mut self,
        value: &'v Value,
        mut f: impl FnMut(&mut Self, &'v Value) -> Option<T>,
    ) -> Option<Vec<T>> {
        let items = match value {
            Value::Array(items) => items,
            other => {
                self.mismatch(JsonType::Array, other);
                return None;
            }
        };
        let mut out = Vec::with_capacity(items.len());
        let mut ok = true;
        for (i, item) in items.iter().enumerate() {
            if self.halted() {
                return None;
            }
            match self.at_index(i, |d| f(d, item)) {
                Some(v) => out.push(v),
                None => ok = false,
            }
        }
        ok.then_some(out)
    }

    /// Like [`array`](Self::array) with an inclusive item-count range.
    pub fn bounded_array<'v, T>(
        &mut self,
        value: &'v Value,
        min: usize,
        max: usize,
        f: impl FnMut(&mut Self, &'v Value) -> Option<T>,
    ) -> Option<Vec<T>> {
        let mut in_bounds = true;
        if let Value::Array(items) = value {
            if items.len() < min {
                self.report_constraint(Constraint::MinItems {
                    min,
                    actual: items.len(),
                });
                in_bounds = false;
            } else if items.len() > max {
                self.report_constraint(Constraint::MaxItems {
                    max,
                    actual: items.len(),
                });
                in_bounds = false;
            }
        }
        if self.halted() {
            return None;
        }
        let items = self.array(value, f)?;
        in_bounds.then_some(items)
    }

    // ─── Unions ─────────────────────────────────────────────────────

    /// Run one candidate of an untagged union in isolation. On failure the
    /// candidate's violations are handed back instead of being recorded.
    pub fn attempt<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Option<T>,
    ) -> Result<T, Vec<Violation>> {
        let outer = std::mem::take(&mut self.violations);
        let out = f(self);
        let produced = std::mem::replace(&mut self.violations, outer);
        match out {
            Some(value) if produced.is_empty() => Ok(value),
            _ => Err(produced),
        }
    }

    pub fn finish<T>(self, value: Option<T>) -> Result<T, ValidationError> {
        match (value, self.violations.is_empty()) {
            (Some(value), true) => Ok(value),
            (_, false) => Err(ValidationError::from_violations(self.violations)),
            (None, true) => Err(ValidationError::single(
                self.path,
                ErrorKind::TypeMismatch {
                    expected: JsonType::Object,
                    found: JsonType::Null,
                },
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn string_at(d: &mut Decoder, v: &Value) -> Option<String> {
        match v {
            Value::String(s) => Some(s.clone()),
            other => {
                d.mismatch(JsonType::String, other);
                None
            }
        }
    }

    #[test]
    fn test_required_reports_missing_with_path() {
        let payload = json!({ "a": { "b": {} } });
        let mut d = Decoder::new(DecodeMode::FailFast);
        let obj = payload.as_object().unwrap();
        let out = d.required(obj, "a", |d, v| {
            let a = d.object(v)?;
            d.required(a, "b", |d, v| {
                let b = d.object(v)?;
                d.required(b, "c", string_at)
            })
        });
        let err = d.finish(out).unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err.first().path.to_string(), "a.b.c");
        assert_eq!(err.first().kind, ErrorKind::MissingField);
    }

    #[test]
    fn test_optional_absent_is_not_an_error() {
        let payload = json!({});
        let mut d = Decoder::new(DecodeMode::CollectAll);
        let out = d.optional(payload.as_object().unwrap(), "caption", string_at);
        assert_eq!(d.finish(out).unwrap(), None);
    }

    #[test]
    fn test_optional_present_wrong_type_is_an_error() {
        let payload = json!({ "caption": 7 });
        let mut d = Decoder::new(DecodeMode::CollectAll);
        let out = d.optional(payload.as_object().unwrap(), "caption", string_at);
        let err = d.finish(out).unwrap_err();
        assert_eq!(
            err.first().kind,
            ErrorKind::TypeMismatch {
                expected: JsonType::String,
                found: JsonType::Number
            }
        );
    }

    #[test]
    fn test_fail_fast_stops_after_first() {
        let payload = json!([1, 2, 3]);
        let mut d = Decoder::new(DecodeMode::FailFast);
        let out = d.array(&payload, string_at);
        let err = d.finish(out).unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err.first().path.to_string(), "[0]");
    }

    #[test]
    fn test_collect_all_reports_every_item() {
        let payload = json!([1, "ok", 3]);
        let mut d = Decoder::new(DecodeMode::CollectAll);
        let out = d.array(&payload, string_at);
        let err = d.finish(out).unwrap_err();
        let paths: Vec<String> = err.violations().iter().map(|v| v.path.to_string()).collect();
        assert_eq!(paths, vec!["[0]", "[2]"]);
    }

    #[test]
    fn test_bounded_array_checks_count() {
        let payload = json!(["a", "b", "c", "d"]);
        let mut d = Decoder::new(DecodeMode::FailFast);
        let out = d.bounded_array(&payload, 1, 3, string_at);
        let err = d.finish(out).unwrap_err();
        assert_eq!(
            err.first().kind,
            ErrorKind::constraint(Constraint::MaxItems { max: 3, actual: 4 })
        );
    }

    #[test]
    fn test_attempt_isolates_candidate_violations() {
        let payload = json!({ "x": 1 });
        let obj = payload.as_object().unwrap();
        let mut d = Decoder::new(DecodeMode::FailFast);
        let first = d.attempt(|d| d.required(obj, "y", string_at));
        assert!(first.is_err());
        assert!(!d.halted());
        let second = d.attempt(|d| d.required(obj, "x", |_, v| v.as_i64()));
        assert_eq!(second, Ok(1));
        assert_eq!(d.finish(Some(())), Ok(()));
    }

    #[test]
    fn test_forbid_reports_each_present_key() {
        let payload = json!({ "image": {}, "video": {} });
        let mut d = Decoder::new(DecodeMode::CollectAll);
        let out = d.forbid(payload.as_object().unwrap(), &["image", "audio", "video"]);
        let err = d.finish(out).unwrap_err();
        assert_eq!(err.len(), 2);
        assert_eq!(err.violations()[1].path.to_string(), "video");
    }
}
