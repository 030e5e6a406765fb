//! Field paths from the payload root to a violation.

use serde::Serialize;
use std::fmt;

/// One step in a [`FieldPath`]: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Sequence of key/index steps, rendered as `entry[0].changes[1].value`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Builder-style: append a key step.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.0.push(PathSegment::Key(key.into()));
        self
    }

    /// Builder-style: append an index step.
    pub fn index(mut self, index: usize) -> Self {
        self.0.push(PathSegment::Index(index));
        self
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Last key on the path, skipping trailing indices.
    pub fn last_key(&self) -> Option<&str> {
        self.0.iter().rev().find_map(|s| match s {
            PathSegment::Key(k) => Some(k.as_str()),
            PathSegment::Index(_) => None,
        })
    }

    pub(crate) fn push(&mut self, segment: PathSegment) {
        self.0.push(segment);
    }

    pub(crate) fn pop(&mut self) {
        self.0.pop();
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(k) if i == 0 => write!(f, "{}", k)?,
                PathSegment::Key(k) => write!(f, ".{}", k)?,
                PathSegment::Index(n) => write!(f, "[{}]", n)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_mixed_path() {
        let path = FieldPath::root()
            .key("entry")
            .index(0)
            .key("changes")
            .index(2)
            .key("value");
        assert_eq!(path.to_string(), "entry[0].changes[2].value");
    }

    #[test]
    fn test_display_root() {
        assert_eq!(FieldPath::root().to_string(), "<root>");
        assert!(FieldPath::root().is_root());
    }

    #[test]
    fn test_last_key_skips_indices() {
        let path = FieldPath::root().key("messages").index(3);
        assert_eq!(path.last_key(), Some("messages"));
        assert_eq!(FieldPath::root().index(1).last_key(), None);
    }

    #[test]
    fn test_serializes_as_array() {
        let path = FieldPath::root().key("entry").index(0);
        assert_eq!(
            serde_json::to_value(&path).unwrap(),
            serde_json::json!(["entry", 0])
        );
    }
}
