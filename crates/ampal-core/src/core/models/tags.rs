use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// A free-form value attached to any level of the hierarchy.
///
/// Tags are the extension point used by analysis code that consumes a parsed
/// structure: torsion angles, secondary-structure assignments, accessibility
/// values and similar annotations are cached here rather than in dedicated fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<TagValue>),
}

/// The tag map carried by atoms, monomers, polymers and assemblies.
pub type Tags = BTreeMap<String, TagValue>;

impl TagValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TagValue::Int(v) => Some(*v as f64),
            TagValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TagValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Orders two tag values for sorting containers by a tag.
    ///
    /// Numbers compare numerically with each other, text compares lexically and
    /// mixed kinds fall back to a fixed kind order so sorting stays total.
    pub fn sort_cmp(&self, other: &TagValue) -> Ordering {
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            _ => match (self, other) {
                (TagValue::Text(a), TagValue::Text(b)) => a.cmp(b),
                (TagValue::Bool(a), TagValue::Bool(b)) => a.cmp(b),
                _ => self.kind_rank().cmp(&other.kind_rank()),
            },
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            TagValue::Bool(_) => 0,
            TagValue::Int(_) | TagValue::Float(_) => 1,
            TagValue::Text(_) => 2,
            TagValue::List(_) => 3,
        }
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Bool(v) => write!(f, "{}", v),
            TagValue::Int(v) => write!(f, "{}", v),
            TagValue::Float(v) => write!(f, "{}", v),
            TagValue::Text(v) => write!(f, "{}", v),
            TagValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for TagValue {
    fn from(v: bool) -> Self {
        TagValue::Bool(v)
    }
}

impl From<i64> for TagValue {
    fn from(v: i64) -> Self {
        TagValue::Int(v)
    }
}

impl From<f64> for TagValue {
    fn from(v: f64) -> Self {
        TagValue::Float(v)
    }
}

impl From<&str> for TagValue {
    fn from(v: &str) -> Self {
        TagValue::Text(v.to_string())
    }
}

impl From<String> for TagValue {
    fn from(v: String) -> Self {
        TagValue::Text(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_tags_sort_numerically_across_int_and_float() {
        assert_eq!(TagValue::Int(2).sort_cmp(&TagValue::Float(10.5)), Ordering::Less);
        assert_eq!(TagValue::Float(3.0).sort_cmp(&TagValue::Int(3)), Ordering::Equal);
    }

    #[test]
    fn mixed_kinds_use_fixed_rank() {
        assert_eq!(
            TagValue::Int(100).sort_cmp(&TagValue::from("a")),
            Ordering::Less
        );
        assert_eq!(
            TagValue::List(vec![]).sort_cmp(&TagValue::Bool(true)),
            Ordering::Greater
        );
    }

    #[test]
    fn display_renders_nested_lists() {
        let value = TagValue::List(vec![TagValue::Int(1), TagValue::from("H")]);
        assert_eq!(value.to_string(), "[1, H]");
    }

    #[test]
    fn accessors_return_expected_variants() {
        assert_eq!(TagValue::from(1.5).as_f64(), Some(1.5));
        assert_eq!(TagValue::from("helix").as_str(), Some("helix"));
        assert_eq!(TagValue::Bool(true).as_f64(), None);
    }
}
