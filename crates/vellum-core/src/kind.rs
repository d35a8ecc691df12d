//! Node kind discriminant reported across the boundary.

use std::fmt;

use serde_json::Value;

/// Kind of a stored node, as reported to callers.
///
/// Values are ABI-stable. Signed and unsigned integer storage both report
/// [`NodeKind::Int`].
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// JSON `null`.
    Null = 0,
    /// `true` / `false`.
    Bool = 1,
    /// Integer number (i64 or u64 storage).
    Int = 2,
    /// Floating-point number.
    Float = 3,
    /// UTF-8 string.
    String = 4,
    /// Ordered string-keyed map.
    Object = 5,
    /// Ordered sequence.
    Array = 6,
}

impl NodeKind {
    /// Classify a value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(n) if n.is_f64() => Self::Float,
            Value::Number(_) => Self::Int,
            Value::String(_) => Self::String,
            Value::Object(_) => Self::Object,
            Value::Array(_) => Self::Array,
        }
    }

    /// Whether this kind holds child nodes.
    pub fn is_container(self) -> bool {
        matches!(self, Self::Object | Self::Array)
    }

    /// Lower-case name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::Object => "object",
            Self::Array => "array",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_codes_are_stable() {
        assert_eq!(NodeKind::Null as i32, 0);
        assert_eq!(NodeKind::Bool as i32, 1);
        assert_eq!(NodeKind::Int as i32, 2);
        assert_eq!(NodeKind::Float as i32, 3);
        assert_eq!(NodeKind::String as i32, 4);
        assert_eq!(NodeKind::Object as i32, 5);
        assert_eq!(NodeKind::Array as i32, 6);
    }

    #[test]
    fn classifies_every_variant() {
        assert_eq!(NodeKind::of(&json!(null)), NodeKind::Null);
        assert_eq!(NodeKind::of(&json!(true)), NodeKind::Bool);
        assert_eq!(NodeKind::of(&json!(-3)), NodeKind::Int);
        assert_eq!(NodeKind::of(&json!(1.5)), NodeKind::Float);
        assert_eq!(NodeKind::of(&json!("x")), NodeKind::String);
        assert_eq!(NodeKind::of(&json!({})), NodeKind::Object);
        assert_eq!(NodeKind::of(&json!([])), NodeKind::Array);
    }

    #[test]
    fn unsigned_storage_reports_int() {
        assert_eq!(NodeKind::of(&json!(u64::MAX)), NodeKind::Int);
    }

    #[test]
    fn only_object_and_array_are_containers() {
        assert!(NodeKind::Object.is_container());
        assert!(NodeKind::Array.is_container());
        assert!(!NodeKind::String.is_container());
        assert!(!NodeKind::Null.is_container());
    }
}
