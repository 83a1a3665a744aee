use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Key from a catalog node (`real_id`) into its paired text store.
///
/// Text stores are JSON objects, so keys are always strings on disk; integer
/// ids in a catalog are matched by their decimal form.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextId(pub String);

impl TextId {
    /// Interpret a raw `real_id` value. `null` and non-scalar shapes are absent.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(id) => Some(Self(id.clone())),
            Value::Number(n) if n.is_i64() || n.is_u64() => Some(Self(n.to_string())),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn real_id_shapes() {
        assert_eq!(TextId::from_value(&json!("a1")), Some(TextId("a1".into())));
        assert_eq!(TextId::from_value(&json!(42)), Some(TextId("42".into())));
        assert_eq!(TextId::from_value(&json!("")), Some(TextId(String::new())));
        assert_eq!(TextId::from_value(&Value::Null), None);
        assert_eq!(TextId::from_value(&json!(1.5)), None);
        assert_eq!(TextId::from_value(&json!(["1"])), None);
    }
}
