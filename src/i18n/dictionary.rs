//! Locale dictionaries: nested JSON documents addressed by dot paths.
//!
//! A path is a sequence of `.`-separated segments. A segment is either an
//! object key, optionally followed by one or more `[n]` array indices
//! (`sections.cards[1].title`), or a bare array index (`sections.cards.1.title`).

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("top-level value must be an object, got {0}")]
    NotAnObject(&'static str),
}

/// One locale's translated strings.
#[derive(Debug, Clone, PartialEq)]
pub struct Dictionary {
    root: Value,
}

impl Dictionary {
    /// Parse a dictionary body. Anything other than a JSON object is rejected.
    pub fn parse(body: &[u8]) -> Result<Self, DictionaryError> {
        let root: Value = serde_json::from_slice(body)?;
        Self::from_value(root)
    }

    pub fn from_value(root: Value) -> Result<Self, DictionaryError> {
        if !root.is_object() {
            return Err(DictionaryError::NotAnObject(kind(&root)));
        }
        Ok(Self { root })
    }

    /// Resolve a key path to whatever value sits there.
    pub fn resolve(&self, path: &str) -> Option<&Value> {
        let mut node = &self.root;
        for segment in path.split('.') {
            if segment.is_empty() {
                return None;
            }
            node = step(node, segment)?;
        }
        Some(node)
    }

    /// Resolve a key path to a string leaf. Objects, arrays, numbers and
    /// other non-string values resolve to `None`.
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.resolve(path).and_then(Value::as_str)
    }

    /// Every leaf in the dictionary with its canonical path
    /// (`a.b[0].c` form), objects walked in key order.
    pub fn leaves(&self) -> Vec<(String, &Value)> {
        let mut out = Vec::new();
        collect_leaves(&self.root, String::new(), &mut out);
        out
    }
}

fn step<'a>(node: &'a Value, segment: &str) -> Option<&'a Value> {
    if let Ok(index) = segment.parse::<usize>() {
        return match node {
            Value::Array(items) => items.get(index),
            Value::Object(map) => map.get(segment),
            _ => None,
        };
    }

    let (key, mut rest) = match segment.find('[') {
        Some(pos) => segment.split_at(pos),
        None => (segment, ""),
    };

    let mut current = if key.is_empty() {
        node
    } else {
        node.as_object()?.get(key)?
    };

    while !rest.is_empty() {
        let close = rest.find(']')?;
        let index: usize = rest.get(1..close)?.parse().ok()?;
        current = current.as_array()?.get(index)?;
        rest = &rest[close + 1..];
        if !rest.is_empty() && !rest.starts_with('[') {
            return None;
        }
    }

    Some(current)
}

fn collect_leaves<'a>(node: &'a Value, prefix: String, out: &mut Vec<(String, &'a Value)>) {
    match node {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                collect_leaves(child, path, out);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                collect_leaves(child, format!("{}[{}]", prefix, i), out);
            }
        }
        leaf => out.push((prefix, leaf)),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Dictionary {
        Dictionary::from_value(json!({
            "meta": { "title": "Acme", "description": "Tools" },
            "header": { "brand": "Acme", "nav_products": "Products" },
            "sections": {
                "cards": [
                    { "title": "Fast", "desc": "Really fast" },
                    { "title": "Safe", "desc": "Really safe" }
                ],
                "count": 2
            }
        }))
        .expect("object")
    }

    // ==================== Parsing ====================

    #[test]
    fn test_parse_object() {
        let dict = Dictionary::parse(br#"{"a": {"b": "c"}}"#).expect("Should parse");
        assert_eq!(dict.get_str("a.b"), Some("c"));
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        let err = Dictionary::parse(b"{not json").unwrap_err();
        assert!(matches!(err, DictionaryError::Json(_)));
    }

    #[test]
    fn test_parse_rejects_non_object() {
        let err = Dictionary::parse(b"[1, 2]").unwrap_err();
        assert!(matches!(err, DictionaryError::NotAnObject("array")));
        assert!(err.to_string().contains("array"));
    }

    // ==================== Path Resolution ====================

    #[test]
    fn test_nested_key() {
        assert_eq!(sample().get_str("header.brand"), Some("Acme"));
    }

    #[test]
    fn test_bracket_index() {
        let dict = sample();
        assert_eq!(dict.get_str("sections.cards[0].title"), Some("Fast"));
        assert_eq!(dict.get_str("sections.cards[1].desc"), Some("Really safe"));
    }

    #[test]
    fn test_numeric_segment_index() {
        assert_eq!(sample().get_str("sections.cards.1.title"), Some("Safe"));
    }

    #[test]
    fn test_numeric_object_key() {
        let dict = Dictionary::from_value(json!({
            "errors": { "404": "Page not found", "500": "Server error" }
        }))
        .unwrap();

        assert_eq!(dict.get_str("errors.404"), Some("Page not found"));
        assert_eq!(dict.get_str("errors.500"), Some("Server error"));
        assert_eq!(dict.get_str("errors.403"), None);
    }

    #[test]
    fn test_index_out_of_range() {
        assert_eq!(sample().get_str("sections.cards[5].title"), None);
    }

    #[test]
    fn test_missing_key() {
        assert_eq!(sample().get_str("contact.send"), None);
    }

    #[test]
    fn test_non_string_values_do_not_resolve_as_strings() {
        let dict = sample();
        assert!(dict.resolve("sections.count").is_some());
        assert_eq!(dict.get_str("sections.count"), None);
        assert_eq!(dict.get_str("header"), None);
        assert_eq!(dict.get_str("sections.cards"), None);
    }

    #[test]
    fn test_malformed_paths() {
        let dict = sample();
        assert_eq!(dict.get_str(""), None);
        assert_eq!(dict.get_str("header..brand"), None);
        assert_eq!(dict.get_str("sections.cards[x].title"), None);
        assert_eq!(dict.get_str("sections.cards[0"), None);
        assert_eq!(dict.get_str("sections.cards[0]junk.title"), None);
    }

    // ==================== Leaves ====================

    #[test]
    fn test_leaves_use_bracket_paths() {
        let dict = sample();
        let paths: Vec<String> = dict.leaves().into_iter().map(|(p, _)| p).collect();

        assert!(paths.contains(&"meta.title".to_string()));
        assert!(paths.contains(&"sections.cards[1].desc".to_string()));
        assert!(paths.contains(&"sections.count".to_string()));
        assert_eq!(paths.len(), 9);
    }

    #[test]
    fn test_leaf_paths_resolve_back() {
        let dict = sample();
        for (path, value) in dict.leaves() {
            assert_eq!(dict.resolve(&path), Some(value), "path {}", path);
        }
    }
}
