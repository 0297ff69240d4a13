//! Decoding of property values written inline in a document.

use sl_core::Value;

/// Decode a raw property value.
///
/// JSON literals (objects, arrays, numbers, booleans, quoted strings) are
/// decoded as such; anything that fails to decode is kept verbatim as a
/// string.
pub fn decode_value(raw: &str) -> Value {
    let text = raw.trim();
    if looks_like_json(text) {
        match serde_json::from_str::<serde_json::Value>(text) {
            Ok(json) => return Value::from(json),
            Err(err) => tracing::trace!(%err, text, "keeping property value as literal text"),
        }
    }
    Value::String(text.to_string())
}

fn looks_like_json(text: &str) -> bool {
    match text.chars().next() {
        Some('{' | '[' | '"' | '-' | '0'..='9') => true,
        _ => matches!(text, "true" | "false" | "null"),
    }
}

/// Split `key: value` where the key is a bare identifier.
///
/// Returns `None` for prose that merely contains a colon.
pub fn split_property(text: &str) -> Option<(String, &str)> {
    let (key, value) = text.split_once(':')?;
    let key = key.trim();
    let mut chars = key.chars();
    let first = chars.next()?;
    if !(first.is_ascii_alphabetic() || first == '_') {
        return None;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return None;
    }
    Some((key.to_ascii_lowercase().replace('-', "_"), value.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_json_literals() {
        assert_eq!(decode_value("3"), Value::Integer(3));
        assert_eq!(decode_value("true"), Value::Boolean(true));
        assert_eq!(decode_value("\"quoted\""), Value::String("quoted".into()));
        assert_eq!(
            decode_value("[\"key\", \"brass key\"]"),
            Value::List(vec![Value::from("key"), Value::from("brass key")])
        );
        let map = decode_value("{\"lockpicking\": 2}");
        assert_eq!(
            map.as_map().and_then(|m| m.get("lockpicking")),
            Some(&Value::Integer(2))
        );
    }

    #[test]
    fn falls_back_to_literal() {
        assert_eq!(decode_value("[key, brass key]"), Value::from("[key, brass key]"));
        assert_eq!(decode_value("An old key"), Value::from("An old key"));
        assert_eq!(decode_value("3 apples"), Value::from("3 apples"));
    }

    #[test]
    fn property_keys() {
        assert_eq!(split_property("lock_difficulty: 3"), Some(("lock_difficulty".into(), "3")));
        assert_eq!(split_property("On-Unlock: Click."), Some(("on_unlock".into(), "Click.")));
        assert_eq!(split_property("Silver Locket"), None);
        assert_eq!(split_property("Note to self: run"), None);
        assert_eq!(split_property(": nothing"), None);
    }
}
