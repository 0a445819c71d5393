//! Diff generation for audit logging
//!
//! Turns a before/after pair of JSON values into the short change summary
//! stored on update entries.

use std::collections::BTreeSet;

use serde_json::Value;

/// Summarize top-level field changes between two JSON values
///
/// Returns `None` when the values are equal. Nested objects show up as a
/// field count; [`generate_detailed_diff`] walks into them.
pub fn generate_diff(before: &Value, after: &Value) -> Option<String> {
    let changes = match (before, after) {
        (Value::Object(before_obj), Value::Object(after_obj)) => {
            let keys: BTreeSet<&String> = before_obj.keys().chain(after_obj.keys()).collect();
            let mut changes = Vec::new();
            for key in keys {
                match (before_obj.get(key), after_obj.get(key)) {
                    (Some(b), Some(a)) if b != a => {
                        changes.push(format!(
                            "{}: {} -> {}",
                            key,
                            format_value(b),
                            format_value(a)
                        ));
                    }
                    (Some(b), None) => {
                        changes.push(format!("{}: {} -> (removed)", key, format_value(b)));
                    }
                    (None, Some(a)) => {
                        changes.push(format!("{}: (added) -> {}", key, format_value(a)));
                    }
                    _ => {}
                }
            }
            changes
        }
        _ if before != after => {
            vec![format!("{} -> {}", format_value(before), format_value(after))]
        }
        _ => Vec::new(),
    };

    if changes.is_empty() {
        None
    } else {
        Some(changes.join(", "))
    }
}

/// Recursive variant that walks nested objects and arrays
///
/// One change per line, each prefixed with the dotted path to the field.
pub fn generate_detailed_diff(before: &Value, after: &Value, prefix: &str) -> Vec<String> {
    let mut changes = Vec::new();

    match (before, after) {
        (Value::Object(before_obj), Value::Object(after_obj)) => {
            let keys: BTreeSet<&String> = before_obj.keys().chain(after_obj.keys()).collect();
            for key in keys {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                match (before_obj.get(key), after_obj.get(key)) {
                    (Some(b), Some(a)) if b != a => {
                        if b.is_object() && a.is_object() {
                            changes.extend(generate_detailed_diff(b, a, &path));
                        } else {
                            changes.push(format!(
                                "{}: {} -> {}",
                                path,
                                format_value(b),
                                format_value(a)
                            ));
                        }
                    }
                    (Some(b), None) => {
                        changes.push(format!("{}: {} -> (removed)", path, format_value(b)));
                    }
                    (None, Some(a)) => {
                        changes.push(format!("{}: (added) -> {}", path, format_value(a)));
                    }
                    _ => {}
                }
            }
        }
        (Value::Array(before_arr), Value::Array(after_arr)) => {
            if before_arr.len() != after_arr.len() {
                changes.push(format!(
                    "{}: [{} items] -> [{} items]",
                    prefix,
                    before_arr.len(),
                    after_arr.len()
                ));
            } else {
                for (i, (b, a)) in before_arr.iter().zip(after_arr.iter()).enumerate() {
                    if b != a {
                        let path = format!("{}[{}]", prefix, i);
                        changes.extend(generate_detailed_diff(b, a, &path));
                    }
                }
            }
        }
        _ => {
            if before != after {
                changes.push(format!(
                    "{}: {} -> {}",
                    prefix,
                    format_value(before),
                    format_value(after)
                ));
            }
        }
    }

    changes
}

/// Render one JSON value for a diff line
fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => {
            // Char-based truncation so multibyte memos never split a codepoint
            if s.chars().count() > 50 {
                let head: String = s.chars().take(47).collect();
                format!("\"{}...\"", head)
            } else {
                format!("\"{}\"", s)
            }
        }
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
    }
}
