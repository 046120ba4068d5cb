// src/dialog/format.rs
// Reshaping classification replies for the chat UI.

use serde_json::{json, Map, Value};

use crate::error::{NlcError, NlcResult};

/// Drop result entries whose `score` is missing or not above `threshold`,
/// and recount `matching_results`. `None` leaves the response untouched.
pub fn filter_by_score(response: &mut Value, threshold: Option<f64>) {
    let Some(threshold) = threshold else {
        return;
    };
    let Some(results) = response.get_mut("results").and_then(Value::as_array_mut) else {
        return;
    };

    results.retain(|entry| {
        entry
            .get("score")
            .and_then(Value::as_f64)
            .is_some_and(|score| score > threshold)
    });
    let count = results.len();
    response["matching_results"] = json!(count);
}

/// Map the classifier's native `classes` list (`class_name` / `confidence`)
/// onto `results` entries carrying `name` / `score`. Responses that already
/// have `results` are left alone.
pub fn normalize_classes(response: &mut Value) {
    let Some(object) = response.as_object_mut() else {
        return;
    };
    if object.contains_key("results") {
        return;
    }
    let Some(classes) = object.get("classes").and_then(Value::as_array) else {
        return;
    };

    let results: Vec<Value> = classes
        .iter()
        .map(|class| {
            let mut entry = class.as_object().cloned().unwrap_or_default();
            if let Some(name) = entry.get("class_name").cloned() {
                entry.entry("name").or_insert(name);
            }
            if let Some(confidence) = entry.get("confidence").cloned() {
                entry.entry("score").or_insert(confidence);
            }
            Value::Object(entry)
        })
        .collect();

    object.insert("matching_results".to_string(), json!(results.len()));
    object.insert("results".to_string(), Value::Array(results));
}

/// Render each entry through `template` and join the lines with newlines.
pub fn format_for_display(entries: &[Value], template: &str) -> NlcResult<String> {
    let lines = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| render_entry(template, entry, i + 1))
        .collect::<NlcResult<Vec<_>>>()?;
    Ok(lines.join("\n"))
}

/// Substitute `{field}` placeholders from `entry`. `{index}` falls back to the
/// 1-based position; `{{` and `}}` are literal braces.
pub fn render_entry(template: &str, entry: &Value, position: usize) -> NlcResult<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut key = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(k) => key.push(k),
                        None => {
                            return Err(NlcError::format(format!(
                                "unterminated placeholder '{{{key}' in template"
                            )));
                        }
                    }
                }
                out.push_str(&field_text(entry, key.trim(), position)?);
            }
            '}' => {
                return Err(NlcError::format("single '}' encountered in template"));
            }
            other => out.push(other),
        }
    }

    Ok(out)
}

fn field_text(entry: &Value, key: &str, position: usize) -> NlcResult<String> {
    match entry.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Ok(other.to_string()),
        None if key == "index" => Ok(position.to_string()),
        None => Err(NlcError::format(format!(
            "result {position} has no '{key}' field"
        ))),
    }
}

/// Shallow merge; keys in `update` overwrite existing ones.
pub fn merge_context(context: &mut Map<String, Value>, update: Map<String, Value>) {
    context.extend(update);
}
