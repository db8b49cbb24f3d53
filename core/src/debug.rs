// Debug printer — development aid for eyeballing envelopes and beacon lists

use serde_json::Value;

/// Recursively print a JSON value's entries to a line sink.
///
/// Objects and arrays are walked entry by entry; a nested container prints
/// its key alone (`key:`) and then its own entries indented one level
/// deeper, two spaces per level. Scalars print inline as `key: value` with
/// strings unquoted. A bare scalar at the top level has no entries and
/// prints nothing.
pub fn print_value(value: &Value, print: &mut dyn FnMut(&str)) {
    print_entries(value, 0, print);
}

/// [`print_value`] with the default sink: one debug-level log line per entry.
pub fn print_to_log(value: &Value) {
    print_value(value, &mut |line| tracing::debug!("{}", line));
}

fn print_entries(value: &Value, level: usize, print: &mut dyn FnMut(&str)) {
    let indent = "  ".repeat(level);
    match value {
        Value::Object(map) => {
            for (key, entry) in map {
                print_entry(&indent, key, entry, level, print);
            }
        }
        Value::Array(items) => {
            for (index, entry) in items.iter().enumerate() {
                print_entry(&indent, &index.to_string(), entry, level, print);
            }
        }
        _ => {}
    }
}

fn print_entry(
    indent: &str,
    key: &str,
    entry: &Value,
    level: usize,
    print: &mut dyn FnMut(&str),
) {
    if entry.is_object() || entry.is_array() {
        print(&format!("{indent}{key}:"));
        print_entries(entry, level + 1, print);
    } else {
        print(&format!("{indent}{key}: {}", scalar_text(entry)));
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
