//! Positional mapping of persisted child states onto child slots.

use serde_json::{Map, Value};

/// The state handed to a child that has nothing to restore.
pub fn empty_state() -> Value {
    Value::Object(Map::new())
}

/// Blob stored for slot `index`, or an empty state when the persisted list
/// is shorter.
pub fn state_for(previous: &[Value], index: usize) -> Value {
    previous.get(index).cloned().unwrap_or_else(empty_state)
}
