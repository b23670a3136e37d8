//! Deep merge of partial entries into the entry under construction.
//!
//! For every `(key, value)` of the partial entry:
//!
//! | current value | incoming value | result                       |
//! |---------------|----------------|------------------------------|
//! | absent        | any            | inserted as-is               |
//! | list          | any            | appended                     |
//! | map           | map            | merged key-wise, recursively |
//! | anything else | any            | `[current, incoming]`        |
//!
//! A key therefore only ever grows: absent → text → list, or absent → map.

use crate::kanjidic::types::value::{Fields, Value};

/// Merges `partial` into `target`, in the order of `partial`.
pub fn merge(target: &mut Fields, partial: Fields) {
    for (key, value) in partial {
        merge_entry(target, key, value);
    }
}

fn merge_entry(target: &mut Fields, key: String, value: Value) {
    let Some(slot) = target.get_mut(&key) else {
        target.insert(key, value);
        return;
    };
    match (slot, value) {
        (Value::List(items), value) => items.push(value),
        (Value::Map(current), Value::Map(nested)) => merge(current, nested),
        (slot, value) => {
            let current = std::mem::replace(slot, Value::List(Vec::with_capacity(2)));
            *slot = Value::List(vec![current, value]);
        }
    }
}
