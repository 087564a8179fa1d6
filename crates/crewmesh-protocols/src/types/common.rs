//! Common utility types.

use std::collections::HashMap;

/// Open string-keyed metadata map carried on most records.
pub type Metadata = HashMap<String, serde_json::Value>;

/// Shallow-merge `incoming` into `target`, overwriting colliding keys.
pub fn merge_metadata(target: &mut Metadata, incoming: Metadata) {
    for (key, value) in incoming {
        target.insert(key, value);
    }
}
