use serde_json::Value;

/// The layouts a workflow document can come in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentShape {
    /// Already execution-ready: `{ "<id>": { "class_type": ..., "inputs": {...} }, ... }`.
    Flat,
    /// The editor's save format with a `nodes` array.
    Nested,
    /// Valid JSON, but neither of the above.
    Unrecognized,
}

/// Works out which layout `document` uses.
pub fn detect_shape(document: &Value) -> DocumentShape {
    let Value::Object(map) = document else {
        return DocumentShape::Unrecognized;
    };

    if map.get("nodes").is_some_and(Value::is_array) {
        return DocumentShape::Nested;
    }

    // An empty mapping is a flat graph without nodes.
    if map
        .values()
        .all(|node| node.get("class_type").is_some_and(Value::is_string))
    {
        DocumentShape::Flat
    } else {
        DocumentShape::Unrecognized
    }
}
