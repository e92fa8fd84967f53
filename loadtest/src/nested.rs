use serde_json::Value;

/// Follow `keys` down through nested objects. Returns `None` as soon as a key
/// is absent or the current node is not an object.
pub fn nested<'a>(root: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().try_fold(root, |node, key| node.as_object()?.get(*key))
}

/// [`nested`] for a value expected to be an array.
pub fn nested_array<'a>(root: &'a Value, keys: &[&str]) -> Option<&'a Vec<Value>> {
    nested(root, keys)?.as_array()
}
