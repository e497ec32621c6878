use serde_json::{Map, Value};

/// Recursively merge `source` into `target`.
///
/// Keys present in both where both values are objects are merged key by key.
/// Any other incoming value replaces the target value outright, so an object
/// arriving over a primitive replaces it rather than merging into it.
pub fn deep_merge(target: &mut Map<String, Value>, source: &Map<String, Value>) {
    for (key, incoming) in source {
        match (target.get_mut(key), incoming) {
            (Some(Value::Object(existing)), Value::Object(nested)) => {
                deep_merge(existing, nested);
            }
            _ => {
                target.insert(key.clone(), incoming.clone());
            }
        }
    }
}

/// Merge every source, in order, into a fresh map.
pub fn merge_all<'a, I>(sources: I) -> Map<String, Value>
where
    I: IntoIterator<Item = &'a Map<String, Value>>,
{
    let mut merged = Map::new();
    for source in sources {
        deep_merge(&mut merged, source);
    }
    merged
}
