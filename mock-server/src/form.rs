//! Rebuilds nested JSON from bracketed form keys.
//!
//! `metadata[foo]=bar` becomes `{"metadata":{"foo":"bar"}}` and
//! `preferred_locales[0]=en-US` becomes `{"preferred_locales":["en-US"]}`.
//! Values of known integer fields are parsed as numbers.

use serde_json::{Map, Value};

const INTEGER_FIELDS: &[&str] = &[
    "amount",
    "balance",
    "exp_month",
    "exp_year",
    "next_invoice_sequence",
];

/// Parses an urlencoded body into nested JSON.
pub fn parse(body: &str) -> Result<Map<String, Value>, serde_urlencoded::de::Error> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(body)?;
    Ok(to_json(pairs))
}

pub fn to_json(pairs: Vec<(String, String)>) -> Map<String, Value> {
    let mut root = Map::new();
    for (key, value) in pairs {
        insert(&mut root, &split_key(&key), value);
    }
    root.into_iter().map(|(k, v)| (k, listify(v))).collect()
}

fn split_key(key: &str) -> Vec<&str> {
    match key.split_once('[') {
        None => vec![key],
        Some((head, rest)) => {
            let mut parts = vec![head];
            parts.extend(rest.trim_end_matches(']').split("]["));
            parts
        }
    }
}

fn insert(map: &mut Map<String, Value>, path: &[&str], value: String) {
    match path {
        [] => {}
        [field] => {
            map.insert(field.to_string(), scalar(field, value));
        }
        [head, rest @ ..] => {
            let entry = map
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Value::Object(child) = entry {
                insert(child, rest, value);
            }
        }
    }
}

fn scalar(field: &str, value: String) -> Value {
    if INTEGER_FIELDS.contains(&field) {
        if let Ok(n) = value.parse::<i64>() {
            return Value::from(n);
        }
    }
    Value::String(value)
}

/// Objects keyed only by indices become arrays ordered by index.
fn listify(value: Value) -> Value {
    match value {
        Value::Object(map)
            if !map.is_empty() && map.keys().all(|k| k.parse::<usize>().is_ok()) =>
        {
            let mut items: Vec<(usize, Value)> = map
                .into_iter()
                .filter_map(|(k, v)| k.parse::<usize>().ok().map(|i| (i, listify(v))))
                .collect();
            items.sort_by_key(|(i, _)| *i);
            Value::Array(items.into_iter().map(|(_, v)| v).collect())
        }
        Value::Object(map) => Value::Object(map.into_iter().map(|(k, v)| (k, listify(v))).collect()),
        other => other,
    }
}
