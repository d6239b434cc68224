//! Form encoding for request bodies.
//!
//! # Design
//! The remote API takes `application/x-www-form-urlencoded` bodies and
//! expresses nesting through bracketed keys (`address[city]`,
//! `preferred_locales[0]`, `metadata[foo]`). Each record writes its own
//! fields into a `FormBody`; nested records append under their parent's key.
//!
//! Field rules:
//! - plain strings are omitted when empty,
//! - numbers are always written, zero included,
//! - `Option` fields are written only when present, even if empty,
//! - lists become indexed keys in order, and an empty list writes nothing.

use std::collections::HashMap;

/// Ordered multimap of form keys to values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormBody {
    entries: Vec<(String, String)>,
}

impl FormBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Writes `value` unless it is empty.
    pub fn set_str(&mut self, key: impl Into<String>, value: &str) {
        if !value.is_empty() {
            self.push(key, value);
        }
    }

    /// Writes `value` when present; `Some("")` is sent as an empty value.
    pub fn set_opt_str(&mut self, key: impl Into<String>, value: Option<&str>) {
        if let Some(value) = value {
            self.push(key, value);
        }
    }

    pub fn set_i64(&mut self, key: impl Into<String>, value: i64) {
        self.push(key, value.to_string());
    }

    pub fn set_opt_i64(&mut self, key: impl Into<String>, value: Option<i64>) {
        if let Some(value) = value {
            self.set_i64(key, value);
        }
    }

    /// Writes `key[0]`, `key[1]`, ... in order.
    pub fn set_list(&mut self, key: &str, values: &[String]) {
        for (index, value) in values.iter().enumerate() {
            self.push(format!("{key}[{index}]"), value.as_str());
        }
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Percent-encodes the entries in insertion order.
    pub fn encode(&self) -> Result<String, serde_urlencoded::ser::Error> {
        serde_urlencoded::to_string(&self.entries)
    }
}

impl IntoIterator for FormBody {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// `field` at the top level, `prefix[field]` under a parent.
pub fn field_key(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{prefix}[{field}]")
    }
}

/// A record that can be sent as a request body.
pub trait FormRequest {
    fn to_form(&self) -> FormBody;
}

/// A value that writes itself beneath a parent key.
pub trait AppendForm {
    fn append_form(&self, form: &mut FormBody, key: &str);
}

impl<T: AppendForm> AppendForm for Option<T> {
    fn append_form(&self, form: &mut FormBody, key: &str) {
        if let Some(value) = self {
            value.append_form(form, key);
        }
    }
}

/// Metadata-style map; each entry becomes `key[entry]=value`. Entry order
/// follows the map's iteration order and is unspecified.
impl AppendForm for HashMap<String, String> {
    fn append_form(&self, form: &mut FormBody, key: &str) {
        for (entry, value) in self {
            form.push(format!("{key}[{entry}]"), value.as_str());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn empty_string_is_omitted() {
        let mut form = FormBody::new();
        form.set_str("currency", "");
        assert!(form.is_empty());
    }

    #[test]
    fn present_empty_option_is_sent() {
        let mut form = FormBody::new();
        form.set_opt_str("description", Some(""));
        form.set_opt_str("email", None);
        assert_eq!(form.entries(), &[("description".to_string(), String::new())]);
    }

    #[test]
    fn zero_numbers_are_written() {
        let mut form = FormBody::new();
        form.set_i64("balance", 0);
        form.set_opt_i64("next_invoice_sequence", None);
        assert_eq!(form.get("balance"), Some("0"));
        assert!(!form.contains_key("next_invoice_sequence"));
    }

    #[test]
    fn lists_use_indexed_keys_in_order() {
        let mut form = FormBody::new();
        form.set_list("preferred_locales", &["en-US".to_string(), "fr-FR".to_string()]);
        assert_eq!(
            form.entries(),
            &[
                ("preferred_locales[0]".to_string(), "en-US".to_string()),
                ("preferred_locales[1]".to_string(), "fr-FR".to_string()),
            ]
        );

        let mut empty = FormBody::new();
        empty.set_list("preferred_locales", &[]);
        assert!(empty.is_empty());
    }

    #[test]
    fn dictionary_entries_match_as_a_set() {
        let dict: HashMap<String, String> = [("foo", "bar"), ("baz", "qux"), ("empty", "")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut form = FormBody::new();
        dict.append_form(&mut form, "metadata");

        let got: HashSet<(String, String)> = form.into_iter().collect();
        let want: HashSet<(String, String)> = dict
            .iter()
            .map(|(k, v)| (format!("metadata[{k}]"), v.clone()))
            .collect();
        assert_eq!(got, want);
    }

    #[test]
    fn absent_nested_value_writes_nothing() {
        let dict: Option<HashMap<String, String>> = None;
        let mut form = FormBody::new();
        dict.append_form(&mut form, "shipping");
        assert!(form.is_empty());
    }

    #[test]
    fn field_key_brackets_under_prefix() {
        assert_eq!(field_key("", "number"), "number");
        assert_eq!(field_key("card", "number"), "card[number]");
        assert_eq!(field_key("invoice_settings[custom_fields]", "a"), "invoice_settings[custom_fields][a]");
    }

    #[test]
    fn encode_percent_escapes_brackets_and_keeps_order() {
        let mut form = FormBody::new();
        form.push("name", "Ada Lovelace");
        form.push("address[city]", "London");
        assert_eq!(form.encode().unwrap(), "name=Ada+Lovelace&address%5Bcity%5D=London");
    }
}
