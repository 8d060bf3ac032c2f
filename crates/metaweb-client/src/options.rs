//! Session defaults and per-call option overrides

use std::collections::BTreeMap;

use serde_json::Value;

/// Envelope options recognized by mqlread (batched and streaming).
pub const READ_OPTIONS: &[&str] = &["lang", "as_of_time", "escape", "uniqueness_failure"];
/// Envelope options recognized by mqlwrite.
pub const WRITE_OPTIONS: &[&str] = &["lang", "escape", "use_permission_of"];
/// URL parameters recognized by the search service.
pub const SEARCH_OPTIONS: &[&str] = &[
    "domain",
    "type",
    "type_strict",
    "limit",
    "start",
    "escape",
    "mql_output",
];
/// URL parameters recognized by the blurb service.
pub const BLURB_OPTIONS: &[&str] = &["maxlength", "break_paragraphs"];
/// URL parameters recognized by the thumbnail service.
pub const THUMBNAIL_OPTIONS: &[&str] = &["maxwidth", "maxheight"];

/// A name → value option map.
///
/// A session holds one of these as its defaults; every operation accepts
/// another one whose entries win over the defaults.
#[derive(Debug, Clone, Default)]
pub struct Options(BTreeMap<String, Value>);

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Defaults restricted to the operation's recognized `keys`, then every
    /// override on top. Overrides are not filtered, so a caller can always
    /// hand an operation an option this client does not know about.
    pub fn merged(&self, keys: &[&str], overrides: &Options) -> BTreeMap<String, Value> {
        let mut merged = BTreeMap::new();
        for &key in keys {
            if let Some(value) = self.0.get(key) {
                merged.insert(key.to_string(), value.clone());
            }
        }
        for (key, value) in &overrides.0 {
            merged.insert(key.clone(), value.clone());
        }
        merged
    }
}

/// Render an option value as a URL parameter. Strings go through bare;
/// everything else uses its JSON spelling.
pub(crate) fn param_str(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merged_filters_defaults() {
        let defaults = Options::new()
            .with("lang", "/lang/en")
            .with("maxwidth", 150);

        let merged = defaults.merged(READ_OPTIONS, &Options::new());
        assert_eq!(merged.get("lang"), Some(&json!("/lang/en")));
        // maxwidth is not a read option, so the default is dropped
        assert!(!merged.contains_key("maxwidth"));
    }

    #[test]
    fn test_overrides_win_and_bypass_filter() {
        let defaults = Options::new().with("lang", "/lang/en");
        let overrides = Options::new()
            .with("lang", "/lang/fr")
            .with("extension", true);

        let merged = defaults.merged(READ_OPTIONS, &overrides);
        assert_eq!(merged.get("lang"), Some(&json!("/lang/fr")));
        assert_eq!(merged.get("extension"), Some(&json!(true)));
    }

    #[test]
    fn test_param_str() {
        assert_eq!(param_str(&json!("plain")), "plain");
        assert_eq!(param_str(&json!(42)), "42");
        assert_eq!(param_str(&json!(true)), "true");
    }
}
