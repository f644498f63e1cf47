//! Parser settings with inert defaults.
//!
//! The markup parser asks for its settings by name. Every name that was not
//! set resolves to `None`, so a missing setting can never make parsing fail.
//! Unknown lookups are counted, which helps when tracking down which knobs
//! the parser actually consults.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;

/// A single settings value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Text(String),
    /// Explicitly unset; behaves like a missing entry.
    Unset,
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Bool(value) => write!(f, "{}", value),
            SettingValue::Int(value) => write!(f, "{}", value),
            SettingValue::Text(value) => write!(f, "{}", value),
            SettingValue::Unset => write!(f, "None"),
        }
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Bool(value)
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        SettingValue::Int(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Text(value.to_string())
    }
}

/// Settings object handed to the markup parser.
#[derive(Debug, Clone)]
pub struct ParserSettings {
    values: IndexMap<String, SettingValue>,
    unknown: RefCell<HashMap<String, usize>>,
}

impl Default for ParserSettings {
    fn default() -> Self {
        let defaults: [(&str, SettingValue); 14] = [
            ("character_level_inline_markup", SettingValue::Bool(false)),
            ("debug", SettingValue::Int(0)),
            ("error_encoding", "utf-8".into()),
            ("error_encoding_error_handler", "backslashreplace".into()),
            ("halt_level", SettingValue::Int(4)),
            ("input_encoding", "unicode".into()),
            ("language_code", "en".into()),
            ("output_encoding", "unicode".into()),
            ("pep_references", SettingValue::Unset),
            ("raw_enabled", SettingValue::Int(1)),
            ("report_level", SettingValue::Int(2)),
            ("rfc_references", SettingValue::Unset),
            ("tab_width", SettingValue::Int(3)),
            ("warning_stream", SettingValue::Unset),
        ];

        Self {
            values: defaults
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
            unknown: RefCell::new(HashMap::new()),
        }
    }
}

impl ParserSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override (or add) a setting.
    pub fn with(mut self, name: &str, value: impl Into<SettingValue>) -> Self {
        self.values.insert(name.to_string(), value.into());
        self
    }

    /// Look up a setting. Unset and unknown names yield `None`.
    pub fn get(&self, name: &str) -> Option<&SettingValue> {
        match self.values.get(name) {
            Some(SettingValue::Unset) => None,
            Some(value) => Some(value),
            None => {
                *self.unknown.borrow_mut().entry(name.to_string()).or_insert(0) += 1;
                None
            }
        }
    }

    /// Interpret a setting as a switch. Integers count as on when non-zero.
    pub fn flag(&self, name: &str) -> bool {
        match self.get(name) {
            Some(SettingValue::Bool(value)) => *value,
            Some(SettingValue::Int(value)) => *value != 0,
            Some(SettingValue::Text(value)) => !value.is_empty(),
            Some(SettingValue::Unset) | None => false,
        }
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        match self.get(name) {
            Some(SettingValue::Int(value)) => Some(*value),
            Some(SettingValue::Bool(value)) => Some(i64::from(*value)),
            _ => None,
        }
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(SettingValue::Text(value)) => Some(value),
            _ => None,
        }
    }

    /// Names that were asked for but never set, with how often.
    pub fn unknown_queries(&self) -> Vec<(String, usize)> {
        let mut queries: Vec<_> = self
            .unknown
            .borrow()
            .iter()
            .map(|(name, count)| (name.clone(), *count))
            .collect();
        queries.sort();
        queries
    }

    /// Tab stops used when expanding tabs; never below one.
    pub fn tab_width(&self) -> usize {
        self.int("tab_width")
            .and_then(|width| usize::try_from(width).ok())
            .filter(|width| *width > 0)
            .unwrap_or(8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = ParserSettings::new();
        assert_eq!(settings.int("tab_width"), Some(3));
        assert_eq!(settings.int("halt_level"), Some(4));
        assert_eq!(settings.int("report_level"), Some(2));
        assert!(settings.flag("raw_enabled"));
        assert!(!settings.flag("character_level_inline_markup"));
        assert_eq!(settings.text("language_code"), Some("en"));
        assert_eq!(settings.text("error_encoding_error_handler"), Some("backslashreplace"));
    }

    #[test]
    fn test_unset_and_unknown_resolve_to_none() {
        let settings = ParserSettings::new();
        assert!(settings.get("pep_references").is_none());
        assert!(settings.get("warning_stream").is_none());
        assert!(settings.get("file_insertion_enabled").is_none());
        assert!(!settings.flag("smart_quotes"));
        assert_eq!(settings.int("id_prefix"), None);
    }

    #[test]
    fn test_unknown_queries_are_counted() {
        let settings = ParserSettings::new();
        settings.get("smart_quotes");
        settings.get("smart_quotes");
        settings.get("id_prefix");
        // known-but-unset names are not "unknown"
        settings.get("rfc_references");

        assert_eq!(
            settings.unknown_queries(),
            vec![("id_prefix".to_string(), 1), ("smart_quotes".to_string(), 2)]
        );
    }

    #[test]
    fn test_overrides() {
        let settings = ParserSettings::new()
            .with("raw_enabled", false)
            .with("tab_width", 4_i64)
            .with("rfc_references", true);
        assert!(!settings.flag("raw_enabled"));
        assert_eq!(settings.tab_width(), 4);
        assert!(settings.flag("rfc_references"));
    }

    #[test]
    fn test_tab_width_never_zero() {
        let settings = ParserSettings::new().with("tab_width", 0_i64);
        assert_eq!(settings.tab_width(), 8);
    }
}
