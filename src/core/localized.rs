//! Localized text values (language tag → string)

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

/// Locale used when a request does not carry a usable language tag
pub const DEFAULT_LOCALE: &str = "ar";

/// Languages every localized field is expected to carry
pub const SUPPORTED_LANGUAGES: &[&str] = &["en", "ar"];

/// A text value stored once per language tag.
///
/// Serialized as a plain JSON object: `{"en": "Admin", "ar": "مدير"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedText(BTreeMap<String, String>);

impl LocalizedText {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Same text for every supported language
    pub fn uniform(text: impl Into<String>) -> Self {
        let text = text.into();
        Self(
            SUPPORTED_LANGUAGES
                .iter()
                .map(|lang| (lang.to_string(), text.clone()))
                .collect(),
        )
    }

    /// Builder-style insert
    pub fn with(mut self, lang: impl Into<String>, text: impl Into<String>) -> Self {
        self.0.insert(lang.into(), text.into());
        self
    }

    pub fn insert(&mut self, lang: impl Into<String>, text: impl Into<String>) {
        self.0.insert(lang.into(), text.into());
    }

    pub fn get(&self, lang: &str) -> Option<&str> {
        self.0.get(lang).map(String::as_str)
    }

    /// Get the text for a locale.
    ///
    /// A blank locale, or anything longer than a language tag, falls back to
    /// [`DEFAULT_LOCALE`]. A missing translation yields an empty string.
    pub fn get_by_locale(&self, locale: Option<&str>) -> &str {
        let locale = match locale {
            Some(l) if !l.trim().is_empty() && l.len() <= 3 => l,
            _ => DEFAULT_LOCALE,
        };
        self.get(locale).unwrap_or("")
    }

    /// Case-insensitive substring match, in one language or in any of them
    pub fn contains(&self, needle: &str, lang: Option<&str>) -> bool {
        let needle = needle.to_lowercase();
        match lang {
            Some(lang) => self
                .get(lang)
                .is_some_and(|v| v.to_lowercase().contains(&needle)),
            None => self.0.values().any(|v| v.to_lowercase().contains(&needle)),
        }
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for LocalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|(k, v)| format!("{}:{}", k, v)).collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LocalizedText {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Check that a string looks like a language tag (`en`, `ar`, `fil`)
pub fn is_language_tag(tag: &str) -> bool {
    static TAG_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = TAG_REGEX.get_or_init(|| Regex::new(r"^[a-z]{2,3}$").unwrap());
    regex.is_match(tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role_name() -> LocalizedText {
        LocalizedText::new().with("en", "Tutor").with("ar", "مدرس")
    }

    #[test]
    fn test_get_by_locale() {
        let text = role_name();
        assert_eq!(text.get_by_locale(Some("en")), "Tutor");
        assert_eq!(text.get_by_locale(Some("ar")), "مدرس");
    }

    #[test]
    fn test_get_by_locale_falls_back_to_default() {
        let text = role_name();
        assert_eq!(text.get_by_locale(None), "مدرس");
        assert_eq!(text.get_by_locale(Some("  ")), "مدرس");
        assert_eq!(text.get_by_locale(Some("en-US")), "مدرس");
    }

    #[test]
    fn test_missing_language_is_empty() {
        let text = LocalizedText::new().with("en", "Only english");
        assert_eq!(text.get_by_locale(Some("fr")), "");
    }

    #[test]
    fn test_contains_is_case_insensitive() {
        let text = role_name();
        assert!(text.contains("teach", Some("en")));
        assert!(text.contains("TEACH", None));
        assert!(!text.contains("teach", Some("ar")));
    }

    #[test]
    fn test_uniform_covers_supported_languages() {
        let text = LocalizedText::uniform("Admin");
        for lang in SUPPORTED_LANGUAGES {
            assert_eq!(text.get(lang), Some("Admin"));
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(role_name().to_string(), "{ar:مدرس, en:Tutor}");
    }

    #[test]
    fn test_serde_is_a_plain_object() {
        let json = serde_json::to_value(role_name()).unwrap();
        assert_eq!(json, serde_json::json!({"en": "Tutor", "ar": "مدرس"}));
    }

    #[test]
    fn test_language_tag() {
        assert!(is_language_tag("en"));
        assert!(is_language_tag("fil"));
        assert!(!is_language_tag("EN"));
        assert!(!is_language_tag("en-US"));
    }
}
