//! Localization of overlay labels.
//!
//! Lookup order for every key: the manually selected locale's messages (when
//! the language setting is not `auto`), then the system resolver, then the
//! built-in English table, then the key itself. A label is never blank.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use crate::core::extract::PageLabels;
use crate::error::{SpotlightError, SpotlightResult};

/// Locales that can be selected manually.
pub const SUPPORTED_LOCALES: &[&str] = &["en", "zh_TW", "ja", "ko", "es"];

/// Message keys used by the overlay chrome and page items.
pub mod keys {
    pub const SEARCH_PLACEHOLDER: &str = "searchPlaceholder";
    pub const LOADING: &str = "loading";
    pub const TYPE_TO_SEARCH: &str = "typeToSearch";
    pub const EMPTY_HINT: &str = "emptyHint";
    pub const TYPE_MORE: &str = "typeMore";
    pub const NO_RESULTS: &str = "noResults";
    pub const SEARCH_GOOGLE: &str = "searchGoogle";
    pub const NAVIGATE: &str = "navigate";
    pub const GO_TO: &str = "goTo";
    pub const CLOSE: &str = "close";
    pub const THIS_SITE: &str = "thisSite";
    pub const RECENT: &str = "recent";
    pub const URL_COPIED: &str = "urlCopied";
    pub const CURRENT_PAGE: &str = "currentPage";
    pub const YOU_ARE_HERE: &str = "youAreHere";
    pub const TEXT_ON_PAGE: &str = "textOnPage";
    pub const BUTTON: &str = "button";
    pub const HEADING: &str = "heading";
}

const DEFAULT_MESSAGES: &[(&str, &str)] = &[
    (keys::SEARCH_PLACEHOLDER, "Search this page, tabs, bookmarks..."),
    (keys::LOADING, "Loading..."),
    (keys::TYPE_TO_SEARCH, "Type to search"),
    (keys::EMPTY_HINT, "Page Text • Tabs • Bookmarks • History"),
    (keys::TYPE_MORE, "Keep typing..."),
    (keys::NO_RESULTS, "No matches found"),
    (keys::SEARCH_GOOGLE, "Search Google for"),
    (keys::NAVIGATE, "Navigate"),
    (keys::GO_TO, "Go to"),
    (keys::CLOSE, "Close"),
    (keys::THIS_SITE, "This site"),
    (keys::RECENT, "Recent"),
    (keys::URL_COPIED, "URL copied!"),
    (keys::CURRENT_PAGE, "Current Page"),
    (keys::YOU_ARE_HERE, "You are here"),
    (keys::TEXT_ON_PAGE, "Text on this page"),
    (keys::BUTTON, "Button"),
    (keys::HEADING, "heading"),
];

/// Language preference: follow the system, or a manual locale.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    Auto,
    Manual(String),
}

impl Language {
    /// Parse a settings value. Unknown locales fall back to `Auto`.
    pub fn parse(tag: &str) -> Self {
        let tag = tag.trim();
        if tag.is_empty() || tag.eq_ignore_ascii_case("auto") {
            return Language::Auto;
        }
        match SUPPORTED_LOCALES.iter().find(|l| l.eq_ignore_ascii_case(tag)) {
            Some(locale) => Language::Manual(locale.to_string()),
            None => {
                tracing::warn!("Unsupported locale {:?}, using system language", tag);
                Language::Auto
            }
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Language::Auto => "auto",
            Language::Manual(locale) => locale,
        }
    }
}

/// Key -> message table for one locale.
pub type MessageTable = HashMap<String, String>;

#[derive(Debug, Deserialize)]
struct MessageEntry {
    message: String,
}

/// Parse a `messages.json` document (`{ key: { message, description? } }`).
pub fn parse_messages(json: &str) -> SpotlightResult<MessageTable> {
    let entries: HashMap<String, MessageEntry> = serde_json::from_str(json)?;
    Ok(entries
        .into_iter()
        .map(|(key, entry)| (key, entry.message))
        .collect())
}

/// Where manual-locale messages come from.
pub trait MessageSource {
    fn load(&self, locale: &str) -> SpotlightResult<MessageTable>;
}

/// `_locales/<locale>/messages.json` directory layout.
#[derive(Debug, Clone)]
pub struct LocaleDir {
    root: PathBuf,
}

impl LocaleDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl MessageSource for LocaleDir {
    fn load(&self, locale: &str) -> SpotlightResult<MessageTable> {
        let path = self.root.join(locale).join("messages.json");
        let content = fs::read_to_string(&path).map_err(|e| {
            SpotlightError::Locale(format!("Failed to read {}: {}", path.display(), e))
        })?;
        parse_messages(&content)
    }
}

/// Resolver standing in for the browser's own i18n lookup.
pub type SystemResolver = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Resolves display strings for the current language setting.
pub struct Localizer {
    language: Language,
    manual: Option<MessageTable>,
    system: Option<SystemResolver>,
}

impl Localizer {
    /// Build a localizer, loading manual messages when a locale is selected.
    /// A failed load falls back to the system resolver for every key.
    pub fn new(language: Language, source: &dyn MessageSource) -> Self {
        let manual = match &language {
            Language::Auto => None,
            Language::Manual(locale) => match source.load(locale) {
                Ok(table) => Some(table),
                Err(e) => {
                    tracing::warn!("Failed to load locale {}: {}", locale, e);
                    None
                }
            },
        };
        Self {
            language,
            manual,
            system: None,
        }
    }

    /// Localizer that only uses the system resolver and built-in defaults.
    pub fn system_default() -> Self {
        Self {
            language: Language::Auto,
            manual: None,
            system: None,
        }
    }

    pub fn with_system_resolver(mut self, resolver: SystemResolver) -> Self {
        self.system = Some(resolver);
        self
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    /// Whether manual messages are in effect.
    pub fn has_manual_messages(&self) -> bool {
        self.manual.is_some()
    }

    pub fn get(&self, key: &str) -> String {
        if let Some(message) = self
            .manual
            .as_ref()
            .and_then(|table| table.get(key))
            .filter(|m| !m.is_empty())
        {
            return message.clone();
        }
        if let Some(message) = self
            .system
            .as_ref()
            .and_then(|resolve| resolve(key))
            .filter(|m| !m.is_empty())
        {
            return message;
        }
        DEFAULT_MESSAGES
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, m)| m.to_string())
            .unwrap_or_else(|| key.to_string())
    }

    /// Labels for the synthetic current-page item and page subtitles.
    pub fn page_labels(&self) -> PageLabels {
        PageLabels {
            current_page: self.get(keys::CURRENT_PAGE),
            you_are_here: self.get(keys::YOU_ARE_HERE),
            text_on_page: self.get(keys::TEXT_ON_PAGE),
            button: self.get(keys::BUTTON),
            heading: self.get(keys::HEADING),
        }
    }
}

impl std::fmt::Debug for Localizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Localizer")
            .field("language", &self.language)
            .field("manual", &self.manual.as_ref().map(|t| t.len()))
            .field("system", &self.system.is_some())
            .finish()
    }
}

/// Static strings painted by the overlay chrome.
///
/// Rebuilt whenever the language setting changes, even mid-session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromeLabels {
    pub placeholder: String,
    pub loading: String,
    pub type_to_search: String,
    pub empty_hint: String,
    pub type_more: String,
    pub no_results: String,
    pub search_google: String,
    pub navigate: String,
    pub go_to: String,
    pub close: String,
    pub this_site: String,
    pub recent: String,
    pub url_copied: String,
}

impl ChromeLabels {
    pub fn build(localizer: &Localizer) -> Self {
        Self {
            placeholder: localizer.get(keys::SEARCH_PLACEHOLDER),
            loading: localizer.get(keys::LOADING),
            type_to_search: localizer.get(keys::TYPE_TO_SEARCH),
            empty_hint: localizer.get(keys::EMPTY_HINT),
            type_more: localizer.get(keys::TYPE_MORE),
            no_results: localizer.get(keys::NO_RESULTS),
            search_google: localizer.get(keys::SEARCH_GOOGLE),
            navigate: localizer.get(keys::NAVIGATE),
            go_to: localizer.get(keys::GO_TO),
            close: localizer.get(keys::CLOSE),
            this_site: localizer.get(keys::THIS_SITE),
            recent: localizer.get(keys::RECENT),
            url_copied: localizer.get(keys::URL_COPIED),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSource(Option<&'static str>);

    impl MessageSource for FixedSource {
        fn load(&self, locale: &str) -> SpotlightResult<MessageTable> {
            match self.0 {
                Some(json) => parse_messages(json),
                None => Err(SpotlightError::Locale(format!("missing {}", locale))),
            }
        }
    }

    const JA: &str = r#"{
        "noResults": {"message": "一致する結果がありません", "description": "empty state"},
        "close": {"message": ""}
    }"#;

    #[test]
    fn test_language_parse() {
        assert_eq!(Language::parse("auto"), Language::Auto);
        assert_eq!(Language::parse(""), Language::Auto);
        assert_eq!(Language::parse("zh_tw"), Language::Manual("zh_TW".into()));
        assert_eq!(Language::parse("klingon"), Language::Auto);
    }

    #[test]
    fn test_manual_locale_wins() {
        let localizer = Localizer::new(Language::Manual("ja".into()), &FixedSource(Some(JA)));
        assert!(localizer.has_manual_messages());
        assert_eq!(localizer.get(keys::NO_RESULTS), "一致する結果がありません");
    }

    #[test]
    fn test_missing_or_empty_key_falls_back() {
        let localizer = Localizer::new(Language::Manual("ja".into()), &FixedSource(Some(JA)))
            .with_system_resolver(Arc::new(|key: &str| {
                (key == keys::CLOSE).then(|| "Schließen".to_string())
            }));
        assert_eq!(localizer.get(keys::CLOSE), "Schließen");
        assert_eq!(localizer.get(keys::LOADING), "Loading...");
    }

    #[test]
    fn test_failed_load_uses_defaults() {
        let localizer = Localizer::new(Language::Manual("ko".into()), &FixedSource(None));
        assert!(!localizer.has_manual_messages());
        assert_eq!(localizer.get(keys::NO_RESULTS), "No matches found");
    }

    #[test]
    fn test_unknown_key_is_never_blank() {
        let localizer = Localizer::system_default();
        assert_eq!(localizer.get("somethingNew"), "somethingNew");
    }

    #[test]
    fn test_chrome_labels_have_no_blank_entries() {
        let labels = ChromeLabels::build(&Localizer::system_default());
        assert_eq!(labels.placeholder, "Search this page, tabs, bookmarks...");
        assert!(!labels.url_copied.is_empty());
    }
}
