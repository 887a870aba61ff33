use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::extract::ExtractOptions;
use crate::core::index::MatcherConfig;
use crate::core::rank::{PrimaryTier, Ranker, TypePriority};
use crate::error::{SpotlightError, SpotlightResult};
use crate::services::browser::HistoryWindow;

/// Which surface the engine is configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// In-page overlay: strict, location-aware matching
    #[default]
    Overlay,
    /// Toolbar popup: looser matching
    Popup,
}

impl Profile {
    pub fn matcher(&self) -> MatcherConfig {
        match self {
            Profile::Overlay => MatcherConfig::overlay(),
            Profile::Popup => MatcherConfig::popup(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub search: SearchConfig,
    pub matcher: MatcherOverrides,
    pub extraction: ExtractionConfig,
    pub highlight: HighlightConfig,
    pub sources: SourcesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,
    pub profile: Profile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub max_results: usize,
    /// Characters required before matching; 0 disables the gate
    pub min_query_length: usize,
    pub primary_tier: PrimaryTier,
    pub url_substring_tier: bool,
}

/// Optional per-field overrides of the profile's matcher settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherOverrides {
    pub threshold: Option<f64>,
    pub ignore_location: Option<bool>,
    pub distance: Option<usize>,
    pub min_match_char_length: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub max_page_items: usize,
    pub min_text_length: usize,
    pub max_text_length: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub scroll_settle_ms: u64,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub history_days: u32,
    pub max_history: usize,
    pub recent_items: usize,
    pub recent_days: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            profile: Profile::Overlay,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 50,
            min_query_length: 2,
            primary_tier: PrimaryTier::TypePriority,
            url_substring_tier: false,
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_page_items: 200,
            min_text_length: 3,
            max_text_length: 300,
        }
    }
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            scroll_settle_ms: 300,
            duration_ms: 3000,
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            history_days: 30,
            max_history: 500,
            recent_items: 8,
            recent_days: 7,
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> PathBuf {
        config_dir().join("config.toml")
    }

    /// Load config from file, or return defaults if not found
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load config from `path`. Unreadable or malformed files yield defaults.
    pub fn load_from(path: &Path) -> Self {
        let mut config = if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config: {}", e);
                        Self::default()
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config: {}", e);
                    Self::default()
                }
            }
        } else {
            Self::default()
        };

        config.validate();
        config
    }

    /// Parse config text, propagating syntax errors.
    pub fn parse(content: &str) -> SpotlightResult<Self> {
        let mut config: Self = toml::from_str(content)?;
        config.validate();
        Ok(config)
    }

    /// Validate and clamp config values to acceptable ranges
    fn validate(&mut self) {
        self.search.max_results = self.search.max_results.clamp(1, 200);
        self.search.min_query_length = self.search.min_query_length.min(10);

        if let Some(threshold) = self.matcher.threshold.as_mut() {
            *threshold = threshold.clamp(0.0, 1.0);
        }
        if let Some(min_len) = self.matcher.min_match_char_length.as_mut() {
            *min_len = (*min_len).max(1);
        }

        let extraction = &mut self.extraction;
        extraction.max_page_items = extraction.max_page_items.clamp(1, 2000);
        extraction.min_text_length = extraction.min_text_length.max(1);
        extraction.max_text_length = extraction.max_text_length.max(extraction.min_text_length);

        self.highlight.scroll_settle_ms = self.highlight.scroll_settle_ms.min(5_000);
        self.highlight.duration_ms = self.highlight.duration_ms.clamp(100, 60_000);

        self.sources.history_days = self.sources.history_days.clamp(1, 365);
        self.sources.max_history = self.sources.max_history.clamp(1, 10_000);
        self.sources.recent_items = self.sources.recent_items.min(50);
        self.sources.recent_days = self.sources.recent_days.clamp(1, 90);
    }

    /// Save config to file
    pub fn save(&self) -> SpotlightResult<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> SpotlightResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| SpotlightError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content)?;
        Ok(())
    }

    /// Profile matcher settings with overrides applied.
    pub fn matcher_config(&self) -> MatcherConfig {
        let mut matcher = self.general.profile.matcher();
        if let Some(threshold) = self.matcher.threshold {
            matcher.threshold = threshold;
        }
        if let Some(ignore) = self.matcher.ignore_location {
            matcher.ignore_location = ignore;
        }
        if let Some(distance) = self.matcher.distance {
            matcher.distance = distance;
        }
        if let Some(min_len) = self.matcher.min_match_char_length {
            matcher.min_match_char_length = min_len;
        }
        matcher
    }

    pub fn ranker(&self, priority: TypePriority) -> Ranker {
        Ranker::new(self.search.primary_tier, priority)
            .with_max_results(self.search.max_results)
            .with_url_substring_tier(self.search.url_substring_tier)
    }

    pub fn min_query_gate(&self) -> Option<usize> {
        match self.search.min_query_length {
            0 => None,
            n => Some(n),
        }
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            max_items: self.extraction.max_page_items,
            min_text_len: self.extraction.min_text_length,
            max_text_len: self.extraction.max_text_length,
        }
    }

    pub fn history_window(&self) -> HistoryWindow {
        HistoryWindow {
            days: self.sources.history_days,
            max_results: self.sources.max_history,
        }
    }

    pub fn scroll_settle(&self) -> Duration {
        Duration::from_millis(self.highlight.scroll_settle_ms)
    }

    pub fn highlight_duration(&self) -> Duration {
        Duration::from_millis(self.highlight.duration_ms)
    }
}

/// Directory holding config.toml and settings.json
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| {
            dirs::home_dir()
                .map(|h| h.join(".config"))
                .unwrap_or_else(|| PathBuf::from("/tmp"))
        })
        .join("spotlight")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.search.max_results, 50);
        assert_eq!(config.min_query_gate(), Some(2));
        assert_eq!(config.general.profile, Profile::Overlay);
        assert_eq!(config.matcher_config(), MatcherConfig::overlay());
        assert_eq!(config.highlight_duration(), Duration::from_secs(3));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::parse(
            r#"
            [general]
            profile = "popup"

            [search]
            primary_tier = "site-affinity"
            min_query_length = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.general.profile, Profile::Popup);
        assert_eq!(config.search.primary_tier, PrimaryTier::SiteAffinity);
        assert_eq!(config.min_query_gate(), None);
        assert_eq!(config.search.max_results, 50);
        assert_eq!(config.extraction.max_page_items, 200);
        assert!(config.matcher_config().ignore_location);
    }

    #[test]
    fn test_matcher_overrides() {
        let config = Config::parse(
            r#"
            [matcher]
            threshold = 0.35
            distance = 40
            "#,
        )
        .unwrap();
        let matcher = config.matcher_config();
        assert_eq!(matcher.threshold, 0.35);
        assert_eq!(matcher.distance, 40);
        assert!(!matcher.ignore_location);
    }

    #[test]
    fn test_validate_clamps() {
        let config = Config::parse(
            r#"
            [search]
            max_results = 0

            [matcher]
            threshold = 4.0

            [extraction]
            min_text_length = 10
            max_text_length = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.search.max_results, 1);
        assert_eq!(config.matcher.threshold, Some(1.0));
        assert_eq!(config.extraction.max_text_length, 10);
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let dir = std::env::temp_dir().join(format!("spotlight-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        fs::write(&path, "[search\nmax_results = ").unwrap();

        let config = Config::load_from(&path);
        assert_eq!(config.search.max_results, 50);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_save_then_load() {
        let dir = std::env::temp_dir().join(format!("spotlight-save-{}", std::process::id()));
        let path = dir.join("config.toml");

        let mut config = Config::default();
        config.search.url_substring_tier = true;
        config.sources.recent_items = 3;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path);
        assert!(loaded.search.url_substring_tier);
        assert_eq!(loaded.sources.recent_items, 3);

        let _ = fs::remove_dir_all(&dir);
    }
}
