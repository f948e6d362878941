use crate::models::CanvasSize;

/// Application-level constants
pub const APP_NAME: &str = "uikit-harvest";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable toggling automatic persistence after each scrape.
pub const SAVE_TO_DB_ENV: &str = "SAVE_TO_DB";
/// Environment variable holding the template store connection string.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "uikit_harvest_lib=info,uikit_harvest=info,warn"
}

/// Settings for the convert-and-save pipeline.
///
/// Passed explicitly to [`crate::pipeline::TemplatePipeline::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestConfig {
    /// Persist converted templates after each scrape.
    pub persist_enabled: bool,
    /// Where the template store lives. Required whenever persistence runs.
    pub connection_string: Option<String>,
    /// Canvas used when a scraped record carries no viewport.
    pub default_canvas: CanvasSize,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            persist_enabled: false,
            connection_string: None,
            default_canvas: CanvasSize::DEFAULT,
        }
    }
}

impl HarvestConfig {
    /// Read `SAVE_TO_DB` and `DATABASE_URL` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key → value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            persist_enabled: lookup(SAVE_TO_DB_ENV).as_deref().is_some_and(parse_flag),
            connection_string: lookup(DATABASE_URL_ENV).filter(|s| !s.trim().is_empty()),
            ..Self::default()
        }
    }
}

/// `1`, `true`, `yes`, `on` (any case) are truthy; everything else is false.
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_do_not_persist() {
        let config = HarvestConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, HarvestConfig::default());
        assert!(!config.persist_enabled);
        assert!(config.connection_string.is_none());
    }

    #[test]
    fn reads_flag_and_url() {
        let config = HarvestConfig::from_lookup(lookup_from(&[
            ("SAVE_TO_DB", "True"),
            ("DATABASE_URL", "sqlite://templates.db"),
        ]));
        assert!(config.persist_enabled);
        assert_eq!(config.connection_string.as_deref(), Some("sqlite://templates.db"));
        assert_eq!(config.default_canvas, CanvasSize::DEFAULT);
    }

    #[test]
    fn blank_url_is_treated_as_absent() {
        let config = HarvestConfig::from_lookup(lookup_from(&[("DATABASE_URL", "  ")]));
        assert!(config.connection_string.is_none());
    }

    #[test]
    fn flag_parsing() {
        for v in ["1", "true", "YES", " on "] {
            assert!(parse_flag(v), "{v}");
        }
        for v in ["0", "false", "", "enabled"] {
            assert!(!parse_flag(v), "{v}");
        }
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }
}
