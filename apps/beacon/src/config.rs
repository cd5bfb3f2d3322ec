use std::env;
use std::path::PathBuf;

use dotenv::dotenv;

use crate::storage::DEFAULT_NAMESPACE;

pub const STORE_VAR: &str = "BEACON_STORE";
pub const NAMESPACE_VAR: &str = "BEACON_NAMESPACE";
pub const CATALOG_VAR: &str = "BEACON_CATALOG";
pub const LOG_VAR: &str = "BEACON_LOG";
pub const DEBUG_VAR: &str = "DEBUG";

const DEFAULT_STORE: &str = "beacon-store.json";
const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// JSON file holding the key-value substrate
    pub store_path: PathBuf,
    pub namespace: String,
    /// Catalog override; the built-in roster when `None`
    pub catalog_path: Option<PathBuf>,
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(DEFAULT_STORE),
            namespace: DEFAULT_NAMESPACE.to_string(),
            catalog_path: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl AppConfig {
    /// Load `.env`, then resolve every setting from the environment.
    pub fn from_env() -> Self {
        dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let set = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let log_filter = if set(DEBUG_VAR).is_some_and(|value| value != "0") {
            "debug".to_string()
        } else {
            set(LOG_VAR).unwrap_or(defaults.log_filter)
        };

        Self {
            store_path: set(STORE_VAR).map_or(defaults.store_path, PathBuf::from),
            namespace: lookup(NAMESPACE_VAR).unwrap_or(defaults.namespace),
            catalog_path: set(CATALOG_VAR).map(PathBuf::from),
            log_filter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn resolve(vars: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = resolve(&[]);
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.store_path, PathBuf::from("beacon-store.json"));
        assert_eq!(config.namespace, "techno-beacon-");
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = resolve(&[
            ("BEACON_STORE", "/tmp/beacon/state.json"),
            ("BEACON_NAMESPACE", ""),
            ("BEACON_CATALOG", "roster.json"),
            ("BEACON_LOG", "techno_beacon=info"),
        ]);
        assert_eq!(config.store_path, PathBuf::from("/tmp/beacon/state.json"));
        assert_eq!(config.namespace, "");
        assert_eq!(config.catalog_path, Some(PathBuf::from("roster.json")));
        assert_eq!(config.log_filter, "techno_beacon=info");
    }

    #[test]
    fn debug_flag_wins_over_log_filter() {
        let config = resolve(&[("DEBUG", "1"), ("BEACON_LOG", "error")]);
        assert_eq!(config.log_filter, "debug");

        let config = resolve(&[("DEBUG", "0"), ("BEACON_LOG", "error")]);
        assert_eq!(config.log_filter, "error");
    }
}
