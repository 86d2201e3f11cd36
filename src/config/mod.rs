use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::models::WeekStart;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub calendar: CalendarConfig,
    pub merge_cache: MergeCacheConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalendarConfig {
    pub week_start: WeekStart,
    /// Minutes east of UTC used when no offset is given per call
    pub timezone_offset_minutes: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeCacheConfig {
    pub enabled: bool,
    #[serde(default = "MergeCacheConfig::default_max_entries")]
    pub max_entries: u64,
    #[serde(default = "MergeCacheConfig::default_ttl_secs")]
    pub ttl_secs: u64,
}

impl MergeCacheConfig {
    const fn default_max_entries() -> u64 {
        256
    }

    const fn default_ttl_secs() -> u64 {
        300
    }
}

impl Default for MergeCacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_entries: Self::default_max_entries(),
            ttl_secs: Self::default_ttl_secs(),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let week_start = match lookup("STATCHART_WEEK_START")
            .unwrap_or_else(|| "monday".to_string())
            .to_lowercase()
            .as_str()
        {
            "monday" => WeekStart::Monday,
            "sunday" => WeekStart::Sunday,
            other => {
                tracing::warn!(
                    "Unknown STATCHART_WEEK_START '{other}', falling back to 'monday'. Supported values: monday, sunday"
                );
                WeekStart::Monday
            }
        };

        let timezone_offset_minutes = lookup("STATCHART_TZ_OFFSET_MINUTES")
            .unwrap_or_else(|| "0".to_string())
            .parse::<i32>()
            .context("STATCHART_TZ_OFFSET_MINUTES must be an integer number of minutes")?;

        let enabled = lookup("STATCHART_MERGE_CACHE")
            .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(false);

        let max_entries = lookup("STATCHART_MERGE_CACHE_MAX_ENTRIES")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or_else(MergeCacheConfig::default_max_entries);

        let ttl_secs = lookup("STATCHART_MERGE_CACHE_TTL_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or_else(MergeCacheConfig::default_ttl_secs);

        Ok(Config {
            calendar: CalendarConfig {
                week_start,
                timezone_offset_minutes,
            },
            merge_cache: MergeCacheConfig {
                enabled,
                max_entries,
                ttl_secs,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.calendar.week_start, WeekStart::Monday);
        assert_eq!(config.calendar.timezone_offset_minutes, 0);
        assert!(!config.merge_cache.enabled);
        assert_eq!(config.merge_cache.max_entries, 256);
        assert_eq!(config.merge_cache.ttl_secs, 300);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("STATCHART_WEEK_START", "Sunday"),
            ("STATCHART_TZ_OFFSET_MINUTES", "-300"),
            ("STATCHART_MERGE_CACHE", "yes"),
            ("STATCHART_MERGE_CACHE_MAX_ENTRIES", "16"),
        ])
        .unwrap();

        assert_eq!(config.calendar.week_start, WeekStart::Sunday);
        assert_eq!(config.calendar.timezone_offset_minutes, -300);
        assert!(config.merge_cache.enabled);
        assert_eq!(config.merge_cache.max_entries, 16);
    }

    #[test]
    fn test_unknown_week_start_falls_back() {
        let config = config_from(&[("STATCHART_WEEK_START", "friday")]).unwrap();
        assert_eq!(config.calendar.week_start, WeekStart::Monday);
    }

    #[test]
    fn test_bad_offset_is_an_error() {
        assert!(config_from(&[("STATCHART_TZ_OFFSET_MINUTES", "east")]).is_err());
    }
}
