//! Process configuration from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `HOST` | `0.0.0.0` |
//! | `PORT` | `8080` |
//! | `DATABASE_URL` | `sqlite://data.sqlite3` |
//! | `THIRD_PLACE_MATCH` | off (`1`/`true`/`yes` turns it on) |
//!
//! Unparseable values fall back to the default.

use crate::logic::ProgressionOptions;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub third_place_match: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 8080,
            database_url: "sqlite://data.sqlite3".to_owned(),
            third_place_match: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the environment, or a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("HOST")
                .filter(|h| !h.trim().is_empty())
                .unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(defaults.port),
            database_url: lookup("DATABASE_URL")
                .filter(|u| !u.trim().is_empty())
                .unwrap_or(defaults.database_url),
            third_place_match: lookup("THIRD_PLACE_MATCH")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.third_place_match),
        }
    }

    pub fn progression(&self) -> ProgressionOptions {
        ProgressionOptions {
            third_place_match: self.third_place_match,
        }
    }
}
