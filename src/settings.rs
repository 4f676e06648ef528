use std::path::Path;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::classify::ClassifierRules;
use crate::error::ConfigError;
use crate::parser::cards::LocatorSettings;

pub const DEFAULT_LISTING_URL: &str = "https://www.classaction.org/settlements";

/// Run settings: an optional TOML file, then `SUPABASE_URL` and
/// `SUPABASE_SERVICE_KEY` from the environment.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub url: Option<String>,
    pub service_key: Option<String>,
    pub listing_url: String,
    pub classifier: ClassifierRules,
    pub locator: LocatorSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            url: None,
            service_key: None,
            listing_url: DEFAULT_LISTING_URL.to_string(),
            classifier: ClassifierRules::default(),
            locator: LocatorSettings::default(),
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("SUPABASE"))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Store URL and key, both required for the hosted store.
    pub fn credentials(&self) -> Result<(&str, &str), ConfigError> {
        let url = non_empty(&self.url).ok_or(ConfigError::Missing("SUPABASE_URL"))?;
        let key = non_empty(&self.service_key).ok_or(ConfigError::Missing("SUPABASE_SERVICE_KEY"))?;
        Ok((url, key))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
