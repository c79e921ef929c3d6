use serde::{Deserialize, Serialize};

use crate::cas::Options;
use crate::types::Result;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// General configuration
    #[serde(default)]
    pub general: GeneralConfig,

    /// Certificate authority backend selection
    #[serde(default)]
    pub authority: Options,
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Application name
    pub app_name: String,

    /// Log level
    pub log_level: String,

    /// Enable structured (JSON) logging
    pub structured_logging: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            app_name: "CAS Bridge".to_string(),
            log_level: "info".to_string(),
            structured_logging: false,
        }
    }
}

impl Settings {
    /// Load configuration from environment variables and configuration files
    pub fn load() -> Result<Self> {
        use config::{Config, Environment, File};
        use std::env;

        let mut builder = Config::builder();

        // Add default values
        builder = builder.add_source(Config::try_from(&Self::default())?);

        // Add configuration from files
        if let Ok(config_path) = env::var("CONFIG_FILE") {
            builder = builder.add_source(File::with_name(&config_path));
        } else {
            builder = builder.add_source(File::with_name("config/default").required(false));

            let env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
            builder = builder.add_source(File::with_name(&format!("config/{}", env)).required(false));
        }

        // e.g. CASB__AUTHORITY__PROJECT
        builder = builder.add_source(Environment::with_prefix("CASB").separator("__"));

        let config = builder.build()?;
        let settings: Settings = config.try_deserialize()?;

        Ok(settings)
    }

    /// Parse a YAML document
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}
