use std::path::PathBuf;

use serde::Deserialize;
use smart_default::SmartDefault;

use crate::errors::*;

/// Runtime configuration, deserialized from a TOML file.
#[derive(Debug, Clone, Deserialize, SmartDefault)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    #[default(51.5074)]
    pub latitude: f64,
    #[default(-0.1278)]
    pub longitude: f64,
    /// Human label for the location, used in logs; front-ends keep their own.
    #[default("London".into())]
    pub location: String,
    pub units: UnitSystem,
    /// Days of forecast to request from the provider.
    #[default(3)]
    pub forecast_days: u32,
    /// Seconds between fetch cycles.
    #[default(600)]
    pub interval: u64,
    /// Met Office DataHub API key. Enables the structured warnings source
    /// for UK locations; passed through as-is, never stored anywhere else.
    pub met_office_api_key: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, SmartDefault)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl Config {
    /// Read configuration from `path`.
    ///
    /// A path that exists is used as-is; otherwise the file is looked up
    /// under `$XDG_CONFIG_HOME/weatherwarn/`.
    pub fn load(path: &str) -> Result<Self> {
        let file = resolve(path)
            .ok_or_else(|| Error::config(format!("config file not found: {path}")))?;
        let contents = std::fs::read_to_string(&file)
            .map_err(|e| Error::config(format!("failed to read {}: {e}", file.display())))?;
        toml::from_str(&contents)
            .map_err(|e| Error::config(format!("failed to parse {}: {e}", file.display())))
    }
}

fn resolve(path: &str) -> Option<PathBuf> {
    let file = PathBuf::from(path);
    if file.exists() {
        return Some(file);
    }
    let xdg = dirs::config_dir()?.join("weatherwarn").join(path);
    xdg.exists().then_some(xdg)
}
