//! Settings for the command-line front end.
//!
//! Values are layered: built-in defaults, then the optional TOML file
//! (`config/tally.toml` unless `--config` says otherwise), then `TALLY_*`
//! environment variables, then command-line flags.

use chrono_tz::Tz;
use serde::Deserialize;

use crate::{
    cli::Cli,
    error::{AppError, Result},
};

const DEFAULT_CONFIG_PATH: &str = "config/tally.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding one JSON document per storage key.
    pub data_dir: String,
    /// IANA name used for month boundaries and entered dates.
    pub timezone: String,
    pub level: String,
    pub bcrypt_cost: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            timezone: "UTC".to_string(),
            level: "warn".to_string(),
            bcrypt_cost: 12,
        }
    }
}

impl Settings {
    pub fn load(cli: &Cli) -> Result<Self> {
        let config_path = cli.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
        let mut settings: Settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("TALLY"))
            .build()?
            .try_deserialize()?;

        if let Some(data_dir) = &cli.data_dir {
            settings.data_dir = data_dir.clone();
        }
        if let Some(timezone) = &cli.timezone {
            settings.timezone = timezone.clone();
        }
        if let Some(level) = &cli.level {
            settings.level = level.clone();
        }

        Ok(settings)
    }

    pub fn timezone(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| AppError::Timezone(self.timezone.clone()))
    }
}
