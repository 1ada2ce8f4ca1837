//! Configuration loading for Citaflow.
//!
//! Configuration is resolved in layers: an optional `config/default.toml`
//! file, then environment variables prefixed with `APP` (double underscore as
//! the section separator, e.g. `APP_SERVER__PORT=9000`). A `.env` file is
//! honoured before the environment is read.

use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use tracing::debug;

pub mod models;

pub use models::{AppConfig, DatabaseConfig, SchedulingConfig, ServerConfig};

static DOTENV_LOADED: OnceCell<()> = OnceCell::new();

/// Load `.env` into the process environment exactly once.
pub fn ensure_dotenv_loaded() {
    DOTENV_LOADED.get_or_init(|| {
        if dotenv::dotenv().is_ok() {
            debug!("Loaded environment overrides from .env");
        }
    });
}

/// Load the application configuration.
///
/// Missing file sources are not an error; every field of [`AppConfig`] that
/// the scheduling engine depends on carries a serde default.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();
    let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "default".to_string());
    Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?
        .try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_the_scheduling_knobs() {
        let config = AppConfig::default();
        assert_eq!(config.scheduling.horizon_days, 90);
        assert_eq!(config.scheduling.default_pending_limit, 3);
        assert_eq!(config.scheduling.cancel_lead_hours, 24);
        assert_eq!(config.scheduling.attendance_code_length, 6);
        assert_eq!(config.scheduling.time_zone, "America/Mexico_City");
        assert!(config.database.is_none());
    }

    #[test]
    fn scheduling_config_deserializes_partial_input() {
        let parsed: SchedulingConfig =
            serde_json::from_str(r#"{"horizon_days": 14, "time_zone": "UTC"}"#).unwrap();
        assert_eq!(parsed.horizon_days, 14);
        assert_eq!(parsed.time_zone, "UTC");
        // Untouched fields fall back to the system defaults.
        assert_eq!(parsed.default_open_time, "08:30");
        assert_eq!(parsed.notes_max_len, 1000);
    }
}
