// --- File: crates/citaflow_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

// --- Database Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // e.g., DATABASE_URL loaded via APP_DATABASE__URL or DATABASE_URL
}

// --- Scheduling Config ---
// Every knob the scheduling engine needs. All fields have serde defaults so a
// minimal config file (or none at all) still yields a working engine.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SchedulingConfig {
    /// IANA timezone name the offices operate in (e.g. "America/Mexico_City").
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
    /// How many calendar days forward to offer bookable days.
    #[serde(default = "default_horizon_days")]
    pub horizon_days: u32,
    /// System-wide limit of simultaneously PENDING appointments per client.
    /// A client row may override this upward, never downward.
    #[serde(default = "default_pending_limit")]
    pub default_pending_limit: u32,
    /// Office opening time used when a service defines no window, "HH:MM".
    #[serde(default = "default_open_time")]
    pub default_open_time: String,
    /// Office closing time used when a service defines no window, "HH:MM".
    #[serde(default = "default_close_time")]
    pub default_close_time: String,
    /// Hours before the appointment start after which it can no longer be
    /// cancelled (before business-day adjustment).
    #[serde(default = "default_cancel_lead_hours")]
    pub cancel_lead_hours: u32,
    /// Number of digits in the generated attendance code.
    #[serde(default = "default_attendance_code_length")]
    pub attendance_code_length: usize,
    /// Maximum length of the free-text notes on an appointment.
    #[serde(default = "default_notes_max_len")]
    pub notes_max_len: usize,
}

fn default_time_zone() -> String {
    "America/Mexico_City".to_string()
}

fn default_horizon_days() -> u32 {
    90
}

fn default_pending_limit() -> u32 {
    3
}

fn default_open_time() -> String {
    "08:30".to_string()
}

fn default_close_time() -> String {
    "16:30".to_string()
}

fn default_cancel_lead_hours() -> u32 {
    24
}

fn default_attendance_code_length() -> usize {
    6
}

fn default_notes_max_len() -> usize {
    1000
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            time_zone: default_time_zone(),
            horizon_days: default_horizon_days(),
            default_pending_limit: default_pending_limit(),
            default_open_time: default_open_time(),
            default_close_time: default_close_time(),
            cancel_lead_hours: default_cancel_lead_hours(),
            attendance_code_length: default_attendance_code_length(),
            notes_max_len: default_notes_max_len(),
        }
    }
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    // Database config is optional: without it the backend runs on the
    // in-memory store (useful for local development and tests).
    pub database: Option<DatabaseConfig>,

    #[serde(default)]
    pub scheduling: SchedulingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: None,
            scheduling: SchedulingConfig::default(),
        }
    }
}
