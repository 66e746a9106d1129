use crate::error::app_error::AppError;
use chrono_tz::Tz;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    pub scheduling: SchedulingConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SchedulingConfig {
    /// IANA zone in which session dates and times are expressed.
    pub timezone: String,
    pub default_granularity_minutes: u32,
    /// How far before or after the scheduled start a session may be started.
    pub start_tolerance_minutes: u32,
    pub min_duration_minutes: u32,
    pub max_duration_minutes: u32,
    /// Reject bookings that fall outside the tutor's availability rules.
    pub enforce_availability: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub json_format: bool,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
            default_granularity_minutes: 30,
            start_tolerance_minutes: 15,
            min_duration_minutes: 15,
            max_duration_minutes: 240,
            enforce_availability: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl SchedulingConfig {
    pub fn tz(&self) -> Result<Tz, AppError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| AppError::InvalidInput(format!("Unknown timezone: {}", self.timezone)))
    }
}

impl Config {
    /// Load configuration from multiple sources in priority order:
    /// 1. Built-in defaults
    /// 2. Tutoring.toml (if present)
    /// 3. Environment variables prefixed with TUTORING_, nested with a double
    ///    underscore (e.g. TUTORING_SCHEDULING__START_TOLERANCE_MINUTES=10)
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    fn figment() -> Figment {
        let defaults = toml::to_string(&Config::default()).unwrap_or_default();

        Figment::new()
            .merge(Toml::string(&defaults))
            .merge(Toml::file("Tutoring.toml"))
            .merge(Env::prefixed("TUTORING_").split("__"))
    }
}
