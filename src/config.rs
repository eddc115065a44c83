//! Environment-driven configuration
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file by the binary via `dotenvy`.

use std::env;

use serde::Serialize;
use url::Url;

use crate::dashboard::DashboardSettings;
use crate::streak::StreakPolicy;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://fittrack.db?mode=rwc";
pub const DEFAULT_EMAIL_API_BASE: &str = "https://api.resend.com";
pub const DEFAULT_EMAIL_FROM: &str = "FitTrack <notifications@fittrack.app>";
pub const DEFAULT_APP_URL: &str = "http://localhost:5173";

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum ConfigError {
  #[error("Missing configuration: {0}")]
  MissingConfig(String),

  #[error("Invalid configuration for {name}: {reason}")]
  Invalid { name: String, reason: String },
}

/// Optional variable; unset and blank both mean "use the default"
fn optional_var(name: &str) -> Option<String> {
  env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn required_var(name: &str) -> Result<String, ConfigError> {
  optional_var(name).ok_or_else(|| ConfigError::MissingConfig(name.into()))
}

fn parse_var<T>(name: &str) -> Result<Option<T>, ConfigError>
where
  T: std::str::FromStr,
  T::Err: std::fmt::Display,
{
  optional_var(name)
    .map(|raw| {
      raw.parse::<T>().map_err(|e| ConfigError::Invalid {
        name: name.into(),
        reason: e.to_string(),
      })
    })
    .transpose()
}

fn url_var(name: &str, default: &str) -> Result<Url, ConfigError> {
  let raw = optional_var(name).unwrap_or_else(|| default.to_string());
  Url::parse(&raw).map_err(|e| ConfigError::Invalid {
    name: name.into(),
    reason: e.to_string(),
  })
}

/// ---------------------------------------------------------------------------
/// App Configuration
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
  pub database_url: String,
  pub recency_window_months: Option<u32>,
  pub streak_grace_days: Option<u32>,
  pub streak_lookback_days: Option<u32>,
}

impl AppConfig {
  pub fn from_env() -> Result<Self, ConfigError> {
    Ok(Self {
      database_url: optional_var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
      recency_window_months: parse_var("FITTRACK_RECENCY_MONTHS")?,
      streak_grace_days: parse_var("FITTRACK_STREAK_GRACE_DAYS")?,
      streak_lookback_days: parse_var("FITTRACK_STREAK_LOOKBACK_DAYS")?,
    })
  }

  /// Dashboard settings with any overrides applied over the defaults
  pub fn dashboard_settings(&self) -> DashboardSettings {
    let defaults = DashboardSettings::default();
    DashboardSettings {
      recency_window_months: self.recency_window_months.unwrap_or(defaults.recency_window_months),
      streak: StreakPolicy {
        grace_days: self.streak_grace_days.unwrap_or(defaults.streak.grace_days),
        max_lookback_days: self.streak_lookback_days.unwrap_or(defaults.streak.max_lookback_days),
      },
      ..defaults
    }
  }
}

/// ---------------------------------------------------------------------------
/// Email Configuration
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct EmailConfig {
  pub api_key: String,
  pub api_base: Url,
  pub from: String,
  /// Linked from reminder emails
  pub app_url: Url,
}

impl EmailConfig {
  pub fn from_env() -> Result<Self, ConfigError> {
    Ok(Self {
      api_key: required_var("RESEND_API_KEY")?,
      api_base: url_var("EMAIL_API_BASE", DEFAULT_EMAIL_API_BASE)?,
      from: optional_var("EMAIL_FROM").unwrap_or_else(|| DEFAULT_EMAIL_FROM.to_string()),
      app_url: url_var("APP_URL", DEFAULT_APP_URL)?,
    })
  }
}
