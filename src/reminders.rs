//! Daily workout reminder job
//!
//! Users pick a reminder time on a 30-minute grid. Each run handles the slot
//! containing `now`: every opted-in user whose time falls in that slot and who
//! has not logged a workout since local midnight gets one email.

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Timelike, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::config::EmailConfig;
use crate::models::Profile;
use crate::store::{self, StoreError};

const SLOT_MINUTES: u32 = 30;
const SUBJECT: &str = "💪 Daily Workout Reminder";

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ReminderError {
  #[error("HTTP request failed: {0}")]
  Request(#[from] reqwest::Error),

  #[error("API error: {0}")]
  Api(String),

  #[error(transparent)]
  Store(#[from] StoreError),
}

impl Serialize for ReminderError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// Scheduling
/// ---------------------------------------------------------------------------

/// Default when a user enabled reminders without choosing a time
pub fn default_reminder_time() -> NaiveTime {
  NaiveTime::from_hms_opt(20, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Round a wall-clock time down to its 30-minute slot
pub fn reminder_slot(time: NaiveTime) -> NaiveTime {
  let minute = time.minute() - time.minute() % SLOT_MINUTES;
  NaiveTime::from_hms_opt(time.hour(), minute, 0).unwrap_or(NaiveTime::MIN)
}

/// Parse a stored reminder time ("HH:MM:SS" or "HH:MM")
pub fn parse_reminder_time(raw: &str) -> Option<NaiveTime> {
  let raw = raw.trim();
  NaiveTime::parse_from_str(raw, "%H:%M:%S")
    .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
    .ok()
}

/// Whether `profile` should be reminded in `slot`
pub fn is_due(profile: &Profile, slot: NaiveTime) -> bool {
  if !profile.reminder_enabled {
    return false;
  }

  let preferred = match profile.reminder_time.as_deref() {
    Some(raw) => match parse_reminder_time(raw) {
      Some(time) => time,
      None => {
        tracing::warn!(user_id = %profile.id, reminder_time = raw, "Unreadable reminder time, skipping");
        return false;
      }
    },
    None => default_reminder_time(),
  };

  reminder_slot(preferred) == slot
}

/// Local midnight of `now`'s day, as a UTC instant
pub fn start_of_day<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
  let midnight = now.date_naive().and_time(NaiveTime::MIN);
  match now.timezone().from_local_datetime(&midnight).earliest() {
    Some(local) => local.with_timezone(&Utc),
    // Midnight skipped by a DST change; fall back to elapsed time since it
    None => {
      let elapsed = Duration::seconds(i64::from(now.time().num_seconds_from_midnight()));
      now.with_timezone(&Utc) - elapsed
    }
  }
}

/// ---------------------------------------------------------------------------
/// Email
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReminderEmail {
  pub from: String,
  pub to: String,
  pub subject: String,
  pub html: String,
}

pub fn compose_reminder(profile: &Profile, from: &str, app_url: &url::Url) -> ReminderEmail {
  let name = html_escape::encode_text(profile.greeting_name());
  let link = html_escape::encode_double_quoted_attribute(app_url.as_str());

  let html = format!(
    r#"<div style="font-family: sans-serif; max-width: 600px; margin: 0 auto;">
  <h2>Hey {name}!</h2>
  <p>Just a friendly reminder to log your workout for today in FitTrack.</p>
  <p>Consistent tracking is key to achieving your fitness goals!</p>
  <div style="margin: 30px 0;">
    <a href="{link}" style="background-color: #3b82f6; color: white; padding: 10px 20px; text-decoration: none; border-radius: 5px; font-weight: bold;">Log Your Workout</a>
  </div>
  <p style="color: #666; font-size: 12px;">If you'd like to stop receiving these reminders, you can update your notification settings in your profile.</p>
</div>"#
  );

  ReminderEmail {
    from: from.to_string(),
    to: profile.email.clone(),
    subject: SUBJECT.to_string(),
    html,
  }
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
  id: Option<String>,
}

/// Client for a Resend-compatible `POST /emails` endpoint
pub struct EmailClient {
  http: Client,
  api_base: String,
  api_key: String,
}

impl EmailClient {
  pub fn new(config: &EmailConfig) -> Self {
    Self {
      http: Client::new(),
      api_base: config.api_base.as_str().trim_end_matches('/').to_string(),
      api_key: config.api_key.clone(),
    }
  }

  /// Send one email; returns the provider's message id when it gives one
  pub async fn send(&self, email: &ReminderEmail) -> Result<Option<String>, ReminderError> {
    let url = format!("{}/emails", self.api_base);

    let response = self
      .http
      .post(&url)
      .bearer_auth(&self.api_key)
      .json(email)
      .send()
      .await?;

    if !response.status().is_success() {
      let status = response.status();
      let error_text = response.text().await.unwrap_or_default();
      return Err(ReminderError::Api(format!("Email API error {}: {}", status, error_text)));
    }

    let body: SendEmailResponse = response.json().await?;
    Ok(body.id)
  }
}

/// ---------------------------------------------------------------------------
/// Job
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReminderFailure {
  pub user_id: String,
  pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReminderReport {
  /// Slot handled by this run ("HH:MM")
  pub slot: String,
  /// Opted-in users whose time fell in the slot
  pub checked: usize,
  /// Recipients that were sent a reminder
  pub reminders_sent: Vec<String>,
  pub errors: Vec<ReminderFailure>,
  pub message: String,
}

async fn remind_user(
  pool: &SqlitePool,
  client: &EmailClient,
  config: &EmailConfig,
  profile: &Profile,
  since: DateTime<Utc>,
) -> Result<bool, ReminderError> {
  if store::has_workout_since(pool, &profile.id, since).await? {
    tracing::debug!(user_id = %profile.id, "Workout already logged today");
    return Ok(false);
  }

  let email = compose_reminder(profile, &config.from, &config.app_url);
  let message_id = client.send(&email).await?;
  tracing::info!(user_id = %profile.id, ?message_id, "Sent workout reminder");

  Ok(true)
}

/// Run one pass of the reminder job for the slot containing `now`.
///
/// Failing to load profiles aborts the run; failures for a single user are
/// recorded in the report and the run continues.
pub async fn run_reminders<Tz: TimeZone>(
  pool: &SqlitePool,
  client: &EmailClient,
  config: &EmailConfig,
  now: &DateTime<Tz>,
) -> Result<ReminderReport, ReminderError> {
  let slot = reminder_slot(now.time());
  let since = start_of_day(now);

  let due: Vec<Profile> = store::fetch_reminder_profiles(pool)
    .await?
    .into_iter()
    .filter(|p| is_due(p, slot))
    .collect();

  tracing::info!(slot = %slot.format("%H:%M"), users = due.len(), "Found users due for a reminder");

  let mut reminders_sent = Vec::new();
  let mut errors = Vec::new();

  for profile in &due {
    match remind_user(pool, client, config, profile, since).await {
      Ok(true) => reminders_sent.push(profile.email.clone()),
      Ok(false) => {}
      Err(e) => {
        tracing::error!(user_id = %profile.id, error = %e, "Error processing user");
        errors.push(ReminderFailure {
          user_id: profile.id.clone(),
          error: e.to_string(),
        });
      }
    }
  }

  Ok(ReminderReport {
    slot: slot.format("%H:%M").to_string(),
    checked: due.len(),
    message: format!("Sent {} reminders", reminders_sent.len()),
    reminders_sent,
    errors,
  })
}
