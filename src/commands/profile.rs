use crate::db::AppState;
use crate::models::Profile;
use crate::reminders::parse_reminder_time;
use crate::store;

pub async fn get_profile(state: &AppState, user_id: &str) -> Result<Profile, String> {
  store::fetch_profile(&state.db, user_id)
    .await
    .map_err(|e| format!("Failed to fetch profile: {}", e))
}

/// Turn reminders on/off and optionally change the time ("HH:MM" or "HH:MM:SS").
/// Times are stored as "HH:MM:SS".
pub async fn update_reminder_settings(
  state: &AppState,
  user_id: &str,
  enabled: bool,
  reminder_time: Option<&str>,
) -> Result<Profile, String> {
  let normalized = reminder_time
    .map(|raw| {
      parse_reminder_time(raw)
        .map(|t| t.format("%H:%M:%S").to_string())
        .ok_or_else(|| format!("Invalid reminder time: {}", raw))
    })
    .transpose()?;

  store::update_reminder_settings(&state.db, user_id, enabled, normalized.as_deref())
    .await
    .map_err(|e| format!("Failed to update reminder settings: {}", e))?;

  tracing::info!(user_id, enabled, reminder_time = ?normalized, "Updated reminder settings");

  get_profile(state, user_id).await
}
