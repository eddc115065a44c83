use chrono::Local;

use super::{load_dashboard_summary, refresh};
use crate::dashboard::DashboardSummary;
use crate::db::AppState;
use crate::models::{NewPersonalRecord, NewWorkout};
use crate::store;

/// ---------------------------------------------------------------------------
/// Queries
/// ---------------------------------------------------------------------------

pub async fn get_dashboard_summary(state: &AppState, user_id: &str) -> Result<DashboardSummary, String> {
  load_dashboard_summary(state, user_id, &Local::now()).await
}

/// ---------------------------------------------------------------------------
/// Workouts
/// ---------------------------------------------------------------------------

/// Log a workout; returns its id
pub async fn log_workout<F>(
  state: &AppState,
  user_id: &str,
  workout: NewWorkout,
  on_change: F,
) -> Result<i64, String>
where
  F: FnOnce(&DashboardSummary),
{
  if workout.name.trim().is_empty() {
    return Err("Workout name is required".to_string());
  }

  let id = store::insert_workout(&state.db, user_id, &workout)
    .await
    .map_err(|e| format!("Failed to log workout: {}", e))?;

  refresh(state, user_id, &Local::now(), on_change).await?;

  Ok(id)
}

pub async fn delete_workout<F>(state: &AppState, user_id: &str, workout_id: i64, on_change: F) -> Result<(), String>
where
  F: FnOnce(&DashboardSummary),
{
  store::delete_workout(&state.db, user_id, workout_id)
    .await
    .map_err(|e| format!("Failed to delete workout: {}", e))?;

  refresh(state, user_id, &Local::now(), on_change).await
}

/// ---------------------------------------------------------------------------
/// Personal Records
/// ---------------------------------------------------------------------------

pub async fn log_personal_record<F>(
  state: &AppState,
  user_id: &str,
  record: NewPersonalRecord,
  on_change: F,
) -> Result<i64, String>
where
  F: FnOnce(&DashboardSummary),
{
  if record.exercise.trim().is_empty() || record.value.trim().is_empty() {
    return Err("Exercise and value are required".to_string());
  }

  let id = store::insert_personal_record(&state.db, user_id, &record)
    .await
    .map_err(|e| format!("Failed to log personal record: {}", e))?;

  refresh(state, user_id, &Local::now(), on_change).await?;

  Ok(id)
}

pub async fn delete_personal_record<F>(
  state: &AppState,
  user_id: &str,
  record_id: i64,
  on_change: F,
) -> Result<(), String>
where
  F: FnOnce(&DashboardSummary),
{
  store::delete_personal_record(&state.db, user_id, record_id)
    .await
    .map_err(|e| format!("Failed to delete personal record: {}", e))?;

  refresh(state, user_id, &Local::now(), on_change).await
}
