//! Command facade
//!
//! Each command fetches a full snapshot from the store, runs the pure
//! aggregation over it and hands back a view-model. Mutations recompute the
//! dashboard afterwards and pass it to the caller's `on_change` callback.
//! Errors are flattened to strings at this boundary.

pub mod charts;
pub mod dashboard;
pub mod profile;

use chrono::{DateTime, TimeZone};

use crate::dashboard::{compute_dashboard_summary, DashboardSummary};
use crate::db::AppState;
use crate::store;

/// Fetch everything the dashboard needs and aggregate it
pub(crate) async fn load_dashboard_summary<Tz: TimeZone>(
  state: &AppState,
  user_id: &str,
  now: &DateTime<Tz>,
) -> Result<DashboardSummary, String> {
  let workouts = store::fetch_workouts(&state.db, user_id)
    .await
    .map_err(|e| format!("Failed to fetch workouts: {}", e))?;

  let records = store::fetch_personal_records(&state.db, user_id)
    .await
    .map_err(|e| format!("Failed to fetch personal records: {}", e))?;

  Ok(compute_dashboard_summary(&workouts, &records, now, &state.settings))
}

/// Recompute the dashboard after a mutation and notify the caller
pub(crate) async fn refresh<Tz, F>(state: &AppState, user_id: &str, now: &DateTime<Tz>, on_change: F) -> Result<(), String>
where
  Tz: TimeZone,
  F: FnOnce(&DashboardSummary),
{
  let summary = load_dashboard_summary(state, user_id, now).await?;
  on_change(&summary);
  Ok(())
}
