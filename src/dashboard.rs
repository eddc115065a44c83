//! Dashboard summary aggregation
//!
//! Derives the dashboard view-model from a full snapshot of a user's workouts
//! and personal records. Always recomputed from the whole snapshot; nothing
//! here is cached or patched incrementally.

use chrono::{DateTime, Months, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::duration::{format_minutes, parse_optional_duration, total_minutes};
use crate::models::{Intensity, PersonalRecordEntry, WorkoutRecord};
use crate::streak::{current_streak, StreakPolicy};

/// ---------------------------------------------------------------------------
/// Settings
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSettings {
  /// Records achieved within this many calendar months are flagged new
  pub recency_window_months: u32,
  pub streak: StreakPolicy,
  /// Length of the "recent activity" list
  pub recent_workouts_limit: usize,
}

impl Default for DashboardSettings {
  fn default() -> Self {
    Self {
      recency_window_months: 1,
      streak: StreakPolicy::default(),
      recent_workouts_limit: 5,
    }
  }
}

/// ---------------------------------------------------------------------------
/// Recency
/// ---------------------------------------------------------------------------

/// Whether a record counts as new: achieved on or after `now` minus the window
pub fn is_new_record<Tz: TimeZone>(achieved_at: DateTime<Utc>, now: &DateTime<Tz>, window_months: u32) -> bool {
  match now.clone().checked_sub_months(Months::new(window_months)) {
    Some(cutoff) => achieved_at >= cutoff.with_timezone(&Utc),
    None => true,
  }
}

/// ---------------------------------------------------------------------------
/// Summary
/// ---------------------------------------------------------------------------

/// Row of the "recent activity" list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentWorkout {
  pub id: i64,
  pub name: String,
  pub occurred_at: DateTime<Utc>,
  pub duration_minutes: u32,
  pub duration: String,
  pub intensity: Option<Intensity>,
  pub exercise_count: usize,
}

impl From<&WorkoutRecord> for RecentWorkout {
  fn from(w: &WorkoutRecord) -> Self {
    let minutes = parse_optional_duration(w.duration.as_deref());
    Self {
      id: w.id,
      name: w.name.clone(),
      occurred_at: w.occurred_at,
      duration_minutes: minutes,
      duration: format_minutes(minutes),
      intensity: w.intensity.clone(),
      exercise_count: w.exercises.len(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
  pub total_workouts: usize,
  pub total_minutes: u32,
  /// `total_minutes` formatted for display
  pub total_time: String,
  pub current_streak_days: u32,
  /// Records inside the recency window, most recent first
  pub new_records: Vec<PersonalRecordEntry>,
  /// Latest workouts, most recent first
  pub recent_workouts: Vec<RecentWorkout>,
}

impl DashboardSummary {
  pub fn new_record_count(&self) -> usize {
    self.new_records.len()
  }
}

/// Build the dashboard summary from a full snapshot.
///
/// Output does not depend on input order: lists are sorted by instant with
/// the id as tie-breaker.
pub fn compute_dashboard_summary<Tz: TimeZone>(
  workouts: &[WorkoutRecord],
  records: &[PersonalRecordEntry],
  now: &DateTime<Tz>,
  settings: &DashboardSettings,
) -> DashboardSummary {
  let total_minutes = total_minutes(workouts.iter().map(|w| w.duration.as_deref()));

  let current_streak_days = current_streak(workouts.iter().map(|w| w.occurred_at), now, &settings.streak);

  let mut new_records: Vec<PersonalRecordEntry> = records
    .iter()
    .filter(|r| is_new_record(r.achieved_at, now, settings.recency_window_months))
    .cloned()
    .collect();
  new_records.sort_by(|a, b| b.achieved_at.cmp(&a.achieved_at).then(a.id.cmp(&b.id)));

  let mut recent: Vec<&WorkoutRecord> = workouts.iter().collect();
  recent.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at).then(b.id.cmp(&a.id)));
  let recent_workouts = recent
    .into_iter()
    .take(settings.recent_workouts_limit)
    .map(RecentWorkout::from)
    .collect();

  DashboardSummary {
    total_workouts: workouts.len(),
    total_minutes,
    total_time: format_minutes(total_minutes),
    current_streak_days,
    new_records,
    recent_workouts,
  }
}
