//! Test utilities and helpers for unit testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Seeders for raw rows (including legacy formats)
//! - Mock data factories anchored on a fixed clock

use crate::models::measurement::keys;
use crate::models::{ExerciseEntry, Intensity, MetricPoint, PersonalRecordEntry, Profile, WorkoutRecord};
use chrono::{DateTime, Duration, TimeZone, Utc};
use sqlx::SqlitePool;

pub const TEST_USER: &str = "user-1";

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database with all migrations applied
///
/// Uses max_connections(1) so every query sees the same in-memory database
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// Seed `count` workouts for `user_id`, one per day going back from now
/// Returns the IDs of created workouts
pub async fn seed_test_workouts(pool: &SqlitePool, user_id: &str, count: usize) -> Vec<i64> {
  let mut workout_ids = Vec::new();

  for i in 0..count {
    let date = crate::models::format_timestamp(&datetime_days_ago(i as i64));
    let duration = if i % 2 == 0 { "45 min" } else { "1 hr" };

    let result = sqlx::query(
      r#"
      INSERT INTO workouts (user_id, name, date, duration, intensity)
      VALUES (?1, ?2, ?3, ?4, ?5)
      "#,
    )
    .bind(user_id)
    .bind(format!("Workout {}", i + 1))
    .bind(date)
    .bind(duration)
    .bind("Medium")
    .execute(pool)
    .await
    .expect("Failed to insert test workout");

    workout_ids.push(result.last_insert_rowid());
  }

  workout_ids
}

/// Insert a workout row exactly as given, with a legacy exercise list
pub async fn seed_legacy_workout(pool: &SqlitePool, user_id: &str, date: &str, exercises_json: &str) -> i64 {
  sqlx::query(
    r#"
    INSERT INTO workouts (user_id, name, date, duration, intensity, legacy_exercises)
    VALUES (?1, 'Legacy Workout', ?2, '30 min', 'moderate', ?3)
    "#,
  )
  .bind(user_id)
  .bind(date)
  .bind(exercises_json)
  .execute(pool)
  .await
  .expect("Failed to insert legacy workout")
  .last_insert_rowid()
}

/// Insert (or replace) a profile
pub async fn seed_test_profile(pool: &SqlitePool, profile: &Profile) {
  crate::store::upsert_profile(pool, profile)
    .await
    .expect("Failed to seed profile");
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

/// Workout `days_ago` days before `fixed_now()` with two exercises
pub fn mock_workout(id: i64, days_ago: i64, duration: Option<&str>) -> WorkoutRecord {
  WorkoutRecord {
    id,
    name: format!("Workout {}", id),
    occurred_at: fixed_now() - Duration::days(days_ago),
    duration: duration.map(str::to_string),
    intensity: Some(Intensity::Medium),
    exercises: vec![
      ExerciseEntry {
        name: "Squats".to_string(),
        sets: Some("3".to_string()),
        reps: Some("10".to_string()),
        weight: Some("185 lbs".to_string()),
      },
      ExerciseEntry::named("Plank"),
    ],
    notes: None,
  }
}

/// Personal record achieved `days_ago` days before `fixed_now()`
pub fn mock_record(id: i64, exercise: &str, days_ago: i64) -> PersonalRecordEntry {
  PersonalRecordEntry {
    id,
    exercise: exercise.to_string(),
    value: "225 lbs".to_string(),
    previous_value: Some("215 lbs".to_string()),
    achieved_at: fixed_now() - Duration::days(days_ago),
  }
}

/// Metric point carrying only a weight value
pub fn mock_metric_point(days_ago: i64, weight: Option<f64>) -> MetricPoint {
  MetricPoint::new(fixed_now() - Duration::days(days_ago)).with(keys::WEIGHT, weight)
}

pub fn mock_profile(id: &str, reminder_enabled: bool, reminder_time: Option<&str>) -> Profile {
  Profile {
    id: id.to_string(),
    email: format!("{}@example.com", id),
    username: None,
    reminder_enabled,
    reminder_time: reminder_time.map(str::to_string),
  }
}

/// ---------------------------------------------------------------------------
/// Time Helpers
/// ---------------------------------------------------------------------------

/// Stable "now" for deterministic tests: 2024-03-15 12:00 UTC
pub fn fixed_now() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
}

/// Create a DateTime N days ago from the wall clock
pub fn datetime_days_ago(days: i64) -> DateTime<Utc> {
  Utc::now() - Duration::days(days)
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    let tables: Vec<(String,)> = sqlx::query_as(
      "SELECT name FROM sqlite_master WHERE type='table' AND name IN ('profiles', 'workouts', 'exercises', 'personal_records', 'exercise_progress', 'body_measurements')"
    )
    .fetch_all(&pool)
    .await
    .expect("Failed to query tables");

    assert_eq!(tables.len(), 6, "Expected 6 tables, got {}", tables.len());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_seed_workouts_returns_correct_count() {
    let pool = setup_test_db().await;

    let ids = seed_test_workouts(&pool, TEST_USER, 5).await;
    assert_eq!(ids.len(), 5);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workouts")
      .fetch_one(&pool)
      .await
      .expect("Failed to count workouts");

    assert_eq!(count, 5);

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_mock_factories_use_fixed_clock() {
    let workout = mock_workout(1, 2, Some("30 min"));
    assert_eq!(workout.occurred_at, Utc.with_ymd_and_hms(2024, 3, 13, 12, 0, 0).unwrap());
    assert_eq!(workout.exercises.len(), 2);

    let record = mock_record(1, "Squat", 0);
    assert_eq!(record.achieved_at, fixed_now());

    assert!(mock_metric_point(0, None).metrics.is_empty());
  }
}
