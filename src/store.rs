//! SQLite-backed store for workouts, records, progress and profiles
//!
//! Every read returns ingested domain records for one user. Mutations are
//! plain inserts/deletes; derived values are never persisted.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::models::{
  format_timestamp, parse_timestamp, BodyMeasurementRow, ExerciseProgressRow, ExerciseRow, IngestError, MetricPoint,
  NewBodyMeasurement, NewExerciseProgress, NewPersonalRecord, NewWorkout, PersonalRecordEntry, PersonalRecordRow,
  Profile, WorkoutRecord, WorkoutRow,
};

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error(transparent)]
  Ingest(#[from] IngestError),

  #[error("Workout {0} not found")]
  WorkoutNotFound(i64),

  #[error("Personal record {0} not found")]
  RecordNotFound(i64),

  #[error("Profile {0} not found")]
  ProfileNotFound(String),
}

/// ---------------------------------------------------------------------------
/// Workouts
/// ---------------------------------------------------------------------------

/// All workouts for a user, most recent first, with their exercises
pub async fn fetch_workouts(pool: &SqlitePool, user_id: &str) -> Result<Vec<WorkoutRecord>, StoreError> {
  let rows: Vec<WorkoutRow> = sqlx::query_as(
    r#"
    SELECT id, user_id, name, date, duration, intensity, notes, legacy_exercises
    FROM workouts
    WHERE user_id = ?1
    ORDER BY date DESC, id DESC
    "#,
  )
  .bind(user_id)
  .fetch_all(pool)
  .await?;

  let exercise_rows: Vec<ExerciseRow> = sqlx::query_as(
    r#"
    SELECT e.id, e.workout_id, e.position, e.name, e.sets, e.reps, e.weight
    FROM exercises e
    JOIN workouts w ON w.id = e.workout_id
    WHERE w.user_id = ?1
    ORDER BY e.workout_id, e.position, e.id
    "#,
  )
  .bind(user_id)
  .fetch_all(pool)
  .await?;

  let mut by_workout: HashMap<i64, Vec<ExerciseRow>> = HashMap::new();
  for row in exercise_rows {
    by_workout.entry(row.workout_id).or_default().push(row);
  }

  let workouts = rows
    .into_iter()
    .map(|row| {
      let exercises = by_workout.remove(&row.id).unwrap_or_default();
      WorkoutRecord::from_rows(row, exercises)
    })
    .collect::<Result<Vec<_>, _>>()?;

  tracing::debug!(user_id, count = workouts.len(), "Fetched workouts");

  Ok(workouts)
}

/// Insert a workout and its exercises; returns the new workout id
pub async fn insert_workout(pool: &SqlitePool, user_id: &str, workout: &NewWorkout) -> Result<i64, StoreError> {
  let mut tx = pool.begin().await?;

  let result = sqlx::query(
    r#"
    INSERT INTO workouts (user_id, name, date, duration, intensity, notes)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    "#,
  )
  .bind(user_id)
  .bind(&workout.name)
  .bind(format_timestamp(&workout.occurred_at))
  .bind(&workout.duration)
  .bind(&workout.intensity)
  .bind(&workout.notes)
  .execute(&mut *tx)
  .await?;

  let workout_id = result.last_insert_rowid();

  for (position, exercise) in workout.exercises.iter().enumerate() {
    sqlx::query(
      r#"
      INSERT INTO exercises (workout_id, position, name, sets, reps, weight)
      VALUES (?1, ?2, ?3, ?4, ?5, ?6)
      "#,
    )
    .bind(workout_id)
    .bind(position as i64)
    .bind(&exercise.name)
    .bind(&exercise.sets)
    .bind(&exercise.reps)
    .bind(&exercise.weight)
    .execute(&mut *tx)
    .await?;
  }

  tx.commit().await?;

  tracing::info!(user_id, workout_id, exercises = workout.exercises.len(), "Logged workout");

  Ok(workout_id)
}

/// Delete a workout owned by `user_id`, exercises first
pub async fn delete_workout(pool: &SqlitePool, user_id: &str, workout_id: i64) -> Result<(), StoreError> {
  let mut tx = pool.begin().await?;

  sqlx::query(
    r#"
    DELETE FROM exercises
    WHERE workout_id IN (SELECT id FROM workouts WHERE id = ?1 AND user_id = ?2)
    "#,
  )
  .bind(workout_id)
  .bind(user_id)
  .execute(&mut *tx)
  .await?;

  let result = sqlx::query("DELETE FROM workouts WHERE id = ?1 AND user_id = ?2")
    .bind(workout_id)
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

  if result.rows_affected() == 0 {
    return Err(StoreError::WorkoutNotFound(workout_id));
  }

  tx.commit().await?;

  tracing::info!(user_id, workout_id, "Deleted workout");

  Ok(())
}

/// Whether the user logged any workout at or after `since`
pub async fn has_workout_since(pool: &SqlitePool, user_id: &str, since: DateTime<Utc>) -> Result<bool, StoreError> {
  // Dates are free-form ISO-8601 text, so compare after parsing rather than in SQL
  let rows: Vec<(i64, String)> = sqlx::query_as("SELECT id, date FROM workouts WHERE user_id = ?1")
    .bind(user_id)
    .fetch_all(pool)
    .await?;

  for (id, date) in rows {
    let occurred_at = parse_timestamp(&date).ok_or_else(|| IngestError::InvalidTimestamp {
      entity: "workout".to_string(),
      id,
      value: date.clone(),
    })?;
    if occurred_at >= since {
      return Ok(true);
    }
  }

  Ok(false)
}

/// ---------------------------------------------------------------------------
/// Personal Records
/// ---------------------------------------------------------------------------

pub async fn fetch_personal_records(pool: &SqlitePool, user_id: &str) -> Result<Vec<PersonalRecordEntry>, StoreError> {
  let rows: Vec<PersonalRecordRow> = sqlx::query_as(
    r#"
    SELECT id, user_id, exercise, value, previous_value, date
    FROM personal_records
    WHERE user_id = ?1
    ORDER BY date DESC, id DESC
    "#,
  )
  .bind(user_id)
  .fetch_all(pool)
  .await?;

  let records = rows
    .into_iter()
    .map(PersonalRecordEntry::try_from)
    .collect::<Result<Vec<_>, _>>()?;

  Ok(records)
}

pub async fn insert_personal_record(
  pool: &SqlitePool,
  user_id: &str,
  record: &NewPersonalRecord,
) -> Result<i64, StoreError> {
  let result = sqlx::query(
    r#"
    INSERT INTO personal_records (user_id, exercise, value, previous_value, date)
    VALUES (?1, ?2, ?3, ?4, ?5)
    "#,
  )
  .bind(user_id)
  .bind(&record.exercise)
  .bind(&record.value)
  .bind(&record.previous_value)
  .bind(format_timestamp(&record.achieved_at))
  .execute(pool)
  .await?;

  let record_id = result.last_insert_rowid();
  tracing::info!(user_id, record_id, exercise = %record.exercise, "Logged personal record");

  Ok(record_id)
}

pub async fn delete_personal_record(pool: &SqlitePool, user_id: &str, record_id: i64) -> Result<(), StoreError> {
  let result = sqlx::query("DELETE FROM personal_records WHERE id = ?1 AND user_id = ?2")
    .bind(record_id)
    .bind(user_id)
    .execute(pool)
    .await?;

  if result.rows_affected() == 0 {
    return Err(StoreError::RecordNotFound(record_id));
  }

  Ok(())
}

/// ---------------------------------------------------------------------------
/// Progress & Measurements
/// ---------------------------------------------------------------------------

/// Exercise progress points, optionally for a single exercise
pub async fn fetch_exercise_progress(
  pool: &SqlitePool,
  user_id: &str,
  exercise_id: Option<&str>,
) -> Result<Vec<MetricPoint>, StoreError> {
  let rows: Vec<ExerciseProgressRow> = sqlx::query_as(
    r#"
    SELECT id, user_id, exercise_id, exercise_name, date, weight, reps, sets
    FROM exercise_progress
    WHERE user_id = ?1 AND (?2 IS NULL OR exercise_id = ?2)
    "#,
  )
  .bind(user_id)
  .bind(exercise_id)
  .fetch_all(pool)
  .await?;

  let points = rows
    .iter()
    .map(MetricPoint::try_from)
    .collect::<Result<Vec<_>, _>>()?;

  Ok(points)
}

pub async fn insert_exercise_progress(
  pool: &SqlitePool,
  user_id: &str,
  progress: &NewExerciseProgress,
) -> Result<i64, StoreError> {
  let result = sqlx::query(
    r#"
    INSERT INTO exercise_progress (user_id, exercise_id, exercise_name, date, weight, reps, sets, notes)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
    "#,
  )
  .bind(user_id)
  .bind(&progress.exercise_id)
  .bind(&progress.exercise_name)
  .bind(format_timestamp(&progress.recorded_at))
  .bind(progress.weight)
  .bind(progress.reps)
  .bind(progress.sets)
  .bind(&progress.notes)
  .execute(pool)
  .await?;

  Ok(result.last_insert_rowid())
}

pub async fn fetch_body_measurements(pool: &SqlitePool, user_id: &str) -> Result<Vec<MetricPoint>, StoreError> {
  let rows: Vec<BodyMeasurementRow> = sqlx::query_as(
    r#"
    SELECT id, user_id, date, weight, body_fat_percentage, chest, waist, hips, biceps, thighs
    FROM body_measurements
    WHERE user_id = ?1
    "#,
  )
  .bind(user_id)
  .fetch_all(pool)
  .await?;

  let points = rows
    .iter()
    .map(MetricPoint::try_from)
    .collect::<Result<Vec<_>, _>>()?;

  Ok(points)
}

pub async fn insert_body_measurement(
  pool: &SqlitePool,
  user_id: &str,
  measurement: &NewBodyMeasurement,
) -> Result<i64, StoreError> {
  let result = sqlx::query(
    r#"
    INSERT INTO body_measurements (
      user_id, date, weight, body_fat_percentage, chest, waist, hips, biceps, thighs
    )
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
    "#,
  )
  .bind(user_id)
  .bind(format_timestamp(&measurement.recorded_at))
  .bind(measurement.weight)
  .bind(measurement.body_fat_percentage)
  .bind(measurement.chest)
  .bind(measurement.waist)
  .bind(measurement.hips)
  .bind(measurement.biceps)
  .bind(measurement.thighs)
  .execute(pool)
  .await?;

  Ok(result.last_insert_rowid())
}

/// ---------------------------------------------------------------------------
/// Profiles
/// ---------------------------------------------------------------------------

pub async fn fetch_profile(pool: &SqlitePool, user_id: &str) -> Result<Profile, StoreError> {
  sqlx::query_as::<_, Profile>(
    "SELECT id, email, username, reminder_enabled, reminder_time FROM profiles WHERE id = ?1",
  )
  .bind(user_id)
  .fetch_optional(pool)
  .await?
  .ok_or_else(|| StoreError::ProfileNotFound(user_id.to_string()))
}

pub async fn upsert_profile(pool: &SqlitePool, profile: &Profile) -> Result<(), StoreError> {
  sqlx::query(
    r#"
    INSERT INTO profiles (id, email, username, reminder_enabled, reminder_time)
    VALUES (?1, ?2, ?3, ?4, ?5)
    ON CONFLICT(id) DO UPDATE SET
      email = excluded.email,
      username = excluded.username,
      reminder_enabled = excluded.reminder_enabled,
      reminder_time = excluded.reminder_time,
      updated_at = CURRENT_TIMESTAMP
    "#,
  )
  .bind(&profile.id)
  .bind(&profile.email)
  .bind(&profile.username)
  .bind(profile.reminder_enabled)
  .bind(&profile.reminder_time)
  .execute(pool)
  .await?;

  Ok(())
}

pub async fn update_reminder_settings(
  pool: &SqlitePool,
  user_id: &str,
  enabled: bool,
  reminder_time: Option<&str>,
) -> Result<(), StoreError> {
  let result = sqlx::query(
    r#"
    UPDATE profiles SET
      reminder_enabled = ?1,
      reminder_time = COALESCE(?2, reminder_time),
      updated_at = CURRENT_TIMESTAMP
    WHERE id = ?3
    "#,
  )
  .bind(enabled)
  .bind(reminder_time)
  .bind(user_id)
  .execute(pool)
  .await?;

  if result.rows_affected() == 0 {
    return Err(StoreError::ProfileNotFound(user_id.to_string()));
  }

  Ok(())
}

/// Profiles that opted in to workout reminders
pub async fn fetch_reminder_profiles(pool: &SqlitePool) -> Result<Vec<Profile>, StoreError> {
  let profiles = sqlx::query_as::<_, Profile>(
    r#"
    SELECT id, email, username, reminder_enabled, reminder_time
    FROM profiles
    WHERE reminder_enabled = 1
    ORDER BY id
    "#,
  )
  .fetch_all(pool)
  .await?;

  Ok(profiles)
}
