use chrono::Local;

use crate::charts::{build_chart_series, ChartSeries};
use crate::db::AppState;
use crate::models::measurement::keys;
use crate::models::{NewBodyMeasurement, NewExerciseProgress};
use crate::store;

fn ensure_metric(metric: &str, allowed: &[&str]) -> Result<(), String> {
  if allowed.contains(&metric) {
    Ok(())
  } else {
    Err(format!("Unknown metric: {}", metric))
  }
}

/// ---------------------------------------------------------------------------
/// Chart Queries
/// ---------------------------------------------------------------------------

/// Progress chart for one exercise (or all, when `exercise_id` is `None`)
pub async fn get_exercise_chart(
  state: &AppState,
  user_id: &str,
  exercise_id: Option<&str>,
  metric: &str,
  range: &str,
) -> Result<ChartSeries, String> {
  ensure_metric(metric, &keys::EXERCISE_METRICS)?;

  let points = store::fetch_exercise_progress(&state.db, user_id, exercise_id)
    .await
    .map_err(|e| format!("Failed to fetch exercise progress: {}", e))?;

  Ok(build_chart_series(&points, range, metric, &Local::now()))
}

pub async fn get_measurement_chart(
  state: &AppState,
  user_id: &str,
  metric: &str,
  range: &str,
) -> Result<ChartSeries, String> {
  ensure_metric(metric, &keys::BODY_METRICS)?;

  let points = store::fetch_body_measurements(&state.db, user_id)
    .await
    .map_err(|e| format!("Failed to fetch body measurements: {}", e))?;

  Ok(build_chart_series(&points, range, metric, &Local::now()))
}

/// ---------------------------------------------------------------------------
/// Chart Data Entry
/// ---------------------------------------------------------------------------

pub async fn log_exercise_progress(
  state: &AppState,
  user_id: &str,
  progress: NewExerciseProgress,
) -> Result<i64, String> {
  if progress.exercise_id.is_none() && progress.exercise_name.is_none() {
    return Err("Exercise id or name is required".to_string());
  }

  store::insert_exercise_progress(&state.db, user_id, &progress)
    .await
    .map_err(|e| format!("Failed to log exercise progress: {}", e))
}

pub async fn log_body_measurement(
  state: &AppState,
  user_id: &str,
  measurement: NewBodyMeasurement,
) -> Result<i64, String> {
  store::insert_body_measurement(&state.db, user_id, &measurement)
    .await
    .map_err(|e| format!("Failed to log body measurement: {}", e))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::charts::TimeRange;
  use crate::dashboard::DashboardSettings;
  use crate::test_utils::*;

  fn state(pool: sqlx::SqlitePool) -> AppState {
    AppState {
      db: pool,
      settings: DashboardSettings::default(),
    }
  }

  fn progress(exercise_id: &str, days_ago: i64, weight: f64) -> NewExerciseProgress {
    NewExerciseProgress {
      exercise_id: Some(exercise_id.to_string()),
      exercise_name: None,
      recorded_at: datetime_days_ago(days_ago),
      weight: Some(weight),
      reps: Some(5),
      sets: Some(3),
      notes: None,
    }
  }

  #[tokio::test]
  async fn test_exercise_chart_filters_window_and_exercise() {
    let pool = setup_test_db().await;
    let state = state(pool.clone());

    log_exercise_progress(&state, TEST_USER, progress("bench", 40, 135.0)).await.unwrap();
    log_exercise_progress(&state, TEST_USER, progress("bench", 10, 145.0)).await.unwrap();
    log_exercise_progress(&state, TEST_USER, progress("bench", 1, 150.0)).await.unwrap();
    log_exercise_progress(&state, TEST_USER, progress("squat", 1, 225.0)).await.unwrap();

    let series = get_exercise_chart(&state, TEST_USER, Some("bench"), keys::WEIGHT, "30days")
      .await
      .unwrap();

    assert_eq!(series.range, TimeRange::Last30Days);
    let values: Vec<_> = series.points.iter().map(|p| p.value).collect();
    assert_eq!(values, vec![Some(145.0), Some(150.0)]);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_measurement_chart_unknown_range_and_missing_values() {
    let pool = setup_test_db().await;
    let state = state(pool.clone());

    let with_waist = NewBodyMeasurement {
      recorded_at: datetime_days_ago(5),
      weight: Some(181.0),
      waist: Some(34.0),
      ..Default::default()
    };
    let weight_only = NewBodyMeasurement {
      recorded_at: datetime_days_ago(2),
      weight: Some(180.0),
      ..Default::default()
    };
    log_body_measurement(&state, TEST_USER, with_waist).await.unwrap();
    log_body_measurement(&state, TEST_USER, weight_only).await.unwrap();

    let series = get_measurement_chart(&state, TEST_USER, keys::WAIST, "fortnight")
      .await
      .unwrap();

    assert_eq!(series.range, TimeRange::Last30Days);
    assert_eq!(series.range_label, "Last 30 days");
    assert_eq!(series.metric_label, "Waist (in)");
    let values: Vec<_> = series.points.iter().map(|p| p.value).collect();
    assert_eq!(values, vec![Some(34.0), None]);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_charts_reject_metrics_of_the_other_kind() {
    let pool = setup_test_db().await;
    let state = state(pool.clone());

    let err = get_exercise_chart(&state, TEST_USER, None, keys::WAIST, "7days").await.unwrap_err();
    assert_eq!(err, "Unknown metric: waist");

    let err = get_measurement_chart(&state, TEST_USER, keys::REPS, "7days").await.unwrap_err();
    assert_eq!(err, "Unknown metric: reps");

    assert!(get_exercise_chart(&state, TEST_USER, None, keys::SETS, "7days").await.is_ok());
    assert!(get_measurement_chart(&state, TEST_USER, keys::THIGHS, "7days").await.is_ok());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_log_exercise_progress_requires_exercise() {
    let pool = setup_test_db().await;
    let state = state(pool.clone());

    let mut anonymous = progress("bench", 0, 100.0);
    anonymous.exercise_id = None;
    assert!(log_exercise_progress(&state, TEST_USER, anonymous).await.is_err());

    teardown_test_db(pool).await;
  }
}
