use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ingest_timestamp, IngestError};

/// Metric keys shared by progress and measurement rows
pub mod keys {
  pub const WEIGHT: &str = "weight";
  pub const REPS: &str = "reps";
  pub const SETS: &str = "sets";
  pub const BODY_FAT_PERCENTAGE: &str = "body_fat_percentage";
  pub const CHEST: &str = "chest";
  pub const WAIST: &str = "waist";
  pub const HIPS: &str = "hips";
  pub const BICEPS: &str = "biceps";
  pub const THIGHS: &str = "thighs";

  pub const EXERCISE_METRICS: [&str; 3] = [WEIGHT, REPS, SETS];
  pub const BODY_METRICS: [&str; 7] = [WEIGHT, BODY_FAT_PERCENTAGE, CHEST, WAIST, HIPS, BICEPS, THIGHS];
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ExerciseProgressRow {
  pub id: i64,
  pub user_id: String,
  pub exercise_id: Option<String>,
  pub exercise_name: Option<String>,
  pub date: String,
  pub weight: Option<f64>,
  pub reps: Option<i64>,
  pub sets: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BodyMeasurementRow {
  pub id: i64,
  pub user_id: String,
  pub date: String,
  pub weight: Option<f64>,
  pub body_fat_percentage: Option<f64>,
  pub chest: Option<f64>,
  pub waist: Option<f64>,
  pub hips: Option<f64>,
  pub biceps: Option<f64>,
  pub thighs: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExerciseProgress {
  pub exercise_id: Option<String>,
  pub exercise_name: Option<String>,
  pub recorded_at: DateTime<Utc>,
  pub weight: Option<f64>,
  pub reps: Option<i64>,
  pub sets: Option<i64>,
  pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewBodyMeasurement {
  pub recorded_at: DateTime<Utc>,
  pub weight: Option<f64>,
  pub body_fat_percentage: Option<f64>,
  pub chest: Option<f64>,
  pub waist: Option<f64>,
  pub hips: Option<f64>,
  pub biceps: Option<f64>,
  pub thighs: Option<f64>,
}

/// ---------------------------------------------------------------------------
/// Metric Points
/// ---------------------------------------------------------------------------

/// A dated observation of one or more named metrics.
///
/// Only present, finite values are kept, so a missing key means "no data".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
  pub recorded_at: DateTime<Utc>,
  pub metrics: BTreeMap<String, f64>,
}

impl MetricPoint {
  pub fn new(recorded_at: DateTime<Utc>) -> Self {
    Self {
      recorded_at,
      metrics: BTreeMap::new(),
    }
  }

  /// Add a metric; absent or non-finite values are dropped
  pub fn with(mut self, key: &str, value: Option<f64>) -> Self {
    if let Some(v) = value.filter(|v| v.is_finite()) {
      self.metrics.insert(key.to_string(), v);
    }
    self
  }

  pub fn get(&self, key: &str) -> Option<f64> {
    self.metrics.get(key).copied()
  }
}

impl TryFrom<&ExerciseProgressRow> for MetricPoint {
  type Error = IngestError;

  fn try_from(row: &ExerciseProgressRow) -> Result<Self, Self::Error> {
    let recorded_at = ingest_timestamp("exercise progress", row.id, &row.date)?;
    Ok(
      MetricPoint::new(recorded_at)
        .with(keys::WEIGHT, row.weight)
        .with(keys::REPS, row.reps.map(|r| r as f64))
        .with(keys::SETS, row.sets.map(|s| s as f64)),
    )
  }
}

impl TryFrom<&BodyMeasurementRow> for MetricPoint {
  type Error = IngestError;

  fn try_from(row: &BodyMeasurementRow) -> Result<Self, Self::Error> {
    let recorded_at = ingest_timestamp("body measurement", row.id, &row.date)?;
    Ok(
      MetricPoint::new(recorded_at)
        .with(keys::WEIGHT, row.weight)
        .with(keys::BODY_FAT_PERCENTAGE, row.body_fat_percentage)
        .with(keys::CHEST, row.chest)
        .with(keys::WAIST, row.waist)
        .with(keys::HIPS, row.hips)
        .with(keys::BICEPS, row.biceps)
        .with(keys::THIGHS, row.thighs),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  #[test]
  fn test_progress_row_flattens_present_metrics() {
    let row = ExerciseProgressRow {
      id: 3,
      user_id: "user-1".to_string(),
      exercise_id: Some("bench".to_string()),
      exercise_name: Some("Bench Press".to_string()),
      date: "2024-03-01".to_string(),
      weight: Some(135.0),
      reps: Some(8),
      sets: None,
    };

    let point = MetricPoint::try_from(&row).unwrap();
    assert_eq!(point.recorded_at, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
    assert_eq!(point.get(keys::WEIGHT), Some(135.0));
    assert_eq!(point.get(keys::REPS), Some(8.0));
    assert_eq!(point.get(keys::SETS), None);
  }

  #[test]
  fn test_measurement_row_drops_non_finite_values() {
    let row = BodyMeasurementRow {
      id: 9,
      user_id: "user-1".to_string(),
      date: "2024-03-08 07:00:00".to_string(),
      weight: Some(178.0),
      body_fat_percentage: Some(f64::NAN),
      chest: None,
      waist: Some(33.5),
      hips: None,
      biceps: None,
      thighs: None,
    };

    let point = MetricPoint::try_from(&row).unwrap();
    assert_eq!(point.metrics.len(), 2);
    assert_eq!(point.get(keys::BODY_FAT_PERCENTAGE), None);
    assert_eq!(point.get(keys::WAIST), Some(33.5));
  }

  #[test]
  fn test_bad_measurement_date_is_rejected() {
    let row = BodyMeasurementRow {
      id: 4,
      user_id: "user-1".to_string(),
      date: "last tuesday".to_string(),
      weight: Some(178.0),
      body_fat_percentage: None,
      chest: None,
      waist: None,
      hips: None,
      biceps: None,
      thighs: None,
    };
    assert!(MetricPoint::try_from(&row).is_err());
  }
}
