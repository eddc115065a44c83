pub mod measurement;
pub mod profile;
pub mod record;
pub mod workout;

pub use measurement::{BodyMeasurementRow, ExerciseProgressRow, MetricPoint, NewBodyMeasurement, NewExerciseProgress};
pub use profile::Profile;
pub use record::{NewPersonalRecord, PersonalRecordEntry, PersonalRecordRow};
pub use workout::{ExerciseEntry, ExerciseRow, Intensity, NewWorkout, RawExercise, WorkoutRecord, WorkoutRow};

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::Serialize;

/// ---------------------------------------------------------------------------
/// Ingestion Errors
/// ---------------------------------------------------------------------------

/// Raised when a stored row cannot be turned into a domain record.
///
/// Free-text fields never produce this; only timestamps do, because every
/// derived value is anchored on them.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum IngestError {
  #[error("Invalid timestamp '{value}' on {entity} {id}")]
  InvalidTimestamp {
    entity: String,
    id: i64,
    value: String,
  },
}

/// Parse an ISO-8601 timestamp as stored by the data layer.
///
/// Accepts RFC 3339, SQLite's `YYYY-MM-DD HH:MM:SS` (taken as UTC), the same
/// with a `T` separator, and bare dates (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
  let raw = raw.trim();

  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return Some(dt.with_timezone(&Utc));
  }

  if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%:z") {
    return Some(dt.with_timezone(&Utc));
  }

  for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
      return Some(naive.and_utc());
    }
  }

  NaiveDate::parse_from_str(raw, "%Y-%m-%d")
    .ok()
    .and_then(|d| d.and_hms_opt(0, 0, 0))
    .map(|naive| naive.and_utc())
}

/// Parse a row timestamp, attaching the row identity on failure
pub(crate) fn ingest_timestamp(entity: &str, id: i64, raw: &str) -> Result<DateTime<Utc>, IngestError> {
  parse_timestamp(raw).ok_or_else(|| IngestError::InvalidTimestamp {
    entity: entity.to_string(),
    id,
    value: raw.to_string(),
  })
}

/// Canonical storage format for timestamps written by this crate
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
  at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Trim free text, mapping blank input to `None`
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
  value
    .map(|v| v.trim().to_string())
    .filter(|v| !v.is_empty())
}
