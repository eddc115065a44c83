use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ingest_timestamp, non_blank, IngestError};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PersonalRecordRow {
  pub id: i64,
  pub user_id: String,
  pub exercise: String,
  pub value: String,
  pub previous_value: Option<String>,
  pub date: String,
}

/// A personal record; achieved and previous values are free text ("225 lbs", "22:15")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalRecordEntry {
  pub id: i64,
  pub exercise: String,
  pub value: String,
  pub previous_value: Option<String>,
  pub achieved_at: DateTime<Utc>,
}

impl TryFrom<PersonalRecordRow> for PersonalRecordEntry {
  type Error = IngestError;

  fn try_from(row: PersonalRecordRow) -> Result<Self, Self::Error> {
    let achieved_at = ingest_timestamp("personal record", row.id, &row.date)?;
    Ok(Self {
      id: row.id,
      exercise: row.exercise,
      value: row.value,
      previous_value: non_blank(row.previous_value),
      achieved_at,
    })
  }
}

/// For inserting new personal records (without id)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPersonalRecord {
  pub exercise: String,
  pub value: String,
  pub previous_value: Option<String>,
  pub achieved_at: DateTime<Utc>,
}
