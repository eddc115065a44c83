use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::{ingest_timestamp, non_blank, IngestError};

/// Workout row as stored, before ingestion
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WorkoutRow {
  pub id: i64,
  pub user_id: String,
  pub name: String,
  pub date: String,
  pub duration: Option<String>,
  pub intensity: Option<String>,
  pub notes: Option<String>,
  /// JSON array from older clients: plain names or detailed objects
  pub legacy_exercises: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ExerciseRow {
  pub id: i64,
  pub workout_id: i64,
  pub position: i64,
  pub name: String,
  pub sets: Option<String>,
  pub reps: Option<String>,
  pub weight: Option<String>,
}

/// ---------------------------------------------------------------------------
/// Exercises
/// ---------------------------------------------------------------------------

/// Exercise as it appears in legacy exercise lists.
///
/// Early workouts stored bare names; later ones stored objects whose
/// sets/reps/weight may be strings or numbers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawExercise {
  Named(String),
  Detailed {
    name: String,
    #[serde(default, deserialize_with = "free_text")]
    sets: Option<String>,
    #[serde(default, deserialize_with = "free_text")]
    reps: Option<String>,
    #[serde(default, deserialize_with = "free_text")]
    weight: Option<String>,
  },
}

fn free_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<Value>::deserialize(deserializer)?;
  Ok(match value {
    Some(Value::String(s)) => Some(s),
    Some(Value::Number(n)) => Some(n.to_string()),
    _ => None,
  })
}

/// Normalized exercise entry; sets/reps/weight stay free text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseEntry {
  pub name: String,
  pub sets: Option<String>,
  pub reps: Option<String>,
  pub weight: Option<String>,
}

impl ExerciseEntry {
  pub fn named(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      sets: None,
      reps: None,
      weight: None,
    }
  }
}

impl From<RawExercise> for ExerciseEntry {
  fn from(raw: RawExercise) -> Self {
    match raw {
      RawExercise::Named(name) => Self::named(name.trim()),
      RawExercise::Detailed {
        name,
        sets,
        reps,
        weight,
      } => Self {
        name: name.trim().to_string(),
        sets: non_blank(sets),
        reps: non_blank(reps),
        weight: non_blank(weight),
      },
    }
  }
}

impl From<ExerciseRow> for ExerciseEntry {
  fn from(row: ExerciseRow) -> Self {
    Self {
      name: row.name.trim().to_string(),
      sets: non_blank(row.sets),
      reps: non_blank(row.reps),
      weight: non_blank(row.weight),
    }
  }
}

/// Decode a legacy exercise list. Anything unreadable yields no exercises.
pub fn parse_legacy_exercises(json: &str) -> Vec<ExerciseEntry> {
  match serde_json::from_str::<Vec<RawExercise>>(json) {
    Ok(raw) => raw
      .into_iter()
      .map(ExerciseEntry::from)
      .filter(|e| !e.name.is_empty())
      .collect(),
    Err(e) => {
      tracing::warn!("Ignoring unreadable legacy exercise list: {}", e);
      Vec::new()
    }
  }
}

/// ---------------------------------------------------------------------------
/// Intensity
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Intensity {
  Low,
  Medium,
  High,
  Other(String),
}

impl Intensity {
  /// Classify a free-text intensity label
  pub fn from_label(label: &str) -> Option<Self> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
      return None;
    }

    Some(match trimmed.to_lowercase().as_str() {
      "low" | "easy" | "light" => Intensity::Low,
      "medium" | "moderate" => Intensity::Medium,
      "high" | "very high" | "hard" => Intensity::High,
      _ => Intensity::Other(trimmed.to_string()),
    })
  }

  pub fn as_str(&self) -> &str {
    match self {
      Intensity::Low => "low",
      Intensity::Medium => "medium",
      Intensity::High => "high",
      Intensity::Other(label) => label,
    }
  }
}

impl From<Intensity> for String {
  fn from(intensity: Intensity) -> Self {
    intensity.as_str().to_string()
  }
}

impl From<String> for Intensity {
  fn from(label: String) -> Self {
    Intensity::from_label(&label).unwrap_or(Intensity::Other(label))
  }
}

/// ---------------------------------------------------------------------------
/// Workout Records
/// ---------------------------------------------------------------------------

/// A logged workout after ingestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRecord {
  pub id: i64,
  pub name: String,
  pub occurred_at: DateTime<Utc>,
  pub duration: Option<String>,
  pub intensity: Option<Intensity>,
  pub exercises: Vec<ExerciseEntry>,
  pub notes: Option<String>,
}

impl WorkoutRecord {
  /// Build a record from its row and child exercise rows.
  ///
  /// Structured exercise rows win; the legacy JSON list is only consulted
  /// when a workout has none.
  pub fn from_rows(row: WorkoutRow, mut exercise_rows: Vec<ExerciseRow>) -> Result<Self, IngestError> {
    let occurred_at = ingest_timestamp("workout", row.id, &row.date)?;

    let exercises = if exercise_rows.is_empty() {
      row
        .legacy_exercises
        .as_deref()
        .map(parse_legacy_exercises)
        .unwrap_or_default()
    } else {
      exercise_rows.sort_by_key(|e| (e.position, e.id));
      exercise_rows.into_iter().map(ExerciseEntry::from).collect()
    };

    Ok(Self {
      id: row.id,
      name: row.name,
      occurred_at,
      duration: non_blank(row.duration),
      intensity: row.intensity.as_deref().and_then(Intensity::from_label),
      exercises,
      notes: non_blank(row.notes),
    })
  }
}

/// For logging a new workout (without id)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWorkout {
  pub name: String,
  pub occurred_at: DateTime<Utc>,
  pub duration: Option<String>,
  pub intensity: Option<String>,
  #[serde(default)]
  pub exercises: Vec<ExerciseEntry>,
  pub notes: Option<String>,
}
