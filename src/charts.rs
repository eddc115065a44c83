//! Time-windowed chart series for exercise progress and body measurements

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Months, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::models::measurement::keys;
use crate::models::MetricPoint;

/// Date label used on the chart's x axis ("Mar 01")
const LABEL_FORMAT: &str = "%b %d";

/// ---------------------------------------------------------------------------
/// Time Ranges
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeRange {
  #[serde(rename = "7days")]
  Last7Days,
  #[default]
  #[serde(rename = "30days")]
  Last30Days,
  #[serde(rename = "3months")]
  Last3Months,
  #[serde(rename = "6months")]
  Last6Months,
  #[serde(rename = "1year")]
  LastYear,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown time range: {0}")]
pub struct UnknownTimeRange(pub String);

impl TimeRange {
  pub const ALL: [TimeRange; 5] = [
    TimeRange::Last7Days,
    TimeRange::Last30Days,
    TimeRange::Last3Months,
    TimeRange::Last6Months,
    TimeRange::LastYear,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      TimeRange::Last7Days => "7days",
      TimeRange::Last30Days => "30days",
      TimeRange::Last3Months => "3months",
      TimeRange::Last6Months => "6months",
      TimeRange::LastYear => "1year",
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      TimeRange::Last7Days => "Last 7 days",
      TimeRange::Last30Days => "Last 30 days",
      TimeRange::Last3Months => "Last 3 months",
      TimeRange::Last6Months => "Last 6 months",
      TimeRange::LastYear => "Last year",
    }
  }

  /// Lenient parse: unknown tokens fall back to the 30-day default
  pub fn from_token(token: &str) -> Self {
    token.parse().unwrap_or_else(|e: UnknownTimeRange| {
      tracing::warn!("{}, using {}", e, TimeRange::default());
      TimeRange::default()
    })
  }

  /// Concrete window ending at `now`. Month ranges use calendar months.
  pub fn window<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> TimeWindow<Tz> {
    let start = match self {
      TimeRange::Last7Days => now.clone() - Duration::days(7),
      TimeRange::Last30Days => now.clone() - Duration::days(30),
      TimeRange::Last3Months => months_before(now, 3),
      TimeRange::Last6Months => months_before(now, 6),
      TimeRange::LastYear => months_before(now, 12),
    };

    TimeWindow {
      start,
      end: now.clone(),
    }
  }
}

fn months_before<Tz: TimeZone>(now: &DateTime<Tz>, months: u32) -> DateTime<Tz> {
  now
    .clone()
    .checked_sub_months(Months::new(months))
    .unwrap_or_else(|| now.clone() - Duration::days(30 * i64::from(months)))
}

impl FromStr for TimeRange {
  type Err = UnknownTimeRange;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    TimeRange::ALL
      .into_iter()
      .find(|r| r.as_str() == s.trim())
      .ok_or_else(|| UnknownTimeRange(s.to_string()))
  }
}

impl fmt::Display for TimeRange {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Inclusive `[start, end]` window
#[derive(Debug, Clone, PartialEq)]
pub struct TimeWindow<Tz: TimeZone> {
  pub start: DateTime<Tz>,
  pub end: DateTime<Tz>,
}

impl<Tz: TimeZone> TimeWindow<Tz> {
  pub fn contains(&self, at: &DateTime<Utc>) -> bool {
    *at >= self.start.with_timezone(&Utc) && *at <= self.end.with_timezone(&Utc)
  }
}

/// ---------------------------------------------------------------------------
/// Series
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
  pub label: String,
  /// `None` when the point has no value for the metric (distinct from zero)
  pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
  pub metric: String,
  pub metric_label: String,
  pub range: TimeRange,
  /// Display text for the range ("Last 30 days")
  pub range_label: String,
  pub points: Vec<ChartPoint>,
}

/// Axis label for a metric key; unknown keys are shown as-is
pub fn metric_label(key: &str) -> String {
  match key {
    keys::WEIGHT => "Weight (lbs)",
    keys::REPS => "Repetitions",
    keys::SETS => "Sets",
    keys::BODY_FAT_PERCENTAGE => "Body Fat %",
    keys::CHEST => "Chest (in)",
    keys::WAIST => "Waist (in)",
    keys::HIPS => "Hips (in)",
    keys::BICEPS => "Biceps (in)",
    keys::THIGHS => "Thighs (in)",
    other => other,
  }
  .to_string()
}

/// Selects, orders and projects points for one metric in one window.
///
/// Selection happens once in `new`; `iter` can be called any number of
/// times and always yields the same sequence.
pub struct SeriesBuilder<Tz: TimeZone> {
  entries: Vec<(DateTime<Utc>, Option<f64>)>,
  window: TimeWindow<Tz>,
}

impl<Tz: TimeZone> SeriesBuilder<Tz>
where
  Tz::Offset: fmt::Display,
{
  pub fn new(points: &[MetricPoint], window: TimeWindow<Tz>, metric: &str) -> Self {
    let mut entries: Vec<(DateTime<Utc>, Option<f64>)> = points
      .iter()
      .filter(|p| window.contains(&p.recorded_at))
      .map(|p| (p.recorded_at, p.get(metric)))
      .collect();

    entries.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| compare_values(a.1, b.1)));

    Self { entries, window }
  }

  pub fn iter(&self) -> impl Iterator<Item = ChartPoint> + '_ {
    let tz = self.window.end.timezone();
    self.entries.iter().map(move |(at, value)| ChartPoint {
      label: at.with_timezone(&tz).format(LABEL_FORMAT).to_string(),
      value: *value,
    })
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

fn compare_values(a: Option<f64>, b: Option<f64>) -> Ordering {
  match (a, b) {
    (Some(x), Some(y)) => x.total_cmp(&y),
    (None, Some(_)) => Ordering::Less,
    (Some(_), None) => Ordering::Greater,
    (None, None) => Ordering::Equal,
  }
}

/// Build a chart series for `metric_key` over the window named by `range_token`
pub fn build_chart_series<Tz>(
  points: &[MetricPoint],
  range_token: &str,
  metric_key: &str,
  now: &DateTime<Tz>,
) -> ChartSeries
where
  Tz: TimeZone,
  Tz::Offset: fmt::Display,
{
  let range = TimeRange::from_token(range_token);
  let builder = SeriesBuilder::new(points, range.window(now), metric_key);

  ChartSeries {
    metric: metric_key.to_string(),
    metric_label: metric_label(metric_key),
    range,
    range_label: range.label().to_string(),
    points: builder.iter().collect(),
  }
}
