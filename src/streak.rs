//! Consecutive-day activity streaks
//!
//! A streak counts calendar days with at least one workout, ending today or
//! (within the grace period) yesterday. Days are taken in the time zone of
//! the supplied `now`, so callers decide what "today" means.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakPolicy {
  /// How many days may separate today from the latest active day (1 = yesterday)
  pub grace_days: u32,
  /// Maximum days walked backwards from the latest active day
  pub max_lookback_days: u32,
}

impl Default for StreakPolicy {
  fn default() -> Self {
    Self {
      grace_days: 1,
      max_lookback_days: 365,
    }
  }
}

/// Normalize instants to distinct calendar days in `tz`
pub fn active_days<I, Tz>(instants: I, tz: &Tz) -> HashSet<NaiveDate>
where
  I: IntoIterator<Item = DateTime<Utc>>,
  Tz: TimeZone,
{
  instants
    .into_iter()
    .map(|at| at.with_timezone(tz).date_naive())
    .collect()
}

/// Current streak length in days.
///
/// Zero when there is no activity, or when the latest active day is neither
/// today nor inside the grace period (a future-dated latest day also counts
/// as outside it).
pub fn current_streak<I, Tz>(instants: I, now: &DateTime<Tz>, policy: &StreakPolicy) -> u32
where
  I: IntoIterator<Item = DateTime<Utc>>,
  Tz: TimeZone,
{
  let days = active_days(instants, &now.timezone());

  let Some(latest) = days.iter().max().copied() else {
    return 0;
  };

  let today = now.date_naive();
  let days_since = today.signed_duration_since(latest).num_days();
  if days_since < 0 || days_since > i64::from(policy.grace_days) {
    return 0;
  }

  let mut streak = 1;
  let mut day = latest;
  for _ in 0..policy.max_lookback_days {
    match day.pred_opt() {
      Some(prev) if days.contains(&prev) => {
        streak += 1;
        day = prev;
      }
      _ => break,
    }
  }

  streak
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::{Duration, FixedOffset};

  fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 18, 0, 0).unwrap()
  }

  fn days_ago(days: i64) -> DateTime<Utc> {
    now() - Duration::days(days)
  }

  fn streak(instants: Vec<DateTime<Utc>>) -> u32 {
    current_streak(instants, &now(), &StreakPolicy::default())
  }

  #[test]
  fn test_empty_is_zero() {
    assert_eq!(streak(vec![]), 0);
  }

  #[test]
  fn test_three_consecutive_days() {
    assert_eq!(streak(vec![days_ago(0), days_ago(1), days_ago(2)]), 3);
  }

  #[test]
  fn test_gap_stops_streak() {
    assert_eq!(streak(vec![days_ago(0), days_ago(3)]), 1);
  }

  #[test]
  fn test_yesterday_only_counts() {
    assert_eq!(streak(vec![days_ago(1)]), 1);
  }

  #[test]
  fn test_two_days_ago_breaks_streak() {
    assert_eq!(streak(vec![days_ago(2)]), 0);
    assert_eq!(streak(vec![days_ago(2), days_ago(3), days_ago(4)]), 0);
  }

  #[test]
  fn test_duplicates_and_order_do_not_matter() {
    let morning = Utc.with_ymd_and_hms(2024, 3, 15, 7, 0, 0).unwrap();
    let instants = vec![days_ago(1), morning, days_ago(2), now(), days_ago(1)];
    assert_eq!(streak(instants.clone()), 3);

    let mut reversed = instants;
    reversed.reverse();
    assert_eq!(streak(reversed), 3);
  }

  #[test]
  fn test_future_latest_day_is_zero() {
    assert_eq!(streak(vec![days_ago(0), now() + Duration::days(2)]), 0);
  }

  #[test]
  fn test_lookback_is_capped() {
    let instants: Vec<_> = (0..500).map(days_ago).collect();
    assert_eq!(streak(instants), 366);

    let policy = StreakPolicy {
      grace_days: 1,
      max_lookback_days: 6,
    };
    let instants: Vec<_> = (0..30).map(days_ago).collect();
    assert_eq!(current_streak(instants, &now(), &policy), 7);
  }

  #[test]
  fn test_grace_days_is_configurable() {
    let strict = StreakPolicy {
      grace_days: 0,
      ..StreakPolicy::default()
    };
    assert_eq!(current_streak(vec![days_ago(1)], &now(), &strict), 0);

    let lenient = StreakPolicy {
      grace_days: 2,
      ..StreakPolicy::default()
    };
    assert_eq!(current_streak(vec![days_ago(2), days_ago(3)], &now(), &lenient), 2);
  }

  #[test]
  fn test_days_follow_callers_time_zone() {
    // 22:30 UTC on the 14th is already the 15th in UTC+10
    let brisbane = FixedOffset::east_opt(10 * 3600).unwrap();
    let local_now = brisbane.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap();
    let late_utc = Utc.with_ymd_and_hms(2024, 3, 14, 22, 30, 0).unwrap();
    let day_before = Utc.with_ymd_and_hms(2024, 3, 13, 22, 30, 0).unwrap();

    let policy = StreakPolicy::default();
    assert_eq!(current_streak(vec![late_utc, day_before], &local_now, &policy), 2);

    let days = active_days(vec![late_utc], &brisbane);
    assert!(days.contains(&NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()));
  }
}
