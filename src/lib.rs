//! FitTrack core: workout log aggregation, streaks, records and progress charts

pub mod charts;
pub mod commands;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod duration;
pub mod models;
pub mod reminders;
pub mod store;
pub mod streak;

#[cfg(test)]
mod test_utils;

pub use charts::{build_chart_series, ChartPoint, ChartSeries, TimeRange};
pub use dashboard::{compute_dashboard_summary, DashboardSettings, DashboardSummary};
pub use duration::{format_minutes, parse_duration_minutes};
pub use streak::{current_streak, StreakPolicy};

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber; `RUST_LOG` overrides the default level
pub fn init_tracing() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

  tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}
