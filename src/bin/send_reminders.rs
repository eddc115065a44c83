//! One run of the daily workout reminder job.
//!
//! Intended to be scheduled every 30 minutes; prints a JSON report to stdout.

use std::process::ExitCode;

use chrono::Local;
use fittrack_lib::config::{AppConfig, EmailConfig};
use fittrack_lib::reminders::{run_reminders, EmailClient};
use fittrack_lib::{db, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
  // Load environment variables from .env file
  dotenvy::dotenv().ok();
  init_tracing();

  match run().await {
    Ok(report) => {
      println!("{}", report);
      ExitCode::SUCCESS
    }
    Err(e) => {
      tracing::error!("Error sending workout reminders: {}", e);
      println!("{}", serde_json::json!({ "success": false, "error": e }));
      ExitCode::FAILURE
    }
  }
}

async fn run() -> Result<String, String> {
  let app_config = AppConfig::from_env().map_err(|e| e.to_string())?;
  let email_config = EmailConfig::from_env().map_err(|e| e.to_string())?;

  let state = db::initialize_state(&app_config)
    .await
    .map_err(|e| format!("Failed to initialize database: {}", e))?;

  let client = EmailClient::new(&email_config);
  let report = run_reminders(&state.db, &client, &email_config, &Local::now())
    .await
    .map_err(|e| e.to_string())?;

  state.db.close().await;

  serde_json::to_string_pretty(&report).map_err(|e| format!("Failed to serialize report: {}", e))
}
