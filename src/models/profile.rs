use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
  pub id: String,
  pub email: String,
  pub username: Option<String>,
  pub reminder_enabled: bool,
  /// "HH:MM" or "HH:MM:SS", in the job's local time
  pub reminder_time: Option<String>,
}

impl Profile {
  /// Name used to greet the user: username, else the email's local part
  pub fn greeting_name(&self) -> &str {
    if let Some(username) = self.username.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
      return username;
    }

    match self.email.split('@').next().map(str::trim) {
      Some(local) if !local.is_empty() => local,
      _ => "you",
    }
  }
}
