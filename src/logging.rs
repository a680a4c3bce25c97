use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (e.g. `newsdesk=debug`).
pub const LOG_ENV: &str = "NEWSDESK_LOG";

/// Default log directory: $XDG_DATA_HOME/newsdesk/logs
pub fn default_log_dir() -> PathBuf {
  dirs::data_dir()
    .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
    .unwrap_or_else(|| PathBuf::from("."))
    .join("newsdesk")
    .join("logs")
}

/// Install a daily-rolling file subscriber.
///
/// Keep the returned guard alive for the whole process, or buffered lines
/// are lost on exit. Calling this twice is harmless; the second call does
/// not replace the first subscriber.
///
/// Fails when `log_dir` cannot be created. No subscriber is installed then.
pub fn init(log_dir: &Path) -> Result<WorkerGuard, InitError> {
  let appender = RollingFileAppender::builder()
    .rotation(Rotation::DAILY)
    .filename_prefix("newsdesk")
    .filename_suffix("log")
    .build(log_dir)?;
  let (writer, guard) = tracing_appender::non_blocking(appender);

  let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(writer)
    .with_ansi(false)
    .try_init();

  Ok(guard)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_unusable_log_dir_is_an_error() {
    let file = tempfile::NamedTempFile::new().unwrap();
    assert!(init(&file.path().join("logs")).is_err());
  }

  #[test]
  fn test_default_log_dir_is_app_scoped() {
    let dir = default_log_dir();
    assert!(dir.ends_with("newsdesk/logs"));
  }
}
