use color_eyre::{eyre::eyre, Result};
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub provider: ProviderConfig,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub connectivity: ConnectivityConfig,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
  /// Live HTTP headlines provider (needs an API key)
  #[default]
  Live,
  /// Built-in sample articles, no network or key needed
  Sample,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
  pub kind: ProviderKind,
  pub base_url: String,
  /// Country code sent with every request
  pub country: String,
  pub request_timeout_secs: u64,
}

impl Default for ProviderConfig {
  fn default() -> Self {
    Self {
      kind: ProviderKind::default(),
      base_url: "https://newsapi.org/v2/top-headlines".to_string(),
      country: "us".to_string(),
      request_timeout_secs: 10,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  /// Database file (defaults to $XDG_DATA_HOME/newsdesk/cache.db)
  pub path: Option<PathBuf>,
  #[serde(deserialize_with = "deserialize_ttl_minutes")]
  pub ttl_minutes: u64,
  pub payload_key: String,
  pub timestamp_key: String,
}

impl CacheConfig {
  /// The configured TTL, saturating at the largest representable span.
  pub fn ttl(&self) -> chrono::Duration {
    ttl_from_minutes(self.ttl_minutes).unwrap_or(chrono::Duration::MAX)
  }
}

fn ttl_from_minutes(minutes: u64) -> Option<chrono::Duration> {
  i64::try_from(minutes)
    .ok()
    .and_then(chrono::Duration::try_minutes)
}

/// Reject TTLs that do not fit in a time span.
fn deserialize_ttl_minutes<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
  D: Deserializer<'de>,
{
  let minutes = u64::deserialize(deserializer)?;
  match ttl_from_minutes(minutes) {
    Some(_) => Ok(minutes),
    None => Err(serde::de::Error::custom(format!(
      "ttl_minutes {} is out of range",
      minutes
    ))),
  }
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      path: None,
      ttl_minutes: 30,
      payload_key: "@news_cache".to_string(),
      timestamp_key: "@news_cache_timestamp".to_string(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConnectivityConfig {
  /// URL probed once at startup
  pub probe_url: String,
  /// How long to wait for a first signal before assuming offline
  pub timeout_secs: u64,
}

impl ConnectivityConfig {
  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs)
  }
}

impl Default for ConnectivityConfig {
  fn default() -> Self {
    Self {
      probe_url: "https://newsapi.org".to_string(),
      timeout_secs: 3,
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./newsdesk.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/newsdesk/config.yaml
  ///
  /// Without any file, defaults are used.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("newsdesk.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("newsdesk").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  pub fn from_yaml(contents: &str) -> std::result::Result<Self, serde_yaml::Error> {
    // An empty document deserializes to unit, not to a mapping.
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }
    serde_yaml::from_str(contents)
  }

  /// Get the provider API key from environment variables.
  ///
  /// Checks NEWSDESK_API_KEY first, then NEWS_API_KEY as fallback.
  pub fn get_api_key() -> Result<String> {
    std::env::var("NEWSDESK_API_KEY")
      .or_else(|_| std::env::var("NEWS_API_KEY"))
      .ok()
      .filter(|key| !key.trim().is_empty())
      .ok_or_else(|| {
        eyre!(
          "News API key not found. Set NEWSDESK_API_KEY or NEWS_API_KEY, \
           or use `provider.kind: sample`."
        )
      })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_document_gives_defaults() {
    let config = Config::from_yaml("").unwrap();
    assert_eq!(config.provider.kind, ProviderKind::Live);
    assert_eq!(config.provider.country, "us");
    assert_eq!(config.cache.ttl(), chrono::Duration::milliseconds(1_800_000));
    assert_eq!(config.cache.payload_key, "@news_cache");
    assert_eq!(config.cache.timestamp_key, "@news_cache_timestamp");
    assert_eq!(config.connectivity.timeout(), Duration::from_secs(3));
  }

  #[test]
  fn test_partial_sections_keep_other_defaults() {
    let config = Config::from_yaml(
      "provider:\n  kind: sample\ncache:\n  ttl_minutes: 5\n  path: /tmp/news.db\n",
    )
    .unwrap();
    assert_eq!(config.provider.kind, ProviderKind::Sample);
    assert_eq!(
      config.provider.base_url,
      "https://newsapi.org/v2/top-headlines"
    );
    assert_eq!(config.cache.ttl(), chrono::Duration::minutes(5));
    assert_eq!(config.cache.path, Some(PathBuf::from("/tmp/news.db")));
    assert_eq!(config.cache.payload_key, "@news_cache");
    assert_eq!(config.connectivity.timeout_secs, 3);
  }

  #[test]
  fn test_unknown_provider_kind_is_rejected() {
    assert!(Config::from_yaml("provider:\n  kind: carrier-pigeon\n").is_err());
  }

  #[test]
  fn test_out_of_range_ttl_is_rejected() {
    assert!(Config::from_yaml("cache:\n  ttl_minutes: 1000000000000000000\n").is_err());
    assert!(Config::from_yaml("cache:\n  ttl_minutes: 18446744073709551615\n").is_err());

    let config = CacheConfig {
      ttl_minutes: u64::MAX,
      ..CacheConfig::default()
    };
    assert_eq!(config.ttl(), chrono::Duration::MAX);
  }

  #[test]
  fn test_missing_explicit_path_is_an_error() {
    let missing = Path::new("/definitely/not/here/newsdesk.yaml");
    assert!(Config::load(Some(missing)).is_err());
  }

  #[test]
  fn test_load_from_explicit_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "connectivity:\n  timeout_secs: 1\n").unwrap();

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.connectivity.timeout(), Duration::from_secs(1));
  }
}
