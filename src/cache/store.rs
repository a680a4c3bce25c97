//! Article store: one persisted snapshot of the latest collection plus its
//! save time, served only while younger than the TTL.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use crate::config::CacheConfig;
use crate::error::{NewsError, Result};
use crate::news::Article;

use super::storage::KeyValueStore;

/// A cached collection together with the time it was saved.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
  pub articles: Vec<Article>,
  pub saved_at: DateTime<Utc>,
}

impl CacheEntry {
  pub fn age(&self, now: DateTime<Utc>) -> Duration {
    now - self.saved_at
  }
}

/// Persists the article collection under two fixed keys.
///
/// Storage and serialization failures are logged and reported as `false`
/// or `None`, never returned to the caller.
pub struct ArticleStore<S: KeyValueStore> {
  storage: S,
  ttl: Duration,
  payload_key: String,
  timestamp_key: String,
}

impl<S: KeyValueStore> ArticleStore<S> {
  pub fn new(storage: S, config: &CacheConfig) -> Self {
    Self {
      storage,
      ttl: config.ttl(),
      payload_key: config.payload_key.clone(),
      timestamp_key: config.timestamp_key.clone(),
    }
  }

  /// Override the time-to-live.
  pub fn with_ttl(mut self, ttl: Duration) -> Self {
    self.ttl = ttl;
    self
  }

  pub fn ttl(&self) -> Duration {
    self.ttl
  }

  /// Replace the cached collection, stamping it with the current time.
  pub fn save(&self, articles: &[Article]) -> bool {
    self.save_at(articles, Utc::now())
  }

  fn save_at(&self, articles: &[Article], now: DateTime<Utc>) -> bool {
    match self.write_entry(articles, now) {
      Ok(()) => {
        debug!(count = articles.len(), "saved articles to cache");
        true
      }
      Err(e) => {
        warn!(error = %e, "failed to save articles to cache");
        false
      }
    }
  }

  fn write_entry(&self, articles: &[Article], now: DateTime<Utc>) -> Result<()> {
    let payload = serde_json::to_string(articles)?;
    let timestamp = now.timestamp_millis().to_string();
    // Payload first, then timestamp; both inside one transaction.
    self.storage.multi_set(&[
      (self.payload_key.as_str(), payload.as_str()),
      (self.timestamp_key.as_str(), timestamp.as_str()),
    ])
  }

  /// The cached collection, if present and fresh.
  pub fn load(&self) -> Option<Vec<Article>> {
    self.load_entry().map(|entry| entry.articles)
  }

  /// The cached collection with its save time, if present and fresh.
  pub fn load_entry(&self) -> Option<CacheEntry> {
    self.load_entry_at(Utc::now())
  }

  /// The last saved collection regardless of age. Not for serving: only
  /// for carrying details forward into the next save.
  pub fn load_last(&self) -> Option<Vec<Article>> {
    match self.read_entry() {
      Ok(entry) => entry.map(|entry| entry.articles),
      Err(e) => {
        warn!(error = %e, "failed to read article cache");
        None
      }
    }
  }

  fn load_entry_at(&self, now: DateTime<Utc>) -> Option<CacheEntry> {
    let entry = match self.read_entry() {
      Ok(Some(entry)) => entry,
      Ok(None) => {
        debug!("no cached articles");
        return None;
      }
      Err(e) => {
        warn!(error = %e, "failed to read article cache");
        return None;
      }
    };

    let age = entry.age(now);
    if age < Duration::zero() {
      warn!(saved_at = %entry.saved_at, "cache timestamp is in the future, ignoring cache");
      return None;
    }
    if age > self.ttl {
      debug!(age_secs = age.num_seconds(), "cached articles expired");
      return None;
    }

    Some(entry)
  }

  /// Read the raw entry without any freshness check.
  fn read_entry(&self) -> Result<Option<CacheEntry>> {
    let values = self
      .storage
      .multi_get(&[self.payload_key.as_str(), self.timestamp_key.as_str()])?;

    let (payload, timestamp) = match values.as_slice() {
      [Some(payload), Some(timestamp)] => (payload, timestamp),
      _ => return Ok(None),
    };

    let saved_at = timestamp
      .trim()
      .parse::<i64>()
      .ok()
      .and_then(DateTime::from_timestamp_millis)
      .ok_or_else(|| NewsError::Timestamp(timestamp.clone()))?;

    let articles: Vec<Article> = serde_json::from_str(payload)?;
    Ok(Some(CacheEntry { articles, saved_at }))
  }

  /// Drop both payload and timestamp.
  pub fn clear(&self) -> bool {
    match self
      .storage
      .multi_remove(&[self.payload_key.as_str(), self.timestamp_key.as_str()])
    {
      Ok(()) => {
        debug!("cleared article cache");
        true
      }
      Err(e) => {
        warn!(error = %e, "failed to clear article cache");
        false
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::SqliteStorage;
  use crate::news::types::test_article;
  use crate::news::Category;

  fn store() -> ArticleStore<SqliteStorage> {
    ArticleStore::new(SqliteStorage::in_memory().unwrap(), &CacheConfig::default())
  }

  fn eight_articles() -> Vec<Article> {
    (0..8)
      .map(|i| {
        let category = Category::SELECTABLE[i % Category::SELECTABLE.len()];
        test_article(&format!("a{}", i), category)
      })
      .collect()
  }

  /// Storage that fails every call.
  struct BrokenStorage;

  impl KeyValueStore for BrokenStorage {
    fn multi_get(&self, _keys: &[&str]) -> Result<Vec<Option<String>>> {
      Err(NewsError::LockPoisoned)
    }

    fn multi_set(&self, _entries: &[(&str, &str)]) -> Result<()> {
      Err(NewsError::LockPoisoned)
    }

    fn multi_remove(&self, _keys: &[&str]) -> Result<()> {
      Err(NewsError::LockPoisoned)
    }
  }

  #[test]
  fn test_default_ttl_is_thirty_minutes() {
    assert_eq!(store().ttl(), Duration::milliseconds(1_800_000));
  }

  #[test]
  fn test_load_without_save_is_none() {
    assert!(store().load().is_none());
  }

  #[test]
  fn test_save_then_load_round_trips() {
    let store = store();
    let articles = eight_articles();
    assert!(store.save(&articles));

    let entry = store.load_entry().unwrap();
    assert_eq!(entry.articles, articles);
    assert!((Utc::now() - entry.saved_at) < Duration::seconds(5));
  }

  #[test]
  fn test_load_after_ttl_is_none() {
    let store = store();
    let saved_at = Utc::now() - Duration::minutes(31);
    assert!(store.save_at(&eight_articles(), saved_at));

    assert!(store.load_entry_at(Utc::now()).is_none());
    // Still fresh one minute before expiry.
    assert!(store
      .load_entry_at(saved_at + Duration::minutes(29))
      .is_some());
  }

  #[test]
  fn test_load_last_ignores_ttl() {
    let store = store();
    assert!(store.load_last().is_none());

    store.save_at(&eight_articles(), Utc::now() - Duration::hours(5));
    assert!(store.load().is_none());
    assert_eq!(store.load_last().unwrap().len(), 8);
  }

  #[test]
  fn test_short_ttl_expires() {
    let store = store().with_ttl(Duration::milliseconds(20));
    assert!(store.save(&eight_articles()));
    std::thread::sleep(std::time::Duration::from_millis(50));
    assert!(store.load().is_none());
  }

  #[test]
  fn test_save_replaces_wholesale() {
    let store = store();
    store.save(&eight_articles());
    let smaller = vec![test_article("only", Category::Health)];
    store.save(&smaller);
    assert_eq!(store.load().unwrap(), smaller);
  }

  #[test]
  fn test_clear_removes_entry() {
    let store = store();
    store.save(&eight_articles());
    assert!(store.clear());
    assert!(store.load().is_none());
  }

  #[test]
  fn test_missing_timestamp_means_no_cache() {
    let storage = SqliteStorage::in_memory().unwrap();
    storage.multi_set(&[("@news_cache", "[]")]).unwrap();
    let store = ArticleStore::new(storage, &CacheConfig::default());
    assert!(store.load().is_none());
  }

  #[test]
  fn test_garbage_timestamp_means_no_cache() {
    let storage = SqliteStorage::in_memory().unwrap();
    storage
      .multi_set(&[("@news_cache", "[]"), ("@news_cache_timestamp", "yesterday")])
      .unwrap();
    let store = ArticleStore::new(storage, &CacheConfig::default());
    assert!(store.load().is_none());
  }

  #[test]
  fn test_corrupt_payload_means_no_cache() {
    let storage = SqliteStorage::in_memory().unwrap();
    let now = Utc::now().timestamp_millis().to_string();
    storage
      .multi_set(&[("@news_cache", "{not json"), ("@news_cache_timestamp", now.as_str())])
      .unwrap();
    let store = ArticleStore::new(storage, &CacheConfig::default());
    assert!(store.load().is_none());
  }

  #[test]
  fn test_future_timestamp_means_no_cache() {
    let store = store();
    store.save_at(&eight_articles(), Utc::now() + Duration::hours(1));
    assert!(store.load().is_none());
  }

  #[test]
  fn test_broken_storage_degrades_quietly() {
    let store = ArticleStore::new(BrokenStorage, &CacheConfig::default());
    assert!(!store.save(&eight_articles()));
    assert!(store.load().is_none());
    assert!(!store.clear());
  }

  #[test]
  fn test_custom_keys_are_used() {
    let config = CacheConfig {
      payload_key: "p".into(),
      timestamp_key: "t".into(),
      ..CacheConfig::default()
    };
    let store = ArticleStore::new(SqliteStorage::in_memory().unwrap(), &config);
    store.save(&eight_articles());

    let raw = store.storage.multi_get(&["p", "t", "@news_cache"]).unwrap();
    assert!(raw[0].is_some());
    assert!(raw[1].is_some());
    assert!(raw[2].is_none());
  }
}
