//! Routes article requests to the network or the local cache.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::cache::{ArticleStore, CacheEntry, KeyValueStore};
use crate::connectivity::Connectivity;

use super::source::RemoteSource;
use super::types::{filter_by_category, Article, Category};

pub const NO_CACHE_MESSAGE: &str = "No cached news available. Please connect to the internet.";
pub const FETCH_FAILED_MESSAGE: &str = "Failed to load news. Please try again.";
pub const EMPTY_MESSAGE: &str = "No articles found.";

/// Why no articles could be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unavailable {
  /// Offline and nothing fresh in the cache
  NoCache,
  /// Online, but the provider could not be reached or answered badly
  FetchFailed,
}

/// Outcome of a collection request.
#[derive(Debug, Clone, PartialEq)]
pub enum NewsResult {
  Articles(Vec<Article>),
  /// Data was available but nothing matched
  Empty,
  Unavailable(Unavailable),
  /// An identical request is still running; nothing was issued
  InFlight,
}

impl NewsResult {
  fn from_articles(articles: Vec<Article>) -> Self {
    if articles.is_empty() {
      Self::Empty
    } else {
      Self::Articles(articles)
    }
  }

  pub fn articles(&self) -> &[Article] {
    match self {
      Self::Articles(articles) => articles,
      _ => &[],
    }
  }

  /// User-facing message for the non-data outcomes.
  pub fn message(&self) -> Option<&'static str> {
    match self {
      Self::Articles(_) | Self::InFlight => None,
      Self::Empty => Some(EMPTY_MESSAGE),
      Self::Unavailable(Unavailable::NoCache) => Some(NO_CACHE_MESSAGE),
      Self::Unavailable(Unavailable::FetchFailed) => Some(FETCH_FAILED_MESSAGE),
    }
  }
}

/// Outcome of a single-article lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum ArticleLookup {
  Found(Article),
  NotFound,
  NotAvailableOffline,
  NoCachedData,
  FetchFailed,
  InFlight,
}

impl ArticleLookup {
  pub fn message(&self) -> Option<&'static str> {
    match self {
      Self::Found(_) | Self::InFlight => None,
      Self::NotFound => Some("Article not found"),
      Self::NotAvailableOffline => Some("Article not available offline"),
      Self::NoCachedData => Some("No cached data available"),
      Self::FetchFailed => Some("Failed to load article"),
    }
  }
}

/// Liveness flag for the view that issued a request.
///
/// Close it when the view goes away; results arriving afterwards are dropped
/// by [`accept`](Self::accept).
#[derive(Debug, Clone)]
pub struct ViewHandle {
  live: Arc<AtomicBool>,
}

impl ViewHandle {
  pub fn new() -> Self {
    Self {
      live: Arc::new(AtomicBool::new(true)),
    }
  }

  pub fn close(&self) {
    self.live.store(false, Ordering::Release);
  }

  pub fn is_live(&self) -> bool {
    self.live.load(Ordering::Acquire)
  }

  /// Pass `value` through only if the view is still open.
  pub fn accept<T>(&self, value: T) -> Option<T> {
    if self.is_live() {
      Some(value)
    } else {
      debug!("discarding response for closed view");
      None
    }
  }
}

impl Default for ViewHandle {
  fn default() -> Self {
    Self::new()
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum RequestKey {
  Collection(Option<Category>),
  Article(String),
}

/// Releases its request key when dropped.
struct InFlightGuard<'a> {
  in_flight: &'a Mutex<HashSet<RequestKey>>,
  key: RequestKey,
}

impl Drop for InFlightGuard<'_> {
  fn drop(&mut self) {
    let mut set = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
    set.remove(&self.key);
  }
}

/// Decides between network and cache for every request.
///
/// Online results are written through to the store as the full, unfiltered
/// collection, so offline category switches can still filter locally.
pub struct NewsCoordinator<R: RemoteSource, S: KeyValueStore> {
  source: R,
  store: ArticleStore<S>,
  in_flight: Mutex<HashSet<RequestKey>>,
}

impl<R: RemoteSource, S: KeyValueStore> NewsCoordinator<R, S> {
  pub fn new(source: R, store: ArticleStore<S>) -> Self {
    Self {
      source,
      store,
      in_flight: Mutex::new(HashSet::new()),
    }
  }

  pub fn store(&self) -> &ArticleStore<S> {
    &self.store
  }

  fn begin(&self, key: RequestKey) -> Option<InFlightGuard<'_>> {
    let mut set = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
    if !set.insert(key.clone()) {
      debug!(?key, "identical request already in flight");
      return None;
    }
    Some(InFlightGuard {
      in_flight: &self.in_flight,
      key,
    })
  }

  /// Load articles for `category` (all when `None`).
  ///
  /// Anything but a confirmed `Online` reads from the cache.
  pub async fn load_articles(
    &self,
    category: Option<Category>,
    connectivity: Connectivity,
  ) -> NewsResult {
    let Some(_guard) = self.begin(RequestKey::Collection(category)) else {
      return NewsResult::InFlight;
    };

    if connectivity.is_online() {
      self.load_online(category).await
    } else {
      self.load_offline(category)
    }
  }

  async fn load_online(&self, category: Option<Category>) -> NewsResult {
    info!(category = ?category, "online, fetching news");

    let fetched = match self.source.fetch_collection(category).await {
      Ok(articles) => articles,
      Err(e) => {
        warn!(error = %e, category = ?category, "failed to fetch news");
        return NewsResult::Unavailable(Unavailable::FetchFailed);
      }
    };

    match category {
      Some(_) => {
        let full = self.collection_for_cache(&fetched).await;
        self.store.save(&full);
        NewsResult::from_articles(fetched)
      }
      None => {
        let full = keep_known_categories(fetched, self.store.load_last().as_deref());
        self.store.save(&full);
        NewsResult::from_articles(full)
      }
    }
  }

  /// The unfiltered collection to persist after a category-scoped fetch.
  ///
  /// A fresh cached collection is reused as the base. Otherwise the full
  /// collection is fetched, keeping categories learned from earlier scoped
  /// fetches.
  async fn collection_for_cache(&self, scoped: &[Article]) -> Vec<Article> {
    let base = match self.store.load() {
      Some(cached) => {
        debug!(count = cached.len(), "reusing fresh cached collection");
        cached
      }
      None => match self.source.fetch_collection(None).await {
        Ok(full) => keep_known_categories(full, self.store.load_last().as_deref()),
        Err(e) => {
          warn!(error = %e, "failed to refresh full collection, caching scoped articles only");
          Vec::new()
        }
      },
    };
    merge_by_id(base, scoped)
  }

  fn load_offline(&self, category: Option<Category>) -> NewsResult {
    info!(category = ?category, "offline, loading news from cache");

    match self.store.load() {
      Some(cached) => NewsResult::from_articles(filter_by_category(&cached, category)),
      None => NewsResult::Unavailable(Unavailable::NoCache),
    }
  }

  /// Re-filter a collection the caller already holds. No I/O.
  pub fn view(&self, collection: &[Article], category: Option<Category>) -> NewsResult {
    NewsResult::from_articles(filter_by_category(collection, category))
  }

  /// Look up one article by id.
  pub async fn find_article(&self, id: &str, connectivity: Connectivity) -> ArticleLookup {
    let Some(_guard) = self.begin(RequestKey::Article(id.to_string())) else {
      return ArticleLookup::InFlight;
    };

    if connectivity.is_online() {
      debug!(id, "fetching article detail online");
      match self.source.fetch_by_id(id).await {
        Ok(Some(article)) => ArticleLookup::Found(article),
        Ok(None) => ArticleLookup::NotFound,
        Err(e) => {
          warn!(error = %e, id, "failed to fetch article");
          ArticleLookup::FetchFailed
        }
      }
    } else {
      debug!(id, "loading article detail from cache");
      match self.store.load() {
        Some(cached) => cached
          .into_iter()
          .find(|a| a.id == id)
          .map(ArticleLookup::Found)
          .unwrap_or(ArticleLookup::NotAvailableOffline),
        None => ArticleLookup::NoCachedData,
      }
    }
  }

  /// The fresh cache entry, if any.
  pub fn cached_entry(&self) -> Option<CacheEntry> {
    self.store.load_entry()
  }

  pub fn clear_cache(&self) -> bool {
    self.store.clear()
  }
}

/// Restore categories from `previous` for articles the provider only
/// tagged `General`.
fn keep_known_categories(mut fetched: Vec<Article>, previous: Option<&[Article]>) -> Vec<Article> {
  let Some(previous) = previous else {
    return fetched;
  };
  for article in fetched
    .iter_mut()
    .filter(|a| a.category == Category::General)
  {
    if let Some(known) = previous
      .iter()
      .find(|p| p.id == article.id && p.category != Category::General)
    {
      article.category = known.category;
    }
  }
  fetched
}

/// Overlay `scoped` onto `base` by id: matches are replaced in place, the
/// rest is appended in order.
fn merge_by_id(mut base: Vec<Article>, scoped: &[Article]) -> Vec<Article> {
  for article in scoped {
    match base.iter_mut().find(|a| a.id == article.id) {
      Some(existing) => *existing = article.clone(),
      None => base.push(article.clone()),
    }
  }
  base
}
