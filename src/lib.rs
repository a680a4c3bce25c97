//! Offline-aware news access: fetch top headlines when online, serve a
//! TTL-bounded local copy when not.

pub mod cache;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod logging;
pub mod news;

pub use cache::{ArticleStore, CacheEntry, KeyValueStore, SqliteStorage};
pub use config::Config;
pub use connectivity::{Connectivity, ConnectivityObserver, ConnectivityProbe, HttpProbe};
pub use error::NewsError;
pub use news::{
  filter_by_category, Article, ArticleLookup, Category, NewsCoordinator, NewsProvider, NewsResult,
  RemoteSource, Unavailable, ViewHandle,
};
