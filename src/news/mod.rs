//! Article model, remote sources, and the offline-aware coordinator.

pub mod api_types;
pub mod client;
pub mod coordinator;
pub mod sample;
pub mod source;
pub mod types;

pub use client::NewsClient;
pub use coordinator::{ArticleLookup, NewsCoordinator, NewsResult, Unavailable, ViewHandle};
pub use sample::SampleSource;
pub use source::{NewsProvider, RemoteSource};
pub use types::{filter_by_category, Article, Category};
