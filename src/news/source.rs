//! The remote article source interface and its configured variants.

use std::future::Future;

use crate::config::{Config, ProviderKind};
use crate::error::Result;

use super::client::NewsClient;
use super::sample::SampleSource;
use super::types::{Article, Category};

/// Anything that can hand out article collections.
///
/// Implementations filter server-side when given a category. Failures are
/// returned, not swallowed: the coordinator decides what the consumer sees.
pub trait RemoteSource: Send + Sync {
  /// Fetch the current collection, optionally scoped to one category.
  fn fetch_collection(
    &self,
    category: Option<Category>,
  ) -> impl Future<Output = Result<Vec<Article>>> + Send;

  /// Fetch the full collection and look up one article by id.
  fn fetch_by_id(&self, id: &str) -> impl Future<Output = Result<Option<Article>>> + Send {
    async move {
      let articles = self.fetch_collection(None).await?;
      Ok(articles.into_iter().find(|a| a.id == id))
    }
  }
}

/// The provider selected by configuration.
#[derive(Clone)]
pub enum NewsProvider {
  Live(NewsClient),
  Sample(SampleSource),
}

impl NewsProvider {
  pub fn from_config(config: &Config) -> color_eyre::Result<Self> {
    match config.provider.kind {
      ProviderKind::Live => {
        let api_key = Config::get_api_key()?;
        let client = NewsClient::new(&config.provider, api_key)
          .map_err(|e| color_eyre::eyre::eyre!("Failed to create news client: {}", e))?;
        Ok(Self::Live(client))
      }
      ProviderKind::Sample => Ok(Self::Sample(SampleSource::new())),
    }
  }
}

impl RemoteSource for NewsProvider {
  async fn fetch_collection(&self, category: Option<Category>) -> Result<Vec<Article>> {
    match self {
      Self::Live(client) => client.fetch_collection(category).await,
      Self::Sample(sample) => sample.fetch_collection(category).await,
    }
  }
}
