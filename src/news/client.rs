use chrono::Utc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::config::ProviderConfig;
use crate::error::{NewsError, Result};

use super::api_types::{ApiErrorResponse, ApiHeadlinesResponse};
use super::source::RemoteSource;
use super::types::{Article, Category};

/// HTTP client for the top-headlines endpoint.
#[derive(Clone)]
pub struct NewsClient {
  http: reqwest::Client,
  endpoint: Url,
  country: String,
  api_key: String,
}

impl NewsClient {
  pub fn new(config: &ProviderConfig, api_key: String) -> Result<Self> {
    let endpoint = Url::parse(&config.base_url)?;
    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.request_timeout_secs))
      .user_agent(concat!("newsdesk/", env!("CARGO_PKG_VERSION")))
      .build()?;

    Ok(Self {
      http,
      endpoint,
      country: config.country.clone(),
      api_key,
    })
  }

  /// Build the request URL. Contains the API key, so never log it.
  fn request_url(&self, category: Option<Category>) -> Url {
    let mut url = self.endpoint.clone();
    {
      let mut query = url.query_pairs_mut();
      query.append_pair("country", &self.country);
      query.append_pair("apiKey", &self.api_key);
      if let Some(category) = category {
        query.append_pair("category", category.as_str());
      }
    }
    url
  }

  /// Fetch top headlines, optionally scoped to a category.
  pub async fn top_headlines(&self, category: Option<Category>) -> Result<Vec<Article>> {
    debug!(endpoint = %self.endpoint, category = ?category, "fetching top headlines");

    let response = self.http.get(self.request_url(category)).send().await?;
    let status = response.status();

    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      let message = serde_json::from_str::<ApiErrorResponse>(&body)
        .map(|e| e.message)
        .unwrap_or_default();
      warn!(status = status.as_u16(), %message, "provider rejected request");
      return Err(NewsError::Status {
        status: status.as_u16(),
        message,
      });
    }

    let body = response.bytes().await?;
    let payload: ApiHeadlinesResponse = serde_json::from_slice(&body)?;

    if payload.is_error() {
      let message = payload.message.unwrap_or_default();
      warn!(code = ?payload.code, %message, "provider returned an error body");
      return Err(NewsError::Status {
        status: status.as_u16(),
        message,
      });
    }

    let articles = payload.into_articles(category, Utc::now());
    debug!(count = articles.len(), category = ?category, "fetched top headlines");
    Ok(articles)
  }
}

impl RemoteSource for NewsClient {
  async fn fetch_collection(&self, category: Option<Category>) -> Result<Vec<Article>> {
    self.top_headlines(category).await
  }
}
