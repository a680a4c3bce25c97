//! Serde-deserializable types matching the headline provider's responses.
//!
//! These types are separate from domain types so that every field the
//! provider may omit is an `Option`, and defaulting happens in one place.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;

use super::types::{Article, Category};

pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/300";
pub const UNKNOWN_AUTHOR: &str = "Unknown";

// ============================================================================
// Top headlines response
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ApiSource {
  pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiArticle {
  pub source: Option<ApiSource>,
  pub author: Option<String>,
  pub title: Option<String>,
  pub description: Option<String>,
  pub url: Option<String>,
  pub url_to_image: Option<String>,
  pub published_at: Option<String>,
  pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHeadlinesResponse {
  #[serde(default)]
  pub status: String,
  #[serde(default)]
  pub articles: Vec<ApiArticle>,
  pub code: Option<String>,
  pub message: Option<String>,
}

/// Body returned alongside non-success statuses.
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorResponse {
  #[serde(default)]
  pub code: String,
  #[serde(default)]
  pub message: String,
}

// ============================================================================
// Conversions to domain types
// ============================================================================

impl ApiHeadlinesResponse {
  pub fn is_error(&self) -> bool {
    self.status == "error"
  }

  /// Map every raw item into an [`Article`].
  ///
  /// `requested` is the category the request was scoped to, if any.
  pub fn into_articles(self, requested: Option<Category>, now: DateTime<Utc>) -> Vec<Article> {
    self
      .articles
      .into_iter()
      .enumerate()
      .map(|(index, item)| item.into_article(index, requested, now))
      .collect()
  }
}

impl ApiArticle {
  pub fn into_article(
    self,
    index: usize,
    requested: Option<Category>,
    now: DateTime<Utc>,
  ) -> Article {
    let description = non_empty(self.description);
    let category = requested.unwrap_or_else(|| {
      self
        .source
        .as_ref()
        .and_then(|s| s.name.as_deref())
        .map(Category::from_label)
        .unwrap_or(Category::General)
    });

    Article {
      id: non_empty(self.url).unwrap_or_else(|| index.to_string()),
      title: self.title.unwrap_or_default(),
      content: non_empty(self.content)
        .or_else(|| description.clone())
        .unwrap_or_default(),
      summary: description.unwrap_or_default(),
      category,
      image_url: non_empty(self.url_to_image).unwrap_or_else(|| PLACEHOLDER_IMAGE_URL.to_string()),
      author: non_empty(self.author).unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
      published_at: non_empty(self.published_at)
        .unwrap_or_else(|| now.to_rfc3339_opts(SecondsFormat::Millis, true)),
    }
  }
}

// ============================================================================
// Helpers
// ============================================================================

fn non_empty(value: Option<String>) -> Option<String> {
  value.filter(|s| !s.trim().is_empty())
}
