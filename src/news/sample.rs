use crate::error::Result;

use super::source::RemoteSource;
use super::types::{filter_by_category, Article, Category};

/// Fixed sample feed, for running without network access or credentials.
///
/// Behaves like the live provider: category requests are filtered before
/// being returned.
#[derive(Debug, Clone)]
pub struct SampleSource {
  articles: Vec<Article>,
}

impl SampleSource {
  pub fn new() -> Self {
    Self {
      articles: sample_articles(),
    }
  }
}

impl Default for SampleSource {
  fn default() -> Self {
    Self::new()
  }
}

impl RemoteSource for SampleSource {
  async fn fetch_collection(&self, category: Option<Category>) -> Result<Vec<Article>> {
    Ok(filter_by_category(&self.articles, category))
  }
}

const SAMPLES: [(&str, Category, &str, &str); 10] = [
  (
    "AI Breakthrough in Natural Language Processing",
    Category::Technology,
    "Sarah Johnson",
    "Researchers unveil a model that follows long instructions with fewer errors.",
  ),
  (
    "New Smartphone Chips Promise Two-Day Battery Life",
    Category::Technology,
    "Michael Chen",
    "Chipmakers shift to a more efficient process for next year's phones.",
  ),
  (
    "Global Markets Rally on Inflation Data",
    Category::Business,
    "Emily Rodriguez",
    "Stocks climb after consumer prices rise less than expected.",
  ),
  (
    "Startup Funding Rebounds in Third Quarter",
    Category::Business,
    "David Park",
    "Venture investment grows for the first time in six quarters.",
  ),
  (
    "Underdogs Clinch Championship in Overtime Thriller",
    Category::Sports,
    "James Wilson",
    "A last-second goal settles a final that went the distance.",
  ),
  (
    "Marathon Record Falls in Berlin",
    Category::Sports,
    "Anna Schmidt",
    "Ideal conditions help the winner shave seconds off the world best.",
  ),
  (
    "Streaming Series Breaks Viewing Records",
    Category::Entertainment,
    "Lisa Thompson",
    "The finale drew the largest audience in the platform's history.",
  ),
  (
    "Film Festival Announces Lineup",
    Category::Entertainment,
    "Marco Rossi",
    "Forty premieres are scheduled across ten days.",
  ),
  (
    "Study Links Daily Walks to Better Sleep",
    Category::Health,
    "Dr. Priya Patel",
    "Participants who walked thirty minutes a day slept longer on average.",
  ),
  (
    "New Guidelines for Seasonal Vaccines",
    Category::Health,
    "Robert Kim",
    "Health agencies update recommendations ahead of winter.",
  ),
];

fn sample_articles() -> Vec<Article> {
  SAMPLES
    .iter()
    .enumerate()
    .map(|(i, (title, category, author, summary))| Article {
      id: format!("sample-{}", i + 1),
      title: title.to_string(),
      summary: summary.to_string(),
      content: format!("{} {}", summary, "Full coverage is available when online."),
      category: *category,
      image_url: super::api_types::PLACEHOLDER_IMAGE_URL.to_string(),
      author: author.to_string(),
      published_at: format!("2024-10-{:02}T09:00:00.000Z", 21 - i),
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_sample_has_two_per_category() {
    let source = SampleSource::new();
    let all = source.fetch_collection(None).await.unwrap();
    assert_eq!(all.len(), 10);
    for category in Category::SELECTABLE {
      let scoped = source.fetch_collection(Some(category)).await.unwrap();
      assert_eq!(scoped.len(), 2, "category {}", category);
    }
  }

  #[tokio::test]
  async fn test_sample_ids_are_unique() {
    let all = SampleSource::new().fetch_collection(None).await.unwrap();
    let mut ids: Vec<_> = all.iter().map(|a| a.id.clone()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), all.len());
  }

  #[tokio::test]
  async fn test_fetch_by_id_uses_default_lookup() {
    let source = SampleSource::new();
    let found = source.fetch_by_id("sample-3").await.unwrap().unwrap();
    assert_eq!(found.category, Category::Business);
    assert!(source.fetch_by_id("missing").await.unwrap().is_none());
  }
}
