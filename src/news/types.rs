use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// News category.
///
/// The provider only knows the five named categories; anything else collapses
/// into `General`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
  Technology,
  Business,
  Sports,
  Entertainment,
  Health,
  General,
}

impl Category {
  /// Categories a consumer can filter on, in display order.
  pub const SELECTABLE: [Category; 5] = [
    Category::Technology,
    Category::Business,
    Category::Sports,
    Category::Entertainment,
    Category::Health,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Technology => "technology",
      Self::Business => "business",
      Self::Sports => "sports",
      Self::Entertainment => "entertainment",
      Self::Health => "health",
      Self::General => "general",
    }
  }

  /// Parse a free-form label (case-insensitive). Unknown labels map to `General`.
  pub fn from_label(label: &str) -> Self {
    match label.trim().to_lowercase().as_str() {
      "technology" => Self::Technology,
      "business" => Self::Business,
      "sports" => Self::Sports,
      "entertainment" => Self::Entertainment,
      "health" => Self::Health,
      _ => Self::General,
    }
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl Serialize for Category {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(self.as_str())
  }
}

impl<'de> Deserialize<'de> for Category {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let label = String::deserialize(deserializer)?;
    Ok(Self::from_label(&label))
  }
}

/// Canonical article, as returned to consumers and persisted in the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
  pub id: String,
  pub title: String,
  pub summary: String,
  pub content: String,
  pub category: Category,
  pub image_url: String,
  pub author: String,
  /// ISO-8601 timestamp
  pub published_at: String,
}

/// Keep only articles in `category`, preserving order. `None` keeps everything.
pub fn filter_by_category(articles: &[Article], category: Option<Category>) -> Vec<Article> {
  match category {
    Some(category) => articles
      .iter()
      .filter(|a| a.category == category)
      .cloned()
      .collect(),
    None => articles.to_vec(),
  }
}

#[cfg(test)]
pub(crate) fn test_article(id: &str, category: Category) -> Article {
  Article {
    id: id.to_string(),
    title: format!("Title {}", id),
    summary: format!("Summary {}", id),
    content: format!("Content {}", id),
    category,
    image_url: "https://via.placeholder.com/300".to_string(),
    author: "Unknown".to_string(),
    published_at: "2024-10-21T07:28:00Z".to_string(),
  }
}
