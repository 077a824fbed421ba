use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A book as returned by the recommendation API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub publication_year: Option<i32>,
    #[serde(default)]
    pub page_count: Option<u32>,
}

impl Book {
    /// Builds a book from one element of a `recommendations` array.
    ///
    /// Returns `None` unless `id`, `title` and `author` are non-blank strings.
    /// Optional fields with an unexpected shape are ignored rather than
    /// rejecting the whole entry.
    pub fn from_value(value: &Value) -> Option<Self> {
        let id = required_str(value, "id")?;
        let title = required_str(value, "title")?;
        let author = required_str(value, "author")?;

        Some(Self {
            id,
            title,
            author,
            description: value["description"].as_str().map(str::to_string),
            topics: string_list(&value["topics"]),
            categories: string_list(&value["categories"]),
            average_rating: value["average_rating"].as_f64(),
            publication_year: value["publication_year"]
                .as_i64()
                .and_then(|y| i32::try_from(y).ok()),
            page_count: value["page_count"]
                .as_u64()
                .and_then(|p| u32::try_from(p).ok()),
        })
    }

    /// Case-insensitive match against the book's categories and topics
    pub fn matches_category(&self, category: &str) -> bool {
        self.categories
            .iter()
            .chain(self.topics.iter())
            .any(|c| c.eq_ignore_ascii_case(category))
    }
}

fn required_str(value: &Value, field: &str) -> Option<String> {
    value[field]
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn string_list(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Ordered recommendations currently on display; replaced wholesale on refresh
pub type RecommendationSet = Vec<Book>;
