use serde::{Deserialize, Serialize};
use url::Url;

/// A single entry read from a feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub url: Option<Url>,
}

impl Article {
    pub fn new(title: impl Into<String>, url: Option<Url>) -> Self {
        Self {
            title: title.into(),
            url,
        }
    }

    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "(Untitled)"
        } else {
            &self.title
        }
    }
}
