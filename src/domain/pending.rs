use serde::{Deserialize, Serialize};
use url::Url;

/// A bookmark that could not be confirmed sent.
///
/// Two entries are the same pending item iff url, title and selection are all
/// equal; the account that queued it is not part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PendingSubmission {
    pub url: Url,
    pub title: String,
    pub selection: String,
}

impl PendingSubmission {
    pub fn new(url: Url, title: impl Into<String>, selection: impl Into<String>) -> Self {
        Self {
            url,
            title: title.into(),
            selection: selection.into(),
        }
    }
}
