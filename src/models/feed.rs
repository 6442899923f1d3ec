//! Feed entry data structure.

use serde::{Deserialize, Serialize};

/// A single entry of an RSS or Atom feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedItem {
    /// Entry title
    pub title: String,

    /// Link to the article page (empty when the entry carries none)
    pub link: String,
}
