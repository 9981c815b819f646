//! Full-text search: the prebuilt index file and the reader-side session.
//!
//! At build time [`build_documents`] projects every post into a
//! [`SearchDocument`] and [`write_search_index`] stores them as a JSON array
//! at the output root:
//!
//! ```json
//! [{"id": "posts/02.second.html", "title": "Second", "content": "..."}]
//! ```
//!
//! At page-view time the browser fetches that file and answers queries
//! against an in-memory index. [`index`] holds those documents in a tantivy
//! RAM index and [`client`] is the event-driven session around it;
//! `static/search.js` is the browser rendition of the same rules and is
//! shipped into every build.

pub mod client;
pub mod index;

use crate::content::Post;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name of the index at the output root.
pub const SEARCH_INDEX_FILE: &str = "search-index.json";

/// Browser search script, written to `static/js/search.js` when the theme
/// does not provide its own.
pub const SEARCH_SCRIPT: &str = include_str!("../../static/search.js");

/// Output-relative path of the browser search script.
pub const SEARCH_SCRIPT_PATH: &str = "static/js/search.js";

#[derive(Error, Debug)]
pub enum SearchIndexError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Search engine error: {0}")]
    Engine(#[from] tantivy::TantivyError),
}

/// Per-post projection stored in the search index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchDocument {
    /// Output-relative path of the post page
    pub id: String,
    pub title: String,
    /// Plain-text body
    pub content: String,
}

impl From<&Post> for SearchDocument {
    fn from(post: &Post) -> Self {
        Self {
            id: post.output_path.clone(),
            title: post.title.clone(),
            content: post.plain_text.clone(),
        }
    }
}

/// One document per post, in the order given.
pub fn build_documents(posts: &[Post]) -> Vec<SearchDocument> {
    posts.iter().map(SearchDocument::from).collect()
}

/// Serialize documents to the JSON array stored on disk.
pub fn to_json(docs: &[SearchDocument]) -> Result<String, SearchIndexError> {
    Ok(serde_json::to_string(docs)?)
}

/// Parse a search index file's contents.
pub fn from_json(json: &str) -> Result<Vec<SearchDocument>, SearchIndexError> {
    Ok(serde_json::from_str(json)?)
}

/// Write `docs` as a JSON array to `path`.
pub fn write_search_index(path: &Path, docs: &[SearchDocument]) -> Result<(), SearchIndexError> {
    fs::write(path, to_json(docs)?)?;
    Ok(())
}
