//! Reader-side search session.
//!
//! [`SearchSession`] owns the index state and reacts to the events a search
//! page produces, answering each with at most one [`RenderCommand`]. It
//! shares nothing with the build; `static/search.js` drives the same state
//! machine in the browser.
//!
//! ```text
//!             IndexLoaded              Query(q), |q| >= 2
//! Loading ───────────────▶ Ready ─────────────────────────▶ Show / Hide
//!    │
//!    │ IndexFailed, or the index cannot be built
//!    ▼
//!  Inert   (queries answered with nothing, forever)
//! ```
//!
//! Clicks outside the results panel always hide it. Queries are answered
//! only once the index is loaded; before that, or after loading failed,
//! they produce no command at all.

use super::SearchDocument;
use super::index::{InvertedIndex, SearchHit};

/// Queries shorter than this (in characters, after trimming) hide results.
pub const MIN_QUERY_CHARS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    /// The index document was fetched and parsed.
    IndexLoaded(Vec<SearchDocument>),
    /// Fetching or parsing the index failed.
    IndexFailed(String),
    /// The search box changed.
    Query(String),
    /// A click landed outside both the search box and the results panel.
    ClickOutside,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    Hide,
    Show(Vec<SearchHit>),
}

#[derive(Debug, Default)]
enum State {
    #[default]
    Loading,
    Ready(InvertedIndex),
    Inert,
}

#[derive(Debug, Default)]
pub struct SearchSession {
    state: State,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, State::Ready(_))
    }

    pub fn is_inert(&self) -> bool {
        matches!(self.state, State::Inert)
    }

    /// Apply one event, returning what the results panel should do.
    pub fn handle(&mut self, event: SearchEvent) -> Option<RenderCommand> {
        match event {
            SearchEvent::IndexLoaded(docs) => {
                if matches!(self.state, State::Loading) {
                    self.state = match InvertedIndex::build(docs) {
                        Ok(index) => {
                            tracing::debug!(documents = index.len(), "search index loaded");
                            State::Ready(index)
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "search index could not be built; search disabled");
                            State::Inert
                        }
                    };
                }
                None
            }
            SearchEvent::IndexFailed(reason) => {
                tracing::warn!(%reason, "search index unavailable; search disabled");
                self.state = State::Inert;
                None
            }
            SearchEvent::Query(text) => self.query(&text),
            SearchEvent::ClickOutside => Some(RenderCommand::Hide),
        }
    }

    fn query(&self, text: &str) -> Option<RenderCommand> {
        let State::Ready(index) = &self.state else {
            return None;
        };
        if text.trim().chars().count() < MIN_QUERY_CHARS {
            return Some(RenderCommand::Hide);
        }
        match index.search(text) {
            Ok(hits) if !hits.is_empty() => Some(RenderCommand::Show(hits)),
            Ok(_) => Some(RenderCommand::Hide),
            Err(e) => {
                tracing::warn!(error = %e, query = text, "search failed");
                Some(RenderCommand::Hide)
            }
        }
    }
}
