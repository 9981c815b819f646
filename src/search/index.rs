//! In-memory full-text index over [`SearchDocument`]s, backed by tantivy.
//!
//! ## Matching
//!
//! Text is split into tokens: lowercase runs of alphanumeric characters
//! (tantivy's `SimpleTokenizer` + `LowerCaser`). A query term matches every
//! indexed token it is a prefix of, so `cat` finds "cats" and "catalog".
//! Prefixes are expanded against the term dictionary and the expanded
//! tokens combine with OR.
//!
//! ## Scoring
//!
//! BM25 per field, title matches boosted by [`TITLE_BOOST`]. A document's
//! score is the sum over all matched tokens. Hits are ordered by score
//! descending, then by position in the index.

use super::{SearchDocument, SearchIndexError};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use tantivy::{
    DocAddress, Index, IndexReader, IndexWriter, ReloadPolicy, Score, Term,
    collector::TopDocs,
    doc,
    query::{BooleanQuery, BoostQuery, Occur, Query, TermQuery},
    schema::{
        Field, IndexRecordOption, OwnedValue, STORED, Schema, TantivyDocument, TextFieldIndexing,
        TextOptions,
    },
    tokenizer::{LowerCaser, RemoveLongFilter, SimpleTokenizer, TextAnalyzer, TokenStream},
};

pub const TITLE_BOOST: Score = 10.0;

const TOKENIZER: &str = "plainblog_tokenizer";

/// Smallest heap tantivy accepts for a single indexing thread.
const WRITER_HEAP_BYTES: usize = 15_000_000;

/// A document matching a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub title: String,
    pub score: f64,
}

pub struct InvertedIndex {
    docs: Vec<SearchDocument>,
    reader: IndexReader,
    title_field: Field,
    content_field: Field,
    position_field: Field,
}

impl fmt::Debug for InvertedIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvertedIndex")
            .field("documents", &self.docs.len())
            .finish_non_exhaustive()
    }
}

impl InvertedIndex {
    pub fn build(docs: Vec<SearchDocument>) -> Result<Self, SearchIndexError> {
        let mut builder = Schema::builder();
        let indexing = TextFieldIndexing::default()
            .set_tokenizer(TOKENIZER)
            .set_index_option(IndexRecordOption::WithFreqs);
        let text = TextOptions::default().set_indexing_options(indexing);
        let title_field = builder.add_text_field("title", text.clone());
        let content_field = builder.add_text_field("content", text);
        let position_field = builder.add_u64_field("position", STORED);

        let index = Index::create_in_ram(builder.build());
        index.tokenizers().register(TOKENIZER, analyzer());

        let mut writer: IndexWriter = index.writer_with_num_threads(1, WRITER_HEAP_BYTES)?;
        for (position, document) in docs.iter().enumerate() {
            writer.add_document(doc!(
                title_field => document.title.clone(),
                content_field => document.content.clone(),
                position_field => position as u64,
            ))?;
        }
        writer.commit()?;

        let reader: IndexReader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;

        Ok(Self {
            docs,
            reader,
            title_field,
            content_field,
            position_field,
        })
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Documents matching any term of `query`, best first, one hit each.
    pub fn search(&self, query: &str) -> Result<Vec<SearchHit>, SearchIndexError> {
        if self.docs.is_empty() {
            return Ok(Vec::new());
        }
        let searcher = self.reader.searcher();

        // A token reached by two query terms ("ca", "cat") is queried once.
        let mut tokens = BTreeSet::new();
        for prefix in tokenize(query) {
            for field in [self.title_field, self.content_field] {
                for segment in searcher.segment_readers() {
                    let inverted = segment.inverted_index(field)?;
                    let mut stream = inverted.terms().range().ge(prefix.as_bytes()).into_stream()?;
                    while stream.advance() {
                        let Ok(token) = std::str::from_utf8(stream.key()) else {
                            continue;
                        };
                        if !token.starts_with(prefix.as_str()) {
                            break;
                        }
                        tokens.insert(token.to_string());
                    }
                }
            }
        }
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let mut subqueries: Vec<(Occur, Box<dyn Query>)> = Vec::new();
        for token in &tokens {
            let title = TermQuery::new(
                Term::from_field_text(self.title_field, token),
                IndexRecordOption::WithFreqs,
            );
            let content = TermQuery::new(
                Term::from_field_text(self.content_field, token),
                IndexRecordOption::WithFreqs,
            );
            subqueries.push((Occur::Should, Box::new(BoostQuery::new(Box::new(title), TITLE_BOOST))));
            subqueries.push((Occur::Should, Box::new(content)));
        }
        let query = BooleanQuery::new(subqueries);
        let top_docs = searcher.search(&query, &TopDocs::with_limit(self.docs.len()))?;

        let mut ranked = Vec::with_capacity(top_docs.len());
        for (score, address) in top_docs {
            if let Some(position) = self.position(&searcher, address)? {
                ranked.push((position, score));
            }
        }
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        Ok(ranked
            .into_iter()
            .filter_map(|(position, score)| {
                let doc = self.docs.get(position)?;
                Some(SearchHit {
                    id: doc.id.clone(),
                    title: doc.title.clone(),
                    score: f64::from(score),
                })
            })
            .collect())
    }

    fn position(
        &self,
        searcher: &tantivy::Searcher,
        address: DocAddress,
    ) -> Result<Option<usize>, SearchIndexError> {
        let doc: TantivyDocument = searcher.doc(address)?;
        let Some(value) = doc.get_first(self.position_field) else {
            return Ok(None);
        };
        let owned: OwnedValue = value.into();
        Ok(match owned {
            OwnedValue::U64(position) => usize::try_from(position).ok(),
            _ => None,
        })
    }
}

fn analyzer() -> TextAnalyzer {
    TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(RemoveLongFilter::limit(40))
        .filter(LowerCaser)
        .build()
}

/// Lowercase alphanumeric runs of `text`, as the index sees them.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut analyzer = analyzer();
    let mut stream = analyzer.token_stream(text);
    let mut tokens = Vec::new();
    while stream.advance() {
        tokens.push(stream.token().text.clone());
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, title: &str, content: &str) -> SearchDocument {
        SearchDocument {
            id: id.into(),
            title: title.into(),
            content: content.into(),
        }
    }

    fn index(docs: Vec<SearchDocument>) -> InvertedIndex {
        InvertedIndex::build(docs).unwrap()
    }

    fn ids(hits: &[SearchHit]) -> Vec<&str> {
        hits.iter().map(|h| h.id.as_str()).collect()
    }

    fn pets() -> InvertedIndex {
        index(vec![
            doc("/a", "Cats", "cats are great"),
            doc("/b", "Dogs", "dogs are loyal"),
        ])
    }

    #[test]
    fn tokenize_lowercases_and_splits() {
        assert_eq!(
            tokenize("Hello, World! it's 2024"),
            vec!["hello", "world", "it", "s", "2024"]
        );
    }

    #[test]
    fn tokenize_keeps_unicode_words() {
        assert_eq!(tokenize("Café über"), vec!["café", "über"]);
    }

    #[test]
    fn prefix_matches_only_relevant_document() {
        assert_eq!(ids(&pets().search("cat").unwrap()), vec!["/a"]);
    }

    #[test]
    fn content_only_term_matches() {
        assert_eq!(ids(&pets().search("loyal").unwrap()), vec!["/b"]);
        assert_eq!(ids(&pets().search("gre").unwrap()), vec!["/a"]);
    }

    #[test]
    fn shared_content_term_matches_every_document_in_order() {
        let hits = pets().search("are").unwrap();
        assert_eq!(ids(&hits), vec!["/a", "/b"]);
        assert_eq!(hits[0].score, hits[1].score);
    }

    #[test]
    fn terms_combine_with_or() {
        let index = index(vec![
            doc("/a", "Cats", ""),
            doc("/b", "Dogs", ""),
            doc("/c", "Birds", ""),
        ]);
        assert_eq!(ids(&index.search("dog cat").unwrap()), vec!["/a", "/b"]);
    }

    #[test]
    fn title_outranks_content() {
        let index = index(vec![
            doc("/body", "Other", "rust rust rust"),
            doc("/title", "Rust", "nothing here"),
        ]);
        assert_eq!(ids(&index.search("rust").unwrap()), vec!["/title", "/body"]);
    }

    #[test]
    fn rarer_terms_weigh_more() {
        let index = index(vec![
            doc("/common", "", "apple"),
            doc("/both", "", "apple zebra"),
            doc("/also", "", "apple"),
        ]);
        let hits = index.search("apple zebra").unwrap();
        assert_eq!(hits[0].id, "/both");
        assert!(hits[0].score > hits[1].score);
    }

    #[test]
    fn ties_keep_document_order() {
        let index = index(vec![doc("/first", "Same", ""), doc("/second", "Same", "")]);
        assert_eq!(ids(&index.search("same").unwrap()), vec!["/first", "/second"]);
    }

    #[test]
    fn one_hit_per_document() {
        let index = index(vec![doc("/a", "Cat cats catalog", "cat cat")]);
        assert_eq!(index.search("cat ca cats").unwrap().len(), 1);
    }

    #[test]
    fn overlapping_query_terms_do_not_double_count() {
        let index = index(vec![doc("/a", "Cats", ""), doc("/b", "Dogs", "")]);
        let once = index.search("cats").unwrap()[0].score;
        let twice = index.search("ca cats").unwrap()[0].score;
        assert_eq!(once, twice);
    }

    #[test]
    fn no_match_is_empty() {
        let index = pets();
        assert!(index.search("zebra").unwrap().is_empty());
        assert!(index.search("!!!").unwrap().is_empty());
    }

    #[test]
    fn query_is_case_insensitive() {
        let index = index(vec![doc("/a", "", "Rustacean")]);
        assert_eq!(ids(&index.search("RUST").unwrap()), vec!["/a"]);
    }

    #[test]
    fn empty_index() {
        let index = index(Vec::new());
        assert!(index.is_empty());
        assert!(index.search("anything").unwrap().is_empty());
    }
}
