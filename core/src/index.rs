use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use time::OffsetDateTime;

use crate::config::IdfMode;
use crate::tokenizer::{normalize_term, tokenize};

pub type DocId = String;
pub type Metadata = BTreeMap<String, serde_json::Value>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub content: String,
    pub metadata: Metadata,
    /// Token count after tokenization
    pub word_count: usize,
    pub unique_word_count: usize,
    #[serde(with = "time::serde::rfc3339")]
    pub indexed_at: OffsetDateTime,
}

/// A document as returned to callers: everything but the content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: DocId,
    pub metadata: Metadata,
    pub word_count: usize,
    pub unique_word_count: usize,
    #[serde(with = "time::serde::rfc3339")]
    pub indexed_at: OffsetDateTime,
}

impl From<&Document> for DocumentSummary {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id.clone(),
            metadata: doc.metadata.clone(),
            word_count: doc.word_count,
            unique_word_count: doc.unique_word_count,
            indexed_at: doc.indexed_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub document: DocumentSummary,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BoolOp {
    And,
    Or,
}

/// Term → documents map with per-document term frequencies.
///
/// No term is kept with an empty posting set, and every document's term
/// frequencies sum to its `word_count`.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    documents: HashMap<DocId, Document>,
    postings: HashMap<String, BTreeSet<DocId>>,
    term_freqs: HashMap<DocId, HashMap<String, usize>>,
    total_words: usize,
    idf: IdfMode,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    pub fn with_idf(idf: IdfMode) -> Self {
        Self { idf, ..Self::default() }
    }

    /// Index `content` under `id`, fully replacing any earlier version.
    /// Returns whether an earlier version existed.
    pub fn index_document(&mut self, id: &str, content: &str, metadata: Metadata) -> bool {
        let replaced = self.remove_document(id);

        let tokens = tokenize(content);
        let mut freqs: HashMap<String, usize> = HashMap::new();
        for token in &tokens {
            *freqs.entry(token.clone()).or_insert(0) += 1;
        }
        for term in freqs.keys() {
            self.postings.entry(term.clone()).or_default().insert(id.to_string());
        }

        let doc = Document {
            id: id.to_string(),
            content: content.to_string(),
            metadata,
            word_count: tokens.len(),
            unique_word_count: freqs.len(),
            indexed_at: OffsetDateTime::now_utc(),
        };
        self.total_words += doc.word_count;
        self.term_freqs.insert(id.to_string(), freqs);
        self.documents.insert(id.to_string(), doc);
        replaced
    }

    /// Drop `id` and its postings. Unknown ids are a no-op returning false.
    pub fn remove_document(&mut self, id: &str) -> bool {
        let Some(doc) = self.documents.remove(id) else {
            return false;
        };
        self.total_words -= doc.word_count;
        if let Some(freqs) = self.term_freqs.remove(id) {
            for term in freqs.keys() {
                if let Some(set) = self.postings.get_mut(term) {
                    set.remove(id);
                    if set.is_empty() {
                        self.postings.remove(term);
                    }
                }
            }
        }
        true
    }

    /// TF-IDF ranked search. Ties are ordered by document id.
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        if limit == 0 {
            return Vec::new();
        }
        let n = self.documents.len();
        let mut scores: HashMap<&str, f64> = HashMap::new();
        for term in tokenize(query) {
            let Some(docs) = self.postings.get(&term) else {
                continue;
            };
            let idf = self.idf.idf(n, docs.len());
            for doc_id in docs {
                let tf = self.term_frequency(doc_id, &term);
                *scores.entry(doc_id.as_str()).or_insert(0.0) += tf as f64 * idf;
            }
        }

        let mut ranked: Vec<(&str, f64)> = scores.into_iter().collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.0.cmp(b.0))
        });
        ranked
            .into_iter()
            .take(limit)
            .filter_map(|(id, score)| {
                self.documents.get(id).map(|doc| SearchHit { document: doc.into(), score })
            })
            .collect()
    }

    /// Evaluate `AND` / `OR` / `NOT` strictly left to right, without
    /// precedence. Adjacent clauses with no operator between them are ANDed.
    pub fn boolean_search(&self, query: &str) -> Vec<DocumentSummary> {
        let mut result: Option<BTreeSet<&str>> = None;
        let mut pending: Option<BoolOp> = None;
        let mut negate = false;

        for raw in query.split_whitespace() {
            match raw.to_ascii_uppercase().as_str() {
                "AND" => {
                    pending = Some(BoolOp::And);
                    continue;
                }
                "OR" => {
                    pending = Some(BoolOp::Or);
                    continue;
                }
                "NOT" => {
                    negate = !negate;
                    continue;
                }
                _ => {}
            }
            let Some(term) = normalize_term(raw) else {
                continue;
            };

            let matching: BTreeSet<&str> = self
                .postings
                .get(&term)
                .map(|set| set.iter().map(String::as_str).collect())
                .unwrap_or_default();
            let clause: BTreeSet<&str> = if negate {
                self.documents
                    .keys()
                    .map(String::as_str)
                    .filter(|id| !matching.contains(id))
                    .collect()
            } else {
                matching
            };

            result = Some(match (result, pending.unwrap_or(BoolOp::And)) {
                (None, _) => clause,
                (Some(acc), BoolOp::And) => acc.intersection(&clause).copied().collect(),
                (Some(acc), BoolOp::Or) => acc.union(&clause).copied().collect(),
            });
            pending = None;
            negate = false;
        }

        result
            .unwrap_or_default()
            .into_iter()
            .filter_map(|id| self.documents.get(id).map(DocumentSummary::from))
            .collect()
    }

    pub fn get_document(&self, id: &str) -> Option<&Document> {
        self.documents.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.documents.contains_key(id)
    }

    /// Distinct terms of `id`, empty when unknown.
    pub fn document_terms(&self, id: &str) -> Vec<String> {
        self.term_freqs.get(id).map(|f| f.keys().cloned().collect()).unwrap_or_default()
    }

    pub fn term_frequency(&self, id: &str, term: &str) -> usize {
        self.term_freqs.get(id).and_then(|f| f.get(term)).copied().unwrap_or(0)
    }

    /// Number of documents containing `term`.
    pub fn document_frequency(&self, term: &str) -> usize {
        self.postings.get(term).map_or(0, BTreeSet::len)
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize { self.documents.len() }

    pub fn is_empty(&self) -> bool { self.documents.is_empty() }

    /// Number of distinct terms with at least one posting.
    pub fn term_count(&self) -> usize { self.postings.len() }

    pub fn total_words(&self) -> usize { self.total_words }

    pub fn idf_mode(&self) -> IdfMode { self.idf }

    #[cfg(test)]
    fn check_invariants(&self) {
        assert!(self.postings.values().all(|s| !s.is_empty()));
        for (id, freqs) in &self.term_freqs {
            let doc = &self.documents[id];
            assert_eq!(freqs.values().sum::<usize>(), doc.word_count);
            assert_eq!(freqs.len(), doc.unique_word_count);
            for term in freqs.keys() {
                assert!(self.postings[term].contains(id));
            }
        }
        let distinct: std::collections::HashSet<&String> = self.postings.values().flatten().collect();
        assert!(distinct.iter().all(|id| self.documents.contains_key(*id)));
        assert_eq!(self.documents.values().map(|d| d.word_count).sum::<usize>(), self.total_words);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids<T>(v: &[T], f: impl Fn(&T) -> &str) -> Vec<String> {
        v.iter().map(|x| f(x).to_string()).collect()
    }

    fn fruit() -> InvertedIndex {
        let mut idx = InvertedIndex::new();
        idx.index_document("1", "red apple", Metadata::new());
        idx.index_document("2", "green apple", Metadata::new());
        idx.index_document("3", "red banana", Metadata::new());
        idx
    }

    fn boolean(idx: &InvertedIndex, q: &str) -> Vec<String> {
        ids(&idx.boolean_search(q), |d| d.id.as_str())
    }

    #[test]
    fn indexes_counts_and_postings() {
        let mut idx = InvertedIndex::new();
        idx.index_document("d", "The quick brown fox, the end.", Metadata::new());
        let doc = idx.get_document("d").unwrap();
        assert_eq!(doc.word_count, 6);
        assert_eq!(doc.unique_word_count, 5);
        assert_eq!(idx.term_frequency("d", "the"), 2);
        assert_eq!(idx.document_frequency("fox"), 1);
        assert_eq!(idx.total_words(), 6);
        idx.check_invariants();
    }

    #[test]
    fn search_finds_document_with_positive_score() {
        let mut idx = InvertedIndex::new();
        idx.index_document("d", "the quick brown fox", Metadata::new());
        let hits = idx.search("quick", 10);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document.id, "d");
        assert!(hits[0].score > 0.0);
        assert!(idx.search("zzz_not_present", 10).is_empty());
    }

    #[test]
    fn search_ranks_by_tf_idf() {
        let mut idx = InvertedIndex::with_idf(IdfMode::Plain);
        idx.index_document("a", "rust rust rust", Metadata::new());
        idx.index_document("b", "rust go", Metadata::new());
        idx.index_document("c", "python", Metadata::new());
        idx.index_document("d", "java", Metadata::new());
        let hits = idx.search("rust", 10);
        assert_eq!(ids(&hits, |h| h.document.id.as_str()), vec!["a", "b"]);
        let idf = (4.0f64 / 3.0).ln();
        assert!((hits[0].score - 3.0 * idf).abs() < 1e-9);
        assert!((hits[1].score - idf).abs() < 1e-9);
    }

    #[test]
    fn search_accumulates_across_terms() {
        let idx = fruit();
        let hits = idx.search("red apple", 10);
        assert_eq!(hits[0].document.id, "1");
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn search_ties_break_by_id_and_truncate() {
        let idx = fruit();
        let hits = idx.search("red", 1);
        assert_eq!(ids(&hits, |h| h.document.id.as_str()), vec!["1"]);
        assert!(idx.search("red", 0).is_empty());
    }

    #[test]
    fn search_empty_index_and_query() {
        let idx = InvertedIndex::new();
        assert!(idx.search("anything", 5).is_empty());
        assert!(fruit().search("", 5).is_empty());
    }

    #[test]
    fn reindex_replaces_postings() {
        let mut idx = InvertedIndex::new();
        idx.index_document("d", "alpha", Metadata::new());
        assert!(idx.index_document("d", "beta", Metadata::new()));
        assert!(idx.search("alpha", 10).is_empty());
        assert_eq!(idx.search("beta", 10).len(), 1);
        assert_eq!(idx.term_count(), 1);
        assert_eq!(idx.len(), 1);
        idx.check_invariants();
    }

    #[test]
    fn remove_document_drops_empty_terms() {
        let mut idx = fruit();
        assert!(idx.remove_document("2"));
        assert_eq!(idx.document_frequency("green"), 0);
        assert_eq!(idx.document_frequency("apple"), 1);
        assert!(!idx.remove_document("2"));
        assert!(!idx.remove_document("missing"));
        assert_eq!(idx.len(), 2);
        idx.check_invariants();
    }

    #[test]
    fn boolean_and_or_not() {
        let idx = fruit();
        assert_eq!(boolean(&idx, "red AND apple"), vec!["1"]);
        assert_eq!(boolean(&idx, "red OR banana"), vec!["1", "3"]);
        assert_eq!(boolean(&idx, "apple NOT red"), vec!["2"]);
    }

    #[test]
    fn boolean_operators_are_case_insensitive() {
        let idx = fruit();
        assert_eq!(boolean(&idx, "red and apple"), vec!["1"]);
        assert_eq!(boolean(&idx, "Green or BANANA"), vec!["2", "3"]);
    }

    #[test]
    fn boolean_folds_left_to_right() {
        let idx = fruit();
        // (green OR banana) AND red, not green OR (banana AND red)
        assert_eq!(boolean(&idx, "green OR banana AND red"), vec!["3"]);
    }

    #[test]
    fn boolean_leading_not_is_complement() {
        let idx = fruit();
        assert_eq!(boolean(&idx, "NOT red"), vec!["2"]);
        assert_eq!(boolean(&idx, "NOT NOT red"), vec!["1", "3"]);
    }

    #[test]
    fn boolean_degenerate_queries() {
        let idx = fruit();
        assert!(boolean(&idx, "").is_empty());
        assert!(boolean(&idx, "AND OR").is_empty());
        assert!(boolean(&idx, "unknown").is_empty());
        assert_eq!(boolean(&idx, "red AND"), vec!["1", "3"]);
        assert_eq!(boolean(&idx, "NOT unknown").len(), 3);
    }
}
