//! Search engine facade.
//!
//! Owns the trie, the inverted index and the query cache. Writes go to both
//! the index and the trie and clear the cache before the index lock is
//! released, so a reader never gets a result cached against an older corpus.
//!
//! Lock order is index → trie → cache. The cache lock is never held while
//! acquiring another lock.

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::index::{DocumentSummary, InvertedIndex, Metadata, SearchHit};
use crate::lru::LruCache;
use crate::tokenizer::normalize_query;
use crate::trie::Trie;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Search { query: String, limit: usize },
    Autocomplete { prefix: String, limit: usize },
    Boolean { query: String },
}

#[derive(Debug, Clone)]
pub enum CachedResult {
    Search(Vec<SearchHit>),
    Suggestions(Vec<String>),
    Boolean(Vec<DocumentSummary>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
    pub cache_hit: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutocompleteResponse {
    pub suggestions: Vec<String>,
    pub cache_hit: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BooleanResponse {
    pub results: Vec<DocumentSummary>,
    pub cache_hit: bool,
}

/// Read-only counters for observability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineStats {
    pub searches: u64,
    pub autocompletes: u64,
    pub boolean_searches: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    /// `cache_hits / (cache_hits + cache_misses)`, 0 before any lookup
    pub hit_rate: f64,
    pub indexed_documents: usize,
    /// Distinct terms in the inverted index
    pub index_size: usize,
    pub total_words: usize,
    pub trie_terms: usize,
    pub cache_size: usize,
    pub cache_capacity: usize,
}

#[derive(Debug, Default)]
struct Counters {
    searches: AtomicU64,
    autocompletes: AtomicU64,
    boolean_searches: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
}

pub struct SearchEngine {
    config: EngineConfig,
    index: RwLock<InvertedIndex>,
    trie: RwLock<Trie>,
    cache: Mutex<LruCache<CacheKey, CachedResult>>,
    counters: Counters,
}

impl SearchEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let cache = LruCache::new(config.cache_capacity)?;
        Ok(Self {
            index: RwLock::new(InvertedIndex::with_idf(config.idf)),
            trie: RwLock::new(Trie::new()),
            cache: Mutex::new(cache),
            counters: Counters::default(),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig { &self.config }

    /// Index or re-index a document. Returns whether it replaced an earlier
    /// version.
    pub fn index_document(&self, id: &str, content: &str, metadata: Metadata) -> bool {
        let mut index = self.index.write();
        let mut trie = self.trie.write();

        if self.config.reindex_trie_on_document_update {
            for term in index.document_terms(id) {
                trie.decrement(&term);
            }
        }
        let replaced = index.index_document(id, content, metadata);
        let terms = index.document_terms(id);
        for term in &terms {
            trie.insert(term);
        }

        self.invalidate();
        tracing::debug!(id, terms = terms.len(), replaced, "indexed document");
        replaced
    }

    /// Index a stored file, recording its name in the metadata.
    pub fn index_file(&self, id: &str, filename: &str, content: &str) -> bool {
        let mut metadata = Metadata::new();
        metadata.insert("filename".into(), serde_json::Value::String(filename.to_string()));
        self.index_document(id, content, metadata)
    }

    /// Remove a document. Unknown ids are a no-op and keep the cache.
    pub fn remove_document(&self, id: &str) -> bool {
        let mut index = self.index.write();
        if !index.contains(id) {
            return false;
        }
        if self.config.reindex_trie_on_document_update {
            let mut trie = self.trie.write();
            for term in index.document_terms(id) {
                trie.decrement(&term);
            }
        }
        index.remove_document(id);
        self.invalidate();
        tracing::debug!(id, "removed document");
        true
    }

    /// TF-IDF ranked search with cache-aside.
    pub fn search(&self, query: &str, limit: usize) -> SearchResponse {
        self.counters.searches.fetch_add(1, Ordering::Relaxed);
        let query = normalize_query(query);
        if query.is_empty() {
            return SearchResponse { results: Vec::new(), cache_hit: false };
        }
        let key = CacheKey::Search { query: query.clone(), limit };
        if let Some(CachedResult::Search(results)) = self.lookup(&key) {
            return SearchResponse { results, cache_hit: true };
        }

        let index = self.index.read();
        let results = index.search(&query, limit);
        self.store(key, CachedResult::Search(results.clone()));
        SearchResponse { results, cache_hit: false }
    }

    /// Frequency-ranked completions of `prefix` with cache-aside.
    pub fn autocomplete(&self, prefix: &str, limit: usize) -> AutocompleteResponse {
        self.counters.autocompletes.fetch_add(1, Ordering::Relaxed);
        let prefix = normalize_query(prefix);
        if prefix.is_empty() {
            return AutocompleteResponse { suggestions: Vec::new(), cache_hit: false };
        }
        let key = CacheKey::Autocomplete { prefix: prefix.clone(), limit };
        if let Some(CachedResult::Suggestions(suggestions)) = self.lookup(&key) {
            return AutocompleteResponse { suggestions, cache_hit: true };
        }

        let trie = self.trie.read();
        let suggestions: Vec<String> =
            trie.autocomplete(&prefix, limit).into_iter().map(|(term, _)| term).collect();
        self.store(key, CachedResult::Suggestions(suggestions.clone()));
        AutocompleteResponse { suggestions, cache_hit: false }
    }

    /// Boolean `AND` / `OR` / `NOT` query with cache-aside.
    pub fn boolean_search(&self, query: &str) -> BooleanResponse {
        self.counters.boolean_searches.fetch_add(1, Ordering::Relaxed);
        let query = normalize_query(query);
        if query.is_empty() {
            return BooleanResponse { results: Vec::new(), cache_hit: false };
        }
        let key = CacheKey::Boolean { query: query.clone() };
        if let Some(CachedResult::Boolean(results)) = self.lookup(&key) {
            return BooleanResponse { results, cache_hit: true };
        }

        let index = self.index.read();
        let results = index.boolean_search(&query);
        self.store(key, CachedResult::Boolean(results.clone()));
        BooleanResponse { results, cache_hit: false }
    }

    pub fn get_document(&self, id: &str) -> Option<DocumentSummary> {
        self.index.read().get_document(id).map(DocumentSummary::from)
    }

    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }

    pub fn stats(&self) -> EngineStats {
        let (indexed_documents, index_size, total_words) = {
            let index = self.index.read();
            (index.len(), index.term_count(), index.total_words())
        };
        let trie_terms = self.trie.read().len();
        let (cache_size, cache_capacity) = {
            let cache = self.cache.lock();
            (cache.len(), cache.capacity())
        };
        let cache_hits = self.counters.cache_hits.load(Ordering::Relaxed);
        let cache_misses = self.counters.cache_misses.load(Ordering::Relaxed);
        let lookups = cache_hits + cache_misses;
        let hit_rate = if lookups == 0 { 0.0 } else { cache_hits as f64 / lookups as f64 };

        EngineStats {
            searches: self.counters.searches.load(Ordering::Relaxed),
            autocompletes: self.counters.autocompletes.load(Ordering::Relaxed),
            boolean_searches: self.counters.boolean_searches.load(Ordering::Relaxed),
            cache_hits,
            cache_misses,
            hit_rate,
            indexed_documents,
            index_size,
            total_words,
            trie_terms,
            cache_size,
            cache_capacity,
        }
    }

    fn lookup(&self, key: &CacheKey) -> Option<CachedResult> {
        let hit = self.cache.lock().get(key).cloned();
        if hit.is_some() {
            self.counters.cache_hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(?key, "cache hit");
        } else {
            self.counters.cache_misses.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(?key, "cache miss");
        }
        hit
    }

    // Callers hold the read lock the value was computed under.
    fn store(&self, key: CacheKey, value: CachedResult) {
        if let Some((evicted, _)) = self.cache.lock().put(key, value) {
            tracing::trace!(?evicted, "cache eviction");
        }
    }

    fn invalidate(&self) {
        let mut cache = self.cache.lock();
        if !cache.is_empty() {
            tracing::debug!(entries = cache.len(), "invalidating query cache");
            cache.clear();
        }
    }
}
