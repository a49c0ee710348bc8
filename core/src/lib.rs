//! In-process full-text search core.
//!
//! [`SearchEngine`] owns a [`Trie`] for prefix completion, an [`InvertedIndex`]
//! for TF-IDF ranked and boolean retrieval, and an [`LruCache`] that memoizes
//! query results until the corpus changes.

pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod loader;
pub mod lru;
pub mod tokenizer;
pub mod trie;

pub use config::{EngineConfig, IdfMode};
pub use engine::{
    AutocompleteResponse, BooleanResponse, CacheKey, CachedResult, EngineStats, SearchEngine,
    SearchResponse,
};
pub use error::{Result, SearchError};
pub use index::{DocId, Document, DocumentSummary, InvertedIndex, Metadata, SearchHit};
pub use lru::LruCache;
pub use trie::Trie;
