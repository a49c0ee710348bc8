use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};

pub const DEFAULT_CACHE_CAPACITY: usize = 100;

/// Inverse document frequency formula used when ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdfMode {
    /// `ln(N / (df + 1))`
    Plain,
    /// `ln(1 + N / (df + 1))`, positive for any non-empty corpus
    #[default]
    Smoothed,
}

impl IdfMode {
    /// Weight of a term found in `df` of `num_docs` documents. An empty
    /// corpus contributes nothing.
    pub fn idf(self, num_docs: usize, df: usize) -> f64 {
        if num_docs == 0 {
            return 0.0;
        }
        let ratio = num_docs as f64 / (df as f64 + 1.0);
        match self {
            IdfMode::Plain => ratio.ln(),
            IdfMode::Smoothed => (1.0 + ratio).ln(),
        }
    }
}

impl std::str::FromStr for IdfMode {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "plain" => Ok(IdfMode::Plain),
            "smoothed" => Ok(IdfMode::Smoothed),
            other => Err(SearchError::InvalidConfig(format!("unknown idf mode '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of memoized query results
    pub cache_capacity: usize,
    pub idf: IdfMode,
    /// Decrement trie frequencies for a document's old terms when it is
    /// re-indexed or removed. Off by default: trie frequencies accumulate
    /// across every version of every document ever indexed.
    pub reindex_trie_on_document_update: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            idf: IdfMode::default(),
            reindex_trie_on_document_update: false,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.cache_capacity == 0 {
            return Err(SearchError::InvalidConfig("cache_capacity must be at least 1".into()));
        }
        Ok(())
    }
}
