//! Load documents from `.json` / `.jsonl` files or directories of them.

use anyhow::Result;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::engine::SearchEngine;
use crate::index::Metadata;

#[derive(Debug, Clone, Deserialize)]
pub struct InputDoc {
    pub id: String,
    pub body: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub meta: Option<serde_json::Value>,
}

impl InputDoc {
    /// Fold `title`, `url` and an object-valued `meta` into one metadata map.
    pub fn metadata(&self) -> Metadata {
        let mut metadata = Metadata::new();
        match &self.meta {
            Some(serde_json::Value::Object(obj)) => {
                for (k, v) in obj {
                    metadata.insert(k.clone(), v.clone());
                }
            }
            Some(other) => {
                metadata.insert("meta".into(), other.clone());
            }
            None => {}
        }
        if let Some(title) = &self.title {
            metadata.insert("title".into(), title.clone().into());
        }
        if let Some(url) = &self.url {
            metadata.insert("url".into(), url.clone().into());
        }
        metadata
    }
}

/// Read every document under `input`, which may be a single file or a
/// directory searched recursively for `.json` and `.jsonl` files.
pub fn load_documents<P: AsRef<Path>>(input: P) -> Result<Vec<InputDoc>> {
    let input = input.as_ref();
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && matches!(extension(p), Some("json" | "jsonl")) {
                files.push(p.to_path_buf());
            }
        }
    } else if input.is_file() {
        files.push(input.to_path_buf());
    } else {
        anyhow::bail!("input path {} does not exist", input.display());
    }

    let mut docs = Vec::new();
    for file in files {
        if extension(&file) == Some("jsonl") {
            read_jsonl(&file, &mut docs)?;
        } else {
            read_json(&file, &mut docs)?;
        }
    }
    tracing::info!(path = %input.display(), docs = docs.len(), "loaded documents");
    Ok(docs)
}

/// Load `input` and index every document into `engine`. Returns the number
/// of documents indexed.
pub fn index_path<P: AsRef<Path>>(engine: &SearchEngine, input: P) -> Result<usize> {
    let docs = load_documents(input)?;
    for doc in &docs {
        engine.index_document(&doc.id, &doc.body, doc.metadata());
    }
    Ok(docs.len())
}

fn extension(p: &Path) -> Option<&str> {
    p.extension().and_then(|s| s.to_str())
}

fn read_jsonl(file: &Path, docs: &mut Vec<InputDoc>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        docs.push(serde_json::from_str(&line)?);
    }
    Ok(())
}

fn read_json(file: &Path, docs: &mut Vec<InputDoc>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                docs.push(serde_json::from_value(v)?);
            }
        }
        serde_json::Value::Object(_) => docs.push(serde_json::from_value(json)?),
        _ => tracing::warn!(file = %file.display(), "skipping json file without documents"),
    }
    Ok(())
}
