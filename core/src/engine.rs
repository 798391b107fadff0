use crate::config::EngineConfig;
use crate::corpus::load_corpus;
use crate::persist::{load_indexes, save_indexes};
use crate::query::{boolean_query, proximity_query, QueryResult};
use crate::stopwords::Stopwords;
use crate::tokenizer::normalize;
use crate::{build, Error, IndexSnapshot, Result};
use std::path::Path;
use std::sync::Arc;

/// Read-only query handle over a loaded snapshot. Clones share the same snapshot.
#[derive(Debug, Clone)]
pub struct Searcher {
    index: Arc<IndexSnapshot>,
    stopwords: Arc<Stopwords>,
}

impl Searcher {
    pub fn new(index: IndexSnapshot, stopwords: Stopwords) -> Self {
        Self { index: Arc::new(index), stopwords: Arc::new(stopwords) }
    }

    pub fn evaluate_boolean(&self, query: &str) -> QueryResult {
        boolean_query(query, &self.index, &self.stopwords)
    }

    pub fn evaluate_proximity(&self, query: &str) -> QueryResult {
        proximity_query(query, &self.index.positional, &self.stopwords)
    }

    pub fn index(&self) -> &IndexSnapshot { &self.index }

    pub fn stopwords(&self) -> &Stopwords { &self.stopwords }
}

pub fn load_stopwords(config: &EngineConfig) -> Result<Stopwords> {
    match &config.stopwords_path {
        Some(path) => Stopwords::load(path),
        None => Ok(Stopwords::english()),
    }
}

/// Load, normalize and index every corpus file in `dir`.
pub fn build_from_corpus<P: AsRef<Path>>(dir: P, extension: &str, stopwords: &Stopwords) -> Result<IndexSnapshot> {
    let docs = load_corpus(dir, extension)?
        .into_iter()
        .map(|(doc_id, text)| {
            let terms = normalize(&text, stopwords);
            (doc_id, terms)
        });
    build(docs)
}

/// Serve the stored index, building and saving one from the configured corpus if none exists.
pub fn open_or_build(config: &EngineConfig) -> Result<Searcher> {
    let stopwords = load_stopwords(config)?;
    if let Some(index) = load_indexes(&config.index_path)? {
        return Ok(Searcher::new(index, stopwords));
    }
    let index = build_and_save(config, &stopwords)?;
    Ok(Searcher::new(index, stopwords))
}

/// Build a fresh snapshot from the configured corpus and replace the stored index with it.
pub fn rebuild(config: &EngineConfig) -> Result<Searcher> {
    let stopwords = load_stopwords(config)?;
    let index = build_and_save(config, &stopwords)?;
    Ok(Searcher::new(index, stopwords))
}

fn build_and_save(config: &EngineConfig, stopwords: &Stopwords) -> Result<IndexSnapshot> {
    let corpus = config
        .corpus_dir
        .as_ref()
        .ok_or_else(|| Error::MissingIndex(config.index_path.clone()))?;
    let index = build_from_corpus(corpus, &config.extension, stopwords)?;
    save_indexes(&index, &config.index_path)?;
    Ok(index)
}
