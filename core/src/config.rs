use crate::persist::DEFAULT_INDEX_FILE;
use std::path::PathBuf;

pub const DEFAULT_EXTENSION: &str = "txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Stored index file.
    pub index_path: PathBuf,
    /// Newline-delimited stopword list. The built-in English list is used when unset.
    pub stopwords_path: Option<PathBuf>,
    /// Corpus to build from when no index is stored.
    pub corpus_dir: Option<PathBuf>,
    /// Extension of corpus files, without the dot.
    pub extension: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            index_path: PathBuf::from(DEFAULT_INDEX_FILE),
            stopwords_path: None,
            corpus_dir: None,
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

impl EngineConfig {
    /// Defaults overlaid with BIRS_INDEX_PATH, BIRS_STOPWORDS, BIRS_CORPUS_DIR and BIRS_EXTENSION.
    pub fn from_env() -> Self {
        Self::default().with_vars(|key| std::env::var(key).ok())
    }

    fn with_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| var(key).filter(|v| !v.trim().is_empty());
        if let Some(v) = var("BIRS_INDEX_PATH") { self.index_path = v.into(); }
        if let Some(v) = var("BIRS_STOPWORDS") { self.stopwords_path = Some(v.into()); }
        if let Some(v) = var("BIRS_CORPUS_DIR") { self.corpus_dir = Some(v.into()); }
        if let Some(v) = var("BIRS_EXTENSION") { self.extension = v.trim_start_matches('.').to_string(); }
        self
    }
}
