use crate::Result;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

const ENGLISH: &[&str] = &[
    "a","about","above","after","again","against","all","am","an","and","any","are","as","at",
    "be","because","been","before","being","below","between","both","but","by",
    "can","cannot","could",
    "did","do","does","doing","down","during",
    "each","few","for","from","further",
    "had","has","have","having","he","her","here","hers","herself","him","himself","his","how",
    "i","if","in","into","is","it","its","itself",
    "me","more","most","my","myself",
    "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
    "same","she","should","so","some","such",
    "than","that","the","their","theirs","them","themselves","then","there","these","they","this","those","through","to","too",
    "under","until","up","very",
    "was","we","were","what","when","where","which","while","who","whom","why","with","would",
    "you","your","yours","yourself","yourselves",
];

/// Set of surface forms excluded from indexing and querying.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stopwords {
    words: HashSet<String>,
}

impl Stopwords {
    pub fn empty() -> Self { Self::default() }

    pub fn english() -> Self {
        ENGLISH.iter().copied().collect()
    }

    /// Load a newline-delimited stopword list. Lines are trimmed and blank lines skipped.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        let words: Stopwords = raw.lines().collect();
        tracing::debug!(path = %path.as_ref().display(), count = words.len(), "loaded stopwords");
        Ok(words)
    }

    pub fn contains(&self, word: &str) -> bool { self.words.contains(word) }

    pub fn len(&self) -> usize { self.words.len() }

    pub fn is_empty(&self) -> bool { self.words.is_empty() }
}

impl<'a> FromIterator<&'a str> for Stopwords {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let words = iter
            .into_iter()
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .collect();
        Self { words }
    }
}
