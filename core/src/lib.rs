pub mod config;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod index;
pub mod persist;
pub mod query;
pub mod stopwords;
pub mod tokenizer;

pub use config::EngineConfig;
pub use engine::{open_or_build, rebuild, Searcher};
pub use error::{Error, Result};
pub use index::{build, DocId, DocKey, IndexSnapshot, IndexStats, InvertedIndex, PositionalIndex, Position, PostingSet, Term};
pub use query::QueryResult;
