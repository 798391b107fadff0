use crate::stopwords::Stopwords;
use crate::tokenizer::{normalize, normalize_word};
use crate::{DocId, Error, IndexSnapshot, PositionalIndex, PostingSet, Result, Term};
use std::time::{Duration, Instant};

/// Matching documents, their count, and the time spent on lookups and set algebra.
/// Parsing and normalizing the query string is not included in `elapsed`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub docs: Vec<DocId>,
    pub count: usize,
    pub elapsed: Duration,
}

impl QueryResult {
    pub fn empty() -> Self { Self::default() }

    fn new(docs: Vec<DocId>, elapsed: Duration) -> Self {
        Self { count: docs.len(), docs, elapsed }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    And,
    Or,
    Not,
}

impl Operator {
    pub fn parse(token: &str) -> Option<Self> {
        if token.eq_ignore_ascii_case("and") {
            Some(Operator::And)
        } else if token.eq_ignore_ascii_case("or") {
            Some(Operator::Or)
        } else if token.eq_ignore_ascii_case("not") {
            Some(Operator::Not)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BooleanToken {
    Operator(Operator),
    /// Terms of one operand word. Empty when the word normalizes away.
    Operand(Vec<Term>),
}

/// Split a boolean query on whitespace and normalize its operands.
pub fn parse_boolean(query: &str, stopwords: &Stopwords) -> Vec<BooleanToken> {
    query
        .split_whitespace()
        .map(|token| match Operator::parse(token) {
            Some(op) => BooleanToken::Operator(op),
            None => BooleanToken::Operand(normalize(token, stopwords)),
        })
        .collect()
}

/// Evaluate a flat boolean query strictly left to right.
///
/// Each operator applies to the operand that follows it. `not x` replaces the running result
/// with every indexed document lacking `x`, whatever came before. An operand with no operator
/// in front of it replaces the running result. An operand word that splits into several terms
/// (`data-mining`) matches documents containing all of them.
pub fn boolean_query(query: &str, index: &IndexSnapshot, stopwords: &Stopwords) -> QueryResult {
    let tokens = parse_boolean(query, stopwords);
    let has_terms = tokens
        .iter()
        .any(|t| matches!(t, BooleanToken::Operand(terms) if !terms.is_empty()));
    if !has_terms {
        return QueryResult::empty();
    }

    let start = Instant::now();
    let mut result = PostingSet::new();
    let mut pending: Option<Operator> = None;
    let mut universe: Option<PostingSet> = None;

    for token in &tokens {
        match token {
            BooleanToken::Operator(op) => pending = Some(*op),
            BooleanToken::Operand(terms) => {
                let postings = operand_postings(index, terms);
                result = match pending.take() {
                    None => postings,
                    Some(Operator::And) => result.intersect(&postings),
                    Some(Operator::Or) => result.union(&postings),
                    Some(Operator::Not) => universe
                        .get_or_insert_with(|| index.inverted.all_docs())
                        .difference(&postings),
                };
            }
        }
    }

    let elapsed = start.elapsed();
    tracing::debug!(query, count = result.len(), ?elapsed, "boolean query");
    QueryResult::new(result.ids(), elapsed)
}

fn operand_postings(index: &IndexSnapshot, terms: &[Term]) -> PostingSet {
    let mut iter = terms.iter();
    let Some(first) = iter.next() else {
        return PostingSet::new();
    };
    iter.fold(index.inverted.postings_for(first), |acc, term| {
        acc.intersect(&index.inverted.postings_for(term))
    })
}

/// `word1 word2 /k`: both terms within `k` tokens of each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProximityQuery {
    /// `None` when the word normalizes to nothing (or to several terms) and so can never match.
    pub first: Option<Term>,
    pub second: Option<Term>,
    pub window: u32,
}

impl ProximityQuery {
    pub fn parse(query: &str, stopwords: &Stopwords) -> Result<Self> {
        let (words, window) = query
            .rsplit_once('/')
            .ok_or_else(|| Error::MalformedProximityQuery(format!("missing '/' in {query:?}")))?;
        let window = window
            .trim()
            .parse::<u32>()
            .map_err(|_| Error::MalformedProximityQuery(format!("window {:?} is not a non-negative integer", window.trim())))?;
        let words: Vec<&str> = words.split_whitespace().collect();
        let [first, second] = words.as_slice() else {
            return Err(Error::MalformedProximityQuery(format!("expected two words, got {}", words.len())));
        };
        Ok(Self {
            first: normalize_word(first, stopwords),
            second: normalize_word(second, stopwords),
            window,
        })
    }
}

/// Evaluate a proximity query. Malformed input yields an empty result rather than an error.
/// Matching doc ids are sorted as strings.
pub fn proximity_query(query: &str, positional: &PositionalIndex, stopwords: &Stopwords) -> QueryResult {
    let parsed = match ProximityQuery::parse(query, stopwords) {
        Ok(q) => q,
        Err(err) => {
            tracing::debug!(query, %err, "proximity query rejected");
            return QueryResult::empty();
        }
    };

    let start = Instant::now();
    let mut docs = match (&parsed.first, &parsed.second) {
        (Some(t1), Some(t2)) => within_window(positional, t1, t2, parsed.window),
        _ => Vec::new(),
    };
    docs.sort();
    let elapsed = start.elapsed();
    tracing::debug!(query, count = docs.len(), ?elapsed, "proximity query");
    QueryResult::new(docs, elapsed)
}

fn within_window(positional: &PositionalIndex, t1: &str, t2: &str, window: u32) -> Vec<DocId> {
    let (Some(docs1), Some(docs2)) = (positional.get(t1), positional.get(t2)) else {
        return Vec::new();
    };
    docs1
        .iter()
        .filter_map(|(doc, p1s)| docs2.get(doc).map(|p2s| (doc, p1s, p2s)))
        .filter(|(_, p1s, p2s)| {
            p1s.iter().any(|p1| p2s.iter().any(|p2| p1.abs_diff(*p2) <= window))
        })
        .map(|(doc, _, _)| doc.clone())
        .collect()
}
