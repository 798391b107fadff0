use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub type Term = String;
pub type DocId = String;
pub type Position = u32;

/// A document id paired with its numeric value. Orders by value, then by the original string,
/// so "7" and "07" stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocKey {
    value: i64,
    id: DocId,
}

impl DocKey {
    pub fn parse(id: &str) -> Result<Self> {
        let value = id.parse::<i64>().map_err(|_| Error::InvalidDocId(id.to_string()))?;
        Ok(Self { value, id: id.to_string() })
    }

    pub fn id(&self) -> &str { &self.id }
}

/// Ordered set of documents, sorted by numeric doc id.
///
/// `intersect`, `union` and `difference` run in O(n + m) and return new sets; the receiver is
/// never modified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<DocId>", into = "Vec<DocId>")]
pub struct PostingSet {
    docs: BTreeSet<DocKey>,
}

impl PostingSet {
    pub fn new() -> Self { Self::default() }

    pub fn from_ids<I, S>(ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let docs = ids
            .into_iter()
            .map(|id| DocKey::parse(id.as_ref()))
            .collect::<Result<BTreeSet<_>>>()?;
        Ok(Self { docs })
    }

    pub fn insert(&mut self, key: DocKey) -> bool { self.docs.insert(key) }

    pub fn len(&self) -> usize { self.docs.len() }

    pub fn is_empty(&self) -> bool { self.docs.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &DocKey> + '_ { self.docs.iter() }

    pub fn intersect(&self, other: &PostingSet) -> PostingSet {
        Self { docs: self.docs.intersection(&other.docs).cloned().collect() }
    }

    pub fn union(&self, other: &PostingSet) -> PostingSet {
        Self { docs: self.docs.union(&other.docs).cloned().collect() }
    }

    /// Documents in `self` that are not in `other`.
    pub fn difference(&self, other: &PostingSet) -> PostingSet {
        Self { docs: self.docs.difference(&other.docs).cloned().collect() }
    }

    /// Doc ids in numeric order.
    pub fn ids(&self) -> Vec<DocId> {
        self.docs.iter().map(|k| k.id.clone()).collect()
    }
}

impl TryFrom<Vec<DocId>> for PostingSet {
    type Error = Error;

    fn try_from(ids: Vec<DocId>) -> Result<Self> { Self::from_ids(ids) }
}

impl From<PostingSet> for Vec<DocId> {
    fn from(set: PostingSet) -> Self {
        set.docs.into_iter().map(|k| k.id).collect()
    }
}

/// Term -> documents containing it at least once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvertedIndex {
    pub postings: BTreeMap<Term, PostingSet>,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    pub fn get(&self, term: &str) -> Option<&PostingSet> { self.postings.get(term) }

    /// Postings for a term, empty if the term is unknown.
    pub fn postings_for(&self, term: &str) -> PostingSet {
        self.postings.get(term).cloned().unwrap_or_default()
    }

    /// Every document that appears under any term.
    pub fn all_docs(&self) -> PostingSet {
        let mut all = PostingSet::new();
        for set in self.postings.values() {
            all.docs.extend(set.docs.iter().cloned());
        }
        all
    }

    pub fn num_terms(&self) -> usize { self.postings.len() }
}

/// Term -> document -> ascending token positions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositionalIndex {
    pub postings: BTreeMap<Term, BTreeMap<DocId, Vec<Position>>>,
}

impl PositionalIndex {
    pub fn new() -> Self { Self::default() }

    pub fn get(&self, term: &str) -> Option<&BTreeMap<DocId, Vec<Position>>> {
        self.postings.get(term)
    }

    pub fn positions(&self, term: &str, doc: &str) -> Option<&[Position]> {
        self.postings.get(term)?.get(doc).map(Vec::as_slice)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub num_docs: usize,
    pub num_terms: usize,
    pub num_postings: usize,
    pub num_positions: usize,
}

/// The immutable index pair served to queries. A rebuild produces a new snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexSnapshot {
    pub inverted: InvertedIndex,
    pub positional: PositionalIndex,
}

impl IndexSnapshot {
    /// Verify that every inverted posting set matches the doc keys of its positional entry and
    /// that no position list is empty or unsorted.
    pub fn check_consistency(&self) -> Result<()> {
        if self.inverted.postings.len() != self.positional.postings.len() {
            return Err(Error::InconsistentIndex(format!(
                "{} inverted terms vs {} positional terms",
                self.inverted.postings.len(),
                self.positional.postings.len()
            )));
        }
        for (term, docs) in &self.positional.postings {
            let Some(set) = self.inverted.get(term) else {
                return Err(Error::InconsistentIndex(format!("term {term:?} missing from inverted index")));
            };
            if set.len() != docs.len() || !set.iter().all(|k| docs.contains_key(k.id())) {
                return Err(Error::InconsistentIndex(format!("doc set mismatch for term {term:?}")));
            }
            for (doc, positions) in docs {
                if positions.is_empty() || positions.windows(2).any(|w| w[0] >= w[1]) {
                    return Err(Error::InconsistentIndex(format!("bad positions for {term:?} in doc {doc}")));
                }
            }
        }
        Ok(())
    }

    pub fn stats(&self) -> IndexStats {
        let num_postings = self.inverted.postings.values().map(PostingSet::len).sum();
        let num_positions = self
            .positional
            .postings
            .values()
            .flat_map(|docs| docs.values())
            .map(Vec::len)
            .sum();
        IndexStats {
            num_docs: self.inverted.all_docs().len(),
            num_terms: self.inverted.num_terms(),
            num_postings,
            num_positions,
        }
    }
}

/// Build both indexes from per-document term sequences.
///
/// Fails with [`Error::InvalidDocId`] if any doc id is not an integer and with
/// [`Error::DuplicateDocId`] if a doc id is supplied twice. The output does not depend on the
/// order documents are supplied in.
pub fn build<I>(docs: I) -> Result<IndexSnapshot>
where
    I: IntoIterator<Item = (DocId, Vec<Term>)>,
{
    let mut positional = PositionalIndex::new();
    let mut inverted = InvertedIndex::new();
    let mut seen = BTreeSet::new();

    for (doc_id, terms) in docs {
        let key = DocKey::parse(&doc_id)?;
        if !seen.insert(key.clone()) {
            return Err(Error::DuplicateDocId(doc_id));
        }
        for (pos, term) in terms.into_iter().enumerate() {
            let pos = Position::try_from(pos)
                .map_err(|_| Error::InconsistentIndex(format!("doc {doc_id} exceeds {} terms", Position::MAX)))?;
            inverted.postings.entry(term.clone()).or_default().insert(key.clone());
            positional
                .postings
                .entry(term)
                .or_default()
                .entry(doc_id.clone())
                .or_default()
                .push(pos);
        }
    }

    tracing::info!(num_docs = seen.len(), num_terms = inverted.num_terms(), "built indexes");
    Ok(IndexSnapshot { inverted, positional })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(words: &[&str]) -> Vec<Term> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn sample() -> IndexSnapshot {
        build(vec![
            ("1".to_string(), terms(&["cat", "dog", "cat"])),
            ("2".to_string(), terms(&["cat"])),
            ("10".to_string(), terms(&["dog"])),
        ])
        .unwrap()
    }

    #[test]
    fn postings_are_sorted_numerically() {
        let idx = sample();
        assert_eq!(idx.inverted.postings_for("dog").ids(), vec!["1", "10"]);
        assert_eq!(idx.inverted.all_docs().ids(), vec!["1", "2", "10"]);
    }

    #[test]
    fn duplicate_terms_keep_every_position() {
        let idx = sample();
        assert_eq!(idx.positional.positions("cat", "1"), Some(&[0, 2][..]));
        assert_eq!(idx.positional.positions("dog", "10"), Some(&[0][..]));
    }

    #[test]
    fn inverted_matches_positional_keys() {
        let idx = sample();
        idx.check_consistency().unwrap();
        for (term, docs) in &idx.positional.postings {
            let ids: BTreeSet<&str> = idx.inverted.get(term).unwrap().iter().map(DocKey::id).collect();
            let keys: BTreeSet<&str> = docs.keys().map(String::as_str).collect();
            assert_eq!(ids, keys);
        }
    }

    #[test]
    fn non_numeric_doc_id_fails() {
        let err = build(vec![("abc".to_string(), terms(&["cat"]))]).unwrap_err();
        assert!(matches!(err, Error::InvalidDocId(id) if id == "abc"));
    }

    #[test]
    fn repeated_doc_id_fails() {
        let err = build(vec![("1".to_string(), terms(&["a"])), ("1".to_string(), terms(&["a"]))]).unwrap_err();
        assert!(matches!(err, Error::DuplicateDocId(id) if id == "1"));
    }

    #[test]
    fn order_of_documents_does_not_matter() {
        let a = build(vec![
            ("3".to_string(), terms(&["x", "y"])),
            ("1".to_string(), terms(&["y"])),
        ])
        .unwrap();
        let b = build(vec![
            ("1".to_string(), terms(&["y"])),
            ("3".to_string(), terms(&["x", "y"])),
        ])
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn set_operations() {
        let a = PostingSet::from_ids(["1", "2", "3"]).unwrap();
        let b = PostingSet::from_ids(["2", "3", "4"]).unwrap();
        assert_eq!(a.intersect(&b).ids(), vec!["2", "3"]);
        assert_eq!(a.union(&b).ids(), vec!["1", "2", "3", "4"]);
        assert_eq!(a.difference(&b).ids(), vec!["1"]);
        assert!(a.intersect(&PostingSet::new()).is_empty());
    }

    #[test]
    fn leading_zeros_stay_distinct() {
        let set = PostingSet::from_ids(["7", "07", "10"]).unwrap();
        assert_eq!(set.ids(), vec!["07", "7", "10"]);
    }

    #[test]
    fn stats_count_everything() {
        let stats = sample().stats();
        assert_eq!(stats, IndexStats { num_docs: 3, num_terms: 2, num_postings: 4, num_positions: 5 });
    }

    #[test]
    fn detects_mismatched_indexes() {
        let mut idx = sample();
        idx.positional.postings.get_mut("cat").unwrap().remove("2");
        assert!(matches!(idx.check_consistency(), Err(Error::InconsistentIndex(_))));
    }
}
