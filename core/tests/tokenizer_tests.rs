use birs_core::stopwords::Stopwords;
use birs_core::tokenizer::normalize;

#[test]
fn it_splits_compounds_before_stemming() {
    let words = normalize("Client/Server data-mining CATS", &Stopwords::english());
    assert_eq!(words, vec!["client", "server", "data", "mine", "cat"]);
}

#[test]
fn it_drops_non_alphanumeric_units() {
    let words = normalize("dog_house café ★ dog", &Stopwords::english());
    assert_eq!(words, vec!["café", "dog"]);
}

#[test]
fn it_filters_stopwords() {
    let words = normalize("The quick brown fox and the lazy dog", &Stopwords::english());
    assert!(!words.contains(&"the".to_string()));
    assert!(!words.contains(&"and".to_string()));
    assert_eq!(words.first().map(String::as_str), Some("quick"));
}

#[test]
fn positions_count_only_kept_terms() {
    let words = normalize("the cat sat on the dog", &Stopwords::english());
    assert_eq!(words, vec!["cat", "sat", "dog"]);
}

#[test]
fn stopwords_are_matched_before_stemming() {
    let sw: Stopwords = ["cats"].into_iter().collect();
    assert_eq!(normalize("cats cat", &sw), vec!["cat"]);
}
