use bookrec_core::{resolve_column, Field};
use std::collections::BTreeSet;

fn schema(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn picks_first_present_candidate() {
    let s = schema(&["Book-Title", "Book-Author"]);
    assert_eq!(resolve_column(&s, &["Title", "Book-Title"]).as_deref(), Some("Book-Title"));
}

#[test]
fn falls_back_to_case_insensitive() {
    let s = schema(&["Title"]);
    assert_eq!(resolve_column(&s, &["title"]).as_deref(), Some("Title"));
}

#[test]
fn absent_when_nothing_matches() {
    let s = schema(&["ISBN", "Publisher"]);
    assert_eq!(resolve_column(&s, Field::Title.candidates()), None);
    assert_eq!(resolve_column(&s, &[]), None);
}

#[test]
fn rating_aliases() {
    let s = schema(&["Average-Rating", "votes"]);
    assert_eq!(resolve_column(&s, Field::AvgRating.candidates()).as_deref(), Some("Average-Rating"));
    assert_eq!(resolve_column(&s, Field::NumRatings.candidates()).as_deref(), Some("votes"));
}
