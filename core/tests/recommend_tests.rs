mod common;

use bookrec_core::persist::ArtifactPaths;
use bookrec_core::{ArtifactStore, Artifacts, DisplayRecord, RecError, UNKNOWN_AUTHOR};
use common::{similarity, write_fixture, TITLES};
use tempfile::tempdir;

fn loaded() -> Artifacts {
    let dir = tempdir().unwrap();
    write_fixture(dir.path());
    Artifacts::load(&ArtifactPaths::new(dir.path())).unwrap()
}

fn titles_of(recs: &[DisplayRecord]) -> Vec<&str> {
    recs.iter().map(|r| r.title.as_str()).collect()
}

#[test]
fn returns_k_records_in_descending_similarity() {
    let artifacts = loaded();
    let matrix = similarity();
    for (i, t) in TITLES.iter().enumerate() {
        let row = matrix.row(i).unwrap();
        for k in 1..TITLES.len() {
            let recs = artifacts.recommend(t, k).unwrap();
            assert_eq!(recs.len(), k, "title {t} k {k}");
            assert_ne!(recs[0].title, *t);
            let scores: Vec<f64> = recs
                .iter()
                .map(|r| row[TITLES.iter().position(|x| *x == r.title).unwrap()])
                .collect();
            assert!(scores.windows(2).all(|w| w[0] >= w[1]), "{t}: {scores:?}");
        }
    }
}

#[test]
fn ties_resolve_by_index_order() {
    let artifacts = loaded();
    let recs = artifacts.recommend("Dune", 4).unwrap();
    assert_eq!(titles_of(&recs), vec!["Heidi", "Lolita", "Ivanhoe", "Emma"]);
}

#[test]
fn missing_catalog_entry_degrades_single_record() {
    let artifacts = loaded();
    let recs = artifacts.recommend("Dune", 4).unwrap();
    let lolita = &recs[1];
    assert_eq!(lolita.title, "Lolita");
    assert_eq!(lolita.author, UNKNOWN_AUTHOR);
    assert_eq!(lolita.image, None);
    // a null author cell also reads as unknown
    assert_eq!(recs[0].author, UNKNOWN_AUTHOR);
    assert_eq!(recs[2], DisplayRecord { title: "Ivanhoe".into(), author: "Walter Scott".into(), image: Some("ivanhoe.jpg".into()) });
    assert_eq!(recs[3].image.as_deref(), Some("emma.jpg"));
}

#[test]
fn first_catalog_edition_wins() {
    let artifacts = loaded();
    let recs = artifacts.recommend("Lolita", 2).unwrap();
    assert_eq!(titles_of(&recs), vec!["Ivanhoe", "Dune"]);
    assert_eq!(recs[1].author, "Frank Herbert");
    assert_eq!(recs[1].image.as_deref(), Some("dune.jpg"));
}

#[test]
fn unknown_title_is_reported() {
    let artifacts = loaded();
    match artifacts.recommend("NonexistentTitle", 5) {
        Err(RecError::TitleNotFound(t)) => assert_eq!(t, "NonexistentTitle"),
        other => panic!("expected TitleNotFound, got {other:?}"),
    }
}

#[test]
fn oversized_k_is_bounded_by_row() {
    let artifacts = loaded();
    assert_eq!(artifacts.recommend("Emma", 50).unwrap().len(), TITLES.len() - 1);
    assert!(artifacts.recommend("Emma", 0).unwrap().is_empty());
}

#[test]
fn repeated_calls_are_identical() {
    let dir = tempdir().unwrap();
    write_fixture(dir.path());
    let store = ArtifactStore::new(dir.path());
    let a = store.recommend("Emma", 3).unwrap();
    let b = store.recommend("Emma", 3).unwrap();
    assert_eq!(a, b);
    assert_eq!(titles_of(&a), vec!["Ivanhoe", "Lolita", "Dune"]);
}

#[test]
fn popular_maps_mixed_column_names() {
    let artifacts = loaded();
    let top = artifacts.popular(2).unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].title, "Emma");
    assert_eq!(top[0].avg_rating, Some(4.5));
    assert_eq!(top[0].num_ratings, Some(310));
    assert_eq!(top[1].avg_rating, None);
    assert_eq!(top[1].num_ratings, Some(250));

    let all = artifacts.popular(25).unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[2].image, None);
    assert_eq!(all[2].num_ratings, None);
}

#[test]
fn search_titles_uses_pick_list() {
    let artifacts = loaded();
    assert_eq!(artifacts.search_titles("  I", 10), vec!["Ivanhoe", "Heidi", "Lolita"]);
    assert_eq!(artifacts.search_titles("", 2), vec!["Dune", "Emma"]);
}
