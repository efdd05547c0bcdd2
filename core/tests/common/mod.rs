#![allow(dead_code)]

use bookrec_core::persist::{save_artifacts, ArtifactPaths, RawArtifacts};
use bookrec_core::{Cell, Frame, SimilarityMatrix, TitleIndex};
use std::path::Path;

pub const TITLES: [&str; 5] = ["Dune", "Emma", "Heidi", "Ivanhoe", "Lolita"];

fn text(s: &str) -> Cell {
    Cell::Text(s.to_string())
}

pub fn similarity() -> SimilarityMatrix {
    SimilarityMatrix::from_rows(vec![
        vec![1.0, 0.2, 0.7, 0.4, 0.7],
        vec![0.2, 1.0, 0.1, 0.6, 0.3],
        vec![0.7, 0.1, 1.0, 0.5, 0.2],
        vec![0.4, 0.6, 0.5, 1.0, 0.9],
        vec![0.7, 0.3, 0.2, 0.9, 1.0],
    ])
}

/// Catalog uses Book-Crossing column names, repeats Dune for a second
/// edition and has no row for Lolita.
pub fn books() -> Frame {
    let mut f = Frame::new(vec!["ISBN".into(), "Book-Title".into(), "Book-Author".into(), "Image-URL-M".into()]);
    f.push_row(vec![text("1"), text("Dune"), text("Frank Herbert"), text("dune.jpg")]);
    f.push_row(vec![text("2"), text("Dune"), text("F. Herbert"), text("dune-2nd.jpg")]);
    f.push_row(vec![text("3"), text("Emma"), text("Jane Austen"), Cell::List(vec!["emma.jpg".into(), "emma-l.jpg".into()])]);
    f.push_row(vec![text("4"), text("Heidi"), Cell::Null, Cell::Null]);
    f.push_row(vec![text("5"), text("Ivanhoe"), text("Walter Scott"), text("ivanhoe.jpg")]);
    f
}

/// Popularity table uses a different naming convention than the catalog.
pub fn popular() -> Frame {
    let mut f = Frame::new(vec!["title".into(), "Author".into(), "Image".into(), "avg_rating".into(), "num_ratings".into()]);
    f.push_row(vec![text("Emma"), text("Jane Austen"), text("emma.jpg"), Cell::Float(4.5), Cell::Int(310)]);
    f.push_row(vec![text("Dune"), text("Frank Herbert"), text("dune.jpg"), Cell::Float(f64::NAN), Cell::Float(250.0)]);
    f.push_row(vec![text("Heidi"), text("Johanna Spyri"), Cell::Null, Cell::Float(3.9), Cell::Null]);
    f
}

pub fn raw() -> RawArtifacts {
    RawArtifacts {
        popular: popular(),
        titles: TitleIndex::new(TITLES.iter().map(|s| s.to_string()).collect()),
        books: books(),
        similarity: similarity(),
    }
}

pub fn write_fixture(dir: &Path) {
    let paths = ArtifactPaths::new(dir);
    save_artifacts(&paths, &raw(), "2024-01-01T00:00:00Z".into()).unwrap();
}
