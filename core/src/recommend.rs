use crate::error::{RecError, RecResult};
use crate::frame::Cell;
use crate::index::TitleId;
use crate::schema::Field;
use crate::store::Artifacts;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Author shown when a title has no catalog entry or no author column.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayRecord {
    pub title: String,
    pub author: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopularBook {
    pub title: String,
    pub author: String,
    pub image: Option<String>,
    pub avg_rating: Option<f64>,
    pub num_ratings: Option<u64>,
}

/// Rank one matrix row and return the `k` entries after the leading one.
///
/// Scores are ordered descending with ties kept in index order; NaN ranks
/// below every number. The first ranked entry is dropped unconditionally on
/// the assumption that a title is always most similar to itself. If the
/// diagonal is not a row maximum this drops a real neighbour and can keep the
/// query title in the output.
pub fn rank_neighbors(row: &[f64], k: usize) -> Vec<(TitleId, f64)> {
    let mut scored: Vec<(TitleId, f64)> = row.iter().copied().enumerate().collect();
    scored.sort_by(|a, b| desc_nan_last(a.1, b.1));
    scored.into_iter().skip(1).take(k).collect()
}

fn desc_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

fn text_or_unknown(cell: Option<&Cell>) -> String {
    cell.filter(|c| !c.is_null())
        .map(|c| match c {
            Cell::Text(s) => s.clone(),
            Cell::Int(i) => i.to_string(),
            Cell::Float(f) => f.to_string(),
            Cell::Bool(b) => b.to_string(),
            Cell::List(items) => items.join(", "),
            Cell::Null => UNKNOWN_AUTHOR.to_string(),
        })
        .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string())
}

impl Artifacts {
    /// Top-`k` most similar titles to `selected`, enriched from the catalog.
    ///
    /// Returns `min(k, n - 1)` records. A neighbour missing from the catalog
    /// degrades to an "Unknown" author with no image rather than failing the call.
    pub fn recommend(&self, selected: &str, k: usize) -> RecResult<Vec<DisplayRecord>> {
        let index = self
            .titles
            .position(selected)
            .ok_or_else(|| RecError::TitleNotFound(selected.to_string()))?;
        let row = self.similarity.row(index).ok_or_else(|| RecError::ArtifactsIncompatible {
            artifact: "similarity_scores",
            detail: format!("no row {index} in a {n}x{n} matrix", n = self.similarity.n),
        })?;

        let mut out = Vec::with_capacity(k.min(row.len()));
        for (idx, score) in rank_neighbors(row, k) {
            let title = self.titles.title(idx).unwrap_or_default();
            tracing::trace!(idx, score, title, "neighbour");
            out.push(self.enrich(title));
        }
        Ok(out)
    }

    /// Display record for a title, with placeholders when the catalog has no match.
    pub fn enrich(&self, title: &str) -> DisplayRecord {
        let cols = &self.catalog.columns;
        let hit = cols.title.zip(self.catalog.row_for(title));
        let Some((title_col, row)) = hit else {
            tracing::debug!(title, "no catalog entry; using placeholder");
            return DisplayRecord { title: title.to_string(), author: UNKNOWN_AUTHOR.to_string(), image: None };
        };
        let frame = &self.catalog.frame;
        let title = frame
            .cell(row, title_col)
            .and_then(Cell::as_text)
            .unwrap_or(title)
            .to_string();
        let author = text_or_unknown(cols.author.and_then(|c| frame.cell(row, c)));
        let image = cols
            .image
            .and_then(|c| frame.cell(row, c))
            .and_then(Cell::as_image)
            .map(str::to_string);
        DisplayRecord { title, author, image }
    }

    /// The first `n` rows of the popularity table in stored order.
    pub fn popular(&self, n: usize) -> RecResult<Vec<PopularBook>> {
        let cols = &self.popular_columns;
        let required = |field: Field| {
            cols.get(field).ok_or_else(|| RecError::SchemaUnresolved {
                table: "popular",
                field: field.name(),
                available: self.popular.columns.clone(),
            })
        };
        let title_col = required(Field::Title)?;
        let author_col = required(Field::Author)?;
        let image_col = required(Field::Image)?;

        let frame = &self.popular;
        let books = (0..frame.len().min(n))
            .map(|row| PopularBook {
                title: frame.cell(row, title_col).and_then(Cell::as_text).unwrap_or_default().to_string(),
                author: text_or_unknown(frame.cell(row, author_col)),
                image: frame.cell(row, image_col).and_then(Cell::as_image).map(str::to_string),
                avg_rating: cols.avg_rating.and_then(|c| frame.cell(row, c)).and_then(Cell::as_f64),
                num_ratings: cols.num_ratings.and_then(|c| frame.cell(row, c)).and_then(Cell::as_u64),
            })
            .collect();
        Ok(books)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_leading_entry_and_takes_k() {
        let row = [1.0, 0.3, 0.9, 0.5];
        let got: Vec<TitleId> = rank_neighbors(&row, 2).into_iter().map(|(i, _)| i).collect();
        assert_eq!(got, vec![2, 3]);
    }

    #[test]
    fn ties_keep_index_order() {
        let row = [1.0, 0.5, 0.5, 0.5];
        let got: Vec<TitleId> = rank_neighbors(&row, 3).into_iter().map(|(i, _)| i).collect();
        assert_eq!(got, vec![1, 2, 3]);
    }

    #[test]
    fn nan_sorts_last() {
        let row = [1.0, f64::NAN, 0.1, 0.2];
        let got: Vec<TitleId> = rank_neighbors(&row, 3).into_iter().map(|(i, _)| i).collect();
        assert_eq!(got, vec![3, 2, 1]);
    }

    #[test]
    fn skip_is_positional_not_by_index() {
        // Self-similarity is not the row maximum here: index 1 outranks it and is the one skipped.
        let row = [0.4, 0.9, 0.1];
        let got: Vec<TitleId> = rank_neighbors(&row, 2).into_iter().map(|(i, _)| i).collect();
        assert_eq!(got, vec![0, 2]);
    }

    #[test]
    fn near_ties_keep_full_precision() {
        let row = [1.0, 0.30000000001, 0.30000000002];
        let got: Vec<TitleId> = rank_neighbors(&row, 2).into_iter().map(|(i, _)| i).collect();
        assert_eq!(got, vec![2, 1]);
    }

    #[test]
    fn k_beyond_row_is_truncated() {
        assert_eq!(rank_neighbors(&[1.0, 0.2], 5).len(), 1);
        assert!(rank_neighbors(&[1.0, 0.2], 0).is_empty());
        assert!(rank_neighbors(&[], 3).is_empty());
    }
}
