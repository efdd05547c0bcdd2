use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Row/column position of a title in the similarity matrix.
pub type TitleId = usize;

/// Ordered titles of the pivot table; position `i` labels row and column `i`
/// of the [`SimilarityMatrix`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TitleIndex {
    titles: Vec<String>,
    #[serde(skip)]
    positions: HashMap<String, TitleId>,
}

impl TitleIndex {
    pub fn new(titles: Vec<String>) -> Self {
        let mut index = Self { titles, positions: HashMap::new() };
        index.rebuild_positions();
        index
    }

    /// Recompute the reverse map; repeated titles keep their first position.
    pub(crate) fn rebuild_positions(&mut self) {
        self.positions = HashMap::with_capacity(self.titles.len());
        for (i, t) in self.titles.iter().enumerate() {
            self.positions.entry(t.clone()).or_insert(i);
        }
    }

    pub fn position(&self, title: &str) -> Option<TitleId> {
        self.positions.get(title).copied()
    }

    pub fn title(&self, id: TitleId) -> Option<&str> {
        self.titles.get(id).map(String::as_str)
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

/// Dense square matrix of pairwise scores, stored row-major.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimilarityMatrix {
    pub n: usize,
    pub scores: Vec<f64>,
}

impl SimilarityMatrix {
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Self {
        let n = rows.len();
        let scores = rows.into_iter().flatten().collect();
        Self { n, scores }
    }

    pub fn row(&self, i: TitleId) -> Option<&[f64]> {
        if i >= self.n {
            return None;
        }
        self.scores.get(i * self.n..(i + 1) * self.n)
    }

    pub(crate) fn is_square(&self) -> bool {
        self.n.checked_mul(self.n) == Some(self.scores.len())
    }
}
