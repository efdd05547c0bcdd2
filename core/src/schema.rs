//! Logical field names and the column-name guessing that maps them onto
//! whatever a producer happened to call its columns.

use crate::frame::Frame;

/// A logical field that display records are built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    Author,
    Image,
    AvgRating,
    NumRatings,
}

impl Field {
    /// Accepted raw column names, most preferred first.
    pub fn candidates(self) -> &'static [&'static str] {
        match self {
            Field::Title => &["Book-Title", "Title"],
            Field::Author => &["Book-Author", "Author"],
            Field::Image => &["Image-URL-M", "Image-URL", "Image_URL", "ImageURL", "Image"],
            Field::AvgRating => &["avg_rating", "Average-Rating", "Avg-Rating", "Rating"],
            Field::NumRatings => &["num_ratings", "Ratings-Count", "Rating-Count", "Votes"],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Author => "author",
            Field::Image => "image",
            Field::AvgRating => "avg_rating",
            Field::NumRatings => "num_ratings",
        }
    }
}

/// Pick the column that stands for a logical field.
///
/// The first candidate present verbatim wins. Failing that, the first
/// candidate matching some available name case-insensitively wins; if several
/// available names fold to the same candidate, the lexicographically smallest
/// one is returned so the answer never depends on the order of `available`.
pub fn resolve_column<I>(available: I, candidates: &[&str]) -> Option<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let names: Vec<I::Item> = available.into_iter().collect();
    for cand in candidates {
        if names.iter().any(|n| n.as_ref() == *cand) {
            return Some((*cand).to_string());
        }
    }
    for cand in candidates {
        let folded = cand.to_lowercase();
        let hit = names
            .iter()
            .map(|n| n.as_ref())
            .filter(|n| n.to_lowercase() == folded)
            .min();
        if let Some(name) = hit {
            return Some(name.to_string());
        }
    }
    None
}

/// Positions of each logical field within one frame, resolved once per schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    pub title: Option<usize>,
    pub author: Option<usize>,
    pub image: Option<usize>,
    pub avg_rating: Option<usize>,
    pub num_ratings: Option<usize>,
}

impl ColumnMap {
    pub fn resolve(frame: &Frame) -> Self {
        let find = |field: Field| {
            resolve_column(&frame.columns, field.candidates()).and_then(|name| frame.column_position(&name))
        };
        Self {
            title: find(Field::Title),
            author: find(Field::Author),
            image: find(Field::Image),
            avg_rating: find(Field::AvgRating),
            num_ratings: find(Field::NumRatings),
        }
    }

    pub fn get(&self, field: Field) -> Option<usize> {
        match field {
            Field::Title => self.title,
            Field::Author => self.author,
            Field::Image => self.image,
            Field::AvgRating => self.avg_rating,
            Field::NumRatings => self.num_ratings,
        }
    }
}
