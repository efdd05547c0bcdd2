use crate::store::Artifacts;
use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref WS: Regex = Regex::new(r"\s+").expect("valid regex");
}

/// NFKC-normalize, lowercase and collapse runs of whitespace to one space.
pub fn normalize_title(text: &str) -> String {
    let folded = text.nfkc().collect::<String>().to_lowercase();
    WS.replace_all(folded.trim(), " ").into_owned()
}

/// Filter `titles` by a typed query, as a pick list would.
///
/// Titles starting with the query come first, then titles containing it;
/// each group keeps index order. An empty query returns the first `limit` titles.
pub fn filter_titles<'a>(titles: &'a [String], query: &str, limit: usize) -> Vec<&'a str> {
    let q = normalize_title(query);
    if q.is_empty() {
        return titles.iter().take(limit).map(String::as_str).collect();
    }
    let mut prefix = Vec::new();
    let mut inner = Vec::new();
    for t in titles {
        let norm = normalize_title(t);
        if norm.starts_with(&q) {
            prefix.push(t.as_str());
        } else if norm.contains(&q) {
            inner.push(t.as_str());
        }
    }
    prefix.into_iter().chain(inner).take(limit).collect()
}

impl Artifacts {
    pub fn search_titles(&self, query: &str, limit: usize) -> Vec<&str> {
        filter_titles(self.titles(), query, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_width_case_and_spaces() {
        assert_eq!(normalize_title("  The\tHOBBIT  "), "the hobbit");
        // fullwidth letters fold under NFKC
        assert_eq!(normalize_title("ＡＢＣ"), "abc");
    }

    #[test]
    fn prefix_matches_rank_first() {
        let titles: Vec<String> = ["Return of the King", "The King Must Die", "King Rat"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(filter_titles(&titles, "king", 10), vec!["King Rat", "Return of the King", "The King Must Die"]);
        assert_eq!(filter_titles(&titles, "king", 1), vec!["King Rat"]);
        assert_eq!(filter_titles(&titles, "", 2).len(), 2);
        assert!(filter_titles(&titles, "queen", 10).is_empty());
    }
}
