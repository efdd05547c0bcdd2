use anyhow::{bail, Context, Result};
use bookrec_core::persist::{save_artifacts, ArtifactPaths, RawArtifacts};
use bookrec_core::{Artifacts, Cell, Frame, SimilarityMatrix, TitleIndex};
use serde::Deserialize;
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// A pandas `to_json(orient="split")` export.
#[derive(Debug, Deserialize)]
struct SplitFrame {
    columns: Vec<String>,
    #[serde(default)]
    data: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TitleSource {
    List(Vec<String>),
    Split { index: Vec<String> },
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let value = serde_json::from_reader(BufReader::new(f)).with_context(|| format!("parsing {}", path.display()))?;
    Ok(value)
}

pub fn cell_from_json(v: Value) -> Cell {
    match v {
        Value::Null => Cell::Null,
        Value::Bool(b) => Cell::Bool(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Cell::Int(i),
            None => n.as_f64().map(Cell::Float).unwrap_or(Cell::Null),
        },
        Value::String(s) => Cell::Text(s),
        Value::Array(items) => Cell::List(
            items
                .into_iter()
                .map(|x| match x {
                    Value::String(s) => s,
                    other => other.to_string(),
                })
                .collect(),
        ),
        obj @ Value::Object(_) => Cell::Text(obj.to_string()),
    }
}

fn read_frame(path: &Path) -> Result<Frame> {
    let split: SplitFrame = read_json(path)?;
    let mut frame = Frame::new(split.columns);
    for (i, row) in split.data.into_iter().enumerate() {
        if row.len() != frame.columns.len() {
            bail!("{}: row {i} has {} values for {} columns", path.display(), row.len(), frame.columns.len());
        }
        frame.push_row(row.into_iter().map(cell_from_json).collect());
    }
    Ok(frame)
}

fn read_titles(path: &Path) -> Result<TitleIndex> {
    let titles = match read_json::<TitleSource>(path)? {
        TitleSource::List(t) => t,
        TitleSource::Split { index } => index,
    };
    Ok(TitleIndex::new(titles))
}

/// Rows of scores; `null` (how NaN is exported) is kept as NaN.
fn read_similarity(path: &Path) -> Result<SimilarityMatrix> {
    let rows: Vec<Vec<Option<f64>>> = read_json(path)?;
    let n = rows.len();
    if let Some((i, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != n) {
        bail!("{}: row {i} has {} scores, expected {n}", path.display(), r.len());
    }
    let rows = rows
        .into_iter()
        .map(|r| r.into_iter().map(|s| s.unwrap_or(f64::NAN)).collect())
        .collect();
    Ok(SimilarityMatrix::from_rows(rows))
}

/// Convert the JSON exports in `input` into artifact files under `output`,
/// then load them back to prove they are usable.
pub fn pack(input: &Path, output: &Path, created_at: String) -> Result<()> {
    let raw = RawArtifacts {
        popular: read_frame(&input.join("popular.json"))?,
        titles: read_titles(&input.join("pt.json"))?,
        books: read_frame(&input.join("books.json"))?,
        similarity: read_similarity(&input.join("similarity.json"))?,
    };
    if raw.similarity.n != raw.titles.len() {
        bail!("similarity matrix has {} rows but pt.json lists {} titles", raw.similarity.n, raw.titles.len());
    }
    tracing::info!(
        titles = raw.titles.len(),
        popular = raw.popular.len(),
        books = raw.books.len(),
        "read exports"
    );

    let paths = ArtifactPaths::new(output);
    save_artifacts(&paths, &raw, created_at)?;
    let artifacts = Artifacts::load(&paths)?;
    if artifacts.catalog.columns.title.is_none() {
        tracing::warn!(columns = ?artifacts.catalog.frame.columns, "no title column in books; every recommendation will use placeholders");
    }
    tracing::info!(output = %output.display(), "artifacts written");
    Ok(())
}
