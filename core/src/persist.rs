use crate::error::{RecError, RecResult};
use crate::{Frame, SimilarityMatrix, TitleIndex};
use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

/// On-disk layout version written to `meta.json`.
pub const ARTIFACT_VERSION: u32 = 2;

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub version: u32,
    pub created_at: String,
    pub num_titles: usize,
}

pub struct ArtifactPaths {
    pub root: PathBuf,
}

impl ArtifactPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn popular(&self) -> PathBuf { self.root.join("popular.bin") }
    pub fn titles(&self) -> PathBuf { self.root.join("pt.bin") }
    pub fn books(&self) -> PathBuf { self.root.join("books.bin") }
    pub fn similarity(&self) -> PathBuf { self.root.join("similarity.bin") }
    pub fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

/// The four artifacts exactly as read from disk, before any indexing.
pub struct RawArtifacts {
    pub popular: Frame,
    pub titles: TitleIndex,
    pub books: Frame,
    pub similarity: SimilarityMatrix,
}

fn write_bin<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(dir) = path.parent() {
        create_dir_all(dir)?;
    }
    let mut f = File::create(path)?;
    let bytes = bincode::serialize(value)?;
    f.write_all(&bytes)?;
    Ok(())
}

fn read_bin<T: DeserializeOwned>(artifact: &'static str, path: &Path) -> RecResult<T> {
    let mut f = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => RecError::ArtifactsMissing { artifact, path: path.to_path_buf() },
        _ => RecError::ArtifactsIncompatible { artifact, detail: e.to_string() },
    })?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)
        .map_err(|e| RecError::ArtifactsIncompatible { artifact, detail: e.to_string() })?;
    bincode::deserialize(&buf).map_err(|e| RecError::ArtifactsIncompatible { artifact, detail: e.to_string() })
}

fn check_frame(artifact: &'static str, frame: &Frame) -> RecResult<()> {
    if let Some(row) = frame.first_ragged_row() {
        return Err(RecError::ArtifactsIncompatible {
            artifact,
            detail: format!(
                "row {row} has {} cells but the table has {} columns",
                frame.rows[row].len(),
                frame.columns.len()
            ),
        });
    }
    Ok(())
}

pub fn save_popular(paths: &ArtifactPaths, popular: &Frame) -> Result<()> {
    write_bin(&paths.popular(), popular)
}

pub fn load_popular(paths: &ArtifactPaths) -> RecResult<Frame> {
    let frame = read_bin("popular", &paths.popular())?;
    check_frame("popular", &frame)?;
    Ok(frame)
}

pub fn save_titles(paths: &ArtifactPaths, titles: &TitleIndex) -> Result<()> {
    write_bin(&paths.titles(), titles)
}

pub fn load_titles(paths: &ArtifactPaths) -> RecResult<TitleIndex> {
    let mut titles: TitleIndex = read_bin("pt", &paths.titles())?;
    titles.rebuild_positions();
    Ok(titles)
}

pub fn save_books(paths: &ArtifactPaths, books: &Frame) -> Result<()> {
    write_bin(&paths.books(), books)
}

pub fn load_books(paths: &ArtifactPaths) -> RecResult<Frame> {
    let frame = read_bin("books", &paths.books())?;
    check_frame("books", &frame)?;
    Ok(frame)
}

pub fn save_similarity(paths: &ArtifactPaths, matrix: &SimilarityMatrix) -> Result<()> {
    write_bin(&paths.similarity(), matrix)
}

pub fn load_similarity(paths: &ArtifactPaths) -> RecResult<SimilarityMatrix> {
    let matrix: SimilarityMatrix = read_bin("similarity_scores", &paths.similarity())?;
    if !matrix.is_square() {
        return Err(RecError::ArtifactsIncompatible {
            artifact: "similarity_scores",
            detail: format!("{} scores do not form a {n}x{n} matrix", matrix.scores.len(), n = matrix.n),
        });
    }
    Ok(matrix)
}

pub fn save_meta(paths: &ArtifactPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

/// `Ok(None)` when the directory carries no `meta.json`.
pub fn load_meta(paths: &ArtifactPaths) -> RecResult<Option<MetaFile>> {
    let incompatible = |detail: String| RecError::ArtifactsIncompatible { artifact: "meta", detail };
    let mut f = match File::open(paths.meta()) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(incompatible(e.to_string())),
    };
    let mut buf = String::new();
    f.read_to_string(&mut buf).map_err(|e| incompatible(e.to_string()))?;
    let meta: MetaFile = serde_json::from_str(&buf).map_err(|e| incompatible(e.to_string()))?;
    Ok(Some(meta))
}

/// Write all four artifacts plus a fresh `meta.json`.
pub fn save_artifacts(paths: &ArtifactPaths, raw: &RawArtifacts, created_at: String) -> Result<()> {
    create_dir_all(&paths.root)?;
    save_popular(paths, &raw.popular)?;
    save_titles(paths, &raw.titles)?;
    save_books(paths, &raw.books)?;
    save_similarity(paths, &raw.similarity)?;
    let meta = MetaFile { version: ARTIFACT_VERSION, created_at, num_titles: raw.titles.len() };
    save_meta(paths, &meta)?;
    Ok(())
}

/// Load all four artifacts or none of them.
pub fn load_artifacts(paths: &ArtifactPaths) -> RecResult<RawArtifacts> {
    match load_meta(paths)? {
        Some(meta) if meta.version != ARTIFACT_VERSION => {
            return Err(RecError::ArtifactsIncompatible {
                artifact: "meta",
                detail: format!("artifact version {} is not supported (expected {ARTIFACT_VERSION})", meta.version),
            });
        }
        Some(meta) => tracing::debug!(created_at = %meta.created_at, num_titles = meta.num_titles, "artifact meta"),
        None => tracing::warn!(root = %paths.root.display(), "meta.json missing; skipping version check"),
    }

    let popular = load_popular(paths)?;
    let titles = load_titles(paths)?;
    let books = load_books(paths)?;
    let similarity = load_similarity(paths)?;

    if similarity.n != titles.len() {
        return Err(RecError::ArtifactsIncompatible {
            artifact: "similarity_scores",
            detail: format!("matrix is {n}x{n} but the title index holds {} titles", titles.len(), n = similarity.n),
        });
    }
    Ok(RawArtifacts { popular, titles, books, similarity })
}
