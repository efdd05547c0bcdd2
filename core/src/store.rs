use crate::error::{RecError, RecResult};
use crate::persist::{load_artifacts, ArtifactPaths, RawArtifacts};
use crate::recommend::DisplayRecord;
use crate::schema::ColumnMap;
use crate::{Frame, SimilarityMatrix, TitleIndex};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Book metadata used to enrich bare titles, with its columns resolved once
/// and a title -> first row lookup built at load.
pub struct Catalog {
    pub frame: Frame,
    pub columns: ColumnMap,
    first_row: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(frame: Frame) -> Self {
        let columns = ColumnMap::resolve(&frame);
        let mut first_row = HashMap::new();
        if let Some(tc) = columns.title {
            for (i, row) in frame.rows.iter().enumerate() {
                if let Some(t) = row.get(tc).and_then(|c| c.as_text()) {
                    first_row.entry(t.to_string()).or_insert(i);
                }
            }
        }
        Self { frame, columns, first_row }
    }

    /// First catalog row carrying exactly this title.
    pub fn row_for(&self, title: &str) -> Option<usize> {
        self.first_row.get(title).copied()
    }

    pub fn distinct_titles(&self) -> usize {
        self.first_row.len()
    }
}

/// Everything a request needs, immutable once built and shared read-only.
pub struct Artifacts {
    pub popular: Frame,
    pub popular_columns: ColumnMap,
    pub titles: TitleIndex,
    pub similarity: SimilarityMatrix,
    pub catalog: Catalog,
}

impl Artifacts {
    pub fn from_raw(raw: RawArtifacts) -> Self {
        let popular_columns = ColumnMap::resolve(&raw.popular);
        Self {
            popular: raw.popular,
            popular_columns,
            titles: raw.titles,
            similarity: raw.similarity,
            catalog: Catalog::new(raw.books),
        }
    }

    pub fn load(paths: &ArtifactPaths) -> RecResult<Self> {
        let start = Instant::now();
        let artifacts = Self::from_raw(load_artifacts(paths)?);
        tracing::info!(
            root = %paths.root.display(),
            titles = artifacts.titles.len(),
            popular = artifacts.popular.len(),
            catalog_rows = artifacts.catalog.frame.len(),
            catalog_titles = artifacts.catalog.distinct_titles(),
            took_s = start.elapsed().as_secs_f64(),
            "artifacts loaded"
        );
        Ok(artifacts)
    }

    pub fn titles(&self) -> &[String] {
        self.titles.titles()
    }
}

#[derive(Clone, Default)]
pub enum LoadState {
    #[default]
    NotLoaded,
    Loaded(Arc<Artifacts>),
    Failed(RecError),
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreStatus {
    pub state: &'static str,
    pub data_dir: String,
    pub titles: Option<usize>,
    pub error: Option<String>,
}

/// Process-wide holder that loads the artifact directory at most once.
///
/// A failed load is remembered: later calls report the same error without
/// touching the disk until [`ArtifactStore::reload`] is called. Once loaded,
/// readers only share a read lock long enough to clone the `Arc`.
pub struct ArtifactStore {
    paths: ArtifactPaths,
    state: RwLock<LoadState>,
    loads: AtomicUsize,
}

impl ArtifactStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { paths: ArtifactPaths::new(root), state: RwLock::new(LoadState::NotLoaded), loads: AtomicUsize::new(0) }
    }

    pub fn root(&self) -> &PathBuf {
        &self.paths.root
    }

    /// Loaded artifacts, loading them first if nothing has been attempted yet.
    pub fn get(&self) -> RecResult<Arc<Artifacts>> {
        match &*self.state.read() {
            LoadState::Loaded(a) => return Ok(Arc::clone(a)),
            LoadState::Failed(e) => return Err(e.clone()),
            LoadState::NotLoaded => {}
        }
        // Write lock is held across the load so concurrent first callers wait
        // instead of loading twice; whoever gets it second sees the result.
        let mut state = self.state.write();
        match &*state {
            LoadState::Loaded(a) => return Ok(Arc::clone(a)),
            LoadState::Failed(e) => return Err(e.clone()),
            LoadState::NotLoaded => {}
        }
        let (next, result) = self.load_now();
        *state = next;
        result
    }

    /// Load if needed, then rank neighbours of `selected`.
    pub fn recommend(&self, selected: &str, k: usize) -> RecResult<Vec<DisplayRecord>> {
        self.get()?.recommend(selected, k)
    }

    /// Artifacts if a load already succeeded; never touches the disk.
    pub fn loaded(&self) -> Option<Arc<Artifacts>> {
        match &*self.state.read() {
            LoadState::Loaded(a) => Some(Arc::clone(a)),
            _ => None,
        }
    }

    /// Drop whatever is held and load again.
    pub fn reload(&self) -> RecResult<Arc<Artifacts>> {
        let mut state = self.state.write();
        let (next, result) = self.load_now();
        *state = next;
        result
    }

    pub fn state(&self) -> LoadState {
        self.state.read().clone()
    }

    pub fn status(&self) -> StoreStatus {
        let data_dir = self.paths.root.display().to_string();
        match self.state() {
            LoadState::NotLoaded => StoreStatus { state: "not_loaded", data_dir, titles: None, error: None },
            LoadState::Loaded(a) => StoreStatus { state: "loaded", data_dir, titles: Some(a.titles.len()), error: None },
            LoadState::Failed(e) => StoreStatus { state: "failed", data_dir, titles: None, error: Some(e.to_string()) },
        }
    }

    /// Number of times the directory has been read, successful or not.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    fn load_now(&self) -> (LoadState, RecResult<Arc<Artifacts>>) {
        self.loads.fetch_add(1, Ordering::Relaxed);
        match Artifacts::load(&self.paths) {
            Ok(a) => {
                let a = Arc::new(a);
                (LoadState::Loaded(Arc::clone(&a)), Ok(a))
            }
            Err(e) => {
                tracing::error!(root = %self.paths.root.display(), error = %e, "artifact load failed");
                (LoadState::Failed(e.clone()), Err(e))
            }
        }
    }
}
