use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by the artifact store and the query operations built on it.
///
/// Load-time variants (`ArtifactsMissing`, `ArtifactsIncompatible`) end the
/// session's ability to serve anything; `TitleNotFound` and
/// `SchemaUnresolved` are scoped to a single request.
#[derive(Debug, Clone, Error)]
pub enum RecError {
    #[error("artifact `{artifact}` not found at {}", path.display())]
    ArtifactsMissing { artifact: &'static str, path: PathBuf },

    #[error("artifact `{artifact}` is unreadable: {detail}")]
    ArtifactsIncompatible { artifact: &'static str, detail: String },

    #[error("'{0}' not found in title index")]
    TitleNotFound(String),

    #[error("could not resolve a {field} column in {table} (available: {})", available.join(", "))]
    SchemaUnresolved { table: &'static str, field: &'static str, available: Vec<String> },
}

impl RecError {
    /// Stable machine-readable name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            RecError::ArtifactsMissing { .. } => "artifacts_missing",
            RecError::ArtifactsIncompatible { .. } => "artifacts_incompatible",
            RecError::TitleNotFound(_) => "title_not_found",
            RecError::SchemaUnresolved { .. } => "schema_unresolved",
        }
    }

    /// True for failures that make the whole artifact set unusable.
    pub fn is_load_failure(&self) -> bool {
        matches!(self, RecError::ArtifactsMissing { .. } | RecError::ArtifactsIncompatible { .. })
    }
}

pub type RecResult<T> = std::result::Result<T, RecError>;
