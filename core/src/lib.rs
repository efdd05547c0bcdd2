pub mod error;
pub mod frame;
pub mod index;
pub mod persist;
pub mod recommend;
pub mod schema;
pub mod search;
pub mod store;

pub use error::{RecError, RecResult};
pub use frame::{Cell, Frame};
pub use index::{SimilarityMatrix, TitleId, TitleIndex};
pub use recommend::{DisplayRecord, PopularBook, UNKNOWN_AUTHOR};
pub use schema::{resolve_column, ColumnMap, Field};
pub use store::{ArtifactStore, Artifacts, Catalog, LoadState, StoreStatus};
