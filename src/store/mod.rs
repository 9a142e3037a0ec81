pub mod sqlite;
pub mod traits;

pub use sqlite::{open_dataset_pool, MetadataError, SqliteMetadataStore};
pub use traits::{CleanupStats, MetadataSession, MetadataStore, UriRepair};
