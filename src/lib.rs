pub mod bench;
pub mod config;
pub mod demo;
pub mod docs_server;
pub mod ingest;
pub mod model;
pub mod packer;
pub mod seed;
pub mod store;
pub mod translations;

pub use config::AppConfig;
pub use docs_server::DocsServer;
pub use packer::{PackStats, ReleaseFormat, ReleasePacker};
pub use seed::{provision, ProvisionReport};
pub use store::{MetadataStore, SqliteMetadataStore, UriRepair};
