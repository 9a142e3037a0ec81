use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub paths: PathsConfig,
    pub docs: DocsConfig,
    pub release: ReleaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Workspace root the portable distribution lives in.
    pub root: String,
    /// Embedded runtime directory shipped with the release.
    pub runtime_dir: String,
    /// Application state directory (holds the metadata database).
    pub app_home: String,
    /// Metadata database filename inside `app_home`.
    pub metadata_db: String,
    /// Demo dataset database, relative to root.
    pub dataset_db: String,
    /// Demo CSV directory, relative to root.
    pub demo_data_dir: String,
    /// Docs directory served by the docs server, relative to root.
    pub docs_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocsConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseConfig {
    /// Name of the release archive and of its top-level directory.
    pub name: String,
    /// Output directory for archives, relative to root.
    pub output_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            docs: DocsConfig::default(),
            release: ReleaseConfig::default(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root: ".".to_string(),
            runtime_dir: "runtime".to_string(),
            app_home: "app_home".to_string(),
            metadata_db: "bi_metadata.db".to_string(),
            dataset_db: "examples.db".to_string(),
            demo_data_dir: "docs/demo_data".to_string(),
            docs_dir: "docs".to_string(),
        }
    }
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8089,
        }
    }
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            name: "railbi-portable-v1".to_string(),
            output_dir: "release".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, an optional config file, and environment variables
    pub fn load() -> anyhow::Result<Self> {
        let mut config = config::Config::builder();

        // Add default configuration
        config = config.add_source(config::Config::try_from(&AppConfig::default())?);

        // Add config file if it exists
        config = config.add_source(config::File::with_name("config").required(false));

        // Add environment variables with prefix "RAILBI"
        config = config.add_source(
            config::Environment::with_prefix("RAILBI")
                .separator("_")
                .prefix_separator("_"),
        );

        let config = config.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        Ok(app_config)
    }

    pub fn root(&self) -> PathBuf {
        PathBuf::from(&self.paths.root)
    }

    /// Path to the application's metadata database
    pub fn metadata_db_path(&self) -> PathBuf {
        self.root()
            .join(&self.paths.app_home)
            .join(&self.paths.metadata_db)
    }

    /// Path to the demo dataset database
    pub fn dataset_db_path(&self) -> PathBuf {
        self.root().join(&self.paths.dataset_db)
    }

    pub fn demo_data_dir(&self) -> PathBuf {
        self.root().join(&self.paths.demo_data_dir)
    }

    pub fn docs_dir(&self) -> PathBuf {
        self.root().join(&self.paths.docs_dir)
    }

    pub fn release_output_dir(&self) -> PathBuf {
        self.root().join(&self.release.output_dir)
    }

    /// Get the docs server bind address
    pub fn docs_address(&self) -> String {
        format!("{}:{}", self.docs.host, self.docs.port)
    }
}

/// SQLAlchemy-style URI for a SQLite file, with forward slashes so the
/// application accepts it on any platform.
pub fn sqlite_uri(path: &Path) -> String {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    format!("sqlite:///{}", absolute.to_string_lossy().replace('\\', "/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_relative_to_root() {
        let config = AppConfig::default();
        assert_eq!(
            config.metadata_db_path(),
            PathBuf::from("./app_home/bi_metadata.db")
        );
        assert_eq!(config.dataset_db_path(), PathBuf::from("./examples.db"));
        assert_eq!(config.docs_address(), "127.0.0.1:8089");
    }

    #[test]
    fn sqlite_uri_uses_forward_slashes() {
        let uri = sqlite_uri(Path::new("/srv/portable/examples.db"));
        assert_eq!(uri, "sqlite:////srv/portable/examples.db");
        assert!(!uri.contains('\\'));
    }
}
