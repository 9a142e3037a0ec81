//! Release packing: stage the portable distribution into a single archive
//! for transfer onto air-gapped machines.

use anyhow::{bail, Context, Result};
use log::{info, warn};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;
use zip::{write::FileOptions, CompressionMethod, ZipWriter};

use crate::config::AppConfig;

/// Top-level files every release must carry.
const REQUIRED_FILES: &[&str] = &["start.bat", "examples.db", "README.md", "LICENSE", "NOTICE"];

/// Nice-to-have files packed when present.
const OPTIONAL_FILES: &[&str] = &[
    "QUICKSTART.md",
    "launcher.exe",
    "target/release/railbi-portable",
    "target/release/railbi-portable.exe",
    "target/release/fix-db-uri",
    "target/release/fix-db-uri.exe",
];

#[derive(Debug)]
pub struct PackStats {
    pub files_packed: usize,
    pub total_size_bytes: u64,
    pub compressed_size_bytes: u64,
    pub duration_secs: f64,
    pub compression_ratio: f64,
}

impl PackStats {
    pub fn summary(&self) -> String {
        format!(
            "packed {} files ({:.1} MB -> {:.1} MB, {:.1}% compression) in {:.1}s",
            self.files_packed,
            self.total_size_bytes as f64 / 1_048_576.0,
            self.compressed_size_bytes as f64 / 1_048_576.0,
            (1.0 - self.compression_ratio) * 100.0,
            self.duration_secs
        )
    }
}

pub enum ReleaseFormat {
    Zip,
    TarZstd,
}

pub struct ReleasePacker {
    root: PathBuf,
    output_dir: PathBuf,
    release_name: String,
    runtime_dir: String,
    app_home: String,
    docs_dir: String,
}

impl ReleasePacker {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            root: config.root(),
            output_dir: config.release_output_dir(),
            release_name: config.release.name.clone(),
            runtime_dir: config.paths.runtime_dir.clone(),
            app_home: config.paths.app_home.clone(),
            docs_dir: config.paths.docs_dir.clone(),
        }
    }

    pub fn pack(&self, format: ReleaseFormat) -> Result<PackStats> {
        match format {
            ReleaseFormat::Zip => self.pack_zip(),
            ReleaseFormat::TarZstd => self.pack_tar_zstd(),
        }
    }

    /// Pack the release as a ZIP with deflate, the format field teams expect.
    pub fn pack_zip(&self) -> Result<PackStats> {
        let start = Instant::now();
        let files = self.collect_files()?;
        fs::create_dir_all(&self.output_dir)?;

        let zip_path = self.output_dir.join(format!("{}.zip", self.release_name));
        if zip_path.exists() {
            fs::remove_file(&zip_path)?;
        }

        let file = File::create(&zip_path)
            .with_context(|| format!("cannot create {}", zip_path.display()))?;
        let mut zip = ZipWriter::new(BufWriter::new(file));
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(6));

        let mut files_packed = 0usize;
        let mut total_size = 0u64;
        for (source, archive_path) in &files {
            zip.start_file(archive_path.as_str(), options)?;
            let mut reader = BufReader::new(File::open(source)?);
            total_size += io::copy(&mut reader, &mut zip)?;
            files_packed += 1;
            if files_packed % 1000 == 0 {
                info!("{} files packed...", files_packed);
            }
        }
        zip.finish()?;

        let stats = self.stats(files_packed, total_size, &zip_path, start)?;
        info!("{}", stats.summary());
        info!("output: {}", zip_path.display());
        Ok(stats)
    }

    /// Pack the release as tar + zstd, faster and tighter than ZIP.
    pub fn pack_tar_zstd(&self) -> Result<PackStats> {
        let start = Instant::now();
        let files = self.collect_files()?;
        fs::create_dir_all(&self.output_dir)?;

        let archive_path = self
            .output_dir
            .join(format!("{}.tar.zst", self.release_name));
        if archive_path.exists() {
            fs::remove_file(&archive_path)?;
        }

        let file = File::create(&archive_path)
            .with_context(|| format!("cannot create {}", archive_path.display()))?;
        let encoder = zstd::Encoder::new(file, 3)?;
        let mut tar = tar::Builder::new(encoder);

        let mut files_packed = 0usize;
        let mut total_size = 0u64;
        for (source, archive_name) in &files {
            total_size += fs::metadata(source)?.len();
            tar.append_path_with_name(source, archive_name)?;
            files_packed += 1;
            if files_packed % 1000 == 0 {
                info!("{} files packed...", files_packed);
            }
        }
        let encoder = tar.into_inner()?;
        encoder.finish()?;

        let stats = self.stats(files_packed, total_size, &archive_path, start)?;
        info!("{}", stats.summary());
        info!("output: {}", archive_path.display());
        Ok(stats)
    }

    fn stats(
        &self,
        files_packed: usize,
        total_size: u64,
        archive: &Path,
        start: Instant,
    ) -> Result<PackStats> {
        let compressed = fs::metadata(archive)?.len();
        Ok(PackStats {
            files_packed,
            total_size_bytes: total_size,
            compressed_size_bytes: compressed,
            duration_secs: start.elapsed().as_secs_f64(),
            compression_ratio: if total_size > 0 {
                compressed as f64 / total_size as f64
            } else {
                1.0
            },
        })
    }

    /// Resolve the file list: (source path, path inside the archive). The
    /// archive carries everything under a single release-name directory.
    fn collect_files(&self) -> Result<Vec<(PathBuf, String)>> {
        let include_dirs = [
            self.runtime_dir.as_str(),
            self.app_home.as_str(),
            self.docs_dir.as_str(),
        ];

        let mut errors = Vec::new();
        for dir in include_dirs {
            if !self.root.join(dir).is_dir() {
                errors.push(format!("directory not found: {}/", dir));
            }
        }
        for file in REQUIRED_FILES {
            if !self.root.join(file).is_file() {
                errors.push(format!("file not found: {}", file));
            }
        }
        if !errors.is_empty() {
            bail!("release is incomplete:\n  {}", errors.join("\n  "));
        }

        let patterns = self.exclusion_patterns();
        let mut files = Vec::new();

        for dir in include_dirs {
            for entry in WalkDir::new(self.root.join(dir))
                .into_iter()
                .filter_map(|e| e.ok())
            {
                if !entry.file_type().is_file() {
                    continue;
                }
                let relative = entry
                    .path()
                    .strip_prefix(&self.root)?
                    .to_string_lossy()
                    .replace('\\', "/");
                if should_exclude(&relative, &patterns) {
                    continue;
                }
                files.push((
                    entry.path().to_path_buf(),
                    format!("{}/{}", self.release_name, relative),
                ));
            }
        }

        for file in REQUIRED_FILES {
            files.push((
                self.root.join(file),
                format!("{}/{}", self.release_name, file),
            ));
        }
        for file in OPTIONAL_FILES {
            let path = self.root.join(file);
            if path.is_file() {
                files.push((path, format!("{}/{}", self.release_name, file)));
            } else {
                warn!("skipping missing optional file: {}", file);
            }
        }

        Ok(files)
    }

    /// Substring patterns for paths that never belong in a release: caches,
    /// VCS litter, user uploads, and the runtime's test/tooling ballast.
    fn exclusion_patterns(&self) -> Vec<String> {
        let runtime = &self.runtime_dir;
        let mut patterns: Vec<String> = [
            "__pycache__",
            ".pyc",
            ".pyo",
            ".egg-info",
            ".git",
            ".DS_Store",
            "Thumbs.db",
            ".pdb",
            ".dist-info",
        ]
        .iter()
        .map(|p| p.to_string())
        .collect();
        patterns.push(format!("{}/uploads", self.app_home));
        for ballast in [
            "Scripts",
            "Lib/test",
            "Lib/unittest",
            "Lib/site-packages/pip",
            "Lib/site-packages/setuptools",
            "share",
            "doc",
            "tcl",
            "tools",
        ] {
            patterns.push(format!("{}/{}", runtime, ballast));
        }
        patterns
    }
}

fn should_exclude(relative: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|pattern| relative.contains(pattern))
}
