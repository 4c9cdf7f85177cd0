//! Configuration module for the health advisor.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file (`.health-advisor/settings.toml`)
//! - Environment variable overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `HA_` and use double underscores
//! to separate nested levels:
//! - `HA_KNOWLEDGE__TOP_K=3` sets `knowledge.top_k`
//! - `HA_EMBEDDING__BACKEND=hashed` sets `embedding.backend`
//! - `HA_EXPORT__DIRECTORY=plans` sets `export.directory`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory holding settings and the default knowledge index.
pub const CONFIG_DIR: &str = ".health-advisor";

const SETTINGS_FILE: &str = "settings.toml";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Global debug mode
    #[serde(default)]
    pub debug: bool,

    /// Knowledge base settings
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Embedding provider settings
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Plan export settings
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct KnowledgeConfig {
    /// Directory of the persisted knowledge index
    #[serde(default = "default_index_path")]
    pub index_path: PathBuf,

    /// Documents retrieved per plan
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

/// Which embedding provider backs the knowledge store.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Local ONNX model via fastembed
    #[default]
    Fastembed,
    /// Deterministic feature hashing, no model download
    Hashed,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub backend: EmbeddingBackend,

    /// fastembed model name
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Vector dimension for the hashed backend
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Where fastembed caches downloaded models
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    #[serde(default = "default_true")]
    pub show_download_progress: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ExportConfig {
    /// Directory exported plans are written to
    #[serde(default = "default_export_directory")]
    pub directory: PathBuf,

    /// File name prefix, followed by a timestamp
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

fn default_version() -> u32 {
    1
}
fn default_index_path() -> PathBuf {
    PathBuf::from(CONFIG_DIR).join("knowledge")
}
fn default_top_k() -> usize {
    crate::retrieve::DEFAULT_TOP_K
}
fn default_true() -> bool {
    true
}
fn default_embedding_model() -> String {
    "BGESmallENV15".to_string()
}
fn default_dimension() -> usize {
    crate::knowledge::DEFAULT_HASHED_DIMENSION
}
fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("health-advisor").join("models"))
        .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join("models"))
}
fn default_export_directory() -> PathBuf {
    PathBuf::from(".")
}
fn default_file_prefix() -> String {
    "health_plan".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            debug: false,
            knowledge: KnowledgeConfig::default(),
            embedding: EmbeddingConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            index_path: default_index_path(),
            top_k: default_top_k(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::default(),
            model: default_embedding_model(),
            dimension: default_dimension(),
            cache_dir: default_cache_dir(),
            show_download_progress: true,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: default_export_directory(),
            file_prefix: default_file_prefix(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources
    ///
    /// Relative paths resolve against the workspace root, the nearest
    /// ancestor holding a `.health-advisor` directory, or the current
    /// directory when there is none.
    pub fn load() -> Result<Self, Box<figment::Error>> {
        match std::env::current_dir() {
            Ok(current) => Self::load_in(&current),
            Err(_) => Self::load_from(PathBuf::from(CONFIG_DIR).join(SETTINGS_FILE)),
        }
    }

    /// Load configuration as if started from `start`
    pub fn load_in(start: &Path) -> Result<Self, Box<figment::Error>> {
        let root = Self::workspace_root(start).unwrap_or_else(|| start.to_path_buf());
        let mut settings = Self::load_from(root.join(CONFIG_DIR).join(SETTINGS_FILE))?;
        settings.resolve_paths(&root);
        Ok(settings)
    }

    /// Load a specific settings file; relative paths resolve against its workspace
    pub fn load_file(path: &Path) -> Result<Self, Box<figment::Error>> {
        let mut settings = Self::load_from(path)?;
        let dir = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let dir = std::path::absolute(dir).unwrap_or_else(|_| dir.to_path_buf());
        let root = Self::workspace_root(&dir).unwrap_or(dir);
        settings.resolve_paths(&root);
        Ok(settings)
    }

    /// Load configuration from a specific file, still honoring `HA_` overrides
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            // Double underscore separates nested levels, single underscore stays in field names
            .merge(Env::prefixed("HA_").map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
            .extract()
            .map_err(Box::new)
    }

    /// Get the workspace root directory (where `.health-advisor` is located),
    /// searching from `start` up to the filesystem root
    pub fn workspace_root(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .find(|ancestor| ancestor.join(CONFIG_DIR).is_dir())
            .map(Path::to_path_buf)
    }

    /// Anchor relative index and export paths at `root`
    pub fn resolve_paths(&mut self, root: &Path) {
        if self.knowledge.index_path.is_relative() {
            self.knowledge.index_path = root.join(&self.knowledge.index_path);
        }
        if self.export.directory.is_relative() {
            self.export.directory = root.join(&self.export.directory);
        }
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        std::fs::create_dir_all(parent)?;

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Render the effective settings as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Create a default settings file in the current directory
    pub fn init_config_file(force: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
        Self::init_config_file_in(Path::new("."), force)
    }

    /// Create a commented default settings file under `root/.health-advisor/`
    pub fn init_config_file_in(
        root: &Path,
        force: bool,
    ) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = root.join(CONFIG_DIR).join(SETTINGS_FILE);

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let defaults = Settings::default();
        let template = format!(
            r#"# Health Advisor Configuration File

# Version of the configuration schema
version = 1

# Verbose (debug-level) logging
debug = false

[knowledge]
# Where the embedded guidance corpus is persisted
index_path = '{index_path}'

# Number of guidance documents retrieved per plan
top_k = {top_k}

[embedding]
# "fastembed" downloads and runs a local model
# "hashed" needs no download but ranks by word overlap only
backend = "fastembed"

# fastembed model: BGESmallENV15, BGEBaseENV15, AllMiniLML6V2, AllMiniLML12V2
model = "{model}"

# Vector dimension for the hashed backend
dimension = {dimension}

# Model download cache
cache_dir = '{cache_dir}'

show_download_progress = true

[export]
# Directory exported plans are written to
directory = "."

# Exported files are named <prefix>_<YYYYmmddHHMMSS>.txt
file_prefix = "{file_prefix}"
"#,
            index_path = defaults.knowledge.index_path.display(),
            top_k = defaults.knowledge.top_k,
            model = defaults.embedding.model,
            dimension = defaults.embedding.dimension,
            cache_dir = defaults.embedding.cache_dir.display(),
            file_prefix = defaults.export.file_prefix,
        );

        std::fs::write(&config_path, template)?;
        tracing::info!("Wrote configuration to {}", config_path.display());

        Ok(config_path)
    }
}
