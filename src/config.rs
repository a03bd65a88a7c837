use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::embed::hash::DEFAULT_DIMENSIONS;
use crate::error::MemoryMapError;
use crate::index::Metric;
use crate::search::rank::RankConfig;
use crate::store::loader::LoadPolicy;

const CONFIG_DIR: &str = ".memorymap";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub embed: EmbedConfig,
    pub search: SearchConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// CSV file with the memories, relative to the project root unless absolute
    pub path: PathBuf,
    pub policy: LoadPolicy,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedConfig {
    pub backend: EmbedBackend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EmbedBackend {
    #[serde(rename = "hash")]
    Hash { dimensions: usize },
    #[serde(rename = "ollama")]
    Ollama { model: String, url: String },
}

/// Ranking and index settings, fixed for a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Minimum similarity in [0, 1] for a memory to be returned
    pub similarity_threshold: f64,
    /// How many of the top results get highlighted
    pub top_n: usize,
    /// Overall cap on returned results (unset = collection size)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<usize>,
    pub distance_metric: Metric,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// tracing filter directive; RUST_LOG takes precedence
    pub level: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("memories.csv"),
            policy: LoadPolicy::SkipInvalid,
        }
    }
}

impl Default for EmbedBackend {
    fn default() -> Self {
        EmbedBackend::Hash {
            dimensions: DEFAULT_DIMENSIONS,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        let rank = RankConfig::default();
        Self {
            similarity_threshold: 0.3,
            top_n: rank.top_n,
            max_results: rank.max_results,
            distance_metric: Metric::InnerProduct,
        }
    }
}

impl SearchConfig {
    pub fn rank_config(&self) -> RankConfig {
        RankConfig {
            similarity_threshold: self.similarity_threshold as f32,
            top_n: self.top_n,
            max_results: self.max_results,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
        }
    }
}

impl Config {
    /// Load config from a .memorymap/config.toml file, falling back to defaults.
    pub fn load(project_root: &Path) -> Result<Self> {
        let config_path = Self::config_path(project_root);
        if config_path.exists() {
            Self::from_file(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("parsing config from {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("validating config from {}", path.display()))?;
        Ok(config)
    }

    pub fn config_path(project_root: &Path) -> PathBuf {
        project_root.join(CONFIG_DIR).join("config.toml")
    }

    /// Resolve the memories file against the project root.
    pub fn data_path(&self, project_root: &Path) -> PathBuf {
        if self.data.path.is_absolute() {
            self.data.path.clone()
        } else {
            project_root.join(&self.data.path)
        }
    }

    pub fn validate(&self) -> crate::error::Result<()> {
        self.search.rank_config().validate()?;
        if let EmbedBackend::Hash { dimensions: 0 } = self.embed.backend {
            return Err(MemoryMapError::config("embed.backend.dimensions must be at least 1"));
        }
        Ok(())
    }

    /// Write current config to disk (for `memorymap init`).
    pub fn save(&self, project_root: &Path) -> Result<PathBuf> {
        let config_path = Self::config_path(project_root);
        if let Some(dir) = config_path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating config dir {}", dir.display()))?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, contents)
            .with_context(|| format!("writing config to {}", config_path.display()))?;
        Ok(config_path)
    }
}
