//! Configuration module for glovebox.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `GB_` and use double underscores
//! to separate nested levels:
//! - `GB_NUM_WORDS=50000` sets `num_words`
//! - `GB_CLUSTERING__NUM_CLUSTERS=500` sets `clustering.num_clusters`
//! - `GB_GAME__SOFT_SCORE=true` sets `game.soft_score`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::game::{DEFAULT_WINNING_SCORE, ScoringMode};
use crate::vector::KMeansConfig;

/// Directory searched for `settings.toml`.
pub const CONFIG_DIR: &str = ".glovebox";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Directory holding the GloVe files (`glove.6B.<dim>d.txt`)
    #[serde(default = "default_glove_dir")]
    pub glove_dir: PathBuf,

    /// Explicit embedding file, overrides `glove_dir` and `vector_dim`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vectors_file: Option<PathBuf>,

    /// GloVe vector dimension (50, 100, 200 or 300)
    #[serde(default = "default_vector_dim")]
    pub vector_dim: usize,

    /// Number of lines to read from the embedding file
    #[serde(default = "default_num_words")]
    pub num_words: usize,

    /// Directory for cached cluster partitions
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Clustering configuration
    #[serde(default)]
    pub clustering: ClusteringConfig,

    /// Query configuration
    #[serde(default)]
    pub query: QueryConfig,

    /// Word game configuration
    #[serde(default)]
    pub game: GameConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ClusteringConfig {
    /// Number of clusters (the K in K-means)
    #[serde(default = "default_num_clusters")]
    pub num_clusters: usize,

    /// K-means tuning
    #[serde(flatten)]
    pub kmeans: KMeansConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct QueryConfig {
    /// Number of nearest words to show
    #[serde(default = "default_num_results")]
    pub num_results: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GameConfig {
    /// Score by distance instead of one point per round
    #[serde(default = "default_false")]
    pub soft_score: bool,

    /// Score needed to win
    #[serde(default = "default_winning_score")]
    pub winning_score: u32,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_glove_dir() -> PathBuf {
    PathBuf::from("data/glove")
}
fn default_vector_dim() -> usize {
    100
}
fn default_num_words() -> usize {
    10_000
}
fn default_cache_dir() -> PathBuf {
    PathBuf::from("data/cache")
}
fn default_num_clusters() -> usize {
    1_000
}
fn default_num_results() -> usize {
    10
}
fn default_false() -> bool {
    false
}
fn default_winning_score() -> u32 {
    DEFAULT_WINNING_SCORE
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            glove_dir: default_glove_dir(),
            vectors_file: None,
            vector_dim: default_vector_dim(),
            num_words: default_num_words(),
            cache_dir: default_cache_dir(),
            clustering: ClusteringConfig::default(),
            query: QueryConfig::default(),
            game: GameConfig::default(),
        }
    }
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            num_clusters: default_num_clusters(),
            kmeans: KMeansConfig::default(),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            num_results: default_num_results(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            soft_score: false,
            winning_score: default_winning_score(),
        }
    }
}

impl GameConfig {
    pub fn scoring_mode(&self) -> ScoringMode {
        if self.soft_score {
            ScoringMode::Soft
        } else {
            ScoringMode::Hard
        }
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join("settings.toml"));
        Self::load_from(config_path)
    }

    /// Load configuration from a specific file, still honouring `GB_` overrides
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Settings::default()))
            // Layer in config file if it exists
            .merge(Toml::file(path.as_ref()))
            // Double underscore separates nested levels,
            // single underscore stays within field names
            .merge(Env::prefixed("GB_").map(|key| {
                key.as_str()
                    .to_lowercase()
                    .replace("__", ".")
                    .into()
            }))
            .extract()
            .map_err(Box::new)
    }

    /// Find the config file by looking for a .glovebox directory
    /// from the current directory up to root
    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        for ancestor in current.ancestors() {
            let config_dir = ancestor.join(CONFIG_DIR);
            if config_dir.is_dir() {
                return Some(config_dir.join("settings.toml"));
            }
        }

        None
    }

    /// Check whether a settings file exists anywhere above the current directory.
    pub fn check_init() -> Result<(), String> {
        match Self::find_workspace_config() {
            Some(path) if path.exists() => Ok(()),
            Some(path) => Err(format!(
                "Found {CONFIG_DIR} directory but no settings file at {}. Run 'glovebox init' to create it",
                path.display()
            )),
            None => Err(format!(
                "No {CONFIG_DIR}/settings.toml found. Run 'glovebox init' to create one"
            )),
        }
    }

    /// Path of the embedding file to load.
    pub fn vectors_path(&self) -> PathBuf {
        match &self.vectors_file {
            Some(path) => path.clone(),
            None => self
                .glove_dir
                .join(format!("glove.6B.{}d.txt", self.vector_dim)),
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

    /// Create a default settings file with helpful comments
    pub fn init_config_file(
        dir: impl AsRef<Path>,
        force: bool,
    ) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = dir.as_ref().join(CONFIG_DIR).join("settings.toml");

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let defaults = Settings::default();
        let template = format!(
            r#"# glovebox configuration file

# Version of the configuration schema
version = {version}

# Directory holding glove.6B.<vector_dim>d.txt
glove_dir = "{glove_dir}"

# Or point at a specific embedding file instead
# vectors_file = "data/glove/glove.840B.300d.txt"

# GloVe vector dimension: 50, 100, 200 or 300
vector_dim = {vector_dim}

# Number of lines to read from the embedding file
num_words = {num_words}

# Where clustering results are cached
cache_dir = "{cache_dir}"

[clustering]
# Number of resulting word clusters (the K in K-means)
num_clusters = {num_clusters}

# K-means restarts; the run with the lowest inertia is kept
n_init = {n_init}

# Maximum iterations per restart
max_iterations = {max_iterations}

# Stop when centroids move less than this (mean cosine distance)
tolerance = {tolerance}

# Worker threads for the assignment step
threads = {threads}

# Fix the random seed for reproducible clusters
# seed = 42

[query]
# Number of nearest words to show
num_results = {num_results}

[game]
# Score by distance to the computer's answer instead of one point per round
soft_score = false

# Score needed to win
winning_score = {winning_score}
"#,
            version = defaults.version,
            glove_dir = defaults.glove_dir.display(),
            vector_dim = defaults.vector_dim,
            num_words = defaults.num_words,
            cache_dir = defaults.cache_dir.display(),
            num_clusters = defaults.clustering.num_clusters,
            n_init = defaults.clustering.kmeans.n_init,
            max_iterations = defaults.clustering.kmeans.max_iterations,
            tolerance = defaults.clustering.kmeans.tolerance,
            threads = defaults.clustering.kmeans.threads,
            num_results = defaults.query.num_results,
            winning_score = defaults.game.winning_score,
        );

        std::fs::write(&config_path, template)?;
        Ok(config_path)
    }
}
