//! glovebox: word arithmetic and cached clustering over GloVe embeddings.
//!
//! Load a vocabulary with [`VectorStore::load_file`], answer
//! `king - man + woman` style queries with [`nearest_to_expression`], and
//! partition the vocabulary with [`ClusterCache::get_or_compute`], which only
//! runs the [`Clusterer`] when no partition for the same parameters has been
//! stored before.

pub mod cluster;
pub mod config;
pub mod display;
pub mod error;
pub mod game;
pub mod io;
pub mod vector;

// Explicit exports for better API clarity
pub use cluster::{
    CacheKey, CacheSource, CacheStore, ClusterCache, ClusterOutcome, ClusterPartition,
    JsonCacheStore, MemoryCacheStore,
};
pub use config::Settings;
pub use error::{
    CacheError, CacheResult, ClusterError, ClusterResult, GameError, LoadError, LoadResult,
    ParseError, QueryError, QueryResult,
};
pub use game::{GameState, ScoringMode, parse_players};
pub use vector::{
    Clusterer, Expression, KMeansClusterer, KMeansConfig, RankedMatch, VectorStore, WordId,
    cosine_distance, nearest, nearest_to_expression,
};
