//! Word vectors: loading, arithmetic, and exact similarity search.
//!
//! # Architecture
//! [`VectorStore`] owns the vocabulary and is read-only after load. The query
//! path parses an [`Expression`], evaluates it against the store, and ranks
//! every vocabulary entry by cosine distance with [`nearest`]. There is no
//! index: vocabularies of a few hundred thousand words scan in milliseconds.
//!
//! Clustering is expressed through the [`Clusterer`] trait so callers can
//! swap in any partitioning algorithm; [`KMeansClusterer`] is the default.

mod clustering;
mod expression;
mod similarity;
mod store;
mod types;

// Re-export core types for public API
pub use clustering::{
    Clusterer, ClusteringError, KMeansClusterer, KMeansConfig, KMeansResult,
    assign_to_nearest_centroid, cosine_similarity, kmeans_clustering,
};
pub use expression::{Expression, Operator};
pub use similarity::{cosine_distance, nearest, nearest_to_expression};
pub use store::VectorStore;
pub use types::{MAX_COSINE_DISTANCE, RankedMatch, VectorDimension, WordId};
