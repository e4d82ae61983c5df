//! Error types for glovebox
//!
//! This module provides structured error types using thiserror for better
//! error handling and actionable error messages.

use std::path::PathBuf;
use thiserror::Error;

use crate::vector::ClusteringError;

/// Errors raised while loading an embedding source. All of them abort startup.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read embeddings from '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Embedding source contains no records")]
    Empty,

    #[error("Record for '{word}' on line {line} has no vector components")]
    ZeroDimension { line: usize, word: String },

    #[error(
        "Malformed record for '{word}' on line {line}: expected {expected} components, found {actual}"
    )]
    MalformedRecord {
        line: usize,
        word: String,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid number '{token}' for '{word}' on line {line}")]
    InvalidNumber {
        line: usize,
        word: String,
        token: String,
    },

    #[error("Duplicate word '{word}' on line {line} (first seen on line {first_line})")]
    DuplicateWord {
        line: usize,
        first_line: usize,
        word: String,
    },
}

impl LoadError {
    /// Get a stable status code for this error type.
    pub fn status_code(&self) -> String {
        match self {
            Self::Io { .. } => "LOAD_IO_ERROR",
            Self::Empty => "LOAD_EMPTY_SOURCE",
            Self::ZeroDimension { .. } => "LOAD_ZERO_DIMENSION",
            Self::MalformedRecord { .. } => "LOAD_MALFORMED_RECORD",
            Self::InvalidNumber { .. } => "LOAD_INVALID_NUMBER",
            Self::DuplicateWord { .. } => "LOAD_DUPLICATE_WORD",
        }
        .to_string()
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::Io { .. } => vec![
                "Check that the GloVe file exists (default: data/glove/glove.6B.<D>d.txt)",
                "Set glove_dir or vectors_file in .glovebox/settings.toml",
            ],
            Self::Empty | Self::ZeroDimension { .. } => {
                vec!["Each line must be '<word> <f1> ... <fD>' with no header line"]
            }
            Self::MalformedRecord { .. } | Self::InvalidNumber { .. } => vec![
                "The embedding file may be truncated or corrupted; re-download it",
                "Make sure --vector-dim matches the file being read",
            ],
            Self::DuplicateWord { .. } => {
                vec!["Deduplicate the embedding file; every word must appear once"]
            }
        }
    }
}

/// Errors in a word arithmetic expression such as `king - man + woman`.
///
/// Positions are zero-based token indices.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Expression is empty")]
    Empty,

    #[error("Expression cannot start with operator '{operator}'")]
    LeadingOperator { operator: String },

    #[error("Operator '{operator}' at token {position} follows another operator")]
    ConsecutiveOperators { position: usize, operator: String },

    #[error("Operator '{operator}' at token {position} has no operand")]
    MissingOperand { position: usize, operator: String },

    #[error("Expected '+' or '-' before '{word}' at token {position}")]
    MissingOperator { position: usize, word: String },

    #[error("Unknown operator '{operator}' at token {position}; only '+' and '-' are supported")]
    UnknownOperator { position: usize, operator: String },
}

/// Errors raised on the query path. None of them touch the vector store.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("'{word}' not found in the vocabulary")]
    UnknownWord { word: String },

    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

impl QueryError {
    /// Get a stable status code for this error type.
    pub fn status_code(&self) -> String {
        match self {
            Self::Parse(_) => "PARSE_ERROR",
            Self::UnknownWord { .. } => "UNKNOWN_WORD",
            Self::InvalidArgument { .. } => "INVALID_ARGUMENT",
            Self::DimensionMismatch { .. } => "DIMENSION_MISMATCH",
        }
        .to_string()
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::Parse(_) => vec!["Write expressions as 'word [+|- word]...', e.g. 'king - man + woman'"],
            Self::UnknownWord { .. } => vec![
                "Try another word, or load more of the vocabulary with --num-words",
                "GloVe 6B vocabularies are lowercase",
            ],
            _ => vec![],
        }
    }
}

/// Errors reading or writing persisted cluster partitions.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache io error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid cache file '{path}': {details}")]
    Format { path: PathBuf, details: String },
}

impl CacheError {
    pub fn io(path: PathBuf, source: std::io::Error) -> Self {
        Self::Io { path, source }
    }

    pub fn format(path: PathBuf, details: impl Into<String>) -> Self {
        Self::Format {
            path,
            details: details.into(),
        }
    }

    /// Stable code for programmatic handling in JSON responses
    pub fn status_code(&self) -> String {
        match self {
            Self::Io { .. } => "CACHE_IO",
            Self::Format { .. } => "CACHE_INVALID",
        }
        .to_string()
    }

    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::Io { .. } => vec![
                "Ensure the cache directory exists and is writable",
                "Check disk space and permissions",
            ],
            Self::Format { .. } => vec!["Delete the cache file to force the clusters to be recomputed"],
        }
    }
}

/// Errors from the cluster cache layer.
#[derive(Error, Debug)]
pub enum ClusterError {
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("Clusterer '{clusterer}' failed: {source}")]
    Clustering {
        clusterer: String,
        #[source]
        source: ClusteringError,
    },

    #[error("Clusterer '{clusterer}' returned an invalid assignment: {reason}")]
    InvalidAssignment { clusterer: String, reason: String },
}

impl ClusterError {
    pub fn status_code(&self) -> String {
        match self {
            Self::InvalidArgument { .. } => "INVALID_ARGUMENT",
            Self::Clustering { .. } => "CLUSTERING_FAILED",
            Self::InvalidAssignment { .. } => "INVALID_ASSIGNMENT",
        }
        .to_string()
    }

    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::InvalidArgument { .. } => vec![
                "Pick a cluster count between 1 and --num-words",
            ],
            Self::Clustering { .. } => vec![
                "Try fewer clusters or more words",
                "Set clustering.threads = 1 if the thread pool cannot start",
            ],
            Self::InvalidAssignment { .. } => vec![],
        }
    }
}

/// Errors setting up or playing the word game.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("At least one player is required")]
    NoPlayers,

    #[error("Player names cannot be empty")]
    EmptyName,

    #[error("Player '{0}' was entered twice")]
    DuplicatePlayer(String),

    #[error("Winning score must be greater than zero")]
    InvalidWinningScore,

    #[error("No answer recorded for player '{0}'")]
    MissingAnswer(String),
}

/// Result type alias for load operations
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type alias for query operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Result type alias for cache store operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Result type alias for cluster cache operations
pub type ClusterResult<T> = Result<T, ClusterError>;
