//! Exit codes for CLI operations following Unix conventions.
//!
//! # Exit Code Semantics
//!
//! - `0`: Success
//! - `1`: General error
//! - `2`: Blocking error, nothing further can run (e.g. the vocabulary failed to load)
//! - `3-125`: Specific recoverable errors
//! - `126-255`: Reserved by shell

use crate::error::{CacheError, ClusterError, LoadError, QueryError};

/// Standard exit codes for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Operation succeeded (code 0)
    Success = 0,

    /// Unspecified error occurred (code 1)
    GeneralError = 1,

    /// The vocabulary could not be loaded (code 2)
    BlockingError = 2,

    /// A word is not in the vocabulary (code 3)
    NotFound = 3,

    /// The expression did not parse (code 4)
    ParseError = 4,

    /// File I/O error (code 5)
    IoError = 5,

    /// Configuration error (code 6)
    ConfigError = 6,

    /// An argument was out of range (code 7)
    InvalidArgument = 7,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl ExitCode {
    /// Every load failure blocks: no command can run without a vocabulary.
    pub fn from_load_error(error: &LoadError) -> Self {
        match error {
            LoadError::Io { .. } => ExitCode::IoError,
            _ => ExitCode::BlockingError,
        }
    }

    pub fn from_query_error(error: &QueryError) -> Self {
        match error {
            QueryError::Parse(_) => ExitCode::ParseError,
            QueryError::UnknownWord { .. } => ExitCode::NotFound,
            QueryError::InvalidArgument { .. } | QueryError::DimensionMismatch { .. } => {
                ExitCode::InvalidArgument
            }
        }
    }

    pub fn from_cluster_error(error: &ClusterError) -> Self {
        match error {
            ClusterError::InvalidArgument { .. } => ExitCode::InvalidArgument,
            ClusterError::Clustering { .. } | ClusterError::InvalidAssignment { .. } => {
                ExitCode::GeneralError
            }
        }
    }

    /// Picks the code for an error bubbled up through `anyhow`.
    pub fn from_anyhow(error: &anyhow::Error) -> Self {
        if let Some(e) = error.downcast_ref::<LoadError>() {
            Self::from_load_error(e)
        } else if let Some(e) = error.downcast_ref::<QueryError>() {
            Self::from_query_error(e)
        } else if let Some(e) = error.downcast_ref::<ClusterError>() {
            Self::from_cluster_error(e)
        } else if error.downcast_ref::<CacheError>().is_some() {
            ExitCode::IoError
        } else if error.downcast_ref::<figment::Error>().is_some() {
            ExitCode::ConfigError
        } else if error.downcast_ref::<std::io::Error>().is_some() {
            ExitCode::IoError
        } else {
            ExitCode::GeneralError
        }
    }

    pub fn description(&self) -> &str {
        match self {
            ExitCode::Success => "Success",
            ExitCode::GeneralError => "General error",
            ExitCode::BlockingError => "Blocking error - vocabulary unavailable",
            ExitCode::NotFound => "Word not found",
            ExitCode::ParseError => "Expression parse error",
            ExitCode::IoError => "I/O error",
            ExitCode::ConfigError => "Configuration error",
            ExitCode::InvalidArgument => "Invalid argument",
        }
    }
}
