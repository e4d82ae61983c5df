//! What the CLI prints when a command fails.

use super::ExitCode;
use crate::error::{CacheError, ClusterError, LoadError, QueryError};

/// Exit code, stable status code and recovery hints for a failed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub exit_code: ExitCode,
    /// e.g. `UNKNOWN_WORD`; `None` for errors from outside the crate
    pub status: Option<String>,
    pub suggestions: Vec<&'static str>,
}

impl ErrorReport {
    pub fn from_anyhow(error: &anyhow::Error) -> Self {
        let (status, suggestions) = if let Some(e) = error.downcast_ref::<LoadError>() {
            (Some(e.status_code()), e.recovery_suggestions())
        } else if let Some(e) = error.downcast_ref::<QueryError>() {
            (Some(e.status_code()), e.recovery_suggestions())
        } else if let Some(e) = error.downcast_ref::<ClusterError>() {
            (Some(e.status_code()), e.recovery_suggestions())
        } else if let Some(e) = error.downcast_ref::<CacheError>() {
            (Some(e.status_code()), e.recovery_suggestions())
        } else {
            (None, Vec::new())
        };

        Self {
            exit_code: ExitCode::from_anyhow(error),
            status,
            suggestions,
        }
    }

    /// `message [STATUS]`, or just the message.
    pub fn headline(&self, error: &anyhow::Error) -> String {
        match &self.status {
            Some(status) => format!("{error:#} [{status}]"),
            None => format!("{error:#}"),
        }
    }
}
