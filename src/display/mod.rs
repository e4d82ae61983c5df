//! Terminal rendering for the CLI.
//!
//! Tables for ranked matches and clusters, spinners for slow loads, and a
//! colour theme that switches itself off when stdout is not a terminal.

pub mod progress;
pub mod tables;
pub mod theme;

pub use progress::{create_spinner, with_spinner};
pub use tables::{TableBuilder, create_cache_table, create_cluster_table, create_match_table};
pub use theme::{THEME, Theme};
