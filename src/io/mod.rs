//! Process-level I/O conventions for the CLI.

pub mod exit_code;
pub mod report;

pub use exit_code::ExitCode;
pub use report::ErrorReport;
