//! Process-level output conventions.
//!
//! Change reports go to stdout, diagnostics to stderr (see
//! [`crate::logging`]), and the run ends with an [`ExitCode`].

pub mod exit_code;

pub use exit_code::ExitCode;
