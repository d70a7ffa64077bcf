//! gh-autocommit - keeps a GitHub repository updated on a timer
//!
//! The library prompts for a token and repository name, makes sure the
//! repository exists, clones it and then appends to its README, commits and
//! pushes at a fixed interval until stopped.

#![allow(clippy::uninlined_format_args)] // Style preference
#![allow(clippy::return_self_not_must_use)] // Builder pattern is clear enough

pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod git;
pub mod host;
pub mod logger;
pub mod notify;
pub mod prompt;
pub mod remote;
pub mod repo_name;
pub mod session;
pub mod tick;
pub mod ui;

// Re-export important structs and functions for easier testing
pub use config::Config;
pub use controller::{AutoCommitController, ControllerStatus};
pub use error::AutoCommitError;
pub use repo_name::{RepoName, is_valid_repo_name};
pub use session::Session;
