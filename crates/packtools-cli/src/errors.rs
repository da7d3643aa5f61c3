//! Error types for the packtools CLI application.
//!
//! Library, file system, pattern and JSON failures are wrapped transparently so the
//! underlying message reaches the user unchanged. Two variants are specific to the front end:
//! a missing expected-metadata file for `validate`, and a failed `check`.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during CLI operations.
#[derive(Error, Debug)]
pub enum PacktoolsCliError {
  /// Errors from the underlying packtools library
  #[error(transparent)]
  Packtools(#[from] packtools::errors::PacktoolsError),

  /// File system and IO operation errors
  #[error(transparent)]
  IO(#[from] std::io::Error),

  /// Glob pattern matching errors
  #[error(transparent)]
  Glob(#[from] glob::PatternError),

  /// Reading the expected metadata or writing results failed
  #[error(transparent)]
  Json(#[from] serde_json::Error),

  /// No expected journal metadata was given and none exists at the default location
  #[error("no expected journal metadata at {}; pass --expected <FILE>", .0.display())]
  ExpectedNotFound(PathBuf),

  /// `check` found structural problems
  #[error("{} failed structure validation", .0.display())]
  InvalidPackage(PathBuf),
}
