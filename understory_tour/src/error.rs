// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for catalog construction, persistence, and configuration.
//!
//! None of these reach the host through a tour command. Catalog and config
//! errors surface while the host builds a tour; store errors are absorbed by
//! the [bridge](crate::bridge) and logged.

use std::path::PathBuf;

/// Step catalog validation errors.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// A tour needs at least one step.
    #[error("Step catalog is empty")]
    Empty,

    /// Two steps share an identifier.
    #[error("Duplicate step id: {0}")]
    DuplicateId(String),

    /// An action-gated step has no trigger, so it could only ever be skipped.
    #[error("Step {0} is action-gated but has no trigger")]
    MissingTrigger(String),

    /// The catalog JSON could not be parsed.
    #[error("Failed to parse step catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Completion store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Storage is disabled or otherwise unreachable.
    #[error("Completion store unavailable")]
    Unavailable,

    /// Reading or writing the backing file failed.
    #[error("Completion store IO error at {path}: {source}")]
    Io {
        /// Backing file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The backing file is not a JSON object of flags.
    #[error("Completion store at {path} is corrupt: {source}")]
    Corrupt {
        /// Backing file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration JSON could not be parsed.
    #[error("Failed to parse tour configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of range.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Offending field.
        key: &'static str,
        /// What is wrong with it.
        message: String,
    },
}
