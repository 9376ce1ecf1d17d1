//! Error types for javaforge.
//!
//! This module provides the unified error type (`ForgeError`) shared by the
//! environment, the type index and the generation framework.
//!
//! ## Design
//!
//! - **Unified type**: `ForgeError` is the single error type on the public API
//! - **Misses are not errors**: `find_type` returns `Ok(None)` for unknown
//!   types; only the `require_*` variants produce `TypeNotFound`
//! - **Configuration errors fail before output**: generator validation runs
//!   before any source text is produced
//! - **Aggregates**: batch task failures are collected into `Composite`,
//!   cancellation is benign and excluded

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for environment, index and generation operations.
#[derive(Debug, Error)]
pub enum ForgeError {
    /// A required type was not found on the classpath.
    #[error("type not found on classpath: {fqn}")]
    TypeNotFound { fqn: String },

    /// A query was issued against an environment that has been closed.
    #[error("environment is closed")]
    EnvironmentClosed,

    /// A generator tree is not renderable (e.g. missing element name).
    #[error("invalid generator: {message}")]
    InvalidGenerator { message: String },

    /// The environment builder was configured with an unusable value, e.g.
    /// an exclude pattern that is not a valid regex.
    #[error("invalid configuration: {message}")]
    Config { message: String },

    /// A compilation unit could not be parsed at declaration level.
    #[error("parse error in {unit}: {message}")]
    Parse { unit: String, message: String },

    /// A class file could not be decoded.
    #[error("malformed class file {unit}: {message}")]
    ClassFile { unit: String, message: String },

    /// An archive entry could not be read.
    #[error("archive error in {}: {message}", path.display())]
    Archive { path: PathBuf, message: String },

    /// A background task terminated without producing a result, e.g. by
    /// panicking or by being cancelled before completion.
    #[error("task failed: {message}")]
    Task { message: String },

    /// Aggregate failure of a batch of tasks. Holds every nested failure;
    /// cancelled tasks are not included.
    #[error("{}", format_composite(errors))]
    Composite { errors: Vec<ForgeError> },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl ForgeError {
    /// Shorthand for an `InvalidGenerator` error.
    pub fn invalid_generator(message: impl Into<String>) -> Self {
        ForgeError::InvalidGenerator {
            message: message.into(),
        }
    }

    /// The nested failures of a `Composite`, or an empty slice.
    pub fn nested(&self) -> &[ForgeError] {
        match self {
            ForgeError::Composite { errors } => errors,
            _ => &[],
        }
    }
}

fn format_composite(errors: &[ForgeError]) -> String {
    let mut out = String::from("composite failure with nested errors: [");
    for (i, e) in errors.iter().enumerate() {
        if i > 0 {
            out.push_str("; ");
        }
        out.push_str(&e.to_string());
    }
    out.push(']');
    out
}

/// Result alias used across the crate.
pub type ForgeResult<T> = Result<T, ForgeError>;

/// Builds a `Parse` error carrying the display form of the offending unit.
pub(crate) fn parse_error(unit: impl fmt::Display, message: impl Into<String>) -> ForgeError {
    ForgeError::Parse {
        unit: unit.to_string(),
        message: message.into(),
    }
}
