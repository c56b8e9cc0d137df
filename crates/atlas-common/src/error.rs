//! Error types shared by every stage of the atlas pipeline.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Boxed error used as the `source` of wrapped failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type alias for atlas operations.
pub type Result<T> = std::result::Result<T, AtlasError>;

/// Main error type for atlas operations.
#[derive(Error, Debug)]
pub enum AtlasError {
    /// An input source could not be read or decoded.
    #[error("Source error ({}): {message}", .path.display())]
    Source {
        /// What went wrong.
        message: String,
        /// The source that failed.
        path: PathBuf,
        /// Underlying cause, if any.
        #[source]
        source: Option<BoxError>,
    },

    /// A value failed validation (date bounds, measures, settings).
    #[error("Validation error: {message}")]
    Validation {
        /// What went wrong.
        message: String,
        /// Name of the offending field.
        field: Option<String>,
    },

    /// Configuration loading errors.
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong.
        message: String,
        /// Underlying cause, if any.
        #[source]
        source: Option<BoxError>,
    },

    /// Message lookup or formatting failures.
    #[error("Localization error: {message}")]
    Localization {
        /// What went wrong.
        message: String,
        /// Locale that was active.
        locale: Option<String>,
    },

    /// A pipeline stage failed; wraps the stage's own error.
    #[error("Stage '{stage}' failed: {source}")]
    Stage {
        /// Name of the failing stage.
        stage: &'static str,
        /// The stage error.
        #[source]
        source: Box<AtlasError>,
    },

    /// I/O related errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AtlasError {
    /// Create a new source error.
    pub fn source_error(msg: impl Into<String>, path: impl AsRef<Path>) -> Self {
        Self::Source {
            message: msg.into(),
            path: path.as_ref().to_path_buf(),
            source: None,
        }
    }

    /// Create a new source error with an underlying cause.
    pub fn source_error_with(
        msg: impl Into<String>,
        path: impl AsRef<Path>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Source {
            message: msg.into(),
            path: path.as_ref().to_path_buf(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: None,
        }
    }

    /// Create a new validation error with field name.
    pub fn validation_field(msg: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new configuration error with source.
    pub fn config_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new localization error.
    pub fn localization(msg: impl Into<String>, locale: impl Into<String>) -> Self {
        Self::Localization {
            message: msg.into(),
            locale: Some(locale.into()),
        }
    }

    /// Wrap this error with the name of the stage that produced it.
    ///
    /// Wrapping is idempotent: an error already tagged with a stage keeps
    /// its original tag.
    #[must_use]
    pub fn in_stage(self, stage: &'static str) -> Self {
        match self {
            Self::Stage { .. } => self,
            other => Self::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// Name of the stage that failed, if this error was raised inside one.
    pub fn stage(&self) -> Option<&'static str> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// The innermost error, skipping stage wrappers.
    pub fn root(&self) -> &Self {
        match self {
            Self::Stage { source, .. } => source.root(),
            other => other,
        }
    }

    /// Whether the root error is a validation failure.
    pub fn is_validation(&self) -> bool {
        matches!(self.root(), Self::Validation { .. })
    }

    /// Whether the root error is a source failure.
    pub fn is_source(&self) -> bool {
        matches!(self.root(), Self::Source { .. })
    }
}
