//! Error types for kubegen-core

use std::path::PathBuf;

use crate::document::ShapeError;

/// Result type for kubegen-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Underlying cause of an encode or decode failure
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The document parsed but does not have the expected structure.
    #[error(transparent)]
    Shape(#[from] ShapeError),

    /// No registered schema version serves the object's kind.
    #[error("{0}")]
    Version(String),
}

/// Errors that can occur in kubegen-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("kubegen/format: no serializer registered for {content_type:?}")]
    UnsupportedFormat { content_type: String },

    #[error("kubegen/{component}: error encoding {what} to {content_type:?}: {source}")]
    Encode {
        component: &'static str,
        what: String,
        content_type: String,
        #[source]
        source: CodecError,
    },

    #[error("kubegen/{component}: error decoding {content_type:?}: {source}")]
    Decode {
        component: &'static str,
        content_type: String,
        #[source]
        source: CodecError,
    },

    #[error("kubegen/partition: error writing to file {filename:?}: {source}")]
    Write {
        filename: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("kubegen/partition: no filename rule for kind {kind:?} (object {name:?})")]
    UnknownDiscriminator { kind: String, name: String },

    #[error("kubegen/partition: {kind} name {name:?} cannot be used in a filename: {reason}")]
    InvalidName {
        kind: String,
        name: String,
        reason: &'static str,
    },

    #[error("kubegen/partition: {filename:?} is already produced by object #{first}")]
    DuplicateFilename { filename: String, first: usize },
}

impl Error {
    pub fn unsupported(content_type: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            content_type: content_type.into(),
        }
    }

    pub fn encode(
        component: &'static str,
        what: impl Into<String>,
        content_type: impl Into<String>,
        source: impl Into<CodecError>,
    ) -> Self {
        Self::Encode {
            component,
            what: what.into(),
            content_type: content_type.into(),
            source: source.into(),
        }
    }

    pub fn decode(
        component: &'static str,
        content_type: impl Into<String>,
        source: impl Into<CodecError>,
    ) -> Self {
        Self::Decode {
            component,
            content_type: content_type.into(),
            source: source.into(),
        }
    }

    /// Decode failure caused by a document with an unexpected structure.
    pub fn shape(component: &'static str, content_type: impl Into<String>, error: ShapeError) -> Self {
        Self::decode(component, content_type, error)
    }

    pub fn write(filename: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            filename: filename.into(),
            source,
        }
    }
}
