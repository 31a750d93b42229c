use thiserror::Error;

use crate::capability::Capability;

/// Error types for capweb backends and collection resolution
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The requested path is not a legal collection for the requested capabilities
    #[error("Collection not found: /{}", .0.join("/"))]
    CollectionNotFound(Vec<String>),

    /// No object with this id exists in the backend
    #[error("Object not found: {id}")]
    ObjectNotFound {
        /// Id that was looked up
        id: String,
    },

    /// The backend does not provide this capability
    #[error("Capability not supported: {0}")]
    UnsupportedCapability(Capability),

    /// A capability name could not be parsed
    #[error("Unknown capability: {0}")]
    UnknownCapability(String),

    /// Failure reported by a backend or its data source
    #[error("Backend {backend} error: {message}")]
    Backend {
        /// Name of the backend
        backend: String,
        /// Error message
        message: String,
    },

    /// Serde error
    #[error("Serialization error: {0}")]
    SerdeError(String),
}

impl Error {
    /// Create a new collection-not-found error from a path
    pub fn collection_not_found<I, S>(split_path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::CollectionNotFound(split_path.into_iter().map(Into::into).collect())
    }

    /// Create a new object-not-found error
    pub fn object_not_found(id: impl Into<String>) -> Self {
        Self::ObjectNotFound { id: id.into() }
    }

    /// Create a new backend error
    pub fn backend(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Path carried by a collection-not-found error
    pub fn split_path(&self) -> Option<&[String]> {
        match self {
            Self::CollectionNotFound(path) => Some(path),
            _ => None,
        }
    }
}

/// Result type for capweb operations
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::SerdeError(error.to_string())
    }
}
