//! Error types and handling for squash
//!
//! Two classes of failure exist in a compression pass. Configuration errors
//! surface while a plugin is being constructed and abort setup entirely.
//! Everything else happens inside a single asset's task and is collected into
//! the pass report instead of being propagated.

/// Error severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Low severity - only the affected asset is lost
    Low,
    /// Medium severity - a collaborator misbehaved, the pass continues
    Medium,
    /// High severity - setup must be aborted
    High,
}

/// Main error type for squash operations
#[derive(thiserror::Error, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        /// Error message from the I/O operation
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message describing the configuration issue
        message: String,
    },

    /// A named algorithm has no codec behind it
    #[error("Algorithm \"{name}\" is not found")]
    UnknownAlgorithm {
        /// The name that failed to resolve
        name: String,
    },

    /// The compression algorithm failed for an asset
    #[error("Compression error: {message}")]
    Compression {
        /// Error message describing the compression issue
        message: String,
    },

    /// The cache store failed to read or persist an entry
    #[error("Cache error: {message}")]
    Cache {
        /// Error message describing the cache issue
        message: String,
    },

    /// The asset store has no asset with this name
    #[error("Asset not found: {name}")]
    AssetNotFound {
        /// Name of the missing asset
        name: String,
    },

    /// Different content was emitted under an existing asset name
    #[error("Conflict: multiple assets emit different content to the same filename {name}")]
    AssetConflict {
        /// Name of the contested asset
        name: String,
    },

    /// Generic error with custom message
    #[error("{message}")]
    Other {
        /// Custom error message
        message: String,
    },
}

/// Error kind for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// I/O related errors
    Io,
    /// Configuration errors, including unknown algorithms
    Config,
    /// Compression errors
    Compression,
    /// Cache store errors
    Cache,
    /// Asset store errors
    Asset,
    /// Other errors
    Other,
}

impl Error {
    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io { .. } => ErrorKind::Io,
            Self::Config { .. } | Self::UnknownAlgorithm { .. } => ErrorKind::Config,
            Self::Compression { .. } => ErrorKind::Compression,
            Self::Cache { .. } => ErrorKind::Cache,
            Self::AssetNotFound { .. } | Self::AssetConflict { .. } => ErrorKind::Asset,
            Self::Other { .. } => ErrorKind::Other,
        }
    }

    /// Get the error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Config { .. } | Self::UnknownAlgorithm { .. } => ErrorSeverity::High,
            Self::Compression { .. } | Self::AssetConflict { .. } => ErrorSeverity::Low,
            Self::Io { .. }
            | Self::Cache { .. }
            | Self::AssetNotFound { .. }
            | Self::Other { .. } => ErrorSeverity::Medium,
        }
    }

    /// Check if the pass can continue after this error.
    ///
    /// Nothing in a pass is retried; a recoverable error only means the
    /// remaining assets are still processed.
    pub fn is_recoverable(&self) -> bool {
        self.severity() < ErrorSeverity::High
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new unknown algorithm error
    pub fn unknown_algorithm<S: Into<String>>(name: S) -> Self {
        Self::UnknownAlgorithm { name: name.into() }
    }

    /// Create a new compression error
    pub fn compression<S: Into<String>>(message: S) -> Self {
        Self::Compression {
            message: message.into(),
        }
    }

    /// Create a new cache error
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Create a new asset-not-found error
    pub fn asset_not_found<S: Into<String>>(name: S) -> Self {
        Self::AssetNotFound { name: name.into() }
    }

    /// Create a new asset conflict error
    pub fn asset_conflict<S: Into<String>>(name: S) -> Self {
        Self::AssetConflict { name: name.into() }
    }

    /// Create a new generic error
    pub fn other<S: Into<String>>(message: S) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: error.to_string(),
        }
    }
}
