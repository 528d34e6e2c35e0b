//! Core type system and error handling for squash
//!
//! This crate provides the foundational types shared by every squash crate:
//!
//! - **Error handling**: the error taxonomy of a compression pass, with kinds and severities
//! - **Core types**: assets, their metadata, path data and pass statistics
//! - **Traits**: the asset store interface a host build tool implements
//! - **Configuration**: validated values such as the minimum compression ratio
//!
//! # Features
//!
//! - `serde` (default): Enable serialization support
//!
//! # Examples
//!
//! ```rust
//! use squash_types::{AssetInfo, AssetInfoPatch, MinRatio};
//!
//! let mut info = AssetInfo::default();
//! info.apply(&AssetInfoPatch::new().relate("gzipped", "app.js.gz"));
//! assert_eq!(info.related("gzipped"), Some("app.js.gz"));
//!
//! assert!(MinRatio::default().accepts(30, 1024));
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::MinRatio;
pub use error::{Error, ErrorKind, ErrorSeverity};
pub use result::Result;
pub use traits::*;
pub use types::*;

/// Re-exported so downstream crates share one buffer type
pub use bytes::Bytes;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_defaults() {
        let asset = Asset::new("app.js", vec![0u8; 16]);
        assert_eq!(asset.source.size(), 16);
        assert!(!asset.info.compressed);
        assert!(asset.info.related.is_empty());
    }

    #[test]
    fn test_error_severity() {
        let config_error = Error::config("invalid min ratio");
        assert_eq!(config_error.severity(), ErrorSeverity::High);
        assert!(!config_error.is_recoverable());

        let cache_error = Error::cache("disk full");
        assert_eq!(cache_error.severity(), ErrorSeverity::Medium);
        assert!(cache_error.is_recoverable());
    }
}
