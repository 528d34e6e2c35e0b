//! Display helpers for hosts printing asset listings

use console::style;
use squash_types::AssetInfo;
use std::fmt;

/// Renders a green `[compressed]` marker for compressed assets, nothing otherwise
#[derive(Debug, Clone, Copy)]
pub struct CompressedFlag<'a>(&'a AssetInfo);

impl<'a> CompressedFlag<'a> {
    /// Flag for the given metadata
    pub fn new(info: &'a AssetInfo) -> Self {
        Self(info)
    }
}

impl fmt::Display for CompressedFlag<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.compressed {
            write!(f, "{}", style("[compressed]").green().bold())
        } else {
            Ok(())
        }
    }
}
