//! Which slice of the caller's files a search covers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Search scope for file listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileTypeFilter {
    /// Files the caller owns.
    Own,
    /// Files shared with the caller.
    Shared,
    /// Files the caller marked as favorite.
    Favorites,
    /// Owned and shared files together.
    #[default]
    All,
}

impl FileTypeFilter {
    /// Return the filter as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Own => "own",
            Self::Shared => "shared",
            Self::Favorites => "favorites",
            Self::All => "all",
        }
    }
}

impl fmt::Display for FileTypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FileTypeFilter {
    type Err = booble_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "own" => Ok(Self::Own),
            "shared" => Ok(Self::Shared),
            "favorites" => Ok(Self::Favorites),
            "all" | "" => Ok(Self::All),
            _ => Err(booble_core::AppError::validation(format!(
                "Invalid file type: '{s}'. Expected one of: own, shared, favorites, all"
            ))),
        }
    }
}
