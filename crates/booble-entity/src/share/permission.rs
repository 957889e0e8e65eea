//! Ordered file permission levels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Permission granted on a file. Each level implies every lower one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "file_permission", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FilePermission {
    /// View metadata and download.
    Read,
    /// Edit metadata, tags, and upload versions.
    Write,
    /// Delete the file.
    Delete,
    /// Share with others and change visibility.
    Share,
    /// Full control. Only the owner holds it.
    Owner,
}

impl FilePermission {
    /// Numeric level used for comparisons (1 = read .. 5 = owner).
    pub fn level(&self) -> u8 {
        match self {
            Self::Read => 1,
            Self::Write => 2,
            Self::Delete => 3,
            Self::Share => 4,
            Self::Owner => 5,
        }
    }

    /// Check if this permission satisfies `required`.
    pub fn has_at_least(&self, required: FilePermission) -> bool {
        self.level() >= required.level()
    }

    /// Whether this permission may be handed out through a share.
    pub fn is_grantable(&self) -> bool {
        !matches!(self, Self::Owner)
    }

    /// Return the permission as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Delete => "delete",
            Self::Share => "share",
            Self::Owner => "owner",
        }
    }
}

impl PartialOrd for FilePermission {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FilePermission {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.level().cmp(&other.level())
    }
}

impl fmt::Display for FilePermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FilePermission {
    type Err = booble_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            "delete" => Ok(Self::Delete),
            "share" => Ok(Self::Share),
            "owner" => Ok(Self::Owner),
            _ => Err(booble_core::AppError::validation(format!(
                "Invalid permission: '{s}'. Expected one of: read, write, delete, share, owner"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_ordered() {
        assert!(FilePermission::Owner > FilePermission::Share);
        assert!(FilePermission::Share > FilePermission::Delete);
        assert!(FilePermission::Delete > FilePermission::Write);
        assert!(FilePermission::Write > FilePermission::Read);
    }

    #[test]
    fn test_has_at_least() {
        assert!(FilePermission::Write.has_at_least(FilePermission::Read));
        assert!(FilePermission::Write.has_at_least(FilePermission::Write));
        assert!(!FilePermission::Write.has_at_least(FilePermission::Delete));
    }

    #[test]
    fn test_owner_not_grantable() {
        assert!(!FilePermission::Owner.is_grantable());
        assert!(FilePermission::Share.is_grantable());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("WRITE".parse::<FilePermission>().ok(), Some(FilePermission::Write));
        assert!("admin".parse::<FilePermission>().is_err());
    }
}
