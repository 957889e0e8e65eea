//! Permission checks for a caller against a file.
//!
//! Owner always wins. Other users need an unexpired share whose level is at
//! least the required one. Public visibility adds read access for every
//! signed-in user. Deleted files grant nothing.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use booble_core::error::AppError;
use booble_entity::file::DriveFile;
use booble_entity::share::{FilePermission, FileShare};

/// Stateless evaluator of file permissions.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileAccessChecker;

impl FileAccessChecker {
    /// Creates a new checker.
    pub fn new() -> Self {
        Self
    }

    /// Highest permission `user_id` holds on `file` at `now`.
    pub fn effective_permission_at(
        &self,
        file: &DriveFile,
        user_id: Uuid,
        shares: &[FileShare],
        now: DateTime<Utc>,
    ) -> Option<FilePermission> {
        if file.is_deleted() {
            return None;
        }
        if file.is_owned_by(user_id) {
            return Some(FilePermission::Owner);
        }

        let shared = shares
            .iter()
            .filter(|s| s.file_id == file.id && s.user_id == user_id && !s.is_expired_at(now))
            .map(|s| s.permission)
            .max();

        match shared {
            Some(p) => Some(p),
            None if file.visibility.is_public() => Some(FilePermission::Read),
            None => None,
        }
    }

    /// Highest permission `user_id` currently holds on `file`.
    pub fn effective_permission(
        &self,
        file: &DriveFile,
        user_id: Uuid,
        shares: &[FileShare],
    ) -> Option<FilePermission> {
        self.effective_permission_at(file, user_id, shares, Utc::now())
    }

    /// Whether `user_id` holds at least `required` on `file`.
    pub fn can_access(
        &self,
        file: &DriveFile,
        user_id: Uuid,
        shares: &[FileShare],
        required: FilePermission,
    ) -> bool {
        self.effective_permission(file, user_id, shares)
            .is_some_and(|p| p.has_at_least(required))
    }

    /// Fail unless `user_id` holds at least `required` on `file`.
    ///
    /// Callers with no access at all get `NotFound` so file IDs do not leak;
    /// callers with some but insufficient access get `Authorization`.
    pub fn require(
        &self,
        file: &DriveFile,
        user_id: Uuid,
        shares: &[FileShare],
        required: FilePermission,
    ) -> Result<FilePermission, AppError> {
        match self.effective_permission(file, user_id, shares) {
            Some(p) if p.has_at_least(required) => Ok(p),
            Some(_) => Err(AppError::authorization(format!(
                "'{required}' permission required on this file"
            ))),
            None => Err(AppError::not_found(format!("File {} not found", file.id))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use booble_core::error::ErrorKind;
    use booble_entity::file::FileVisibility;
    use chrono::Duration;

    fn file(owner: Uuid) -> DriveFile {
        DriveFile {
            id: Uuid::new_v4(),
            name: "notes.txt".to_string(),
            description: None,
            content_type: "text/plain".to_string(),
            size: 10,
            hash: "h".to_string(),
            owner_id: owner,
            visibility: FileVisibility::Private,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    fn share(
        file: &DriveFile,
        user: Uuid,
        permission: FilePermission,
        expires_at: Option<DateTime<Utc>>,
    ) -> FileShare {
        FileShare {
            id: Uuid::new_v4(),
            file_id: file.id,
            user_id: user,
            permission,
            created_at: Utc::now(),
            expires_at,
        }
    }

    #[test]
    fn test_owner_has_everything() {
        let owner = Uuid::new_v4();
        let f = file(owner);
        assert!(FileAccessChecker.can_access(&f, owner, &[], FilePermission::Owner));
    }

    #[test]
    fn test_deleted_file_denies_owner() {
        let owner = Uuid::new_v4();
        let mut f = file(owner);
        f.deleted_at = Some(Utc::now());
        assert!(!FileAccessChecker.can_access(&f, owner, &[], FilePermission::Read));
    }

    #[test]
    fn test_stranger_has_nothing_on_private_file() {
        let f = file(Uuid::new_v4());
        let stranger = Uuid::new_v4();
        assert!(!FileAccessChecker.can_access(&f, stranger, &[], FilePermission::Read));
        let err = FileAccessChecker
            .require(&f, stranger, &[], FilePermission::Read)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[test]
    fn test_share_levels() {
        let f = file(Uuid::new_v4());
        let user = Uuid::new_v4();
        let shares = vec![share(&f, user, FilePermission::Write, None)];
        assert!(FileAccessChecker.can_access(&f, user, &shares, FilePermission::Read));
        assert!(FileAccessChecker.can_access(&f, user, &shares, FilePermission::Write));
        let err = FileAccessChecker
            .require(&f, user, &shares, FilePermission::Delete)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
    }

    #[test]
    fn test_expired_share_ignored() {
        let f = file(Uuid::new_v4());
        let user = Uuid::new_v4();
        let shares = vec![share(
            &f,
            user,
            FilePermission::Share,
            Some(Utc::now() - Duration::hours(1)),
        )];
        assert_eq!(FileAccessChecker.effective_permission(&f, user, &shares), None);
    }

    #[test]
    fn test_share_for_other_user_ignored() {
        let f = file(Uuid::new_v4());
        let shares = vec![share(&f, Uuid::new_v4(), FilePermission::Share, None)];
        assert_eq!(
            FileAccessChecker.effective_permission(&f, Uuid::new_v4(), &shares),
            None
        );
    }

    #[test]
    fn test_public_visibility_grants_read_only() {
        let mut f = file(Uuid::new_v4());
        f.visibility = FileVisibility::Public;
        let user = Uuid::new_v4();
        assert!(FileAccessChecker.can_access(&f, user, &[], FilePermission::Read));
        assert!(!FileAccessChecker.can_access(&f, user, &[], FilePermission::Write));
    }

    #[test]
    fn test_share_on_public_file_keeps_higher_level() {
        let mut f = file(Uuid::new_v4());
        f.visibility = FileVisibility::Public;
        let user = Uuid::new_v4();
        let shares = vec![share(&f, user, FilePermission::Delete, None)];
        assert_eq!(
            FileAccessChecker.effective_permission(&f, user, &shares),
            Some(FilePermission::Delete)
        );
    }
}
