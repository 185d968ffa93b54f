//! Operator login against the bundled user list.
//!
//! **Not a security boundary.** Credentials are compared in plaintext against
//! `assets/users.json`, which is compiled into the binary, and the matched
//! record (password included) is written to `~/.payments-dashboard/user.json`.
//! This exists so the dashboard can tell who is looking at it; anyone with
//! access to the binary or the home directory can read every password.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{DashboardError, Result};
use crate::settings::app_dir_in;

/// File name of the persisted session record inside the app directory.
pub const SESSION_FILE: &str = "user.json";

const BUNDLED_USERS: &str = include_str!("../assets/users.json");

/// One entry of the bundled user list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub email: String,
    pub password: String,
    pub role: String,
}

/// Parse the user list compiled into the binary.
pub fn bundled_users() -> Result<Vec<UserRecord>> {
    Ok(serde_json::from_str(BUNDLED_USERS)?)
}

// ── AuthStore ─────────────────────────────────────────────────────────────────

/// The logged-in operator, if any, backed by a JSON file on disk.
#[derive(Debug)]
pub struct AuthStore {
    path: PathBuf,
    users: Vec<UserRecord>,
    user: Option<UserRecord>,
}

impl AuthStore {
    /// Default session path: `~/.payments-dashboard/user.json`.
    pub fn session_path() -> PathBuf {
        Self::session_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Session path rooted at `base_dir` (used for testing).
    pub fn session_path_in(base_dir: &Path) -> PathBuf {
        app_dir_in(base_dir).join(SESSION_FILE)
    }

    /// Open the store at the default path with the bundled users.
    pub fn open() -> Result<Self> {
        Ok(Self::open_at(&Self::session_path(), bundled_users()?))
    }

    /// Open the store at `path`, restoring any persisted session.
    ///
    /// A missing or unreadable session file means "logged out".
    pub fn open_at(path: &Path, users: Vec<UserRecord>) -> Self {
        let user = match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<Option<UserRecord>>(&content) {
                Ok(user) => user,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "ignoring corrupt session file");
                    None
                }
            },
            Err(_) => None,
        };

        Self {
            path: path.to_path_buf(),
            users,
            user,
        }
    }

    /// Check `email` / `password` against the user list.
    ///
    /// On success the matched record becomes the current user and is
    /// persisted. On failure nothing changes, including any previous session.
    pub fn login(&mut self, email: &str, password: &str) -> Result<&UserRecord> {
        let found = self
            .users
            .iter()
            .find(|u| u.email == email && u.password == password)
            .cloned()
            .ok_or(DashboardError::InvalidCredentials)?;

        self.persist(&found)?;
        info!(email = %found.email, role = %found.role, "operator logged in");
        Ok(self.user.insert(found))
    }

    /// Forget the current user and delete the session file.
    pub fn logout(&mut self) -> Result<()> {
        self.user = None;
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        info!("operator logged out");
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn user(&self) -> Option<&UserRecord> {
        self.user.as_ref()
    }

    pub fn role(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.role.as_str())
    }

    /// Atomically write `user` to the session file.
    fn persist(&self, user: &UserRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(user)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn users() -> Vec<UserRecord> {
        vec![
            UserRecord {
                email: "admin@example.com".to_string(),
                password: "admin123".to_string(),
                role: "admin".to_string(),
            },
            UserRecord {
                email: "viewer@example.com".to_string(),
                password: "viewer123".to_string(),
                role: "viewer".to_string(),
            },
        ]
    }

    fn store(tmp: &TempDir) -> AuthStore {
        AuthStore::open_at(&AuthStore::session_path_in(tmp.path()), users())
    }

    // ── bundled_users ────────────────────────────────────────────────────────

    #[test]
    fn test_bundled_users_parse() {
        let users = bundled_users().expect("bundled users are valid JSON");
        assert!(!users.is_empty());
        assert!(users.iter().all(|u| !u.email.is_empty() && !u.role.is_empty()));
    }

    // ── login ────────────────────────────────────────────────────────────────

    #[test]
    fn test_login_success_persists_record() {
        let tmp = TempDir::new().expect("tempdir");
        let mut auth = store(&tmp);
        assert!(!auth.is_authenticated());

        let user = auth.login("admin@example.com", "admin123").unwrap().clone();
        assert_eq!(user.role, "admin");
        assert!(auth.is_authenticated());
        assert_eq!(auth.role(), Some("admin"));

        let path = AuthStore::session_path_in(tmp.path());
        assert!(path.exists());

        let reopened = store(&tmp);
        assert_eq!(reopened.user(), Some(&user));
    }

    #[test]
    fn test_login_wrong_password_fails_without_side_effects() {
        let tmp = TempDir::new().expect("tempdir");
        let mut auth = store(&tmp);

        let err = auth.login("admin@example.com", "nope").unwrap_err();
        assert!(matches!(err, DashboardError::InvalidCredentials));
        assert!(!auth.is_authenticated());
        assert!(!AuthStore::session_path_in(tmp.path()).exists());
    }

    #[test]
    fn test_failed_login_keeps_previous_session() {
        let tmp = TempDir::new().expect("tempdir");
        let mut auth = store(&tmp);
        auth.login("viewer@example.com", "viewer123").unwrap();

        assert!(auth.login("admin@example.com", "wrong").is_err());
        assert_eq!(auth.role(), Some("viewer"));
    }

    #[test]
    fn test_login_email_is_case_sensitive() {
        let tmp = TempDir::new().expect("tempdir");
        let mut auth = store(&tmp);
        assert!(auth.login("ADMIN@example.com", "admin123").is_err());
    }

    // ── logout ───────────────────────────────────────────────────────────────

    #[test]
    fn test_logout_clears_session() {
        let tmp = TempDir::new().expect("tempdir");
        let mut auth = store(&tmp);
        auth.login("admin@example.com", "admin123").unwrap();

        auth.logout().unwrap();
        assert!(!auth.is_authenticated());
        assert!(auth.role().is_none());
        assert!(!AuthStore::session_path_in(tmp.path()).exists());
    }

    #[test]
    fn test_logout_when_logged_out_is_ok() {
        let tmp = TempDir::new().expect("tempdir");
        let mut auth = store(&tmp);
        assert!(auth.logout().is_ok());
    }

    // ── open_at ──────────────────────────────────────────────────────────────

    #[test]
    fn test_open_with_corrupt_file_is_logged_out() {
        let tmp = TempDir::new().expect("tempdir");
        let path = AuthStore::session_path_in(tmp.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();

        let auth = AuthStore::open_at(&path, users());
        assert!(!auth.is_authenticated());
    }

    #[test]
    fn test_open_with_null_record_is_logged_out() {
        let tmp = TempDir::new().expect("tempdir");
        let path = AuthStore::session_path_in(tmp.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "null").unwrap();

        assert!(!AuthStore::open_at(&path, users()).is_authenticated());
    }
}
