// ============================
// crates/backend-lib/src/storage.rs
// ============================
//! User directory abstraction with a flat-file implementation.

use std::path::{Path, PathBuf};
use std::{fs, io};

use async_trait::async_trait;
use authgate_common::User;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs as tokio_fs;
use tokio::sync::RwLock;

use crate::error::AppError;

/// Columns a dynamic equality lookup may filter on
const ALLOWED_FIELDS: [&str; 3] = ["username", "email", "id"];

#[derive(Error, Debug)]
pub enum DirectoryError {
    /// A uniqueness constraint was violated at create time
    #[error("{field} already exists")]
    Conflict { field: &'static str },

    /// Field name outside the allow-list used in a dynamic lookup
    #[error("invalid field name: {0}")]
    InvalidField(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<DirectoryError> for AppError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::Conflict { field } => AppError::Conflict { field },
            other => AppError::Internal(other.to_string()),
        }
    }
}

/// New-account fields accepted by [`UserDirectory::create_with_password`].
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
}

/// Persistence contract consumed by the auth service.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Fast-path existence check for both unique columns in one logical
    /// read. Returns `(username_exists, email_exists)`. Best-effort only;
    /// the create-time constraint stays authoritative.
    async fn check_uniqueness(
        &self,
        username: &str,
        email: &str,
    ) -> Result<(bool, bool), DirectoryError>;

    /// Persist a new user with its credential hash.
    ///
    /// Fails with [`DirectoryError::Conflict`] if either unique column is
    /// already taken, including a duplicate that raced in after an
    /// earlier `check_uniqueness` reported the column free.
    async fn create_with_password(
        &self,
        new_user: NewUser,
        password_hash: &str,
    ) -> Result<User, DirectoryError>;

    /// Look up a user and its stored hash. Absence of a matching user is
    /// a normal outcome, not an error.
    async fn find_by_username_with_password(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>, DirectoryError>;

    /// Dynamic equality lookup. `field` must be on the allow-list
    /// (`username`, `email`, `id`); anything else is rejected.
    async fn exists_by(&self, field: &str, value: &str) -> Result<bool, DirectoryError>;
}

/// On-disk record; the only place credential material lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserRecord {
    #[serde(flatten)]
    user: User,
    password_hash: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct DirectoryFile {
    next_id: u64,
    users: Vec<UserRecord>,
}

/// Flat-file implementation of the [`UserDirectory`] trait.
///
/// The whole directory lives in one JSON document under the data root,
/// mirrored in memory behind an `RwLock`. The write lock is the
/// uniqueness critical section: check-and-insert happens atomically
/// under it, which is the storage-level constraint callers rely on.
pub struct FlatFileDirectory {
    path: PathBuf,
    inner: RwLock<DirectoryFile>,
}

impl FlatFileDirectory {
    pub fn new<P: AsRef<Path>>(root: P) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;

        let path = root.join("users.json");
        let inner = if path.exists() {
            serde_json::from_str(&fs::read_to_string(&path)?)?
        } else {
            DirectoryFile {
                next_id: 1,
                users: Vec::new(),
            }
        };

        Ok(Self {
            path,
            inner: RwLock::new(inner),
        })
    }

    async fn persist(&self, file: &DirectoryFile) -> Result<(), DirectoryError> {
        let json = serde_json::to_string_pretty(file)?;
        tokio_fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for FlatFileDirectory {
    async fn check_uniqueness(
        &self,
        username: &str,
        email: &str,
    ) -> Result<(bool, bool), DirectoryError> {
        let inner = self.inner.read().await;
        let mut username_exists = false;
        let mut email_exists = false;
        for record in &inner.users {
            username_exists |= record.user.username == username;
            email_exists |= record.user.email == email;
        }
        Ok((username_exists, email_exists))
    }

    async fn create_with_password(
        &self,
        new_user: NewUser,
        password_hash: &str,
    ) -> Result<User, DirectoryError> {
        let mut inner = self.inner.write().await;

        // authoritative uniqueness check, atomic with the insert below
        for record in &inner.users {
            if record.user.username == new_user.username {
                return Err(DirectoryError::Conflict { field: "username" });
            }
            if record.user.email == new_user.email {
                return Err(DirectoryError::Conflict { field: "email" });
            }
        }

        let now = Utc::now();
        let user = User {
            id: inner.next_id,
            username: new_user.username,
            email: new_user.email,
            created_at: now,
            updated_at: now,
        };

        inner.next_id += 1;
        inner.users.push(UserRecord {
            user: user.clone(),
            password_hash: password_hash.to_string(),
        });
        self.persist(&inner).await?;

        Ok(user)
    }

    async fn find_by_username_with_password(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>, DirectoryError> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .iter()
            .find(|record| record.user.username == username)
            .map(|record| (record.user.clone(), record.password_hash.clone())))
    }

    async fn exists_by(&self, field: &str, value: &str) -> Result<bool, DirectoryError> {
        if !ALLOWED_FIELDS.contains(&field) {
            return Err(DirectoryError::InvalidField(field.to_string()));
        }

        let inner = self.inner.read().await;
        let found = inner.users.iter().any(|record| match field {
            "username" => record.user.username == value,
            "email" => record.user.email == value,
            "id" => value.parse::<u64>().is_ok_and(|id| record.user.id == id),
            _ => unreachable!("field validated against allow-list"),
        });
        Ok(found)
    }
}
