pub mod hub;
pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;

use crate::model::{Account, UserId, Wedge, WedgeId, WedgeInput, WedgePatch};

pub use hub::SnapshotHub;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Upper bound on a single write before it is reported as failed.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("wedge not found: {0}")]
    NotFound(WedgeId),
    #[error("account not found: {0}")]
    UnknownAccount(UserId),
    #[error("save timed out after {0:?}, check your connection and try again")]
    Timeout(Duration),
    #[error("db error: {0}")]
    Db(String),
    #[error("{0}")]
    Other(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Db(err.to_string())
    }
}

impl From<tokio::task::JoinError> for StorageError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<String> for StorageError {
    fn from(err: String) -> Self {
        Self::Other(err)
    }
}

impl From<&str> for StorageError {
    fn from(err: &str) -> Self {
        Self::Other(err.to_string())
    }
}

/// Per-user collection of wedge records with live snapshots.
///
/// Writes are overwrite-by-id; `merge` only writes the fields present in the
/// patch plus `updated_at`.
#[async_trait]
pub trait WedgeStore: Send + Sync {
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Wedge>, StorageError>;
    async fn get(&self, id: &WedgeId) -> Result<Wedge, StorageError>;
    async fn create(&self, user_id: &UserId, input: WedgeInput) -> Result<Wedge, StorageError>;
    async fn merge(&self, id: &WedgeId, patch: &WedgePatch) -> Result<Wedge, StorageError>;
    async fn delete(&self, id: &WedgeId) -> Result<(), StorageError>;
    /// Live query: the receiver holds the user's full collection and is
    /// updated after every write that touches it.
    async fn subscribe(&self, user_id: &UserId)
    -> Result<watch::Receiver<Vec<Wedge>>, StorageError>;
}

/// Sign-in records, keyed by uid with a unique email.
///
/// Emails are stored already normalized; lookups compare them exactly.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn account(&self, uid: &UserId) -> Result<Option<Account>, StorageError>;
    async fn account_by_email(&self, email: &str) -> Result<Option<Account>, StorageError>;
    async fn insert_account(&self, account: &Account) -> Result<(), StorageError>;
    /// Overwrite the record with `account.uid`.
    async fn update_account(&self, account: &Account) -> Result<(), StorageError>;
}

/// Run a store call under a bounded wait; running out of time is a failed write.
///
/// A timeout only stops the wait. A sqlite write already handed to
/// `spawn_blocking` keeps running and may still commit. Writes are
/// overwrite-by-id, so retrying after a timeout lands the same values.
///
/// # Errors
///
/// Returns the inner error, or `StorageError::Timeout` if `limit` elapses first.
pub async fn with_timeout<T, F>(limit: Duration, fut: F) -> Result<T, StorageError>
where
    F: Future<Output = Result<T, StorageError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(?limit, "store write timed out");
            Err(StorageError::Timeout(limit))
        }
    }
}
