use std::sync::Arc;
use std::time::Duration;

use crate::error::AppError;
use crate::model::{CombineSession, UserId, Wedge, WedgeId, WedgeInput, WedgePatch};
use crate::storage::{DEFAULT_WRITE_TIMEOUT, StorageError, WedgeStore, with_timeout};

/// Write side of the user's bag: creating, editing and deleting wedges and
/// committing combine results. Every write runs under `write_timeout`.
#[derive(Clone)]
pub struct Bag {
    store: Arc<dyn WedgeStore>,
    write_timeout: Duration,
}

impl Bag {
    #[must_use]
    pub fn new(store: Arc<dyn WedgeStore>) -> Self {
        Self::with_write_timeout(store, DEFAULT_WRITE_TIMEOUT)
    }

    #[must_use]
    pub fn with_write_timeout(store: Arc<dyn WedgeStore>, write_timeout: Duration) -> Self {
        Self {
            store,
            write_timeout,
        }
    }

    #[must_use]
    pub fn store(&self) -> Arc<dyn WedgeStore> {
        Arc::clone(&self.store)
    }

    /// # Errors
    ///
    /// Returns a storage error if the query fails.
    pub async fn list(&self, user_id: &UserId) -> Result<Vec<Wedge>, StorageError> {
        self.store.list_for_user(user_id).await
    }

    /// Look up a wedge, making sure it belongs to `user_id`.
    ///
    /// # Errors
    ///
    /// `StorageError::NotFound` when it is missing or owned by someone else.
    pub async fn wedge_for(&self, user_id: &UserId, id: &WedgeId) -> Result<Wedge, StorageError> {
        let wedge = self.store.get(id).await?;
        if &wedge.user_id == user_id {
            Ok(wedge)
        } else {
            Err(StorageError::NotFound(id.clone()))
        }
    }

    /// # Errors
    ///
    /// `AppError::Validation` for a blank club name or bad yardage,
    /// `AppError::Storage` if the write fails or times out.
    pub async fn add_wedge(&self, user_id: &UserId, input: WedgeInput) -> Result<Wedge, AppError> {
        let input = input.validate()?;
        let wedge = with_timeout(self.write_timeout, self.store.create(user_id, input)).await?;
        Ok(wedge)
    }

    /// # Errors
    ///
    /// `AppError::Storage` if the wedge is not the user's or the write fails.
    pub async fn delete_wedge(&self, user_id: &UserId, id: &WedgeId) -> Result<(), AppError> {
        self.wedge_for(user_id, id).await?;
        with_timeout(self.write_timeout, self.store.delete(id)).await?;
        Ok(())
    }

    /// Manual edit of a wedge.
    ///
    /// # Errors
    ///
    /// `AppError::Validation` for bad input, `AppError::Storage` if the write fails.
    pub async fn update_wedge(
        &self,
        user_id: &UserId,
        id: &WedgeId,
        patch: WedgePatch,
    ) -> Result<Wedge, AppError> {
        let patch = patch.validate()?;
        self.wedge_for(user_id, id).await?;
        let wedge = with_timeout(self.write_timeout, self.store.merge(id, &patch)).await?;
        Ok(wedge)
    }

    /// Commit combine averages onto the wedge: only the measured swing lengths
    /// and `updated_at` are written.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the write is rejected or times out.
    pub async fn commit_combine(&self, session: &CombineSession) -> Result<Wedge, StorageError> {
        let patch = session.to_patch();
        tracing::info!(
            wedge_id = %session.wedge_id,
            shots = session.shots.len(),
            fields = patch.yardages.len(),
            "committing combine"
        );
        with_timeout(self.write_timeout, self.store.merge(&session.wedge_id, &patch)).await
    }
}
