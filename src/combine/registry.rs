use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::CombineError;
use super::machine::{Msg, Outcome};
use super::runtime::CombineDriver;
use crate::model::UserId;

/// In-progress combines, at most one per user.
#[derive(Clone, Default)]
pub struct CombineRegistry {
    active: Arc<RwLock<HashMap<UserId, Arc<CombineDriver>>>>,
}

impl CombineRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session for `user_id`.
    ///
    /// # Errors
    ///
    /// `CombineError::SessionActive` if the user already has one in progress.
    pub async fn start(
        &self,
        user_id: &UserId,
        driver: CombineDriver,
    ) -> Result<Arc<CombineDriver>, CombineError> {
        let mut active = self.active.write().await;
        if let Some(existing) = active.get(user_id) {
            return Err(CombineError::SessionActive(existing.wedge_id().clone()));
        }
        let driver = Arc::new(driver);
        active.insert(user_id.clone(), Arc::clone(&driver));
        tracing::info!(%user_id, wedge_id = %driver.wedge_id(), "combine started");
        Ok(driver)
    }

    pub async fn get(&self, user_id: &UserId) -> Option<Arc<CombineDriver>> {
        self.active.read().await.get(user_id).cloned()
    }

    /// Dispatch to the user's session, forgetting it once it closes.
    ///
    /// # Errors
    ///
    /// `CombineError::NoActiveSession` if the user has no session.
    pub async fn dispatch(&self, user_id: &UserId, msg: Msg) -> Result<Option<Outcome>, CombineError> {
        let driver = self.get(user_id).await.ok_or(CombineError::NoActiveSession)?;
        let outcome = driver.dispatch(msg).await;
        if outcome.is_some() {
            self.active.write().await.remove(user_id);
        }
        Ok(outcome)
    }

    /// Abort and forget whatever the user has in progress, e.g. on sign-out.
    pub async fn discard(&self, user_id: &UserId) {
        let driver = self.active.write().await.remove(user_id);
        if let Some(driver) = driver {
            driver.dispatch(Msg::Abort).await;
        }
    }
}
