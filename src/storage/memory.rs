use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::{RwLock, watch};

use super::{AccountStore, SnapshotHub, StorageError, WedgeStore};
use crate::model::{Account, UserId, Wedge, WedgeId, WedgeInput, WedgePatch, now_millis};

/// In-process wedge and account store. Used by `--store memory` and by the tests.
#[derive(Default)]
pub struct MemoryStore {
    wedges: RwLock<HashMap<WedgeId, Wedge>>,
    accounts: RwLock<HashMap<UserId, Account>>,
    hub: SnapshotHub,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn collect_for(wedges: &HashMap<WedgeId, Wedge>, user_id: &UserId) -> Vec<Wedge> {
        let mut mine: Vec<Wedge> = wedges
            .values()
            .filter(|w| &w.user_id == user_id)
            .cloned()
            .collect();
        mine.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        mine
    }

    fn notify(&self, wedges: &HashMap<WedgeId, Wedge>, user_id: &UserId) {
        if self.hub.is_watched(user_id) {
            self.hub.publish(user_id, Self::collect_for(wedges, user_id));
        }
    }
}

#[async_trait]
impl WedgeStore for MemoryStore {
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Wedge>, StorageError> {
        let wedges = self.wedges.read().await;
        Ok(Self::collect_for(&wedges, user_id))
    }

    async fn get(&self, id: &WedgeId) -> Result<Wedge, StorageError> {
        self.wedges
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(id.clone()))
    }

    async fn create(&self, user_id: &UserId, input: WedgeInput) -> Result<Wedge, StorageError> {
        let wedge = Wedge::new(user_id.clone(), input, now_millis());
        let mut wedges = self.wedges.write().await;
        wedges.insert(wedge.id.clone(), wedge.clone());
        tracing::info!(wedge_id = %wedge.id, %user_id, club = %wedge.club, "wedge created");
        self.notify(&wedges, user_id);
        Ok(wedge)
    }

    async fn merge(&self, id: &WedgeId, patch: &WedgePatch) -> Result<Wedge, StorageError> {
        let mut wedges = self.wedges.write().await;
        let wedge = wedges
            .get_mut(id)
            .ok_or_else(|| StorageError::NotFound(id.clone()))?;
        wedge.apply(patch, now_millis());
        let merged = wedge.clone();
        tracing::info!(wedge_id = %id, fields = patch.yardages.len(), "wedge updated");
        self.notify(&wedges, &merged.user_id);
        Ok(merged)
    }

    async fn delete(&self, id: &WedgeId) -> Result<(), StorageError> {
        let mut wedges = self.wedges.write().await;
        let removed = wedges
            .remove(id)
            .ok_or_else(|| StorageError::NotFound(id.clone()))?;
        tracing::info!(wedge_id = %id, "wedge deleted");
        self.notify(&wedges, &removed.user_id);
        Ok(())
    }

    async fn subscribe(
        &self,
        user_id: &UserId,
    ) -> Result<watch::Receiver<Vec<Wedge>>, StorageError> {
        let wedges = self.wedges.read().await;
        Ok(self.hub.subscribe(user_id, Self::collect_for(&wedges, user_id)))
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn account(&self, uid: &UserId) -> Result<Option<Account>, StorageError> {
        Ok(self.accounts.read().await.get(uid).cloned())
    }

    async fn account_by_email(&self, email: &str) -> Result<Option<Account>, StorageError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().find(|a| a.email == email).cloned())
    }

    async fn insert_account(&self, account: &Account) -> Result<(), StorageError> {
        let mut accounts = self.accounts.write().await;
        if accounts
            .values()
            .any(|a| a.uid == account.uid || a.email == account.email)
        {
            return Err(StorageError::Db(format!("account exists: {}", account.email)));
        }
        accounts.insert(account.uid.clone(), account.clone());
        Ok(())
    }

    async fn update_account(&self, account: &Account) -> Result<(), StorageError> {
        let mut accounts = self.accounts.write().await;
        if accounts
            .values()
            .any(|a| a.uid != account.uid && a.email == account.email)
        {
            return Err(StorageError::Db(format!("email in use: {}", account.email)));
        }
        let slot = accounts
            .get_mut(&account.uid)
            .ok_or_else(|| StorageError::UnknownAccount(account.uid.clone()))?;
        *slot = account.clone();
        Ok(())
    }
}
