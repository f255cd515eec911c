#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::watch;

use dialed::model::{UserId, Wedge, WedgeId, WedgeInput, WedgePatch};
use dialed::storage::{MemoryStore, SqliteStore, StorageError, WedgeStore};

pub fn wedge_input(club: &str, loft: u32) -> WedgeInput {
    WedgeInput {
        club: club.to_string(),
        loft,
        ..WedgeInput::default()
    }
}

/// Fresh sqlite store with the schema dropped and recreated, then `fixture_sql` applied.
pub async fn setup_sqlite(fixture_sql: &str) -> Result<SqliteStore, StorageError> {
    let store = SqliteStore::open_in_memory()?;
    store
        .execute_batch(include_str!("../../src/sql/schema/sqlite/00_table_drop.sql"))
        .await?;
    store
        .execute_batch(include_str!("../../src/sql/schema/sqlite/00_wedge.sql"))
        .await?;
    store
        .execute_batch(include_str!("../../src/sql/schema/sqlite/01_user_account.sql"))
        .await?;
    store.execute_batch(fixture_sql).await?;
    Ok(store)
}

/// Memory store that records every merge and can be told to stall or fail.
#[derive(Default)]
pub struct RecordingStore {
    inner: MemoryStore,
    merges: Mutex<Vec<(WedgeId, WedgePatch)>>,
    merge_delay: Mutex<Option<Duration>>,
    failures_left: AtomicUsize,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merges(&self) -> Vec<(WedgeId, WedgePatch)> {
        self.merges.lock().unwrap().clone()
    }

    pub fn stall_merges(&self, delay: Duration) {
        *self.merge_delay.lock().unwrap() = Some(delay);
    }

    pub fn fail_next_merges(&self, count: usize) {
        self.failures_left.store(count, Ordering::SeqCst);
    }
}

#[async_trait]
impl WedgeStore for RecordingStore {
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Wedge>, StorageError> {
        self.inner.list_for_user(user_id).await
    }

    async fn get(&self, id: &WedgeId) -> Result<Wedge, StorageError> {
        self.inner.get(id).await
    }

    async fn create(&self, user_id: &UserId, input: WedgeInput) -> Result<Wedge, StorageError> {
        self.inner.create(user_id, input).await
    }

    async fn merge(&self, id: &WedgeId, patch: &WedgePatch) -> Result<Wedge, StorageError> {
        let delay = *self.merge_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(StorageError::Db("permission denied".into()));
        }
        self.merges.lock().unwrap().push((id.clone(), patch.clone()));
        self.inner.merge(id, patch).await
    }

    async fn delete(&self, id: &WedgeId) -> Result<(), StorageError> {
        self.inner.delete(id).await
    }

    async fn subscribe(&self, user_id: &UserId) -> Result<watch::Receiver<Vec<Wedge>>, StorageError> {
        self.inner.subscribe(user_id).await
    }
}

pub fn user() -> UserId {
    UserId::from("golfer-1")
}

pub fn as_store(store: &Arc<RecordingStore>) -> Arc<dyn WedgeStore> {
    Arc::clone(store) as Arc<dyn WedgeStore>
}
