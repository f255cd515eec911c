use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

use super::{AccountStore, SnapshotHub, StorageError, WedgeStore};
use crate::model::{Account, UserId, Wedge, WedgeId, WedgeInput, WedgePatch, now_millis};

/// Applied in order on every open.
pub const SCHEMA: [&str; 2] = [
    include_str!("../sql/schema/sqlite/00_wedge.sql"),
    include_str!("../sql/schema/sqlite/01_user_account.sql"),
];

const SELECT_ACCOUNT: &str =
    "SELECT user_id, email, display_name, salt, digest FROM user_account";

const SELECT_WEDGE: &str = "SELECT wedge_id, user_id, club, loft, full_swing, three_quarter, \
     half, quarter, created_at, updated_at FROM wedge";

/// Wedge and account store backed by a single sqlite connection.
///
/// rusqlite is blocking, so every call hops onto the blocking pool.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    hub: Arc<SnapshotHub>,
}

impl SqliteStore {
    /// Open (or create) the database file and apply the schema.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Db` if the file cannot be opened or the schema fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let conn = Connection::open(path.as_ref())?;
        tracing::info!(path = %path.as_ref().display(), "opened sqlite store");
        Self::with_connection(conn)
    }

    /// # Errors
    ///
    /// Returns `StorageError::Db` if the schema cannot be applied.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        for script in SCHEMA {
            conn.execute_batch(script)?;
        }
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            hub: Arc::new(SnapshotHub::new()),
        })
    }

    async fn run<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StorageError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| StorageError::Db("sqlite connection lock poisoned".into()))?;
            f(&mut guard)
        })
        .await?
    }

    /// Run raw sql, e.g. a fixture or maintenance script.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Db` if any statement fails; the batch is rolled back.
    pub async fn execute_batch(&self, sql: &str) -> Result<(), StorageError> {
        let sql = sql.to_owned();
        self.run(move |conn| {
            let tx = conn.transaction()?;
            tx.execute_batch(&sql)?;
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn notify(&self, user_id: &UserId) {
        if !self.hub.is_watched(user_id) {
            return;
        }
        match self.list_for_user(user_id).await {
            Ok(snapshot) => self.hub.publish(user_id, snapshot),
            Err(e) => tracing::warn!(%user_id, error = %e, "could not refresh snapshot"),
        }
    }
}

fn millis_to_utc(idx: usize, ms: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms).ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, ms))
}

fn row_to_wedge(row: &Row<'_>) -> rusqlite::Result<Wedge> {
    Ok(Wedge {
        id: WedgeId::from(row.get::<_, String>(0)?),
        user_id: UserId::from(row.get::<_, String>(1)?),
        club: row.get(2)?,
        loft: row.get(3)?,
        full_swing: row.get(4)?,
        three_quarter: row.get(5)?,
        half: row.get(6)?,
        quarter: row.get(7)?,
        created_at: millis_to_utc(8, row.get(8)?)?,
        updated_at: millis_to_utc(9, row.get(9)?)?,
    })
}

fn row_to_account(row: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        uid: UserId::from(row.get::<_, String>(0)?),
        email: row.get(1)?,
        display_name: row.get(2)?,
        salt: row.get(3)?,
        digest: row.get(4)?,
    })
}

fn select_one(conn: &Connection, id: &WedgeId) -> Result<Wedge, StorageError> {
    conn.query_row(
        &format!("{SELECT_WEDGE} WHERE wedge_id = ?1"),
        params![id.as_str()],
        row_to_wedge,
    )
    .optional()?
    .ok_or_else(|| StorageError::NotFound(id.clone()))
}

#[async_trait]
impl WedgeStore for SqliteStore {
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Wedge>, StorageError> {
        let user_id = user_id.clone();
        self.run(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_WEDGE} WHERE user_id = ?1 ORDER BY created_at, wedge_id"
            ))?;
            let rows = stmt.query_map(params![user_id.as_str()], row_to_wedge)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
        .await
    }

    async fn get(&self, id: &WedgeId) -> Result<Wedge, StorageError> {
        let id = id.clone();
        self.run(move |conn| select_one(conn, &id)).await
    }

    async fn create(&self, user_id: &UserId, input: WedgeInput) -> Result<Wedge, StorageError> {
        let wedge = Wedge::new(user_id.clone(), input, now_millis());
        let row = wedge.clone();
        self.run(move |conn| {
            conn.execute(
                "INSERT INTO wedge (wedge_id, user_id, club, loft, full_swing, three_quarter, \
                 half, quarter, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    row.id.as_str(),
                    row.user_id.as_str(),
                    row.club,
                    row.loft,
                    row.full_swing,
                    row.three_quarter,
                    row.half,
                    row.quarter,
                    row.created_at.timestamp_millis(),
                    row.updated_at.timestamp_millis(),
                ],
            )?;
            Ok(())
        })
        .await?;
        tracing::info!(wedge_id = %wedge.id, %user_id, club = %wedge.club, "wedge created");
        self.notify(user_id).await;
        Ok(wedge)
    }

    async fn merge(&self, id: &WedgeId, patch: &WedgePatch) -> Result<Wedge, StorageError> {
        let mut assignments = Vec::new();
        let mut values: Vec<Value> = Vec::new();
        if let Some(club) = &patch.club {
            assignments.push("club");
            values.push(Value::Text(club.clone()));
        }
        if let Some(loft) = patch.loft {
            assignments.push("loft");
            values.push(Value::Integer(i64::from(loft)));
        }
        for (swing, yards) in &patch.yardages {
            assignments.push(swing.column_name());
            values.push(Value::Integer(i64::from(*yards)));
        }
        assignments.push("updated_at");
        values.push(Value::Integer(now_millis().timestamp_millis()));

        let set_clause = assignments
            .iter()
            .enumerate()
            .map(|(i, column)| format!("{column} = ?{}", i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE wedge SET {set_clause} WHERE wedge_id = ?{}",
            values.len() + 1
        );
        values.push(Value::Text(id.as_str().to_string()));

        let id_owned = id.clone();
        let merged = self
            .run(move |conn| {
                let changed = conn.execute(&sql, params_from_iter(values))?;
                if changed == 0 {
                    return Err(StorageError::NotFound(id_owned));
                }
                select_one(conn, &id_owned)
            })
            .await?;
        tracing::info!(wedge_id = %id, fields = patch.yardages.len(), "wedge updated");
        self.notify(&merged.user_id).await;
        Ok(merged)
    }

    async fn delete(&self, id: &WedgeId) -> Result<(), StorageError> {
        let id_owned = id.clone();
        let user_id = self
            .run(move |conn| {
                let wedge = select_one(conn, &id_owned)?;
                conn.execute(
                    "DELETE FROM wedge WHERE wedge_id = ?1",
                    params![id_owned.as_str()],
                )?;
                Ok(wedge.user_id)
            })
            .await?;
        tracing::info!(wedge_id = %id, "wedge deleted");
        self.notify(&user_id).await;
        Ok(())
    }

    async fn subscribe(
        &self,
        user_id: &UserId,
    ) -> Result<watch::Receiver<Vec<Wedge>>, StorageError> {
        let current = self.list_for_user(user_id).await?;
        Ok(self.hub.subscribe(user_id, current))
    }
}

#[async_trait]
impl AccountStore for SqliteStore {
    async fn account(&self, uid: &UserId) -> Result<Option<Account>, StorageError> {
        let uid = uid.clone();
        self.run(move |conn| {
            Ok(conn
                .query_row(
                    &format!("{SELECT_ACCOUNT} WHERE user_id = ?1"),
                    params![uid.as_str()],
                    row_to_account,
                )
                .optional()?)
        })
        .await
    }

    async fn account_by_email(&self, email: &str) -> Result<Option<Account>, StorageError> {
        let email = email.to_owned();
        self.run(move |conn| {
            Ok(conn
                .query_row(
                    &format!("{SELECT_ACCOUNT} WHERE email = ?1"),
                    params![email],
                    row_to_account,
                )
                .optional()?)
        })
        .await
    }

    async fn insert_account(&self, account: &Account) -> Result<(), StorageError> {
        let row = account.clone();
        self.run(move |conn| {
            conn.execute(
                "INSERT INTO user_account (user_id, email, display_name, salt, digest, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    row.uid.as_str(),
                    row.email,
                    row.display_name,
                    row.salt,
                    row.digest,
                    now_millis().timestamp_millis(),
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn update_account(&self, account: &Account) -> Result<(), StorageError> {
        let row = account.clone();
        self.run(move |conn| {
            let changed = conn.execute(
                "UPDATE user_account SET email = ?2, display_name = ?3, salt = ?4, digest = ?5 \
                 WHERE user_id = ?1",
                params![
                    row.uid.as_str(),
                    row.email,
                    row.display_name,
                    row.salt,
                    row.digest,
                ],
            )?;
            if changed == 0 {
                return Err(StorageError::UnknownAccount(row.uid));
            }
            Ok(())
        })
        .await
    }
}
