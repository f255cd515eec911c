use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use dialed::identity::{AuthError, LocalIdentity};
use dialed::model::{SwingLength, UserId, WedgeId, WedgePatch, build_matrix};
use dialed::storage::{SqliteStore, StorageError, WedgeStore};

mod common;

#[tokio::test]
async fn test_fixture_lists_per_user() -> Result<(), Box<dyn std::error::Error>> {
    let store = common::setup_sqlite(include_str!("test4.sql")).await?;

    let mine = store.list_for_user(&UserId::from("golfer-1")).await?;
    let ids: Vec<&str> = mine.iter().map(|w| w.id.as_str()).collect();
    assert_eq!(ids, vec!["w-sand", "w-gap", "w-lob"], "ordered by creation");

    let rows = build_matrix(&mine);
    assert_eq!(rows[0].loft, 50);
    assert_eq!(rows[2].loft, 60);
    assert_eq!(rows[0].cell(SwingLength::Half), "—");
    assert_eq!(rows[1].cell(SwingLength::Half), "62");

    let theirs = store.list_for_user(&UserId::from("golfer-2")).await?;
    assert_eq!(theirs.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_merge_writes_only_present_columns() -> Result<(), Box<dyn std::error::Error>> {
    let store = common::setup_sqlite(include_str!("test4.sql")).await?;
    let id = WedgeId::from("w-sand");
    let before = store.get(&id).await?;

    let patch = WedgePatch::yardages(BTreeMap::from([(SwingLength::Quarter, 41)]));
    let after = store.merge(&id, &patch).await?;

    assert_eq!(after.quarter, 41);
    assert_eq!(after.full_swing, before.full_swing);
    assert_eq!(after.three_quarter, before.three_quarter);
    assert_eq!(after.half, before.half);
    assert_eq!(after.club, before.club);
    assert_eq!(after.created_at, before.created_at);
    assert!(after.updated_at > before.updated_at);
    assert_eq!(store.get(&id).await?, after);
    Ok(())
}

#[tokio::test]
async fn test_missing_wedge_is_not_found() -> Result<(), Box<dyn std::error::Error>> {
    let store = common::setup_sqlite("").await?;
    let id = WedgeId::from("nope");
    assert_eq!(store.get(&id).await, Err(StorageError::NotFound(id.clone())));
    let patch = WedgePatch::yardages(BTreeMap::from([(SwingLength::Half, 60)]));
    assert_eq!(store.merge(&id, &patch).await, Err(StorageError::NotFound(id.clone())));
    Ok(())
}

#[tokio::test]
async fn test_subscription_sees_every_write() -> Result<(), Box<dyn std::error::Error>> {
    let store = common::setup_sqlite(include_str!("test4.sql")).await?;
    let me = UserId::from("golfer-1");
    let mut rx = store.subscribe(&me).await?;
    assert_eq!(rx.borrow_and_update().len(), 3);

    let created = store.create(&me, common::wedge_input("Mizuno T24", 46)).await?;
    tokio::time::timeout(Duration::from_secs(2), rx.changed()).await??;
    assert_eq!(rx.borrow_and_update().len(), 4);

    store.delete(&WedgeId::from("w-lob")).await?;
    tokio::time::timeout(Duration::from_secs(2), rx.changed()).await??;
    let snapshot = rx.borrow_and_update().clone();
    assert_eq!(snapshot.len(), 3);
    assert!(snapshot.iter().any(|w| w.id == created.id));

    // someone else's write does not reach this subscriber
    store
        .create(&UserId::from("golfer-2"), common::wedge_input("Ping ChipR", 48))
        .await?;
    assert!(!rx.has_changed()?);
    Ok(())
}

#[tokio::test]
async fn test_check_constraint_rejects_negative_loft() -> Result<(), Box<dyn std::error::Error>> {
    let store = common::setup_sqlite("").await?;
    let res = store
        .execute_batch(
            "INSERT INTO wedge VALUES ('bad', 'u', 'x', -2, 0, 0, 0, 0, 0, 0);",
        )
        .await;
    assert!(matches!(res, Err(StorageError::Db(_))));
    Ok(())
}

fn temp_db(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("dialed_{name}_{}.db", uuid::Uuid::new_v4().simple()));
    path
}

#[tokio::test]
async fn test_account_uid_survives_restart() -> Result<(), Box<dyn std::error::Error>> {
    let path = temp_db("restart");

    let (uid, wedge_id) = {
        let store = Arc::new(SqliteStore::open(&path)?);
        let identity = LocalIdentity::new(store.clone());
        let user = identity.sign_up("pro@club.com", "wedges!", "Pro").await?;
        let wedge = store.create(&user.uid, common::wedge_input("Vokey SM10", 58)).await?;
        let moved = identity.update_email(&user.uid, "new@club.com", "wedges!").await?;
        assert_eq!(moved.uid, user.uid);
        (user.uid, wedge.id)
    };

    // a fresh process over the same file
    let store = Arc::new(SqliteStore::open(&path)?);
    let identity = LocalIdentity::new(store.clone());
    let again = identity.sign_in("new@club.com", "wedges!").await?;
    assert_eq!(again.uid, uid);
    assert_eq!(again.name, "Pro");
    let mine = store.list_for_user(&again.uid).await?;
    assert_eq!(mine.iter().map(|w| w.id.clone()).collect::<Vec<_>>(), vec![wedge_id]);

    assert_eq!(
        identity.sign_up("new@club.com", "another", "").await,
        Err(AuthError::EmailInUse)
    );
    // the old address is free again and does not inherit the wedges
    let newcomer = identity.sign_up("pro@club.com", "another", "").await?;
    assert_ne!(newcomer.uid, uid);
    assert!(store.list_for_user(&newcomer.uid).await?.is_empty());

    drop(identity);
    drop(store);
    let _ = std::fs::remove_file(&path);
    Ok(())
}
