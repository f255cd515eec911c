use std::sync::Arc;
use std::time::Duration;

use dialed::bag::Bag;
use dialed::combine::{CombineDriver, CombineModel, Msg, NextControl, Outcome, Phase, update};
use dialed::model::{ShotTarget, SwingLength, WedgeInput};
use dialed::storage::WedgeStore;

mod common;
use common::{RecordingStore, as_store, user};

async fn setup(store: &Arc<RecordingStore>) -> Result<CombineDriver, Box<dyn std::error::Error>> {
    let wedge = store
        .create(
            &user(),
            WedgeInput {
                club: "Titleist Vokey SM10".into(),
                loft: 56,
                quarter: 40,
                ..WedgeInput::default()
            },
        )
        .await?;
    let bag = Bag::new(as_store(store));
    let driver = CombineDriver::new(CombineModel::new(wedge, Duration::from_millis(400)), bag);
    driver.dispatch(Msg::ChooseTarget(ShotTarget::Manual)).await;
    Ok(driver)
}

async fn shoot(driver: &CombineDriver, distances: &[u32]) {
    for d in distances {
        driver.dispatch(Msg::EditEntry(d.to_string())).await;
        driver.dispatch(Msg::AddShot).await;
    }
}

#[tokio::test]
async fn test_save_writes_only_measured_swings() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(RecordingStore::new());
    let driver = setup(&store).await?;
    let original = store.get(driver.wedge_id()).await?;

    shoot(&driver, &[100, 102, 98]).await;
    driver.dispatch(Msg::Next).await;
    shoot(&driver, &[80, 90, 85, 60, 100]).await;
    driver.dispatch(Msg::Next).await;
    shoot(&driver, &[70]).await;
    driver.dispatch(Msg::Next).await;

    let model = driver.snapshot().await;
    assert_eq!(model.phase(), Phase::Stage(SwingLength::Quarter));
    assert_eq!(model.next_control(), NextControl::Disabled);
    driver.dispatch(Msg::Skip).await;

    let model = driver.snapshot().await;
    assert_eq!(model.phase(), Phase::Review);
    assert_eq!(model.averages().len(), 3);

    assert_eq!(driver.dispatch(Msg::Save).await, Some(Outcome::Saved));

    let merges = store.merges();
    assert_eq!(merges.len(), 1, "exactly one write per save");
    let (id, patch) = &merges[0];
    assert_eq!(id, driver.wedge_id());
    assert!(patch.club.is_none() && patch.loft.is_none());
    assert_eq!(
        patch.yardages.keys().copied().collect::<Vec<_>>(),
        vec![SwingLength::FullSwing, SwingLength::ThreeQuarter, SwingLength::Half]
    );

    let saved = store.get(driver.wedge_id()).await?;
    assert_eq!(saved.full_swing, 100);
    assert_eq!(saved.three_quarter, 85);
    assert_eq!(saved.half, 70);
    assert_eq!(saved.quarter, 40, "untouched swing keeps its old distance");
    assert_eq!(saved.created_at, original.created_at);
    assert!(saved.updated_at >= original.updated_at);
    Ok(())
}

#[tokio::test]
async fn test_abort_leaves_no_write() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(RecordingStore::new());
    let driver = setup(&store).await?;
    let before = store.get(driver.wedge_id()).await?;

    shoot(&driver, &[95, 97]).await;
    driver.dispatch(Msg::Next).await;
    shoot(&driver, &[81]).await;

    assert_eq!(driver.dispatch(Msg::Abort).await, Some(Outcome::Aborted));
    let model = driver.snapshot().await;
    assert_eq!(model.phase(), Phase::Aborted);
    assert!(model.shots(SwingLength::FullSwing).is_empty());

    assert!(store.merges().is_empty());
    assert_eq!(store.get(driver.wedge_id()).await?, before);
    Ok(())
}

#[tokio::test]
async fn test_failed_save_keeps_results_for_retry() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(RecordingStore::new());
    let driver = setup(&store).await?;
    shoot(&driver, &[110]).await;
    for _ in 0..4 {
        driver.dispatch(Msg::Skip).await;
    }
    assert_eq!(driver.snapshot().await.phase(), Phase::Review);

    store.fail_next_merges(1);
    assert_eq!(driver.dispatch(Msg::Save).await, None);
    let model = driver.snapshot().await;
    assert_eq!(model.phase(), Phase::Review);
    assert!(!model.is_saving());
    assert!(model.error().is_some_and(|e| e.contains("permission denied")));
    assert_eq!(model.shots(SwingLength::FullSwing), &[110]);

    assert_eq!(driver.dispatch(Msg::Save).await, Some(Outcome::Saved));
    assert_eq!(store.get(driver.wedge_id()).await?.full_swing, 110);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_stalled_save_times_out() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(RecordingStore::new());
    let wedge = store.create(&user(), common::wedge_input("Ping Glide 4.0", 58)).await?;
    let bag = Bag::with_write_timeout(as_store(&store), Duration::from_secs(10));
    let driver = CombineDriver::new(CombineModel::manual(wedge), bag);
    shoot(&driver, &[75]).await;
    for _ in 0..4 {
        driver.dispatch(Msg::Skip).await;
    }

    store.stall_merges(Duration::from_secs(30));
    assert_eq!(driver.dispatch(Msg::Save).await, None);
    let model = driver.snapshot().await;
    assert!(model.error().is_some_and(|e| e.contains("timed out")));
    assert_eq!(model.phase(), Phase::Review);
    Ok(())
}

fn pure_model() -> CombineModel {
    let wedge = dialed::model::Wedge::new(
        user(),
        common::wedge_input("Callaway Jaws Raw", 60),
        chrono::Utc::now(),
    );
    CombineModel::manual(wedge)
}

fn add(model: &mut CombineModel, distance: u32) {
    update(model, Msg::EditEntry(distance.to_string()));
    update(model, Msg::AddShot);
}

#[test]
fn test_remove_shot_touches_only_its_stage() {
    let mut model = pure_model();
    add(&mut model, 100);
    add(&mut model, 110);
    update(&mut model, Msg::Next);
    add(&mut model, 90);
    update(&mut model, Msg::Back);

    update(&mut model, Msg::RemoveShot(0));
    assert_eq!(model.shots(SwingLength::FullSwing), &[110]);
    assert_eq!(model.shots(SwingLength::ThreeQuarter), &[90]);

    // out of range is a no-op
    update(&mut model, Msg::RemoveShot(5));
    assert_eq!(model.shots(SwingLength::FullSwing), &[110]);
}

#[test]
fn test_back_then_next_returns_to_same_state() {
    let mut model = pure_model();
    add(&mut model, 100);
    update(&mut model, Msg::Next);
    add(&mut model, 90);
    update(&mut model, Msg::EditEntry("8".into()));

    update(&mut model, Msg::Back);
    assert_eq!(model.phase(), Phase::Stage(SwingLength::FullSwing));
    assert_eq!(model.entry(), "");
    assert_eq!(model.shots(SwingLength::FullSwing), &[100]);

    update(&mut model, Msg::Next);
    assert_eq!(model.phase(), Phase::Stage(SwingLength::ThreeQuarter));
    assert_eq!(model.shots(SwingLength::ThreeQuarter), &[90]);
    assert_eq!(model.current_average(), Some(90));
}

#[test]
fn test_rejected_entries_are_not_recorded() {
    let mut model = pure_model();
    for raw in ["0", "201", "abc", "", "-5"] {
        update(&mut model, Msg::EditEntry(raw.into()));
        assert!(!model.can_add_shot());
        update(&mut model, Msg::AddShot);
    }
    assert!(model.shots(SwingLength::FullSwing).is_empty());
    add(&mut model, 200);
    add(&mut model, 1);
    assert_eq!(model.shots(SwingLength::FullSwing), &[200, 1]);
}
