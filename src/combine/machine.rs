//! Combine session state machine.
//!
//! Model / message / update / effect, the same split the score page uses:
//! `update` is pure and synchronous, everything that waits (the auto-advance
//! timer, the save) is returned as an [`Effect`] for the driver to run, and
//! its result comes back in as another [`Msg`].

use std::collections::BTreeMap;
use std::time::Duration;

use super::aggregate::trimmed_mean;
use super::entry::parse_shot_entry;
use crate::model::{CombineSession, CombineShot, ShotTarget, SwingLength, Wedge};

pub const DEFAULT_AUTO_ADVANCE_DELAY: Duration = Duration::from_millis(400);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Choosing a per-stage shot target.
    Setup,
    Stage(SwingLength),
    /// Averages are frozen; waiting for the user to save.
    Review,
    Saved,
    Aborted,
}

impl Phase {
    #[must_use]
    pub fn is_closed(self) -> bool {
        matches!(self, Phase::Saved | Phase::Aborted)
    }
}

/// What the primary "next" button shows and whether it can be pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextControl {
    Disabled,
    Next(SwingLength),
    Finish,
    /// A target is set and not met yet; pressing it skips the rest of the stage.
    Skip { remaining: usize },
}

impl NextControl {
    #[must_use]
    pub fn enabled(self) -> bool {
        !matches!(self, NextControl::Disabled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Saved,
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    ChooseTarget(ShotTarget),
    EditEntry(String),
    AddShot,
    RemoveShot(usize),
    Next,
    Skip,
    Back,
    AutoAdvance { ticket: u64 },
    Save,
    SaveSucceeded,
    SaveFailed(String),
    Abort,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ScheduleAutoAdvance { ticket: u64, delay: Duration },
    CancelAutoAdvance,
    Persist(CombineSession),
    Close(Outcome),
}

/// Shot lists for all four swing lengths of one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageShots(BTreeMap<SwingLength, Vec<u32>>);

impl Default for StageShots {
    fn default() -> Self {
        Self(SwingLength::ALL.into_iter().map(|s| (s, Vec::new())).collect())
    }
}

impl StageShots {
    #[must_use]
    pub fn get(&self, swing: SwingLength) -> &[u32] {
        self.0.get(&swing).map(Vec::as_slice).unwrap_or_default()
    }

    fn push(&mut self, swing: SwingLength, distance: u32) {
        self.0.entry(swing).or_default().push(distance);
    }

    fn remove(&mut self, swing: SwingLength, index: usize) -> Option<u32> {
        let shots = self.0.get_mut(&swing)?;
        (index < shots.len()).then(|| shots.remove(index))
    }

    /// Trimmed mean per swing length, leaving out stages without shots.
    #[must_use]
    pub fn averages(&self) -> BTreeMap<SwingLength, u32> {
        self.0
            .iter()
            .filter(|(_, shots)| !shots.is_empty())
            .map(|(swing, shots)| (*swing, trimmed_mean(shots)))
            .collect()
    }

    #[must_use]
    pub fn to_combine_shots(&self) -> Vec<CombineShot> {
        self.0
            .iter()
            .flat_map(|(swing, shots)| {
                shots.iter().map(|d| CombineShot {
                    swing_length: *swing,
                    distance: *d,
                })
            })
            .collect()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }
}

/// One in-progress combine for one wedge.
///
/// All session state is private; it only changes through [`update`].
#[derive(Debug, Clone)]
pub struct CombineModel {
    wedge: Wedge,
    phase: Phase,
    target: ShotTarget,
    shots: StageShots,
    entry: String,
    auto_advance_delay: Duration,
    pending_advance: Option<u64>,
    next_ticket: u64,
    averages: BTreeMap<SwingLength, u32>,
    saving: bool,
    error: Option<String>,
}

impl CombineModel {
    /// Starts in [`Phase::Setup`] so the user can pick a shot target.
    #[must_use]
    pub fn new(wedge: Wedge, auto_advance_delay: Duration) -> Self {
        Self {
            wedge,
            phase: Phase::Setup,
            target: ShotTarget::Manual,
            shots: StageShots::default(),
            entry: String::new(),
            auto_advance_delay,
            pending_advance: None,
            next_ticket: 0,
            averages: BTreeMap::new(),
            saving: false,
            error: None,
        }
    }

    /// Skips setup: manual advancement only, first stage active.
    #[must_use]
    pub fn manual(wedge: Wedge) -> Self {
        let mut model = Self::new(wedge, DEFAULT_AUTO_ADVANCE_DELAY);
        model.phase = Phase::Stage(SwingLength::FullSwing);
        model
    }

    #[must_use]
    pub fn wedge(&self) -> &Wedge {
        &self.wedge
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn target(&self) -> ShotTarget {
        self.target
    }

    #[must_use]
    pub fn entry(&self) -> &str {
        &self.entry
    }

    #[must_use]
    pub fn shots(&self, swing: SwingLength) -> &[u32] {
        self.shots.get(swing)
    }

    #[must_use]
    pub fn stage(&self) -> Option<SwingLength> {
        match self.phase {
            Phase::Stage(swing) => Some(swing),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.saving
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn auto_advance_pending(&self) -> bool {
        self.pending_advance.is_some()
    }

    /// Frozen averages; empty until the session reaches review.
    #[must_use]
    pub fn averages(&self) -> &BTreeMap<SwingLength, u32> {
        &self.averages
    }

    /// Live trimmed mean of the active stage, `None` while it has no shots.
    #[must_use]
    pub fn current_average(&self) -> Option<u32> {
        let shots = self.shots.get(self.stage()?);
        (!shots.is_empty()).then(|| trimmed_mean(shots))
    }

    /// Whether `swing` already holds as many shots as the target asks for.
    #[must_use]
    pub fn stage_full(&self, swing: SwingLength) -> bool {
        self.target
            .count()
            .is_some_and(|n| self.shots.get(swing).len() >= n)
    }

    #[must_use]
    pub fn can_add_shot(&self) -> bool {
        match self.phase {
            Phase::Stage(swing) => !self.stage_full(swing) && parse_shot_entry(&self.entry).is_some(),
            _ => false,
        }
    }

    #[must_use]
    pub fn next_control(&self) -> NextControl {
        let Phase::Stage(swing) = self.phase else {
            return NextControl::Disabled;
        };
        let count = self.shots.get(swing).len();
        if let Some(target) = self.target.count() {
            if count < target {
                return NextControl::Skip {
                    remaining: target - count,
                };
            }
        }
        if count == 0 {
            return NextControl::Disabled;
        }
        match swing.next() {
            Some(next) => NextControl::Next(next),
            None => NextControl::Finish,
        }
    }

    /// The result bundle handed to persistence.
    #[must_use]
    pub fn session(&self) -> CombineSession {
        CombineSession {
            wedge_id: self.wedge.id.clone(),
            shots: self.shots.to_combine_shots(),
            averages: self.averages.clone(),
        }
    }

    fn cancel_pending(&mut self, effects: &mut Vec<Effect>) {
        if self.pending_advance.take().is_some() {
            effects.push(Effect::CancelAutoAdvance);
        }
    }

    fn advance_from(&mut self, swing: SwingLength) {
        self.entry.clear();
        match swing.next() {
            Some(next) => {
                tracing::debug!(from = %swing, to = %next, "combine stage advanced");
                self.phase = Phase::Stage(next);
            }
            None => {
                self.averages = self.shots.averages();
                tracing::debug!(
                    wedge_id = %self.wedge.id,
                    shots = self.shots.total(),
                    stages = self.averages.len(),
                    "combine finished, averages frozen"
                );
                self.phase = Phase::Review;
            }
        }
    }

    fn discard(&mut self) {
        self.shots = StageShots::default();
        self.entry.clear();
        self.averages.clear();
        self.error = None;
    }
}

/// Apply one message. Messages that make no sense in the current phase are
/// ignored and produce no effects.
pub fn update(model: &mut CombineModel, msg: Msg) -> Vec<Effect> {
    let mut effects = Vec::new();
    match (model.phase, msg) {
        (Phase::Setup, Msg::ChooseTarget(target)) => {
            let target = match target {
                ShotTarget::Fixed(n) => ShotTarget::fixed(n).unwrap_or_default(),
                ShotTarget::Manual => ShotTarget::Manual,
            };
            model.target = target;
            model.shots = StageShots::default();
            model.phase = Phase::Stage(SwingLength::FullSwing);
            tracing::debug!(shot_target = %target, "combine started");
        }
        (Phase::Stage(_), Msg::EditEntry(raw)) => {
            model.entry = raw;
        }
        (Phase::Stage(swing), Msg::AddShot) => {
            if model.stage_full(swing) {
                tracing::debug!(stage = %swing, "stage already at target, shot rejected");
                return effects;
            }
            let Some(distance) = parse_shot_entry(&model.entry) else {
                return effects;
            };
            model.shots.push(swing, distance);
            model.entry.clear();
            // the last stage waits for an explicit finish
            if model.stage_full(swing) && !swing.is_last() {
                let ticket = model.next_ticket;
                model.next_ticket += 1;
                model.pending_advance = Some(ticket);
                effects.push(Effect::ScheduleAutoAdvance {
                    ticket,
                    delay: model.auto_advance_delay,
                });
            }
        }
        (Phase::Stage(swing), Msg::RemoveShot(index)) => {
            if model.shots.remove(swing, index).is_some() && !model.stage_full(swing) {
                model.cancel_pending(&mut effects);
            }
        }
        (Phase::Stage(swing), Msg::Next) => {
            if model.next_control().enabled() {
                model.cancel_pending(&mut effects);
                model.advance_from(swing);
            }
        }
        (Phase::Stage(swing), Msg::Skip) => {
            model.cancel_pending(&mut effects);
            model.advance_from(swing);
        }
        (Phase::Stage(swing), Msg::Back) => {
            if let Some(prev) = swing.prev() {
                model.cancel_pending(&mut effects);
                model.entry.clear();
                model.phase = Phase::Stage(prev);
            }
        }
        (Phase::Stage(swing), Msg::AutoAdvance { ticket }) => {
            if model.pending_advance == Some(ticket) {
                model.pending_advance = None;
                model.advance_from(swing);
            } else {
                tracing::trace!(ticket, "stale auto-advance ignored");
            }
        }
        (Phase::Review, Msg::Save) => {
            if !model.saving {
                model.saving = true;
                model.error = None;
                effects.push(Effect::Persist(model.session()));
            }
        }
        (Phase::Review, Msg::SaveSucceeded) => {
            model.saving = false;
            model.discard();
            model.phase = Phase::Saved;
            effects.push(Effect::Close(Outcome::Saved));
        }
        (Phase::Review, Msg::SaveFailed(reason)) => {
            tracing::warn!(wedge_id = %model.wedge.id, %reason, "combine save failed");
            model.saving = false;
            model.error = Some(reason);
        }
        (phase, Msg::Abort) if !phase.is_closed() && !model.saving => {
            model.cancel_pending(&mut effects);
            model.discard();
            model.phase = Phase::Aborted;
            tracing::debug!(wedge_id = %model.wedge.id, "combine aborted");
            effects.push(Effect::Close(Outcome::Aborted));
        }
        (phase, msg) => {
            tracing::trace!(?phase, ?msg, "message ignored");
        }
    }
    effects
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{UserId, WedgeInput};
    use chrono::Utc;

    fn wedge() -> Wedge {
        Wedge::new(
            UserId::from("u1"),
            WedgeInput {
                club: "Cleveland RTX 6".into(),
                loft: 52,
                ..WedgeInput::default()
            },
            Utc::now(),
        )
    }

    fn add(model: &mut CombineModel, distance: &str) -> Vec<Effect> {
        update(model, Msg::EditEntry(distance.to_string()));
        update(model, Msg::AddShot)
    }

    #[test]
    fn invalid_entry_is_silently_rejected() {
        let mut model = CombineModel::manual(wedge());
        update(&mut model, Msg::EditEntry("0".into()));
        assert!(!model.can_add_shot());
        assert!(update(&mut model, Msg::AddShot).is_empty());
        assert!(model.shots(SwingLength::FullSwing).is_empty());
        assert_eq!(model.entry(), "0");
    }

    #[test]
    fn next_disabled_on_empty_manual_stage() {
        let mut model = CombineModel::manual(wedge());
        assert_eq!(model.next_control(), NextControl::Disabled);
        update(&mut model, Msg::Next);
        assert_eq!(model.phase(), Phase::Stage(SwingLength::FullSwing));

        add(&mut model, "101");
        assert_eq!(model.next_control(), NextControl::Next(SwingLength::ThreeQuarter));
    }

    #[test]
    fn skip_always_advances() {
        let mut model = CombineModel::manual(wedge());
        update(&mut model, Msg::Skip);
        assert_eq!(model.phase(), Phase::Stage(SwingLength::ThreeQuarter));
    }

    #[test]
    fn target_shows_remaining_as_skip() {
        let mut model = CombineModel::new(wedge(), DEFAULT_AUTO_ADVANCE_DELAY);
        update(&mut model, Msg::ChooseTarget(ShotTarget::Fixed(3)));
        assert_eq!(model.next_control(), NextControl::Skip { remaining: 3 });
        add(&mut model, "90");
        assert_eq!(model.next_control(), NextControl::Skip { remaining: 2 });
    }

    #[test]
    fn unsupported_target_falls_back_to_manual() {
        let mut model = CombineModel::new(wedge(), DEFAULT_AUTO_ADVANCE_DELAY);
        update(&mut model, Msg::ChooseTarget(ShotTarget::Fixed(4)));
        assert_eq!(model.target(), ShotTarget::Manual);
        assert_eq!(model.phase(), Phase::Stage(SwingLength::FullSwing));
    }

    #[test]
    fn stale_ticket_does_not_double_advance() {
        let mut model = CombineModel::new(wedge(), Duration::from_millis(300));
        update(&mut model, Msg::ChooseTarget(ShotTarget::Fixed(3)));
        add(&mut model, "100");
        add(&mut model, "101");
        let effects = add(&mut model, "102");
        assert_eq!(
            effects,
            vec![Effect::ScheduleAutoAdvance {
                ticket: 0,
                delay: Duration::from_millis(300)
            }]
        );

        // user pressed next before the timer fired
        assert_eq!(update(&mut model, Msg::Next), vec![Effect::CancelAutoAdvance]);
        assert_eq!(model.phase(), Phase::Stage(SwingLength::ThreeQuarter));

        update(&mut model, Msg::AutoAdvance { ticket: 0 });
        assert_eq!(model.phase(), Phase::Stage(SwingLength::ThreeQuarter));
    }

    #[test]
    fn removing_below_target_cancels_pending_advance() {
        let mut model = CombineModel::new(wedge(), DEFAULT_AUTO_ADVANCE_DELAY);
        update(&mut model, Msg::ChooseTarget(ShotTarget::Fixed(3)));
        for d in ["80", "82", "84"] {
            add(&mut model, d);
        }
        assert!(model.auto_advance_pending());
        assert_eq!(update(&mut model, Msg::RemoveShot(2)), vec![Effect::CancelAutoAdvance]);
        assert!(!model.auto_advance_pending());
        update(&mut model, Msg::AutoAdvance { ticket: 0 });
        assert_eq!(model.phase(), Phase::Stage(SwingLength::FullSwing));
    }

    #[test]
    fn last_stage_waits_for_finish() {
        let mut model = CombineModel::new(wedge(), DEFAULT_AUTO_ADVANCE_DELAY);
        update(&mut model, Msg::ChooseTarget(ShotTarget::Fixed(3)));
        for _ in 0..3 {
            update(&mut model, Msg::Skip);
        }
        assert_eq!(model.phase(), Phase::Stage(SwingLength::Quarter));
        for d in ["30", "31", "32"] {
            assert!(add(&mut model, d).is_empty());
        }
        assert_eq!(model.next_control(), NextControl::Finish);
        update(&mut model, Msg::Next);
        assert_eq!(model.phase(), Phase::Review);
        assert_eq!(model.averages().get(&SwingLength::Quarter), Some(&31));
    }

    #[test]
    fn save_failure_keeps_review_for_retry() {
        let mut model = CombineModel::manual(wedge());
        add(&mut model, "95");
        for _ in 0..4 {
            update(&mut model, Msg::Skip);
        }
        assert_eq!(model.phase(), Phase::Review);

        let effects = update(&mut model, Msg::Save);
        assert!(matches!(effects.as_slice(), [Effect::Persist(_)]));
        assert!(model.is_saving());
        // a second press while saving is ignored
        assert!(update(&mut model, Msg::Save).is_empty());

        update(&mut model, Msg::SaveFailed("offline".into()));
        assert_eq!(model.phase(), Phase::Review);
        assert_eq!(model.error(), Some("offline"));
        assert_eq!(model.shots(SwingLength::FullSwing), &[95]);

        assert!(matches!(update(&mut model, Msg::Save).as_slice(), [Effect::Persist(_)]));
        assert_eq!(model.error(), None);
        assert_eq!(
            update(&mut model, Msg::SaveSucceeded),
            vec![Effect::Close(Outcome::Saved)]
        );
        assert_eq!(model.phase(), Phase::Saved);
        assert_eq!(model.shots.total(), 0);
    }
}
