use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use super::machine::{CombineModel, Effect, Msg, Outcome, update};
use crate::bag::Bag;
use crate::model::WedgeId;

/// Owns one [`CombineModel`] and runs the effects its updates ask for.
///
/// Effects are drained in order; an effect that produces a result (the save)
/// feeds it back through `update` before the next effect runs.
pub struct CombineDriver {
    wedge_id: WedgeId,
    model: Arc<Mutex<CombineModel>>,
    bag: Bag,
    timer: std::sync::Mutex<Option<CancellationToken>>,
}

impl CombineDriver {
    #[must_use]
    pub fn new(model: CombineModel, bag: Bag) -> Self {
        Self {
            wedge_id: model.wedge().id.clone(),
            model: Arc::new(Mutex::new(model)),
            bag,
            timer: std::sync::Mutex::new(None),
        }
    }

    #[must_use]
    pub fn wedge_id(&self) -> &WedgeId {
        &self.wedge_id
    }

    /// A copy of the current state, for rendering.
    pub async fn snapshot(&self) -> CombineModel {
        self.model.lock().await.clone()
    }

    /// Apply `msg` and run every resulting effect. Returns the outcome once the
    /// session closes.
    pub async fn dispatch(&self, msg: Msg) -> Option<Outcome> {
        let mut queue: VecDeque<Effect> = {
            let mut model = self.model.lock().await;
            update(&mut model, msg).into()
        };
        let mut outcome = None;

        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::ScheduleAutoAdvance { ticket, delay } => self.schedule(ticket, delay),
                Effect::CancelAutoAdvance => self.cancel_timer(),
                Effect::Persist(session) => {
                    let result = match self.bag.commit_combine(&session).await {
                        Ok(_) => Msg::SaveSucceeded,
                        Err(e) => Msg::SaveFailed(e.to_string()),
                    };
                    let mut model = self.model.lock().await;
                    queue.extend(update(&mut model, result));
                }
                Effect::Close(closed) => {
                    self.cancel_timer();
                    tracing::info!(wedge_id = %self.wedge_id, outcome = ?closed, "combine closed");
                    outcome = Some(closed);
                }
            }
        }
        outcome
    }

    fn replace_timer(&self, token: Option<CancellationToken>) {
        let mut timer = self
            .timer
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(previous) = std::mem::replace(&mut *timer, token) {
            previous.cancel();
        }
    }

    fn cancel_timer(&self) {
        self.replace_timer(None);
    }

    fn schedule(&self, ticket: u64, delay: Duration) {
        let token = CancellationToken::new();
        self.replace_timer(Some(token.clone()));
        let model = Arc::clone(&self.model);
        tracing::debug!(ticket, ?delay, "auto-advance scheduled");

        tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => {
                    tracing::trace!(ticket, "auto-advance cancelled");
                }
                () = tokio::time::sleep(delay) => {
                    let mut model = model.lock().await;
                    let effects = update(&mut model, Msg::AutoAdvance { ticket });
                    debug_assert!(effects.is_empty());
                }
            }
        });
    }
}

impl Drop for CombineDriver {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}
