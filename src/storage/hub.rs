use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::watch;

use crate::model::{UserId, Wedge};

/// Fan-out of full-collection snapshots, one watch channel per watched user.
///
/// Channels whose receivers are all gone are dropped on the next publish.
#[derive(Default)]
pub struct SnapshotHub {
    channels: Mutex<HashMap<UserId, watch::Sender<Vec<Wedge>>>>,
}

impl SnapshotHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, user_id: &UserId, current: Vec<Wedge>) -> watch::Receiver<Vec<Wedge>> {
        let mut channels = self
            .channels
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match channels.get(user_id) {
            Some(sender) => {
                sender.send_replace(current);
                sender.subscribe()
            }
            None => {
                let (sender, receiver) = watch::channel(current);
                channels.insert(user_id.clone(), sender);
                receiver
            }
        }
    }

    #[must_use]
    pub fn is_watched(&self, user_id: &UserId) -> bool {
        self.channels
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(user_id)
            .is_some_and(|sender| sender.receiver_count() > 0)
    }

    pub fn publish(&self, user_id: &UserId, snapshot: Vec<Wedge>) {
        let mut channels = self
            .channels
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let Some(sender) = channels.get(user_id) else {
            return;
        };
        if sender.receiver_count() == 0 {
            channels.remove(user_id);
            tracing::debug!(%user_id, "no listeners left, snapshot channel closed");
            return;
        }
        tracing::trace!(%user_id, wedges = snapshot.len(), "publishing snapshot");
        sender.send_replace(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropped_receivers_close_the_channel() {
        let hub = SnapshotHub::new();
        let user = UserId::from("u1");
        let rx = hub.subscribe(&user, Vec::new());
        assert!(hub.is_watched(&user));
        drop(rx);
        assert!(!hub.is_watched(&user));
        hub.publish(&user, Vec::new());
        assert!(hub.channels.lock().unwrap().is_empty());
    }
}
