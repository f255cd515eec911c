use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, watch};
use tokio::task::JoinHandle;

use crate::model::{User, UserId, Wedge};
use crate::storage::WedgeStore;

/// One user's wedges, kept current from the store.
///
/// Holds at most one store subscription. When the identity changes the old
/// subscription is dropped before the new one is opened; signed out, the feed
/// is an empty list.
pub struct WedgeFeed {
    snapshot: watch::Receiver<Vec<Wedge>>,
    task: JoinHandle<()>,
}

impl WedgeFeed {
    #[must_use]
    pub fn spawn(identity: watch::Receiver<Option<User>>, store: Arc<dyn WedgeStore>) -> Self {
        let (tx, snapshot) = watch::channel(Vec::new());
        let task = tokio::spawn(follow(identity, store, tx));
        Self { snapshot, task }
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<Wedge> {
        self.snapshot.borrow().clone()
    }

    #[must_use]
    pub fn watch(&self) -> watch::Receiver<Vec<Wedge>> {
        self.snapshot.clone()
    }

    /// Wait for the first snapshot from the store, giving up after `within`.
    /// Returns whether it arrived.
    pub async fn loaded(&self, within: Duration) -> bool {
        // the held receiver never marks a value seen, so any publish counts
        let mut rx = self.snapshot.clone();
        matches!(tokio::time::timeout(within, rx.changed()).await, Ok(Ok(())))
    }

    /// Wait until the snapshot satisfies `ready`, giving up after `within`.
    /// Returns whether it did.
    pub async fn wait_for(&self, within: Duration, ready: impl FnMut(&Vec<Wedge>) -> bool) -> bool {
        let mut rx = self.snapshot.clone();
        matches!(tokio::time::timeout(within, rx.wait_for(ready)).await, Ok(Ok(_)))
    }
}

impl Drop for WedgeFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}

struct UserFeed {
    identity: watch::Sender<Option<User>>,
    feed: Arc<WedgeFeed>,
}

/// One [`WedgeFeed`] per signed-in uid, shared by all of that user's sessions.
pub struct FeedRegistry {
    store: Arc<dyn WedgeStore>,
    feeds: RwLock<HashMap<UserId, UserFeed>>,
}

impl FeedRegistry {
    #[must_use]
    pub fn new(store: Arc<dyn WedgeStore>) -> Self {
        Self {
            store,
            feeds: RwLock::new(HashMap::new()),
        }
    }

    /// The feed for `user`, opened on first use. A changed profile is passed
    /// on to the running feed without re-subscribing.
    pub async fn open(&self, user: &User) -> Arc<WedgeFeed> {
        let mut feeds = self.feeds.write().await;
        if let Some(entry) = feeds.get(&user.uid) {
            entry.identity.send_if_modified(|current| {
                if current.as_ref() == Some(user) {
                    return false;
                }
                *current = Some(user.clone());
                true
            });
            return Arc::clone(&entry.feed);
        }
        let (identity, rx) = watch::channel(Some(user.clone()));
        let feed = Arc::new(WedgeFeed::spawn(rx, Arc::clone(&self.store)));
        tracing::debug!(uid = %user.uid, "wedge feed opened");
        feeds.insert(
            user.uid.clone(),
            UserFeed {
                identity,
                feed: Arc::clone(&feed),
            },
        );
        feed
    }

    /// Stop following `uid`. Returns whether a feed was open.
    pub async fn close(&self, uid: &UserId) -> bool {
        match self.feeds.write().await.remove(uid) {
            Some(entry) => {
                entry.identity.send_replace(None);
                tracing::debug!(%uid, "wedge feed closed");
                true
            }
            None => false,
        }
    }

    pub async fn is_open(&self, uid: &UserId) -> bool {
        self.feeds.read().await.contains_key(uid)
    }
}

enum Event {
    IdentityChanged,
    IdentityClosed,
    Snapshot(Vec<Wedge>),
    SubscriptionClosed,
}

async fn next_snapshot(subscription: &mut Option<watch::Receiver<Vec<Wedge>>>) -> Event {
    match subscription {
        Some(rx) => match rx.changed().await {
            Ok(()) => Event::Snapshot(rx.borrow_and_update().clone()),
            Err(_) => Event::SubscriptionClosed,
        },
        None => std::future::pending().await,
    }
}

async fn follow(
    mut identity: watch::Receiver<Option<User>>,
    store: Arc<dyn WedgeStore>,
    out: watch::Sender<Vec<Wedge>>,
) {
    let mut current: Option<UserId> = None;
    let mut subscription: Option<watch::Receiver<Vec<Wedge>>> = None;
    let mut first = true;

    loop {
        let uid = identity.borrow_and_update().as_ref().map(|u| u.uid.clone());
        if first || uid != current {
            first = false;
            // tear down before re-subscribing
            subscription = None;
            current.clone_from(&uid);
            match &uid {
                None => {
                    tracing::debug!("no identity, wedge feed cleared");
                    out.send_replace(Vec::new());
                }
                Some(uid) => match store.subscribe(uid).await {
                    Ok(mut rx) => {
                        tracing::info!(%uid, "wedge subscription opened");
                        out.send_replace(rx.borrow_and_update().clone());
                        subscription = Some(rx);
                    }
                    Err(e) => {
                        tracing::warn!(%uid, error = %e, "wedge subscription failed");
                        out.send_replace(Vec::new());
                    }
                },
            }
        }

        let event = tokio::select! {
            changed = identity.changed() => match changed {
                Ok(()) => Event::IdentityChanged,
                Err(_) => Event::IdentityClosed,
            },
            event = next_snapshot(&mut subscription) => event,
        };

        match event {
            Event::IdentityChanged => {}
            Event::IdentityClosed => break,
            Event::Snapshot(wedges) => {
                out.send_replace(wedges);
            }
            Event::SubscriptionClosed => {
                tracing::debug!("wedge subscription closed by store");
                subscription = None;
            }
        }
    }
}
