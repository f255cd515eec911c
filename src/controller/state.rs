use actix_web::cookie::{Cookie, SameSite};
use actix_web::{HttpRequest, HttpResponse};
use std::sync::Arc;
use std::time::Duration;

use super::see_other;
use crate::bag::Bag;
use crate::combine::CombineRegistry;
use crate::feed::{FeedRegistry, WedgeFeed};
use crate::identity::{LocalIdentity, SESSION_COOKIE, SessionId, Sessions};
use crate::model::{User, UserId, Wedge};

/// How long a handler waits for the feed to show its own write before rendering anyway.
pub const FEED_SETTLE: Duration = Duration::from_millis(500);

/// Shared state behind every handler.
pub struct AppState {
    pub bag: Bag,
    pub identity: Arc<LocalIdentity>,
    pub sessions: Sessions,
    pub feeds: FeedRegistry,
    pub combines: CombineRegistry,
    pub auto_advance_delay: Duration,
}

fn session_cookie(id: &SessionId) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, id.to_string())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish()
}

fn session_id(req: &HttpRequest) -> Option<SessionId> {
    req.cookie(SESSION_COOKIE)
        .map(|c| SessionId::from(c.value()))
}

impl AppState {
    /// Feeds follow `bag`'s store.
    #[must_use]
    pub fn new(bag: Bag, identity: Arc<LocalIdentity>, auto_advance_delay: Duration) -> Self {
        let feeds = FeedRegistry::new(bag.store());
        Self {
            bag,
            identity,
            sessions: Sessions::new(),
            feeds,
            combines: CombineRegistry::new(),
            auto_advance_delay,
        }
    }

    /// The user whose session cookie came with `req`, or a redirect to the sign-in page.
    ///
    /// # Errors
    ///
    /// Returns the redirect response when the request carries no live session.
    pub async fn user(&self, req: &HttpRequest) -> Result<User, HttpResponse> {
        let Some(id) = session_id(req) else {
            return Err(see_other("/login"));
        };
        let Some(uid) = self.sessions.resolve(&id).await else {
            return Err(see_other("/login"));
        };
        match self.identity.user(&uid).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => {
                self.sessions.end(&id).await;
                Err(see_other("/login"))
            }
            Err(e) => {
                tracing::warn!(%uid, error = %e, "account lookup failed");
                Err(see_other("/login"))
            }
        }
    }

    /// Open a session for `user` and return the cookie that carries it. A
    /// session the browser already held is ended first.
    pub async fn start_session(&self, req: &HttpRequest, user: &User) -> Cookie<'static> {
        if let Some(old) = session_id(req) {
            if let Some(uid) = self.sessions.end(&old).await {
                if uid != user.uid {
                    self.release(&uid).await;
                }
            }
        }
        self.feeds.open(user).await;
        let id = self.sessions.create(&user.uid).await;
        tracing::info!(uid = %user.uid, "session started");
        session_cookie(&id)
    }

    /// End the browser's session and return a cookie that clears it.
    pub async fn end_session(&self, req: &HttpRequest) -> Cookie<'static> {
        if let Some(id) = session_id(req) {
            if let Some(uid) = self.sessions.end(&id).await {
                tracing::info!(%uid, "signed out");
                self.release(&uid).await;
            }
        }
        let mut cookie = session_cookie(&SessionId::from(""));
        cookie.make_removal();
        cookie
    }

    /// Once no browser is signed in as `uid`, drop its combine and feed.
    async fn release(&self, uid: &UserId) {
        if self.sessions.is_active(uid).await {
            return;
        }
        self.combines.discard(uid).await;
        self.feeds.close(uid).await;
    }

    async fn feed(&self, user: &User) -> Arc<WedgeFeed> {
        let feed = self.feeds.open(user).await;
        if !feed.loaded(FEED_SETTLE).await {
            tracing::debug!(uid = %user.uid, "feed not loaded yet");
        }
        feed
    }

    /// The user's wedges as their feed currently has them.
    pub async fn wedges(&self, user: &User) -> Vec<Wedge> {
        self.feed(user).await.snapshot()
    }

    pub async fn settle(&self, user: &User, ready: impl FnMut(&Vec<Wedge>) -> bool) {
        if !self.feed(user).await.wait_for(FEED_SETTLE, ready).await {
            tracing::debug!(uid = %user.uid, "feed did not settle, rendering current snapshot");
        }
    }
}
