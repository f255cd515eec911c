use std::collections::HashMap;
use std::fmt;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::model::UserId;

/// Name of the cookie carrying a browser's session id.
pub const SESSION_COOKIE: &str = "dialed_session";

/// Random per-browser token. Holding it is being signed in.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Signed-in browsers. One user may hold several sessions; each resolves to
/// exactly one uid. Sessions are not persisted, a restart signs everyone out.
#[derive(Default)]
pub struct Sessions {
    by_id: RwLock<HashMap<SessionId, UserId>>,
}

impl Sessions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, uid: &UserId) -> SessionId {
        let id = SessionId::generate();
        self.by_id.write().await.insert(id.clone(), uid.clone());
        tracing::debug!(%uid, "session opened");
        id
    }

    pub async fn resolve(&self, id: &SessionId) -> Option<UserId> {
        self.by_id.read().await.get(id).cloned()
    }

    /// Forget `id`, returning whose session it was.
    pub async fn end(&self, id: &SessionId) -> Option<UserId> {
        let uid = self.by_id.write().await.remove(id);
        if let Some(uid) = &uid {
            tracing::debug!(%uid, "session closed");
        }
        uid
    }

    /// Whether any browser is still signed in as `uid`.
    pub async fn is_active(&self, uid: &UserId) -> bool {
        self.by_id.read().await.values().any(|u| u == uid)
    }
}
