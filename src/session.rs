use std::{
    fs::{self, File},
    io::{BufReader, Write},
    path::PathBuf,
    sync::Mutex,
};

use chrono::{DateTime, Duration, Utc};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex as AsyncMutex;

use crate::{api::auth::AuthClient, error::Result, model::UserId};

/// Tokens are refreshed this long before they actually expire.
const REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub user: AuthUser,
}

impl Session {
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - Duration::seconds(REFRESH_MARGIN_SECS) <= now
    }
}

/// Persistence for the signed-in session.
///
/// Implementations swallow their own failures: a store that cannot be read
/// behaves as if it were empty.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Option<Session>;
    fn save(&self, session: &Session);
    fn clear(&self);
}

#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Option<Session> {
        if !self.path.exists() {
            return None;
        }
        debug!("Loading session {:?}", &self.path);
        let file = File::open(&self.path)
            .map_err(|e| error!("Error getting session from {:?}: {}", &self.path, e))
            .ok()?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| error!("Error reading session from {:?}: {}", &self.path, e))
            .ok()
    }

    fn save(&self, session: &Session) {
        debug!("Saving session {:?}", &self.path);
        let result = serde_json::to_vec(session)
            .map_err(|e| e.to_string())
            .and_then(|data| {
                if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent).map_err(|e| e.to_string())?;
                }
                let mut file = File::create(&self.path).map_err(|e| e.to_string())?;
                file.write_all(&data).map_err(|e| e.to_string())
            });
        if let Err(e) = result {
            error!("Error setting session in {:?}: {}", &self.path, e);
        }
    }

    fn clear(&self) {
        if self.path.exists() {
            if let Err(e) = fs::remove_file(&self.path) {
                error!("Error removing session {:?}: {}", &self.path, e);
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct MemorySessionStore(Mutex<Option<Session>>);

impl MemorySessionStore {
    pub fn with(session: Session) -> Self {
        Self(Mutex::new(Some(session)))
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Option<Session> {
        self.0.lock().ok()?.clone()
    }
    fn save(&self, session: &Session) {
        if let Ok(mut slot) = self.0.lock() {
            *slot = Some(session.clone());
        }
    }
    fn clear(&self) {
        if let Ok(mut slot) = self.0.lock() {
            *slot = None;
        }
    }
}

/// The signed-in session and its lifecycle.
///
/// Acquired once at start with [`SessionContext::acquire`], refreshed on
/// demand when the access token is about to expire, torn down by
/// [`SessionContext::sign_out`].
pub struct SessionContext {
    auth: AuthClient,
    store: Box<dyn SessionStore>,
    current: AsyncMutex<Option<Session>>,
}

impl SessionContext {
    pub fn new(auth: AuthClient, store: Box<dyn SessionStore>) -> Self {
        Self {
            auth,
            store,
            current: AsyncMutex::new(None),
        }
    }

    /// Restore the stored session, refreshing it when it has expired.
    pub async fn acquire(&self) -> Option<UserId> {
        let Some(session) = self.store.load() else {
            info!("User is signed out");
            return None;
        };
        *self.current.lock().await = Some(session);

        let identity = self.identity().await;
        match identity {
            Some(_) => info!("User is signed in"),
            None => info!("User is signed out"),
        }
        identity
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<UserId> {
        let session = self.auth.sign_in_with_password(email, password).await?;
        let id = session.user.id;
        self.store.save(&session);
        *self.current.lock().await = Some(session);
        info!("User is signed in");
        Ok(id)
    }

    /// Revoke the session remotely when possible, always forget it locally.
    pub async fn sign_out(&self) {
        let session = self.current.lock().await.take();
        if let Some(session) = session {
            if let Err(e) = self.auth.logout(&session.access_token).await {
                warn!("Remote logout failed: {}", e);
            }
        }
        self.store.clear();
        info!("User is signed out");
    }

    /// A usable access token, refreshed first when it is about to expire.
    ///
    /// A failed refresh ends the session.
    pub async fn access_token(&self) -> Option<String> {
        let mut current = self.current.lock().await;
        let session = current.as_ref()?;
        if !session.needs_refresh(Utc::now()) {
            return Some(session.access_token.clone());
        }

        match self.auth.refresh(&session.refresh_token).await {
            Ok(fresh) => {
                self.store.save(&fresh);
                let token = fresh.access_token.clone();
                *current = Some(fresh);
                Some(token)
            }
            Err(e) => {
                error!("Session refresh failed: {}", e);
                *current = None;
                self.store.clear();
                None
            }
        }
    }

    pub async fn identity(&self) -> Option<UserId> {
        self.access_token().await?;
        self.current.lock().await.as_ref().map(|s| s.user.id)
    }

    pub async fn email(&self) -> Option<String> {
        self.current.lock().await.as_ref()?.user.email.clone()
    }
}
