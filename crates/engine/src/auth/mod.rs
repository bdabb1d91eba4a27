//! Device-local sign-in.
//!
//! Registered users live in one document under [`USERS_KEY`]; the signed-in
//! user's email lives under [`SESSION_KEY`]. The signed-in state is an explicit
//! [`Session`] value which callers hold on to and pass around. Interested
//! parties subscribe to changes instead of re-reading the key.
//!
//! [`USERS_KEY`]: crate::kv::USERS_KEY
//! [`SESSION_KEY`]: crate::kv::SESSION_KEY

use std::sync::Arc;

use tokio::sync::watch;

pub use credentials::CredentialStore;

use crate::{
    EngineError, ResultEngine,
    kv::{KeyValueStore, SESSION_KEY},
};

mod credentials;

/// Proof that a user is signed in on this device.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    email: String,
}

impl Session {
    pub fn email(&self) -> &str {
        &self.email
    }
}

/// Lower-cases and trims an email; rejects blanks.
pub(crate) fn normalize_email(email: &str) -> ResultEngine<String> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(
            "email must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_lowercase())
}

/// Registration, sign-in and sign-out on top of a [`CredentialStore`].
#[derive(Debug)]
pub struct Auth<S> {
    kv: Arc<S>,
    credentials: CredentialStore<S>,
    current: watch::Sender<Option<Session>>,
}

impl<S: KeyValueStore> Auth<S> {
    pub fn new(kv: Arc<S>, bcrypt_cost: u32) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            credentials: CredentialStore::new(Arc::clone(&kv), bcrypt_cost),
            kv,
            current,
        }
    }

    /// Loads the persisted session, if any, and publishes it.
    pub async fn restore(&self) -> ResultEngine<Option<Session>> {
        let session = self
            .kv
            .get(SESSION_KEY)
            .await?
            .map(|email| email.trim().to_string())
            .filter(|email| !email.is_empty())
            .map(|email| Session { email });
        self.current.send_replace(session.clone());
        Ok(session)
    }

    /// Creates an account and signs it in.
    pub async fn register(&self, email: &str, password: &str) -> ResultEngine<Session> {
        let email = self.credentials.register(email, password).await?;
        tracing::info!("registered {email}");
        self.begin(email).await
    }

    pub async fn log_in(&self, email: &str, password: &str) -> ResultEngine<Session> {
        let email = self.credentials.verify(email, password).await?;
        self.begin(email).await
    }

    pub async fn log_out(&self) -> ResultEngine<()> {
        self.kv.remove(SESSION_KEY).await?;
        if let Some(previous) = self.current.send_replace(None) {
            tracing::info!("signed out {}", previous.email);
        }
        Ok(())
    }

    pub fn current(&self) -> Option<Session> {
        self.current.borrow().clone()
    }

    /// Receiver notified every time the session starts or ends.
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.current.subscribe()
    }

    async fn begin(&self, email: String) -> ResultEngine<Session> {
        self.kv.set(SESSION_KEY, email.clone()).await?;
        let session = Session { email };
        tracing::info!("signed in {}", session.email);
        self.current.send_replace(Some(session.clone()));
        Ok(session)
    }
}
