use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::{
    EngineError, ResultEngine,
    kv::{KeyValueStore, USERS_KEY},
};

use super::normalize_email;

#[derive(Clone, Debug, Serialize, Deserialize)]
struct CredentialRecord {
    email: String,
    password_hash: String,
}

/// The registered users document.
///
/// Registration is a read-modify-write of the whole document, so it runs
/// under an async mutex: one registration at a time, in arrival order.
#[derive(Debug)]
pub struct CredentialStore<S> {
    kv: Arc<S>,
    cost: u32,
    write_lock: Mutex<()>,
}

impl<S: KeyValueStore> CredentialStore<S> {
    /// `cost` is the bcrypt work factor (4..=31).
    pub fn new(kv: Arc<S>, cost: u32) -> Self {
        Self {
            kv,
            cost,
            write_lock: Mutex::new(()),
        }
    }

    /// Stores a new user and returns the normalized email.
    pub async fn register(&self, email: &str, password: &str) -> ResultEngine<String> {
        let email = normalize_email(email)?;
        let password = normalize_password(password)?;

        let _guard = self.write_lock.lock().await;
        let mut users = self.load().await?;
        if users.iter().any(|user| user.email == email) {
            return Err(EngineError::ExistingKey(email));
        }

        let password_hash = hash_password(password, self.cost).await?;
        users.push(CredentialRecord {
            email: email.clone(),
            password_hash,
        });
        let payload = serde_json::to_string(&users)
            .map_err(|err| EngineError::Persistence(std::io::Error::other(err)))?;
        self.kv.set(USERS_KEY, payload).await?;
        Ok(email)
    }

    /// Checks a password and returns the normalized email on success.
    pub async fn verify(&self, email: &str, password: &str) -> ResultEngine<String> {
        let email = normalize_email(email)?;
        let password = normalize_password(password)?;

        let users = self.load().await?;
        let Some(user) = users.into_iter().find(|user| user.email == email) else {
            tracing::debug!("sign-in attempt for unknown user");
            return Err(EngineError::InvalidCredentials);
        };

        let hash = user.password_hash;
        let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|err| EngineError::Hashing(err.to_string()))?
            .map_err(|err| EngineError::Hashing(err.to_string()))?;
        if !matches {
            tracing::debug!("sign-in attempt with wrong password");
            return Err(EngineError::InvalidCredentials);
        }
        Ok(email)
    }

    async fn load(&self) -> ResultEngine<Vec<CredentialRecord>> {
        let Some(raw) = self.kv.get(USERS_KEY).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(users) => Ok(users),
            Err(err) => {
                tracing::warn!("users document is unreadable: {err}");
                Ok(Vec::new())
            }
        }
    }
}

fn normalize_password(password: &str) -> ResultEngine<String> {
    let trimmed = password.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(
            "password must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

async fn hash_password(password: String, cost: u32) -> ResultEngine<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|err| EngineError::Hashing(err.to_string()))?
        .map_err(|err| EngineError::Hashing(err.to_string()))
}
