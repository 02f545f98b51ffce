use rand::RngCore;
use tracing::{debug, info, instrument, warn};

use super::{db_error, Service};
use crate::contract::model::User;
use crate::domain::error::DomainError;

/// Random bytes behind a token key; hex encoding doubles the length.
const TOKEN_BYTES: usize = 20;

impl Service {
    /// Exchange credentials for the user's API token, issuing one if needed.
    #[instrument(name = "foodgram.service.login", skip(self, password))]
    pub async fn login(&self, email: &str, password: String) -> Result<String, DomainError> {
        let Some((user, hash)) = self
            .repos
            .users
            .find_by_email(email.trim())
            .await
            .map_err(db_error)?
        else {
            debug!("Unknown email");
            return Err(DomainError::InvalidCredentials);
        };

        if !verify_password(password, hash).await? {
            warn!(user_id = user.id, "Rejected login with a wrong password");
            return Err(DomainError::InvalidCredentials);
        }

        if let Some(key) = self
            .repos
            .tokens
            .key_for_user(user.id)
            .await
            .map_err(db_error)?
        {
            debug!(user_id = user.id, "Reusing existing token");
            return Ok(key);
        }

        let key = generate_token_key();
        self.repos
            .tokens
            .insert(user.id, &key)
            .await
            .map_err(db_error)?;
        info!(user_id = user.id, "Issued token");
        Ok(key)
    }

    #[instrument(name = "foodgram.service.logout", skip(self))]
    pub async fn logout(&self, user_id: i32) -> Result<(), DomainError> {
        let removed = self
            .repos
            .tokens
            .delete_for_user(user_id)
            .await
            .map_err(db_error)?;
        info!(removed, "Token revoked");
        Ok(())
    }

    /// Resolve the user behind a token key.
    #[instrument(name = "foodgram.service.authenticate", skip_all)]
    pub async fn authenticate(&self, key: &str) -> Result<User, DomainError> {
        self.repos
            .tokens
            .find_user(key.trim())
            .await
            .map_err(db_error)?
            .ok_or(DomainError::InvalidToken)
    }
}

fn generate_token_key() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// bcrypt is CPU bound, so hashing runs on the blocking pool.
pub(super) async fn hash_password(password: String, cost: u32) -> Result<String, DomainError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| DomainError::internal(format!("hashing task failed: {e}")))?
        .map_err(|e| DomainError::internal(format!("password hashing failed: {e}")))
}

pub(super) async fn verify_password(password: String, hash: String) -> Result<bool, DomainError> {
    let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| DomainError::internal(format!("verification task failed: {e}")))?;
    match outcome {
        Ok(ok) => Ok(ok),
        // A malformed stored hash never matches.
        Err(e) => {
            warn!(error = %e, "Stored password hash is unreadable");
            Ok(false)
        }
    }
}
