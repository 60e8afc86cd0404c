use std::sync::Arc;

use anyhow::anyhow;
use tracing::{info, warn};

use vendra_db::DbError;
use vendra_types::api::JoinWaitlistRequest;
use vendra_types::models::WaitlistEntry;

use crate::dispatch::WelcomeDispatcher;
use crate::error::SignupError;
use crate::rate_limit::RateLimiter;
use crate::store::WaitlistStore;
use crate::validation::validate_email;

#[derive(Debug)]
pub struct SignupOutcome {
    pub entry: WaitlistEntry,
    /// Total entries right after the insert.
    pub position: u64,
}

/// Rate check, validation, dedup, insert, position, welcome.
pub struct SignupWorkflow {
    limiter: Arc<RateLimiter>,
    store: Arc<dyn WaitlistStore>,
    welcome: WelcomeDispatcher,
}

impl SignupWorkflow {
    pub fn new(
        limiter: Arc<RateLimiter>,
        store: Arc<dyn WaitlistStore>,
        welcome: WelcomeDispatcher,
    ) -> Self {
        Self {
            limiter,
            store,
            welcome,
        }
    }

    /// Handle one raw signup body from `client_id`.
    ///
    /// Nothing touches the store unless the rate check and validation pass.
    /// The welcome email is queued after the position is known and is
    /// never awaited.
    pub async fn submit(&self, client_id: &str, body: &[u8]) -> Result<SignupOutcome, SignupError> {
        if !self.limiter.check(client_id) {
            warn!(client = client_id, "Waitlist signup rate limited");
            return Err(SignupError::RateLimited);
        }

        let req: JoinWaitlistRequest = serde_json::from_slice(body)
            .map_err(|_| SignupError::ValidationFailed("Invalid email address".into()))?;
        validate_email(&req.email).map_err(|msg| SignupError::ValidationFailed(msg.into()))?;

        // Run blocking DB work off the async runtime
        let store = self.store.clone();
        let email = req.email;
        let (entry, position) = tokio::task::spawn_blocking(move || {
            if store.exists_by_email(&email)? {
                return Err(SignupError::DuplicateEmail);
            }

            // A concurrent signup can slip past the pre-check; the unique
            // index still rejects the second insert.
            let entry = store.insert(&email).map_err(|e| {
                if matches!(e, DbError::DuplicateEmail) {
                    info!(%email, "Duplicate signup caught by unique constraint");
                }
                SignupError::from(e)
            })?;

            let position = store.count()?;
            Ok((entry, position))
        })
        .await
        .map_err(|e| anyhow!("spawn_blocking join error: {}", e))??;

        info!(id = %entry.id, position, "Waitlist signup accepted");
        self.welcome.enqueue(entry.email.clone(), position);

        Ok(SignupOutcome { entry, position })
    }

    pub async fn waitlist_count(&self) -> Result<u64, SignupError> {
        let store = self.store.clone();
        let count = tokio::task::spawn_blocking(move || store.count())
            .await
            .map_err(|e| anyhow!("spawn_blocking join error: {}", e))??;
        Ok(count)
    }
}
