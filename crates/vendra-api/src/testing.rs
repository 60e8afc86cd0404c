//! Fakes shared by the unit tests in this crate.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use futures_util::future::BoxFuture;
use tokio::sync::mpsc;

use vendra_db::DbError;
use vendra_types::models::WaitlistEntry;

use crate::dispatch::WelcomeDispatcher;
use crate::notifier::Notifier;
use crate::rate_limit::RateLimiter;
use crate::signup::SignupWorkflow;
use crate::store::WaitlistStore;

/// Forwards every send to a channel the test can read.
pub struct ChannelNotifier(pub mpsc::UnboundedSender<(String, u64)>);

impl Notifier for ChannelNotifier {
    fn send<'a>(&'a self, email: &'a str, position: u64) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let _ = self.0.send((email.to_string(), position));
            Ok(())
        })
    }
}

/// In-memory store that counts how it was used.
#[derive(Default)]
pub struct CountingStore {
    emails: Mutex<HashSet<String>>,
    reads: AtomicUsize,
    inserts: AtomicUsize,
    blind_precheck: bool,
    failing: bool,
}

impl CountingStore {
    pub fn with_emails(emails: &[&str]) -> Self {
        let store = Self::default();
        store
            .emails
            .lock()
            .unwrap()
            .extend(emails.iter().map(|e| e.to_string()));
        store
    }

    /// `exists_by_email` always answers false.
    pub fn blind_precheck(mut self) -> Self {
        self.blind_precheck = true;
        self
    }

    /// Every call fails with a backend error.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn inserts(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    fn check_failing(&self) -> Result<(), DbError> {
        if self.failing {
            return Err(DbError::Backend(anyhow!("database unavailable")));
        }
        Ok(())
    }
}

impl WaitlistStore for CountingStore {
    fn insert(&self, email: &str) -> Result<WaitlistEntry, DbError> {
        self.check_failing()?;
        if !self.emails.lock().unwrap().insert(email.to_string()) {
            return Err(DbError::DuplicateEmail);
        }
        self.inserts.fetch_add(1, Ordering::SeqCst);
        Ok(WaitlistEntry {
            id: uuid::Uuid::new_v4(),
            email: email.to_string(),
            created_at: chrono::Utc::now(),
        })
    }

    fn exists_by_email(&self, email: &str) -> Result<bool, DbError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check_failing()?;
        if self.blind_precheck {
            return Ok(false);
        }
        Ok(self.emails.lock().unwrap().contains(email))
    }

    fn count(&self) -> Result<u64, DbError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check_failing()?;
        Ok(self.emails.lock().unwrap().len() as u64)
    }
}

/// Workflow over `store` whose welcomes land in the returned receiver.
pub fn recording_workflow<S: WaitlistStore>(
    store: Arc<S>,
) -> (SignupWorkflow, mpsc::UnboundedReceiver<(String, u64)>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let welcome = WelcomeDispatcher::spawn(Arc::new(ChannelNotifier(tx)), 16);
    let store: Arc<dyn WaitlistStore> = store;
    let workflow = SignupWorkflow::new(Arc::new(RateLimiter::new()), store, welcome);
    (workflow, rx)
}
