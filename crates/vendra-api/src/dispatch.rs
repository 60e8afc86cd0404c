use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::notifier::Notifier;

/// Pending jobs before new welcomes are dropped.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Upper bound on a single delivery before it is abandoned.
pub const SEND_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug)]
struct WelcomeJob {
    email: String,
    position: u64,
}

/// Fire-and-forget front of the welcome notifier.
///
/// `enqueue` never waits. A background worker drains the queue and hands
/// each delivery to its own supervised task, so an error, a panic or a
/// stalled send is logged there and goes no further.
#[derive(Clone)]
pub struct WelcomeDispatcher {
    tx: mpsc::Sender<WelcomeJob>,
}

impl WelcomeDispatcher {
    /// Start the worker on the current runtime.
    pub fn spawn(notifier: Arc<dyn Notifier>, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        tokio::spawn(welcome_worker(rx, notifier));
        Self { tx }
    }

    pub fn enqueue(&self, email: String, position: u64) {
        if let Err(e) = self.tx.try_send(WelcomeJob { email, position }) {
            let job = match e {
                mpsc::error::TrySendError::Full(job) => job,
                mpsc::error::TrySendError::Closed(job) => job,
            };
            warn!(email = %job.email, position = job.position, "Welcome queue unavailable, dropping email");
        }
    }
}

async fn welcome_worker(mut rx: mpsc::Receiver<WelcomeJob>, notifier: Arc<dyn Notifier>) {
    debug!("Welcome worker started");

    while let Some(job) = rx.recv().await {
        // One supervisor per job; a slow send never holds up the queue
        tokio::spawn(supervise(notifier.clone(), job));
    }

    debug!("Welcome worker stopped");
}

async fn supervise(notifier: Arc<dyn Notifier>, job: WelcomeJob) {
    let WelcomeJob { email, position } = job;
    let task_email = email.clone();

    let handle = tokio::spawn(async move { notifier.send(&task_email, position).await });

    match tokio::time::timeout(SEND_TIMEOUT, handle).await {
        Ok(Ok(Ok(()))) => info!(%email, position, "Welcome email handled"),
        Ok(Ok(Err(e))) => warn!(%email, position, "Failed to send welcome email: {:#}", e),
        Ok(Err(e)) => error!(%email, position, "Welcome email task panicked: {}", e),
        Err(_) => warn!(%email, position, "Welcome email timed out after {:?}", SEND_TIMEOUT),
    }
}
