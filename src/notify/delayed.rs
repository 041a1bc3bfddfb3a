// src/notify/delayed.rs
//! Deadline-based delivery. Each submitted job gets its own sleeper task; jobs
//! are fire-and-forget and cannot be cancelled once queued.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::{Notifier, OutgoingMessage};

#[derive(Debug, Clone)]
pub struct ScheduledDelivery {
    pub due: Instant,
    pub message: OutgoingMessage,
}

impl ScheduledDelivery {
    pub fn after(delay: std::time::Duration, message: OutgoingMessage) -> Self {
        Self {
            due: Instant::now() + delay,
            message,
        }
    }
}

struct DispatchActor {
    notifier: Arc<dyn Notifier>,
    receiver: mpsc::UnboundedReceiver<ScheduledDelivery>,
}

impl DispatchActor {
    async fn run(mut self) {
        tracing::debug!(target: "notify", "dispatch queue started");
        while let Some(job) = self.receiver.recv().await {
            let notifier = Arc::clone(&self.notifier);
            tokio::spawn(async move {
                tokio::time::sleep_until(job.due).await;
                let report = notifier.deliver(&job.message).await;
                if report.failed > 0 {
                    tracing::warn!(
                        target: "notify",
                        delivered = report.delivered,
                        failed = report.failed,
                        "delayed delivery had failures"
                    );
                }
            });
        }
        tracing::debug!(target: "notify", "dispatch queue stopped");
    }
}

/// Handle to the dispatch actor.
#[derive(Clone)]
pub struct DispatchQueue {
    sender: mpsc::UnboundedSender<ScheduledDelivery>,
}

impl DispatchQueue {
    /// Start the actor on the current runtime.
    pub fn spawn(notifier: Arc<dyn Notifier>) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let actor = DispatchActor { notifier, receiver };
        let task = tokio::spawn(actor.run());
        (Self { sender }, task)
    }

    pub fn submit(&self, job: ScheduledDelivery) {
        if self.sender.send(job).is_err() {
            tracing::error!(target: "notify", "dispatch queue is gone, delayed message dropped");
        }
    }
}
