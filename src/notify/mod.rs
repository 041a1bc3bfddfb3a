// src/notify/mod.rs
//! Outbound side: message formatting, link shortening, Telegram delivery and
//! the delayed dispatch queue.

pub mod delayed;
pub mod format;
pub mod shortener;
pub mod telegram;

use async_trait::async_trait;
use metrics::describe_counter;
use once_cell::sync::OnceCell;

pub use delayed::{DispatchQueue, ScheduledDelivery};
pub use shortener::{IsGdShortener, LinkShortener, NoopShortener};
pub use telegram::TelegramNotifier;

pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("notify_delivered_total", "Messages delivered, per recipient.");
        describe_counter!("notify_failed_total", "Recipient deliveries that failed.");
    });
}

/// One announcement. `image_url` turns it into a photo with caption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub body: String,
    pub image_url: Option<String>,
}

impl OutgoingMessage {
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            image_url: None,
        }
    }

    pub fn with_image(mut self, url: Option<String>) -> Self {
        self.image_url = url;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: usize,
}

impl DeliveryReport {
    pub fn merge(&mut self, other: DeliveryReport) {
        self.delivered += other.delivered;
        self.failed += other.failed;
    }
}

/// Delivery never fails as a whole; per-recipient outcomes are in the report.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, msg: &OutgoingMessage) -> DeliveryReport;
    fn name(&self) -> &'static str;
}

/// Used when Telegram is not configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn deliver(&self, msg: &OutgoingMessage) -> DeliveryReport {
        tracing::info!(
            target: "notify",
            image = msg.image_url.as_deref().unwrap_or("-"),
            "{}",
            msg.body
        );
        DeliveryReport {
            delivered: 1,
            failed: 0,
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
