// src/notify/telegram.rs
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use metrics::counter;
use reqwest::Client;
use serde_json::json;

use super::{DeliveryReport, Notifier, OutgoingMessage};

/// Telegram rejects photo captions longer than this.
pub const CAPTION_LIMIT: usize = 1024;
pub const MESSAGE_LIMIT: usize = 4096;

pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    bot_token: String,
    chat_ids: Vec<String>,
}

impl TelegramNotifier {
    pub fn new(
        client: Client,
        api_base: impl Into<String>,
        bot_token: impl Into<String>,
        chat_ids: Vec<String>,
    ) -> Self {
        Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            bot_token: bot_token.into(),
            chat_ids,
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.bot_token, method)
    }

    async fn post(&self, method: &str, body: serde_json::Value) -> Result<()> {
        let resp = self
            .client
            .post(self.method_url(method))
            .json(&body)
            .send()
            .await
            .with_context(|| format!("telegram {method}"))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            bail!("telegram {method} returned {status}: {text}");
        }
        Ok(())
    }

    pub async fn send_message(&self, chat_id: &str, text: &str) -> Result<()> {
        self.post(
            "sendMessage",
            json!({
                "chat_id": chat_id,
                "text": text,
                "parse_mode": "HTML"
            }),
        )
        .await
    }

    /// Photo with caption; falls back to a plain text message when the photo
    /// is refused.
    pub async fn send_photo(&self, chat_id: &str, photo_url: &str, caption: &str) -> Result<()> {
        let sent = self
            .post(
                "sendPhoto",
                json!({
                    "chat_id": chat_id,
                    "photo": photo_url,
                    "caption": caption,
                    "parse_mode": "HTML"
                }),
            )
            .await;
        if let Err(e) = sent {
            tracing::warn!(target: "notify", chat_id, error = ?e, "sendPhoto failed, falling back to text");
            return self.send_message(chat_id, caption).await;
        }
        Ok(())
    }

    async fn deliver_to(&self, chat_id: &str, msg: &OutgoingMessage) -> Result<()> {
        match msg.image_url.as_deref() {
            Some(photo) if msg.body.chars().count() <= CAPTION_LIMIT => {
                self.send_photo(chat_id, photo, &msg.body).await
            }
            _ => self.send_message(chat_id, &msg.body).await,
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn deliver(&self, msg: &OutgoingMessage) -> DeliveryReport {
        super::ensure_metrics_described();
        let mut report = DeliveryReport::default();
        for chat_id in &self.chat_ids {
            match self.deliver_to(chat_id, msg).await {
                Ok(()) => {
                    report.delivered += 1;
                    counter!("notify_delivered_total").increment(1);
                }
                Err(e) => {
                    report.failed += 1;
                    counter!("notify_failed_total").increment(1);
                    tracing::warn!(target: "notify", chat_id = %chat_id, error = ?e, "telegram delivery failed");
                }
            }
        }
        report
    }

    fn name(&self) -> &'static str {
        "telegram"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_url_ignores_trailing_slash() {
        let n = TelegramNotifier::new(Client::new(), "http://127.0.0.1:9/", "T0K", vec![]);
        assert_eq!(n.method_url("sendMessage"), "http://127.0.0.1:9/botT0K/sendMessage");
    }
}
