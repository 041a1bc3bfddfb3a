// src/config/secrets.rs
//! Credentials come from the environment (or `.env` via dotenvy), never from
//! the TOML file.

pub const ENV_TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const ENV_TELEGRAM_CHAT_IDS: &str = "TELEGRAM_CHAT_IDS";
pub const ENV_RAPID_API_KEY: &str = "RAPID_API_KEY";

#[derive(Clone, Default)]
pub struct Secrets {
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_ids: Vec<String>,
    pub rapid_api_key: Option<String>,
}

// Keep tokens out of logs.
impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("telegram_bot_token", &self.telegram_bot_token.as_ref().map(|_| "***"))
            .field("telegram_chat_ids", &self.telegram_chat_ids)
            .field("rapid_api_key", &self.rapid_api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

impl Secrets {
    pub fn from_env() -> Self {
        Self {
            telegram_bot_token: non_empty(std::env::var(ENV_TELEGRAM_BOT_TOKEN).ok()),
            telegram_chat_ids: parse_chat_ids(
                &std::env::var(ENV_TELEGRAM_CHAT_IDS).unwrap_or_default(),
            ),
            rapid_api_key: non_empty(std::env::var(ENV_RAPID_API_KEY).ok()),
        }
    }

    pub fn telegram_enabled(&self) -> bool {
        self.telegram_bot_token.is_some() && !self.telegram_chat_ids.is_empty()
    }
}

/// Comma separated, trimmed, empties dropped, order kept.
pub fn parse_chat_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_ids_are_trimmed() {
        assert_eq!(
            parse_chat_ids(" 123, ,-100456 ,"),
            vec!["123".to_string(), "-100456".to_string()]
        );
        assert!(parse_chat_ids("").is_empty());
    }

    #[test]
    fn debug_hides_tokens() {
        let s = Secrets {
            telegram_bot_token: Some("123:abc".into()),
            telegram_chat_ids: vec!["1".into()],
            rapid_api_key: Some("k".into()),
        };
        let shown = format!("{s:?}");
        assert!(!shown.contains("123:abc"));
        assert!(s.telegram_enabled());
    }
}
