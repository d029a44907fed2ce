//! Widget behaviour configuration parsed from environment variables.
//!
//! Connection settings (base URL, session cookie) are CLI flags with env
//! fallbacks in `main`; everything that changes how the controller behaves
//! lives here so the library can be configured without clap.

use std::time::Duration;

pub const DEFAULT_WINNER_KEYWORD: &str = "win";
pub const DEFAULT_BOT_DELAY_MS: u64 = 1000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Which field of an inbound message identifies this widget's own echo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EchoKey {
    /// Compare the message origin with the connection id from `session:connected`.
    #[default]
    ClientId,
    /// Compare the message author with the configured username.
    Username,
}

impl EchoKey {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "client_id" => Some(Self::ClientId),
            "username" => Some(Self::Username),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    pub username: Option<String>,
    pub winner_keyword: String,
    pub bot_delay: Duration,
    pub echo_key: EchoKey,
    pub is_admin: bool,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            username: None,
            winner_keyword: DEFAULT_WINNER_KEYWORD.to_owned(),
            bot_delay: Duration::from_millis(DEFAULT_BOT_DELAY_MS),
            echo_key: EchoKey::ClientId,
            is_admin: false,
        }
    }
}

impl WidgetConfig {
    /// Build config from process environment variables.
    ///
    /// Optional:
    /// - `CHAT_USERNAME`: display name sent with local messages
    /// - `CHAT_WINNER_KEYWORD`: default `win`
    /// - `CHAT_BOT_DELAY_MS`: local bot reply delay, default 1000
    /// - `CHAT_ECHO_KEY`: `client_id` (default) or `username`
    /// - `CHAT_ADMIN`: `true` or `false` (default)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let username = lookup("CHAT_USERNAME")
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty());

        let winner_keyword = lookup("CHAT_WINNER_KEYWORD")
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.winner_keyword);

        let bot_delay = match lookup("CHAT_BOT_DELAY_MS") {
            Some(raw) => Duration::from_millis(parse_value("CHAT_BOT_DELAY_MS", &raw, |v| v.parse::<u64>().ok())?),
            None => defaults.bot_delay,
        };

        let echo_key = match lookup("CHAT_ECHO_KEY") {
            Some(raw) => parse_value("CHAT_ECHO_KEY", &raw, EchoKey::parse)?,
            None => defaults.echo_key,
        };

        let is_admin = match lookup("CHAT_ADMIN") {
            Some(raw) => parse_value("CHAT_ADMIN", &raw, |v| v.parse::<bool>().ok())?,
            None => defaults.is_admin,
        };

        Ok(Self { username, winner_keyword, bot_delay, echo_key, is_admin })
    }
}

fn parse_value<T>(var: &'static str, raw: &str, parse: impl Fn(&str) -> Option<T>) -> Result<T, ConfigError> {
    parse(raw.trim()).ok_or_else(|| ConfigError::Invalid { var, value: raw.to_owned() })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
