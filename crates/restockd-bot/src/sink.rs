//! Delivery of rendered messages to a Discord channel.
//!
//! Wraps the `POST /channels/{id}/messages` REST call with bot-token
//! auth. The sink owns which channel and operator identity it addresses;
//! message rendering stays in `restockd-engine`.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::Serialize;
use thiserror::Error;

use restockd_engine::{Embed, Message};

/// Production base of the channel REST API.
pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

const SEND_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("message delivery failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid api base url {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("channel api returned status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
}

/// Sends messages to one channel, optionally tagging the operator.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Clone)]
pub struct ChannelSink {
    client: Client,
    endpoint: Url,
    operator_id: u64,
    token: String,
}

#[derive(Serialize)]
struct MessagePayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    embeds: Vec<&'a Embed>,
}

impl ChannelSink {
    /// Sink against the production API.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(token: &str, channel_id: u64, operator_id: u64) -> Result<Self, SinkError> {
        Self::with_base_url(token, channel_id, operator_id, DEFAULT_API_BASE)
    }

    /// Sink against an alternate API base, e.g. a mock server in tests.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBaseUrl` if `base_url` does not parse, or an HTTP
    /// error if the client cannot be built.
    pub fn with_base_url(
        token: &str,
        channel_id: u64,
        operator_id: u64,
        base_url: &str,
    ) -> Result<Self, SinkError> {
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&normalized)
            .and_then(|base| base.join(&format!("channels/{channel_id}/messages")))
            .map_err(|e| SinkError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: e.to_string(),
            })?;
        let client = Client::builder().timeout(SEND_TIMEOUT).build()?;
        Ok(ChannelSink {
            client,
            endpoint,
            operator_id,
            token: token.to_owned(),
        })
    }

    /// Posts one message to the channel.
    ///
    /// # Errors
    ///
    /// Returns `Http` on transport failure and `UnexpectedStatus` when the
    /// API answers with a non-2xx status.
    pub async fn send(&self, message: &Message) -> Result<(), SinkError> {
        let payload = MessagePayload {
            content: render_content(message, self.operator_id),
            embeds: message.embed.iter().collect(),
        };
        let response = self
            .client
            .post(self.endpoint.clone())
            .header("Authorization", format!("Bot {}", self.token))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

/// Plain-text part of the payload. A requested operator mention goes in
/// front of the text, or stands alone for embed-only messages.
fn render_content(message: &Message, operator_id: u64) -> Option<String> {
    match (&message.content, message.mention_operator) {
        (Some(text), true) => Some(format!("<@{operator_id}> {text}")),
        (Some(text), false) => Some(text.clone()),
        (None, true) => Some(format!("<@{operator_id}>")),
        (None, false) => None,
    }
}
