//! Stateless request/response wrapper around the remote chat endpoints
//!
//! One request, one response, a fixed timeout, no retries. Timeouts map to
//! `Timeout`, everything else to `Network`.

use crate::audio::AudioPayload;
use crate::chat::context::SessionContext;
use crate::chat::types::{ChatReply, ChatRequest, IntentInfo, KnowledgeBaseArticle};
use crate::config::BackendConfig;
use crate::{BanklineError, Result};
use std::time::Duration;
use tracing::debug;

pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
    chat_timeout: Duration,
    voice_timeout: Duration,
}

impl ChatClient {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| BanklineError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            chat_timeout: config.chat_timeout(),
            voice_timeout: config.voice_timeout(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send one text message and return the assistant's reply.
    pub async fn send_message(&self, text: &str, session: &SessionContext) -> Result<ChatReply> {
        let request = ChatRequest::text(text, session);
        debug!(session_id = %session.session_id, "Sending chat message");

        let response = self
            .http
            .post(self.endpoint("/chatbot/chat"))
            .timeout(self.chat_timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| map_transport_error(e, self.chat_timeout))?;

        decode_json(response, self.chat_timeout).await
    }

    /// Upload a recorded clip for server-side transcription and reply.
    pub async fn send_voice(
        &self,
        payload: &AudioPayload,
        session: &SessionContext,
    ) -> Result<ChatReply> {
        debug!(
            session_id = %session.session_id,
            seconds = payload.duration_seconds(),
            "Uploading voice clip"
        );

        let form = reqwest::multipart::Form::new().text("audio", payload.to_base64());

        let response = self
            .http
            .post(self.endpoint("/chatbot/voice"))
            .timeout(self.voice_timeout)
            .multipart(form)
            .send()
            .await
            .map_err(|e| map_transport_error(e, self.voice_timeout))?;

        decode_json(response, self.voice_timeout).await
    }

    /// Intents the backend can classify.
    pub async fn supported_intents(&self) -> Result<Vec<IntentInfo>> {
        let response = self
            .http
            .get(self.endpoint("/chatbot/intents"))
            .timeout(self.chat_timeout)
            .send()
            .await
            .map_err(|e| map_transport_error(e, self.chat_timeout))?;

        decode_json(response, self.chat_timeout).await
    }

    /// Full-text search over the backend knowledge base.
    pub async fn search_knowledge_base(&self, query: &str) -> Result<Vec<KnowledgeBaseArticle>> {
        let response = self
            .http
            .get(self.endpoint("/chatbot/knowledge-base"))
            .query(&[("query", query)])
            .timeout(self.chat_timeout)
            .send()
            .await
            .map_err(|e| map_transport_error(e, self.chat_timeout))?;

        decode_json(response, self.chat_timeout).await
    }
}

/// Map a reqwest failure to the client error taxonomy.
pub(crate) fn map_transport_error(e: reqwest::Error, timeout: Duration) -> BanklineError {
    if e.is_timeout() {
        BanklineError::Timeout(timeout.as_secs())
    } else {
        BanklineError::Network(e.to_string())
    }
}

/// Check the status line, then decode the JSON body.
pub(crate) async fn decode_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    timeout: Duration,
) -> Result<T> {
    let response = response
        .error_for_status()
        .map_err(|e| BanklineError::Network(e.to_string()))?;

    response
        .json::<T>()
        .await
        .map_err(|e| map_transport_error(e, timeout))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let config = BackendConfig {
            base_url: "http://localhost:8080/api/".to_string(),
            ..BackendConfig::default()
        };
        let client = ChatClient::new(&config).unwrap();
        assert_eq!(
            client.endpoint("/chatbot/chat"),
            "http://localhost:8080/api/chatbot/chat"
        );
    }
}
