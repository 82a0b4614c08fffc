//! Text-to-speech client for an OpenAI-compatible `/v1/audio/speech`.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::config::UpstreamConfig;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("speech request failed: {0}")]
    Request(String),
    #[error("speech request timed out")]
    Timeout,
    #[error("speech API returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to read speech response: {0}")]
    Parse(String),
    #[error("speech API returned no audio")]
    EmptyResponse,
}

impl From<reqwest::Error> for SpeechError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SpeechError::Timeout
        } else {
            SpeechError::Request(err.to_string())
        }
    }
}

/// Turns text into mp3 bytes.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError>;
}

pub struct OpenAiSpeech {
    client: reqwest::Client,
    config: UpstreamConfig,
}

impl OpenAiSpeech {
    pub fn new(client: reqwest::Client, config: &UpstreamConfig) -> Self {
        Self {
            client,
            config: config.clone(),
        }
    }
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
    response_format: &'static str,
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSpeech {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        let body = SpeechRequest {
            model: &self.config.tts_model,
            voice: &self.config.tts_voice,
            input: text,
            response_format: "mp3",
        };
        let url = format!("{}/v1/audio/speech", self.config.base_url);

        let mut request = self.client.post(url).json(&body);
        if let Some(key) = self.config.api_key.as_deref()
            && !key.is_empty()
        {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpeechError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| SpeechError::Parse(err.to_string()))?;
        if bytes.is_empty() {
            return Err(SpeechError::EmptyResponse);
        }
        Ok(bytes.to_vec())
    }
}
