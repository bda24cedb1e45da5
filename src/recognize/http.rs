//! HTTP recognizer speaking the Google Speech v2 style protocol: the WAV file is POSTed with the
//! language as a query parameter, and the reply is one JSON object per line, the first with a
//! non-empty `result` carrying the transcript alternatives.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use std::time::Duration;

use super::{RecognitionError, Recognizer};
use crate::audio::{AudioClip, to_wav_bytes};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Default, Deserialize)]
struct ResponseLine {
    #[serde(default)]
    result: Vec<ResultEntry>,
}

#[derive(Debug, Deserialize)]
struct ResultEntry {
    #[serde(default)]
    alternative: Vec<Alternative>,
}

#[derive(Debug, Deserialize)]
struct Alternative {
    #[serde(default)]
    transcript: String,
    confidence: Option<f64>,
}

/// Pick the transcript from a response body. `None` when the service returned no usable text.
pub(crate) fn parse_transcript(body: &str) -> Option<String> {
    let entry = body
        .lines()
        .filter(|l| !l.trim().is_empty())
        .filter_map(|l| serde_json::from_str::<ResponseLine>(l).ok())
        .flat_map(|line| line.result)
        .find(|r| !r.alternative.is_empty())?;

    // Prefer the alternative the service scored; otherwise the first one.
    let best = entry
        .alternative
        .iter()
        .find(|a| a.confidence.is_some())
        .or_else(|| entry.alternative.first())?;
    let text = best.transcript.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Recognizer backed by an HTTP speech endpoint.
pub struct HttpRecognizer {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpRecognizer {
    pub fn new(endpoint: &str, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("build HTTP client for recognizer")?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Recognizer for HttpRecognizer {
    fn recognize(&self, audio: &AudioClip, language: &str) -> Result<String, RecognitionError> {
        let body = to_wav_bytes(audio)
            .map_err(|e| RecognitionError::ServiceUnavailable(format!("encode request: {e}")))?;

        let mut query: Vec<(&str, &str)> = vec![("client", "chromium"), ("lang", language)];
        if let Some(key) = self.api_key.as_deref() {
            query.push(("key", key));
        }
        let url = reqwest::Url::parse_with_params(&self.endpoint, &query)
            .map_err(|e| RecognitionError::ServiceUnavailable(format!("bad endpoint: {e}")))?;
        let response = self
            .client
            .post(url)
            .header(
                CONTENT_TYPE,
                format!("audio/wav; rate={}", audio.sample_rate),
            )
            .body(body)
            .send()
            .map_err(|e| RecognitionError::ServiceUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RecognitionError::ServiceUnavailable(format!(
                "{} returned HTTP {}",
                self.endpoint, status
            )));
        }
        let text = response
            .text()
            .map_err(|e| RecognitionError::ServiceUnavailable(e.to_string()))?;
        parse_transcript(&text).ok_or(RecognitionError::AmbiguousAudio)
    }

    fn name(&self) -> &str {
        "http"
    }
}
