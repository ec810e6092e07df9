//! `generateContent` client for the Gemini API with the Google Search tool.

use crate::config::GenerationSettings;
use crate::models::{CitationRef, RawResponse};
use crate::services::generation::{GenerationError, GenerationService};
use crate::services::prompt::ReportRequest;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    endpoint: String,
    model: String,
}

impl GeminiClient {
    pub fn new(settings: &GenerationSettings) -> Result<Self> {
        let http = Client::builder()
            .timeout(settings.timeout())
            .build()
            .context("Failed to build HTTP client for the generation service")?;
        Ok(Self {
            http,
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
        })
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

#[async_trait]
impl GenerationService for GeminiClient {
    async fn generate(&self, request: &ReportRequest) -> Result<RawResponse, GenerationError> {
        tracing::debug!(model = %self.model, search = request.use_search, "requesting market review");
        let response = self
            .http
            .post(self.url())
            .header(API_KEY_HEADER, request.credential.expose())
            .json(&request_body(request))
            .send()
            .await
            .map_err(|err| transport_error("request failed", err))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| transport_error("failed reading response body", err))?;
        if !status.is_success() {
            return Err(classify_failure(status, body));
        }

        let envelope: GenerateContentResponse = serde_json::from_str(&body).map_err(|err| {
            GenerationError::failed_with_text(format!("undecodable response: {err}"), body.clone())
        })?;
        into_raw_response(envelope)
    }
}

fn request_body(request: &ReportRequest) -> Value {
    let mut body = json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": request.prompt }]
        }]
    });
    if request.use_search {
        body["tools"] = json!([{ "google_search": {} }]);
    }
    body
}

fn transport_error(context: &str, err: reqwest::Error) -> GenerationError {
    if err.is_timeout() {
        GenerationError::TimedOut
    } else {
        GenerationError::failed(format!("{context}: {err}"))
    }
}

fn classify_failure(status: StatusCode, body: String) -> GenerationError {
    let rejected_key = status == StatusCode::BAD_REQUEST && body.contains("API_KEY_INVALID");
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN || rejected_key {
        return GenerationError::Unauthenticated(format!("service rejected the API key ({status})"));
    }
    GenerationError::failed_with_text(format!("service returned {status}"), body)
}

fn into_raw_response(envelope: GenerateContentResponse) -> Result<RawResponse, GenerationError> {
    let Some(candidate) = envelope.candidates.into_iter().next() else {
        let reason = envelope
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason)
            .unwrap_or_else(|| "unspecified".into());
        return Err(GenerationError::failed(format!(
            "response contained no candidates (block reason: {reason})"
        )));
    };

    let text = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default();
    let citations: Vec<CitationRef> = candidate
        .grounding_metadata
        .map(|metadata| {
            metadata
                .grounding_chunks
                .into_iter()
                .map(|chunk| match chunk.web {
                    Some(web) => CitationRef::new(web.uri, web.title),
                    None => CitationRef::new(String::new(), None),
                })
                .collect()
        })
        .unwrap_or_default();
    Ok(RawResponse::new(text, citations))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    #[serde(default)]
    web: Option<WebSource>,
}

#[derive(Debug, Deserialize)]
struct WebSource {
    #[serde(default)]
    uri: String,
    #[serde(default)]
    title: Option<String>,
}
