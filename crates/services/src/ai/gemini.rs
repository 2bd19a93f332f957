use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use lab_core::model::AppSettings;

use super::{GeneratedImage, GenerativeAiClient, InlineImage, TextRequest};
use crate::error::AiClientError;

/// Upper bound on one request, connect through body.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Resolved connection settings for the Gemini API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeminiConfig {
    pub base_url: String,
    pub api_key: String,
    pub text_model: String,
    pub image_model: String,
}

impl GeminiConfig {
    /// Build a config from persisted settings, letting `PROMPTLAB_GEMINI_*`
    /// environment variables override each field.
    ///
    /// Returns `None` when no API key is available from either source.
    #[must_use]
    pub fn from_settings_and_env(settings: &AppSettings) -> Option<Self> {
        Self::resolve(settings, |name| env::var(name).ok())
    }

    fn resolve(settings: &AppSettings, lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let var = |name: &str| lookup(name).filter(|val| !val.trim().is_empty());

        let api_key = var("PROMPTLAB_GEMINI_API_KEY")
            .or_else(|| settings.api_key().map(str::to_string))?;
        let base_url = var("PROMPTLAB_GEMINI_BASE_URL")
            .unwrap_or_else(|| settings.effective_base_url().to_string());
        let text_model = var("PROMPTLAB_GEMINI_TEXT_MODEL")
            .unwrap_or_else(|| settings.effective_text_model().to_string());
        let image_model = var("PROMPTLAB_GEMINI_IMAGE_MODEL")
            .unwrap_or_else(|| settings.effective_image_model().to_string());

        Some(Self {
            base_url,
            api_key: api_key.trim().to_string(),
            text_model,
            image_model,
        })
    }

    fn generate_url(&self, model: &str) -> String {
        format!(
            "{}/models/{model}:generateContent",
            self.base_url.trim_end_matches('/')
        )
    }

    fn models_url(&self) -> String {
        format!("{}/models", self.base_url.trim_end_matches('/'))
    }
}

/// Google Gemini over its REST `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    config: Option<GeminiConfig>,
}

impl GeminiClient {
    #[must_use]
    pub fn new(config: Option<GeminiConfig>) -> Self {
        Self::with_timeout(config, REQUEST_TIMEOUT)
    }

    /// Requests that take longer than `timeout` fail with
    /// `AiClientError::RequestFailed`.
    #[must_use]
    pub fn with_timeout(config: Option<GeminiConfig>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "failed to build HTTP client, using defaults");
                Client::new()
            });
        Self { client, config }
    }

    #[must_use]
    pub fn from_settings(settings: &AppSettings) -> Self {
        Self::new(GeminiConfig::from_settings_and_env(settings))
    }

    #[must_use]
    pub fn config(&self) -> Option<&GeminiConfig> {
        self.config.as_ref()
    }

    async fn generate(
        &self,
        model: &str,
        body: &GenerateRequest,
        failure: &'static str,
    ) -> Result<GenerateResponse, AiClientError> {
        let config = self.config.as_ref().ok_or(AiClientError::Unconfigured)?;
        debug!(model, "sending generateContent request");

        let response = self
            .client
            .post(config.generate_url(model))
            .query(&[("key", config.api_key.as_str())])
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_from_status(status, &body, failure));
        }

        response
            .json()
            .await
            .map_err(|err| AiClientError::InvalidResponse(err.to_string()))
    }
}

#[async_trait]
impl GenerativeAiClient for GeminiClient {
    fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    async fn generate_text(&self, request: TextRequest<'_>) -> Result<String, AiClientError> {
        let config = self.config.as_ref().ok_or(AiClientError::Unconfigured)?;
        let body = GenerateRequest::text(&request);
        let response = self
            .generate(&config.text_model, &body, "Text generation failed")
            .await?;
        extract_text(response)
    }

    async fn generate_image(
        &self,
        prompt: &str,
        input: &InlineImage,
    ) -> Result<GeneratedImage, AiClientError> {
        let config = self.config.as_ref().ok_or(AiClientError::Unconfigured)?;
        let body = GenerateRequest::image(prompt, input);
        let response = self
            .generate(&config.image_model, &body, "Image generation failed")
            .await?;
        extract_image(response)
    }

    async fn test_connection(&self) -> Result<(), AiClientError> {
        let config = self.config.as_ref().ok_or(AiClientError::Unconfigured)?;
        let response = self
            .client
            .get(config.models_url())
            .query(&[("key", config.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            return Err(AiClientError::Unauthorized);
        }
        if status.is_success() {
            return Ok(());
        }
        Err(AiClientError::RequestFailed {
            status: Some(status),
            message: "Unable to verify API key".to_string(),
        })
    }
}

fn error_from_status(status: StatusCode, body: &str, failure: &'static str) -> AiClientError {
    if status == StatusCode::UNAUTHORIZED {
        return AiClientError::Unauthorized;
    }
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|body| body.error)
        .and_then(|detail| detail.message)
        .filter(|msg| !msg.trim().is_empty())
        .unwrap_or_else(|| failure.to_string());
    AiClientError::RequestFailed {
        status: Some(status),
        message,
    }
}

fn first_parts(response: GenerateResponse) -> Result<Vec<ResponsePart>, AiClientError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| AiClientError::InvalidResponse("no candidates returned".into()))?;
    candidate
        .content
        .map(|content| content.parts)
        .ok_or_else(|| AiClientError::InvalidResponse("Invalid response format".into()))
}

fn extract_text(response: GenerateResponse) -> Result<String, AiClientError> {
    first_parts(response)?
        .into_iter()
        .find_map(|part| part.text)
        .ok_or_else(|| AiClientError::InvalidResponse("No response from AI".into()))
}

fn extract_image(response: GenerateResponse) -> Result<GeneratedImage, AiClientError> {
    first_parts(response)?
        .into_iter()
        .find_map(|part| {
            let inline = part.inline_data?;
            let data = inline.data.filter(|data| !data.is_empty())?;
            Some(GeneratedImage {
                mime_type: inline.mime_type.unwrap_or_else(|| "image/png".to_string()),
                data_base64: data,
            })
        })
        .ok_or_else(|| AiClientError::InvalidResponse("No image in response".into()))
}

//
// ─── WIRE TYPES ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<RequestContent>,
    generation_config: GenerationConfig,
}

impl GenerateRequest {
    fn text(request: &TextRequest<'_>) -> Self {
        Self {
            contents: vec![RequestContent {
                parts: vec![RequestPart::text(request.full_prompt())],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: Some(request.max_output_tokens),
                temperature: Some(request.temperature),
                response_modalities: None,
            },
        }
    }

    fn image(prompt: &str, input: &InlineImage) -> Self {
        Self {
            contents: vec![RequestContent {
                parts: vec![
                    RequestPart {
                        text: None,
                        inline_data: Some(InlineDataPayload {
                            mime_type: input.mime_type.to_string(),
                            data: input.to_base64(),
                        }),
                    },
                    RequestPart::text(prompt.to_string()),
                ],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: None,
                temperature: None,
                response_modalities: Some(vec!["TEXT", "IMAGE"]),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineDataPayload>,
}

impl RequestPart {
    fn text(text: String) -> Self {
        Self {
            text: Some(text),
            inline_data: None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataPayload {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<&'static str>>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    text: Option<String>,
    inline_data: Option<InlineDataResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataResponse {
    mime_type: Option<String>,
    data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}
