//! Generative AI access behind a trait so the session driver can run against
//! Gemini or a test double.

use std::path::Path;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::error::AiClientError;

pub mod evaluation;
pub mod gemini;

pub use evaluation::{build_evaluation_prompt, evaluate_prompt, parse_evaluation};
pub use gemini::{GeminiClient, GeminiConfig};

const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 2000;
const DEFAULT_TEMPERATURE: f32 = 0.7;

/// A text generation request with its sampling parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextRequest<'a> {
    pub prompt: &'a str,
    pub context: Option<&'a str>,
    pub max_output_tokens: u32,
    pub temperature: f32,
}

impl<'a> TextRequest<'a> {
    #[must_use]
    pub fn new(prompt: &'a str) -> Self {
        Self {
            prompt,
            context: None,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    /// Attach a document or data set the prompt operates on. Blank context is ignored.
    #[must_use]
    pub fn with_context(mut self, context: Option<&'a str>) -> Self {
        self.context = context.filter(|ctx| !ctx.trim().is_empty());
        self
    }

    #[must_use]
    pub fn with_sampling(mut self, max_output_tokens: u32, temperature: f32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self.temperature = temperature;
        self
    }

    /// The text actually sent to the model.
    #[must_use]
    pub fn full_prompt(&self) -> String {
        match self.context {
            Some(ctx) => format!(
                "Here is the document/data to analyze:\n\n{ctx}\n\n---\n\nUser's instruction:\n{}",
                self.prompt
            ),
            None => self.prompt.to_string(),
        }
    }
}

/// Raw image bytes sent alongside a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl InlineImage {
    #[must_use]
    pub fn new(mime_type: &'static str, bytes: Vec<u8>) -> Self {
        Self { mime_type, bytes }
    }

    #[must_use]
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

/// MIME type guessed from a file extension; anything unknown is sent as JPEG.
#[must_use]
pub fn mime_type_for_path(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("webp") => "image/webp",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    }
}

/// Image returned by the model, still base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub mime_type: String,
    pub data_base64: String,
}

impl GeneratedImage {
    #[must_use]
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data_base64)
    }
}

#[async_trait]
pub trait GenerativeAiClient: Send + Sync {
    /// True when requests can be attempted at all.
    fn is_configured(&self) -> bool;

    /// Generate text.
    ///
    /// # Errors
    ///
    /// Returns `AiClientError` when unconfigured, on transport or HTTP failures, or
    /// when the reply carries no text.
    async fn generate_text(&self, request: TextRequest<'_>) -> Result<String, AiClientError>;

    /// Transform `input` according to `prompt`.
    ///
    /// # Errors
    ///
    /// Returns `AiClientError` when unconfigured, on transport or HTTP failures, or
    /// when the reply carries no image.
    async fn generate_image(
        &self,
        prompt: &str,
        input: &InlineImage,
    ) -> Result<GeneratedImage, AiClientError>;

    /// Check that the configured key is accepted.
    ///
    /// # Errors
    ///
    /// Returns `AiClientError::Unauthorized` for a rejected key and other
    /// variants for configuration or transport problems.
    async fn test_connection(&self) -> Result<(), AiClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_is_framed_before_the_instruction() {
        let request = TextRequest::new("Summarize").with_context(Some("DOC"));
        assert_eq!(
            request.full_prompt(),
            "Here is the document/data to analyze:\n\nDOC\n\n---\n\nUser's instruction:\nSummarize"
        );
        assert_eq!(TextRequest::new("p").with_context(Some("  ")).full_prompt(), "p");
    }

    #[test]
    fn mime_type_follows_extension() {
        assert_eq!(mime_type_for_path(Path::new("images/van.webp")), "image/webp");
        assert_eq!(mime_type_for_path(Path::new("a.PNG")), "image/png");
        assert_eq!(mime_type_for_path(Path::new("a.gif")), "image/gif");
        assert_eq!(mime_type_for_path(Path::new("a.heic")), "image/jpeg");
        assert_eq!(mime_type_for_path(Path::new("noext")), "image/jpeg");
    }

    #[test]
    fn generated_image_renders_data_url() {
        let image = GeneratedImage {
            mime_type: "image/png".into(),
            data_base64: "AAAA".into(),
        };
        assert_eq!(image.data_url(), "data:image/png;base64,AAAA");
        assert_eq!(InlineImage::new("image/png", vec![0, 0, 0]).to_base64(), "AAAA");
    }
}
