use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

use crate::config::Config;
use crate::services::image::PreparedImage;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const IMAGE_NOTE: &str = "\n\n[Catatan: Pengguna melampirkan sebuah gambar. \
Analisis gambar tersebut dan gunakan isinya untuk menjawab pertanyaan di atas.]";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("GEMINI_API_KEY is not configured")]
    MissingApiKey,
    #[error("Gemini request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Gemini API returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Empty response from Gemini")]
    EmptyResponse,
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, prompt: &str, image: Option<&PreparedImage>) -> Result<String, LlmError>;
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    model: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Self {
        GeminiClient {
            client: Client::new(),
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
        }
    }
}

fn build_request(prompt: &str, image: Option<&PreparedImage>) -> GenerateRequest {
    let parts = match image {
        Some(img) => vec![
            Part::Text {
                text: format!("{}{}", prompt, IMAGE_NOTE),
            },
            Part::InlineData {
                inline_data: InlineData {
                    mime_type: img.mime_type.clone(),
                    data: img.data_base64.clone(),
                },
            },
        ],
        None => vec![Part::Text {
            text: prompt.to_string(),
        }],
    };

    GenerateRequest {
        contents: vec![Content { parts }],
    }
}

fn extract_text(body: GenerateResponse) -> Result<String, LlmError> {
    let text: String = body
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(text)
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn generate(&self, prompt: &str, image: Option<&PreparedImage>) -> Result<String, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;
        let url = format!("{}/{}:generateContent", GEMINI_API_BASE, self.model);
        debug!(model = %self.model, with_image = image.is_some(), "calling Gemini");

        let res = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&build_request(prompt, image))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            error!(status, %body, "Gemini non-success status");
            return Err(LlmError::Status { status, body });
        }

        let body: GenerateResponse = res.json().await?;
        extract_text(body)
    }
}
