use anyhow::{Context, Result};
use base64::{engine::general_purpose, Engine};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::CalorieEstimator;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const IMAGE_MIME_TYPE: &str = "image/jpeg";
const MARKDOWN_CHARS: [char; 3] = ['*', '_', '`'];

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    InlineData { inline_data: InlineData },
    Text { text: String },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
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
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Instruction sent with every photo, asking for a calorie range and a short rationale.
pub fn build_prompt(caption: &str) -> String {
    format!(
        "Estimate the calories in this food image. \n\
         Here is the user description: {}.\n\
         Return the following:\n\
         1. Low estimate\n\
         2. High estimate\n\
         3. Medium (average)\n\
         4. A extremely short explanation of your reasoning.",
        caption
    )
}

/// Drops markdown emphasis markers so the reply reads as plain text.
pub fn strip_markdown(text: &str) -> String {
    text.chars().filter(|c| !MARKDOWN_CHARS.contains(c)).collect()
}

pub struct GeminiService {
    api_key: String,
    model: String,
    api_base: String,
    client: reqwest::Client,
}

impl GeminiService {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            api_base: API_BASE.to_string(),
            client: reqwest::Client::new(),
        }
    }

    #[cfg(test)]
    fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", self.api_base, self.model)
    }

    fn build_request(image_data: &[u8], caption: &str) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: IMAGE_MIME_TYPE.to_string(),
                            data: general_purpose::STANDARD.encode(image_data),
                        },
                    },
                    Part::Text {
                        text: build_prompt(caption),
                    },
                ],
            }],
        }
    }

    pub async fn analyze_food_image(&self, image_path: &Path, caption: &str) -> Result<String> {
        log::debug!("📸 Starting image analysis for: {}", image_path.display());

        let image_data = tokio::fs::read(image_path)
            .await
            .with_context(|| format!("failed to read image {}", image_path.display()))?;
        log::debug!("📊 Image file size: {} bytes", image_data.len());

        let request = Self::build_request(&image_data, caption);

        log::info!("🤖 Sending request to Gemini with model: {}", self.model);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| e.without_url())
            .context("Gemini request failed")?;

        let status = response.status();
        log::debug!("📥 Gemini response status: {}", status);

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            log::error!("❌ Gemini API error response: {}", error_text);
            anyhow::bail!("Gemini API error ({}): {}", status, error_text);
        }

        let body = response
            .text()
            .await
            .map_err(|e| e.without_url())
            .context("failed to read Gemini response")?;
        let text = Self::parse_response(&body)?;
        log::info!("💬 Gemini response content: {}", text);

        Ok(text)
    }

    fn parse_response(body: &str) -> Result<String> {
        let parsed: GenerateResponse =
            serde_json::from_str(body).context("malformed Gemini response")?;

        if let Some(reason) = parsed.prompt_feedback.and_then(|f| f.block_reason) {
            anyhow::bail!("Gemini blocked the request: {}", reason);
        }

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            anyhow::bail!("Gemini response contained no text");
        }

        Ok(text)
    }
}

#[async_trait::async_trait]
impl CalorieEstimator for GeminiService {
    async fn estimate(&self, image_path: &Path, caption: &str) -> Result<String> {
        let raw = self.analyze_food_image(image_path, caption).await?;
        Ok(strip_markdown(&raw))
    }
}
