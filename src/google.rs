//! Wire types and transport shared by the Google Generative Language endpoints.

use crate::error::{from_status, BlendError, Result};
use crate::input::InputSet;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Default base URL of the Generative Language API.
pub(crate) const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Environment variable holding the API key.
pub(crate) const API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Resolves an explicit key or `GOOGLE_API_KEY`. Empty values count as missing.
pub(crate) fn resolve_api_key(explicit: Option<String>) -> Result<String> {
    explicit
        .or_else(|| std::env::var(API_KEY_ENV).ok())
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .ok_or_else(|| BlendError::Auth(format!("{API_KEY_ENV} not set and no API key provided")))
}

/// Builds `{base}/v1beta/models/{model}:{method}`.
pub(crate) fn model_url(base_url: &str, model: &str, method: &str) -> String {
    format!(
        "{}/v1beta/models/{}:{}",
        base_url.trim_end_matches('/'),
        model,
        method
    )
}

/// POSTs a JSON body with the key in the `x-goog-api-key` header.
pub(crate) async fn post_json<B, R>(
    client: &reqwest::Client,
    url: &str,
    api_key: &str,
    body: &B,
) -> Result<R>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let response = client
        .post(url)
        .header("x-goog-api-key", api_key)
        .header("Content-Type", "application/json")
        .json(body)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(from_status(status.as_u16(), &text));
    }

    let text = response.text().await?;
    Ok(serde_json::from_str(&text)?)
}

/// Inline base64 payload; used in both requests and responses.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InlineData {
    pub mime_type: String,
    pub data: String,
}

// Request types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Content {
    pub role: &'static str,
    pub parts: Vec<RequestPart>,
}

/// A part in a request: text or inline image data.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum RequestPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

impl RequestPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn inline(mime_type: &str, data: String) -> Self {
        Self::InlineData {
            inline_data: InlineData {
                mime_type: mime_type.to_string(),
                data,
            },
        }
    }

    /// One inline-data part per input image, in order.
    pub fn from_inputs(inputs: &InputSet) -> impl Iterator<Item = Self> + '_ {
        inputs
            .images()
            .iter()
            .map(|image| Self::inline(image.mime_type(), image.to_base64()))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    pub response_modalities: Vec<&'static str>,
}

// Response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Candidate {
    #[serde(default)]
    pub content: Option<ResponseContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
    #[serde(default)]
    pub block_reason_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponseContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub inline_data: Option<InlineData>,
}

impl GenerateContentResponse {
    /// Returns the first candidate's parts, or the reason there are none.
    ///
    /// Blocked prompts arrive as HTTP 200 with `promptFeedback` set, and
    /// blocked outputs as a candidate with a safety finish reason.
    pub fn into_parts(self) -> Result<Vec<ResponsePart>> {
        if let Some(feedback) = self.prompt_feedback {
            if let Some(reason) = feedback.block_reason {
                let msg = feedback
                    .block_reason_message
                    .unwrap_or_else(|| format!("Prompt blocked: {reason}"));
                return Err(BlendError::ContentBlocked(msg));
            }
        }

        let candidate = self.candidates.into_iter().next().ok_or_else(|| {
            BlendError::UnexpectedResponse("no candidates in Gemini response".into())
        })?;

        if let Some(reason) = candidate.finish_reason.as_deref() {
            if is_blocking_finish_reason(reason) {
                return Err(BlendError::ContentBlocked(format!(
                    "Content blocked by Gemini safety filter: {reason}"
                )));
            }
        }

        Ok(candidate.content.map(|c| c.parts).unwrap_or_default())
    }
}

fn is_blocking_finish_reason(reason: &str) -> bool {
    matches!(
        reason,
        "SAFETY"
            | "IMAGE_SAFETY"
            | "IMAGE_PROHIBITED_CONTENT"
            | "IMAGE_RECITATION"
            | "RECITATION"
            | "PROHIBITED_CONTENT"
            | "BLOCKLIST"
    )
}

/// Joins the text of all parts, trimmed.
pub(crate) fn collect_text(parts: &[ResponsePart]) -> String {
    parts
        .iter()
        .filter_map(|p| p.text.as_deref())
        .collect::<Vec<_>>()
        .join("")
        .trim()
        .to_string()
}
