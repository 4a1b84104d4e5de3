use crate::config::{ApiKeys, ScoutConfig};
use crate::core::{BoundingBox, MapReader};
use crate::utils::error::{Result, ScoutError};
use crate::utils::validation::validate_file_extension;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];
pub const SUPPORTED_IMAGE_TYPES: &[&str] = &["image/png", "image/jpeg"];

const MAP_PROMPT: &str = r#"Analyze this map image.
1. Identify the geographic area based on visible street names/landmarks.
2. Estimate the precise Bounding Box (North, South, East, West coordinates).
3. Return ONLY a JSON object: {"north": float, "south": float, "east": float, "west": float}."#;

/// 依副檔名決定上傳圖片的 MIME type
pub fn mime_type_for(path: &str) -> Result<&'static str> {
    validate_file_extension("map_image", path, SUPPORTED_IMAGE_EXTENSIONS)?;

    let extension = std::path::Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    Ok(match extension.as_str() {
        "png" => "image/png",
        _ => "image/jpeg",
    })
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Text { text: &'a str },
    Image { inline_data: InlineData<'a> },
}

#[derive(Debug, Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
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
struct ResponsePart {
    text: Option<String>,
}

/// 去掉 ```json 圍欄後解析邊界
pub fn parse_bbox_answer(answer: &str) -> Result<BoundingBox> {
    let clean_json = answer.replace("```json", "").replace("```", "");
    let clean_json = clean_json.trim();

    let bbox: BoundingBox =
        serde_json::from_str(clean_json).map_err(|e| ScoutError::VisionError {
            message: format!("could not parse coordinates from '{}': {}", clean_json, e),
        })?;

    bbox.validate().map_err(|e| ScoutError::VisionError {
        message: e.to_string(),
    })?;

    Ok(bbox)
}

/// Gemini vision model reading map screenshots.
pub struct GeminiMapReader {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiMapReader {
    pub fn new(client: Client, endpoint: String, model: String, api_key: String) -> Self {
        Self {
            client,
            endpoint,
            model,
            api_key,
        }
    }

    pub fn from_config(client: Client, config: &ScoutConfig, keys: &ApiKeys) -> Result<Self> {
        Ok(Self::new(
            client,
            config.vision.endpoint.clone(),
            config.vision.model.clone(),
            keys.ai_studio()?.to_string(),
        ))
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl MapReader for GeminiMapReader {
    async fn bbox_from_image(&self, image: &[u8], mime_type: &str) -> Result<BoundingBox> {
        if !SUPPORTED_IMAGE_TYPES.contains(&mime_type) {
            return Err(ScoutError::ValidationError {
                message: format!("Unsupported image type '{}'. Upload a PNG or JPG.", mime_type),
            });
        }
        if image.is_empty() {
            return Err(ScoutError::ValidationError {
                message: "Uploaded map image is empty".to_string(),
            });
        }

        tracing::info!("📸 Analyzing map image ({} bytes) with {}", image.len(), self.model);

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    RequestPart::Text { text: MAP_PROMPT },
                    RequestPart::Image {
                        inline_data: InlineData {
                            mime_type,
                            data: STANDARD.encode(image),
                        },
                    },
                ],
            }],
        };

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = crate::core::http::error_body(response).await;
            return Err(ScoutError::VisionError {
                message: format!("HTTP {}: {}", status, body),
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let answer: String = parsed
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| ScoutError::VisionError {
                message: "model returned no text".to_string(),
            })?;

        tracing::debug!("Vision answer: {}", answer);
        let bbox = parse_bbox_answer(&answer)?;
        tracing::info!("✅ Coordinates extracted: {}", bbox);
        Ok(bbox)
    }
}
