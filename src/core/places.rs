use crate::config::{ApiKeys, ScoutConfig};
use crate::core::{BoundingBox, Place, PlaceSearch};
use crate::utils::error::{Result, ScoutError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const PLACES_FIELD_MASK: &str = "places.displayName,places.formattedAddress,places.editorialSummary,places.types,places.websiteUri,places.rating,places.nationalPhoneNumber,places.googleMapsUri";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchTextRequest<'a> {
    text_query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    location_restriction: Option<LocationRestriction>,
}

#[derive(Debug, Serialize)]
struct LocationRestriction {
    rectangle: Rectangle,
}

#[derive(Debug, Serialize)]
struct Rectangle {
    low: LatLng,
    high: LatLng,
}

#[derive(Debug, Serialize)]
struct LatLng {
    latitude: f64,
    longitude: f64,
}

impl From<&BoundingBox> for LocationRestriction {
    fn from(bbox: &BoundingBox) -> Self {
        LocationRestriction {
            rectangle: Rectangle {
                low: LatLng {
                    latitude: bbox.south,
                    longitude: bbox.west,
                },
                high: LatLng {
                    latitude: bbox.north,
                    longitude: bbox.east,
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchTextResponse {
    #[serde(default)]
    places: Vec<Place>,
}

/// Google Places (New) text search, 嚴格限制在矩形範圍內
pub struct GooglePlacesClient {
    client: Client,
    endpoint: String,
    api_key: String,
    field_mask: String,
}

impl GooglePlacesClient {
    pub fn new(client: Client, endpoint: String, api_key: String) -> Self {
        Self {
            client,
            endpoint,
            api_key,
            field_mask: PLACES_FIELD_MASK.to_string(),
        }
    }

    pub fn from_config(client: Client, config: &ScoutConfig, keys: &ApiKeys) -> Result<Self> {
        Ok(Self::new(
            client,
            config.google.places_endpoint.clone(),
            keys.google()?.to_string(),
        ))
    }

    async fn search(&self, body: &SearchTextRequest<'_>) -> Result<Vec<Place>> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("X-Goog-Api-Key", &self.api_key)
            .header("X-Goog-FieldMask", &self.field_mask)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = crate::core::http::error_body(response).await;
            tracing::error!("❌ Google API Error: {}", status.as_u16());
            tracing::debug!("Places error body: {}", body);
            return Err(ScoutError::PlacesApiError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SearchTextResponse = response.json().await?;
        Ok(parsed.places)
    }

    /// 不限範圍的搜尋，僅供連線檢查使用
    pub async fn search_unrestricted(&self, query: &str) -> Result<Vec<Place>> {
        self.search(&SearchTextRequest {
            text_query: query,
            location_restriction: None,
        })
        .await
    }
}

#[async_trait]
impl PlaceSearch for GooglePlacesClient {
    async fn search_in_zone(&self, query: &str, bbox: &BoundingBox) -> Result<Vec<Place>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ScoutError::ValidationError {
                message: "Please enter a search term.".to_string(),
            });
        }

        tracing::info!("🔍 Searching for '{}' inside strict boundary", query);
        let places = self
            .search(&SearchTextRequest {
                text_query: query,
                location_restriction: Some(LocationRestriction::from(bbox)),
            })
            .await?;

        tracing::info!("Found {} raw candidates", places.len());
        Ok(places)
    }
}
