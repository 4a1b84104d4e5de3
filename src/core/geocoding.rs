use crate::config::{ApiKeys, ScoutConfig};
use crate::core::{BoundingBox, Geocoder};
use crate::utils::error::{Result, ScoutError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    viewport: Viewport,
}

#[derive(Debug, Deserialize)]
struct Viewport {
    northeast: LatLng,
    southwest: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl From<&Viewport> for BoundingBox {
    fn from(viewport: &Viewport) -> Self {
        BoundingBox {
            north: viewport.northeast.lat,
            south: viewport.southwest.lat,
            east: viewport.northeast.lng,
            west: viewport.southwest.lng,
        }
    }
}

/// Google Geocoding API：取郵遞區號的官方 viewport
pub struct GoogleGeocoder {
    client: Client,
    endpoint: String,
    api_key: String,
    fallback_region: Option<String>,
}

impl GoogleGeocoder {
    pub fn new(client: Client, endpoint: String, api_key: String) -> Self {
        Self {
            client,
            endpoint,
            api_key,
            fallback_region: None,
        }
    }

    pub fn with_fallback_region(mut self, region: impl Into<String>) -> Self {
        let region = region.into();
        self.fallback_region = if region.trim().is_empty() {
            None
        } else {
            Some(region)
        };
        self
    }

    pub fn from_config(client: Client, config: &ScoutConfig, keys: &ApiKeys) -> Result<Self> {
        Ok(Self::new(
            client,
            config.google.geocode_endpoint.clone(),
            keys.google()?.to_string(),
        )
        .with_fallback_region(config.google.fallback_region.clone()))
    }

    async fn lookup(&self, address: &str) -> Result<GeocodeResponse> {
        tracing::debug!("Geocoding request for address: {}", address);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("address", address), ("key", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ScoutError::GeocodingError {
                status: format!("HTTP {}", response.status().as_u16()),
                message: Some(crate::core::http::error_body(response).await),
            });
        }

        let body: GeocodeResponse = response.json().await?;
        tracing::debug!("Geocoding status for '{}': {}", address, body.status);
        Ok(body)
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn bbox_from_pincode(&self, pincode: &str) -> Result<BoundingBox> {
        let pincode = pincode.trim();
        if pincode.is_empty() {
            return Err(ScoutError::ValidationError {
                message: "Please enter a pincode or zip code.".to_string(),
            });
        }

        tracing::info!("📍 Fetching boundary for pincode: {}", pincode);
        let mut response = self.lookup(pincode).await?;

        if response.status == "ZERO_RESULTS" {
            if let Some(region) = &self.fallback_region {
                tracing::warn!(
                    "⚠️ No location found for '{}', retrying with '{}'",
                    pincode,
                    region
                );
                response = self.lookup(&format!("{}, {}", pincode, region)).await?;
            }
        }

        match response.status.as_str() {
            "OK" => {
                let first = response.results.first().ok_or_else(|| ScoutError::GeocodingError {
                    status: "OK".to_string(),
                    message: Some("response contained no results".to_string()),
                })?;
                let bbox = BoundingBox::from(&first.geometry.viewport);
                tracing::info!("✅ Boundary found: {}", bbox);
                Ok(bbox)
            }
            "ZERO_RESULTS" => Err(ScoutError::ZoneNotFound {
                pincode: pincode.to_string(),
            }),
            status => {
                tracing::error!("❌ Geocoding error: {}", status);
                if let Some(reason) = &response.error_message {
                    tracing::error!("   Reason: {}", reason);
                }
                Err(ScoutError::GeocodingError {
                    status: status.to_string(),
                    message: response.error_message,
                })
            }
        }
    }
}

/// 以郵遞區號為 key 的記憶快取；只快取成功結果
pub struct CachedGeocoder<G: Geocoder + ?Sized> {
    inner: Arc<G>,
    cache: Mutex<HashMap<String, BoundingBox>>,
}

impl<G: Geocoder + ?Sized> CachedGeocoder<G> {
    pub fn new(inner: Arc<G>) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    #[cfg(test)]
    async fn cached_len(&self) -> usize {
        self.cache.lock().await.len()
    }
}

#[async_trait]
impl<G: Geocoder + ?Sized> Geocoder for CachedGeocoder<G> {
    async fn bbox_from_pincode(&self, pincode: &str) -> Result<BoundingBox> {
        let key = pincode.trim().to_string();

        if let Some(bbox) = self.cache.lock().await.get(&key) {
            tracing::debug!("Geocode cache hit for '{}'", key);
            return Ok(*bbox);
        }

        let bbox = self.inner.bbox_from_pincode(&key).await?;
        self.cache.lock().await.insert(key, bbox);
        Ok(bbox)
    }
}
