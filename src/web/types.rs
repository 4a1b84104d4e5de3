//! Request/response payloads and page view models

use crate::core::{AuditedLead, BoundingBox, ScoutReport};
use crate::utils::error::{ErrorCategory, ScoutError};
use serde::{Deserialize, Serialize};

/// JSON API 回應外框
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    pub latency_ms: f64,
    pub timestamp: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, latency_ms: f64) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(error: ApiError, latency_ms: f64) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// 上游 API 的原始回應
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl From<&ScoutError> for ApiError {
    fn from(error: &ScoutError) -> Self {
        let code = match error {
            ScoutError::ValidationError { .. } | ScoutError::ZoneNotFound { .. } => "BAD_REQUEST",
            ScoutError::NoLeadsFound { .. } => "NO_LEADS",
            ScoutError::MissingConfigError { .. } => "NOT_CONFIGURED",
            _ => match error.category() {
                ErrorCategory::Network | ErrorCategory::ExternalService => "UPSTREAM_ERROR",
                _ => "INTERNAL_ERROR",
            },
        };

        Self {
            code: code.to_string(),
            message: error.user_friendly_message(),
            suggestion: Some(error.recovery_suggestion()),
            details: error.upstream_details(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub vision_enabled: bool,
}

// ============================================
// HTML forms
// ============================================

#[derive(Debug, Default, Deserialize)]
pub struct PincodeForm {
    #[serde(default)]
    pub pincode: String,
    pub query: Option<String>,
    pub criteria: Option<String>,
}

/// 已鎖定區域的搜尋表單；邊界放在 hidden 欄位
#[derive(Debug, Deserialize)]
pub struct ScoutForm {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub criteria: String,
}

impl ScoutForm {
    pub fn zone(&self) -> BoundingBox {
        BoundingBox::new(self.north, self.south, self.east, self.west)
    }
}

// ============================================
// JSON API
// ============================================

/// 三選一：郵遞區號、base64 截圖、或直接給邊界
#[derive(Debug, Default, Deserialize)]
pub struct ZoneRequest {
    pub pincode: Option<String>,
    pub image_base64: Option<String>,
    pub mime_type: Option<String>,
    pub bounds: Option<BoundingBox>,
}

#[derive(Debug, Serialize)]
pub struct ZoneData {
    pub zone: BoundingBox,
    pub center: LatLng,
    pub source: String,
}

#[derive(Debug, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl From<&BoundingBox> for LatLng {
    fn from(zone: &BoundingBox) -> Self {
        let (lat, lng) = zone.center();
        Self { lat, lng }
    }
}

#[derive(Debug, Deserialize)]
pub struct ScoutApiRequest {
    pub zone: BoundingBox,
    pub query: Option<String>,
    pub criteria: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScoutData {
    pub qualified: usize,
    pub rejected: usize,
    pub errored: usize,
    pub report: ScoutReport,
}

impl From<ScoutReport> for ScoutData {
    fn from(report: ScoutReport) -> Self {
        Self {
            qualified: report.approved.len(),
            rejected: report.rejected.len(),
            errored: report.errored.len(),
            report,
        }
    }
}

// ============================================
// Page view models
// ============================================

pub struct ZoneView {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
    pub center_lat: f64,
    pub center_lng: f64,
    pub map_url: String,
}

impl From<&BoundingBox> for ZoneView {
    fn from(zone: &BoundingBox) -> Self {
        let (center_lat, center_lng) = zone.center();
        Self {
            north: zone.north,
            south: zone.south,
            east: zone.east,
            west: zone.west,
            center_lat,
            center_lng,
            map_url: format!(
                "https://www.openstreetmap.org/export/embed.html?bbox={},{},{},{}&layer=mapnik&marker={},{}",
                zone.west, zone.south, zone.east, zone.north, center_lat, center_lng
            ),
        }
    }
}

pub struct LeadView {
    pub name: String,
    pub rating: String,
    pub address: String,
    pub phone: String,
    pub summary: String,
    /// 空字串代表沒有
    pub website: String,
    pub maps_url: String,
    pub social_icon: String,
    pub social_platform: String,
    pub social_url: String,
    pub reason: String,
}

impl From<&AuditedLead> for LeadView {
    fn from(lead: &AuditedLead) -> Self {
        let place = &lead.place;
        Self {
            name: place.name().to_string(),
            rating: place.rating_label(),
            address: place.address().to_string(),
            phone: place.phone().to_string(),
            summary: place.summary().to_string(),
            website: place.website_uri.clone().unwrap_or_default(),
            maps_url: place.google_maps_uri.clone().unwrap_or_default(),
            social_icon: lead.social.platform.icon().to_string(),
            social_platform: lead.social.platform.as_str().to_string(),
            social_url: lead.social.url.clone(),
            reason: lead.verdict.reason.clone(),
        }
    }
}
