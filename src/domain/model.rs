use crate::utils::error::{Result, ScoutError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 搜尋範圍（北、南、東、西邊界，十進位度數）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl BoundingBox {
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }

    /// (lat, lng) of the box center, used to place the map marker.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.north + self.south) / 2.0,
            (self.east + self.west) / 2.0,
        )
    }

    pub fn validate(&self) -> Result<()> {
        let values = [self.north, self.south, self.east, self.west];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ScoutError::ValidationError {
                message: format!("Bounding box contains non-finite coordinates: {}", self),
            });
        }

        for (label, lat) in [("north", self.north), ("south", self.south)] {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(ScoutError::ValidationError {
                    message: format!("{} latitude {} is outside [-90, 90]", label, lat),
                });
            }
        }

        for (label, lng) in [("east", self.east), ("west", self.west)] {
            if !(-180.0..=180.0).contains(&lng) {
                return Err(ScoutError::ValidationError {
                    message: format!("{} longitude {} is outside [-180, 180]", label, lng),
                });
            }
        }

        if self.north < self.south {
            return Err(ScoutError::ValidationError {
                message: format!(
                    "north latitude {} is below south latitude {}",
                    self.north, self.south
                ),
            });
        }

        Ok(())
    }
}

/// 解析 "north,south,east,west"
impl std::str::FromStr for BoundingBox {
    type Err = ScoutError;

    fn from_str(s: &str) -> Result<Self> {
        let parts = s
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| ScoutError::ValidationError {
                message: format!("Invalid bounds '{}': {}", s, e),
            })?;

        match parts.as_slice() {
            [north, south, east, west] => {
                let bbox = BoundingBox::new(*north, *south, *east, *west);
                bbox.validate()?;
                Ok(bbox)
            }
            _ => Err(ScoutError::ValidationError {
                message: format!(
                    "Invalid bounds '{}': expected four values north,south,east,west",
                    s
                ),
            }),
        }
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "N {:.6}, S {:.6}, E {:.6}, W {:.6}",
            self.north, self.south, self.east, self.west
        )
    }
}

/// 區域來源：郵遞區號、地圖截圖或直接座標
#[derive(Debug, Clone)]
pub enum ZoneSource {
    Pincode(String),
    MapImage { bytes: Vec<u8>, mime_type: String },
    Bounds(BoundingBox),
}

impl ZoneSource {
    pub fn describe(&self) -> String {
        match self {
            ZoneSource::Pincode(code) => format!("pincode {}", code),
            ZoneSource::MapImage { bytes, mime_type } => {
                format!("map screenshot ({}, {} bytes)", mime_type, bytes.len())
            }
            ZoneSource::Bounds(bbox) => format!("bounds {}", bbox),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalizedText {
    #[serde(default)]
    pub text: String,
    #[serde(default, rename = "languageCode", skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
}

/// A business record returned by the Places text search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<LocalizedText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editorial_summary: Option<LocalizedText>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub national_phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_maps_uri: Option<String>,
}

impl Place {
    pub fn name(&self) -> &str {
        self.display_name
            .as_ref()
            .map(|n| n.text.as_str())
            .filter(|n| !n.is_empty())
            .unwrap_or("Unknown")
    }

    pub fn summary(&self) -> &str {
        self.editorial_summary
            .as_ref()
            .map(|s| s.text.as_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("No summary provided")
    }

    pub fn address(&self) -> &str {
        self.formatted_address.as_deref().unwrap_or("")
    }

    pub fn phone(&self) -> &str {
        self.national_phone_number.as_deref().unwrap_or("Not listed")
    }

    pub fn rating_label(&self) -> String {
        self.rating
            .map(|r| r.to_string())
            .unwrap_or_else(|| "N/A".to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditStatus {
    Approved,
    Rejected,
    Error,
}

impl AuditStatus {
    /// 不分大小寫解析；無法辨識時回傳 None
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "APPROVED" => Some(AuditStatus::Approved),
            "REJECTED" => Some(AuditStatus::Rejected),
            "ERROR" => Some(AuditStatus::Error),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuditStatus::Approved => "APPROVED",
            AuditStatus::Rejected => "REJECTED",
            AuditStatus::Error => "ERROR",
        }
    }
}

impl fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub status: AuditStatus,
    pub reason: String,
}

impl Verdict {
    pub fn approved(reason: impl Into<String>) -> Self {
        Self {
            status: AuditStatus::Approved,
            reason: reason.into(),
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            status: AuditStatus::Rejected,
            reason: reason.into(),
        }
    }

    pub fn error(reason: impl Into<String>) -> Self {
        Self {
            status: AuditStatus::Error,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SocialPlatform {
    Instagram,
    LinkedIn,
}

impl SocialPlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            SocialPlatform::Instagram => "Instagram",
            SocialPlatform::LinkedIn => "LinkedIn",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            SocialPlatform::Instagram => "📸",
            SocialPlatform::LinkedIn => "👔",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialLink {
    pub platform: SocialPlatform,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditedLead {
    pub place: Place,
    pub verdict: Verdict,
    pub social: SocialLink,
}

impl AuditedLead {
    pub fn name(&self) -> &str {
        self.place.name()
    }
}

#[derive(Debug, Clone)]
pub struct ScoutRequest {
    pub zone: ZoneSource,
    pub query: String,
    pub criteria: String,
}

/// extract 階段的輸出：解析後的區域與原始候選名單
#[derive(Debug, Clone)]
pub struct RawLeads {
    pub zone: BoundingBox,
    pub places: Vec<Place>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoutReport {
    pub zone: BoundingBox,
    pub query: String,
    pub criteria: String,
    pub generated_at: DateTime<Utc>,
    pub approved: Vec<AuditedLead>,
    pub rejected: Vec<AuditedLead>,
    pub errored: Vec<AuditedLead>,
}

impl ScoutReport {
    pub fn total(&self) -> usize {
        self.approved.len() + self.rejected.len() + self.errored.len()
    }

    /// Approved first, then rejected, then errored.
    pub fn all_leads(&self) -> impl Iterator<Item = &AuditedLead> {
        self.approved
            .iter()
            .chain(self.rejected.iter())
            .chain(self.errored.iter())
    }
}
