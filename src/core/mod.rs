pub mod auditor;
pub mod engine;
pub mod geocoding;
pub mod http;
pub mod pipeline;
pub mod places;
pub mod report;
pub mod social;
pub mod vision;

pub use crate::domain::model::{
    AuditStatus, AuditedLead, BoundingBox, LocalizedText, Place, RawLeads, ScoutReport,
    ScoutRequest, SocialLink, SocialPlatform, Verdict, ZoneSource,
};
pub use crate::domain::ports::{
    ConfigProvider, Geocoder, LeadAuditor, MapReader, Pipeline, PlaceSearch, Storage,
};
pub use crate::utils::error::Result;
