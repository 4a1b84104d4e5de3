use crate::domain::model::{BoundingBox, Place, RawLeads, ScoutReport, Verdict};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn output_path(&self) -> &str;
    fn report_filename(&self) -> &str;
    fn concurrent_audits(&self) -> usize;
    fn max_leads(&self) -> Option<usize>;
}

/// 郵遞區號 → 官方邊界
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn bbox_from_pincode(&self, pincode: &str) -> Result<BoundingBox>;
}

/// 地圖截圖 → 估計邊界
#[async_trait]
pub trait MapReader: Send + Sync {
    async fn bbox_from_image(&self, image: &[u8], mime_type: &str) -> Result<BoundingBox>;
}

#[async_trait]
pub trait PlaceSearch: Send + Sync {
    async fn search_in_zone(&self, query: &str, bbox: &BoundingBox) -> Result<Vec<Place>>;
}

#[async_trait]
pub trait LeadAuditor: Send + Sync {
    async fn audit(&self, place: &Place, criteria: &str) -> Result<Verdict>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<RawLeads>;
    async fn transform(&self, data: RawLeads) -> Result<ScoutReport>;
    async fn load(&self, report: &ScoutReport) -> Result<String>;
}
