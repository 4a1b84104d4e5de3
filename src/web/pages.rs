use super::types::{LeadView, ZoneView};
use askama::Template;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage {
    pub query: String,
    pub criteria: String,
    pub pincode: String,
    pub vision_enabled: bool,
    pub error: String,
    pub suggestion: String,
}

/// 區域已鎖定，下一步是搜尋
#[derive(Template)]
#[template(path = "zone.html")]
pub struct ZonePage {
    pub source: String,
    pub zone: ZoneView,
    pub query: String,
    pub criteria: String,
}

#[derive(Template)]
#[template(path = "results.html")]
pub struct ResultsPage {
    pub zone: ZoneView,
    pub query: String,
    pub criteria: String,
    pub total: usize,
    pub approved: Vec<LeadView>,
    pub rejected: Vec<LeadView>,
    pub errored: Vec<LeadView>,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorPage {
    pub status: u16,
    pub message: String,
    pub suggestion: String,
    /// 空字串代表沒有上游回應可顯示
    pub details: String,
}
