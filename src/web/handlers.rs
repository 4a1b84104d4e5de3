//! Page and JSON handlers

use askama::Template;
use axum::{
    extract::{Form, Json, Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::sync::Arc;
use std::time::Instant;

use super::pages::{ErrorPage, IndexPage, ResultsPage, ZonePage};
use super::types::*;
use crate::config::ScoutConfig;
use crate::core::report::build_report;
use crate::core::vision::{mime_type_for, SUPPORTED_IMAGE_TYPES};
use crate::core::{BoundingBox, ScoutReport, ZoneSource};
use crate::utils::error::{ErrorCategory, Result, ScoutError};
use crate::ScoutServices;

/// Shared application state
pub struct AppState {
    pub services: ScoutServices,
    pub config: ScoutConfig,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(services: ScoutServices, config: ScoutConfig) -> Self {
        Self {
            services,
            config,
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    fn query_or_default(&self, query: Option<String>) -> String {
        query
            .filter(|q| !q.trim().is_empty())
            .unwrap_or_else(|| self.config.scout.default_query.clone())
    }

    fn criteria_or_default(&self, criteria: Option<String>) -> String {
        criteria
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| self.config.scout.default_criteria.clone())
    }

    /// 搜尋 + 稽核；區域內沒有結果時回傳空報告
    async fn scout(&self, zone: BoundingBox, query: &str, criteria: &str) -> Result<ScoutReport> {
        if query.trim().is_empty() {
            return Err(ScoutError::ValidationError {
                message: "Please enter a search term.".to_string(),
            });
        }

        let zone = self.services.resolve_zone(&ZoneSource::Bounds(zone)).await?;

        match self
            .services
            .find_leads(query, zone, self.config.scout.max_leads)
            .await
        {
            Ok(raw) => Ok(self
                .services
                .audit_leads(raw, query, criteria, self.config.scout.concurrent_audits)
                .await),
            Err(ScoutError::NoLeadsFound { .. }) => {
                tracing::info!("📭 No leads found for '{}' in {}", query.trim(), zone);
                Ok(build_report(zone, query.trim(), criteria, Vec::new()))
            }
            Err(e) => Err(e),
        }
    }
}

/// 錯誤對應的 HTTP 狀態碼
pub fn status_for(error: &ScoutError) -> StatusCode {
    match error {
        ScoutError::ValidationError { .. }
        | ScoutError::ZoneNotFound { .. }
        | ScoutError::InvalidConfigValueError { .. } => StatusCode::BAD_REQUEST,
        _ => match error.category() {
            ErrorCategory::Network | ErrorCategory::ExternalService => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        },
    }
}

fn log_failure(error: &ScoutError) {
    if status_for(error).is_server_error() {
        tracing::error!(
            "❌ Request failed: {} (Category: {:?}, Severity: {:?})",
            error,
            error.category(),
            error.severity()
        );
        if let ScoutError::PlacesApiError { body, .. } = error {
            tracing::error!("   Upstream body: {}", body);
        }
    } else {
        tracing::warn!("⚠️ Rejected request: {}", error);
    }
}

fn render<T: Template>(page: &T) -> Result<Html<String>> {
    Ok(Html(page.render()?))
}

/// HTML 錯誤頁
pub struct PageError(pub ScoutError);

impl From<ScoutError> for PageError {
    fn from(error: ScoutError) -> Self {
        Self(error)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        log_failure(&self.0);
        let status = status_for(&self.0);

        let page = ErrorPage {
            status: status.as_u16(),
            message: self.0.user_friendly_message(),
            suggestion: self.0.recovery_suggestion(),
            details: self.0.upstream_details().unwrap_or_default(),
        };

        match render(&page) {
            Ok(html) => (status, html).into_response(),
            Err(e) => {
                tracing::error!("❌ Failed to render error page: {}", e);
                (status, self.0.user_friendly_message()).into_response()
            }
        }
    }
}

type PageResult = std::result::Result<Response, PageError>;

// ============================================
// Pages
// ============================================

pub async fn index(State(state): State<Arc<AppState>>) -> PageResult {
    let page = IndexPage {
        query: state.config.scout.default_query.clone(),
        criteria: state.config.scout.default_criteria.clone(),
        pincode: String::new(),
        vision_enabled: state.services.vision_enabled(),
        error: String::new(),
        suggestion: String::new(),
    };
    Ok(render(&page)?.into_response())
}

/// 區域解析失敗時回到首頁並顯示錯誤
fn zone_failure(
    state: &AppState,
    error: ScoutError,
    pincode: String,
    query: String,
    criteria: String,
) -> PageResult {
    log_failure(&error);

    let page = IndexPage {
        query,
        criteria,
        pincode,
        vision_enabled: state.services.vision_enabled(),
        error: error.user_friendly_message(),
        suggestion: error.recovery_suggestion(),
    };
    Ok((status_for(&error), render(&page)?).into_response())
}

fn zone_page(source: String, zone: &BoundingBox, query: String, criteria: String) -> PageResult {
    let page = ZonePage {
        source,
        zone: ZoneView::from(zone),
        query,
        criteria,
    };
    Ok(render(&page)?.into_response())
}

pub async fn zone_from_pincode(
    State(state): State<Arc<AppState>>,
    Form(form): Form<PincodeForm>,
) -> PageResult {
    let query = state.query_or_default(form.query);
    let criteria = state.criteria_or_default(form.criteria);
    let source = ZoneSource::Pincode(form.pincode.trim().to_string());

    match state.services.resolve_zone(&source).await {
        Ok(zone) => zone_page(source.describe(), &zone, query, criteria),
        Err(e) => zone_failure(&state, e, form.pincode, query, criteria),
    }
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> ScoutError {
    ScoutError::ValidationError {
        message: format!("Invalid upload: {}", e.body_text()),
    }
}

/// 優先採用瀏覽器給的 Content-Type，否則依副檔名判斷
fn upload_mime_type(content_type: Option<&str>, file_name: &str) -> Result<String> {
    match content_type {
        Some(ct) if SUPPORTED_IMAGE_TYPES.contains(&ct) => Ok(ct.to_string()),
        _ => Ok(mime_type_for(file_name)?.to_string()),
    }
}

pub async fn zone_from_image(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> PageResult {
    let mut image: Option<(Vec<u8>, String)> = None;
    let mut query = None;
    let mut criteria = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "map" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                if !bytes.is_empty() {
                    let mime_type = upload_mime_type(content_type.as_deref(), &file_name)?;
                    image = Some((bytes.to_vec(), mime_type));
                }
            }
            "query" => query = Some(field.text().await.map_err(multipart_error)?),
            "criteria" => criteria = Some(field.text().await.map_err(multipart_error)?),
            other => tracing::debug!("Ignoring multipart field '{}'", other),
        }
    }

    let query = state.query_or_default(query);
    let criteria = state.criteria_or_default(criteria);

    let Some((bytes, mime_type)) = image else {
        let error = ScoutError::ValidationError {
            message: "Please upload a map screenshot.".to_string(),
        };
        return zone_failure(&state, error, String::new(), query, criteria);
    };

    tracing::info!("🧠 Analyzing uploaded map ({}, {} bytes)", mime_type, bytes.len());
    let source = ZoneSource::MapImage { bytes, mime_type };

    match state.services.resolve_zone(&source).await {
        Ok(zone) => zone_page(source.describe(), &zone, query, criteria),
        Err(e) => zone_failure(&state, e, String::new(), query, criteria),
    }
}

pub async fn scout(State(state): State<Arc<AppState>>, Form(form): Form<ScoutForm>) -> PageResult {
    let zone = form.zone();
    let criteria = state.criteria_or_default(Some(form.criteria));
    let report = state.scout(zone, &form.query, &criteria).await?;

    let page = ResultsPage {
        zone: ZoneView::from(&report.zone),
        query: report.query.clone(),
        criteria: report.criteria.clone(),
        total: report.total(),
        approved: report.approved.iter().map(LeadView::from).collect(),
        rejected: report.rejected.iter().map(LeadView::from).collect(),
        errored: report.errored.iter().map(LeadView::from).collect(),
    };
    Ok(render(&page)?.into_response())
}

// ============================================
// JSON API
// ============================================

type ApiResult<T> = std::result::Result<Json<ApiResponse<T>>, (StatusCode, Json<ApiResponse<()>>)>;

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

fn api_failure(error: ScoutError, start: Instant) -> (StatusCode, Json<ApiResponse<()>>) {
    log_failure(&error);
    (
        status_for(&error),
        Json(ApiResponse::error(ApiError::from(&error), elapsed_ms(start))),
    )
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    let start = Instant::now();

    let data = HealthData {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        vision_enabled: state.services.vision_enabled(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}

fn zone_source(request: ZoneRequest) -> Result<ZoneSource> {
    match (request.pincode, request.image_base64, request.bounds) {
        (Some(pincode), None, None) => Ok(ZoneSource::Pincode(pincode.trim().to_string())),
        (None, Some(encoded), None) => {
            let mime_type = request.mime_type.unwrap_or_else(|| "image/png".to_string());
            if !SUPPORTED_IMAGE_TYPES.contains(&mime_type.as_str()) {
                return Err(ScoutError::ValidationError {
                    message: format!("Unsupported image type '{}'", mime_type),
                });
            }
            let bytes = STANDARD
                .decode(encoded.trim())
                .map_err(|e| ScoutError::ValidationError {
                    message: format!("image_base64 is not valid base64: {}", e),
                })?;
            Ok(ZoneSource::MapImage { bytes, mime_type })
        }
        (None, None, Some(bounds)) => Ok(ZoneSource::Bounds(bounds)),
        _ => Err(ScoutError::ValidationError {
            message: "Provide exactly one of pincode, image_base64 or bounds".to_string(),
        }),
    }
}

pub async fn zone_api(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ZoneRequest>,
) -> ApiResult<ZoneData> {
    let start = Instant::now();

    let source = zone_source(request).map_err(|e| api_failure(e, start))?;
    let zone = state
        .services
        .resolve_zone(&source)
        .await
        .map_err(|e| api_failure(e, start))?;

    let data = ZoneData {
        center: LatLng::from(&zone),
        zone,
        source: source.describe(),
    };
    Ok(Json(ApiResponse::success(data, elapsed_ms(start))))
}

pub async fn scout_api(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ScoutApiRequest>,
) -> ApiResult<ScoutData> {
    let start = Instant::now();

    // 只有缺少欄位時才用預設搜尋詞；空白字串照樣拒絕
    let query = request
        .query
        .unwrap_or_else(|| state.config.scout.default_query.clone());
    let criteria = state.criteria_or_default(request.criteria);
    let report = state
        .scout(request.zone, &query, &criteria)
        .await
        .map_err(|e| api_failure(e, start))?;

    Ok(Json(ApiResponse::success(
        ScoutData::from(report),
        elapsed_ms(start),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let validation = ScoutError::ValidationError {
            message: "bad".to_string(),
        };
        assert_eq!(status_for(&validation), StatusCode::BAD_REQUEST);

        let upstream = ScoutError::GeocodingError {
            status: "REQUEST_DENIED".to_string(),
            message: None,
        };
        assert_eq!(status_for(&upstream), StatusCode::BAD_GATEWAY);

        let missing = ScoutError::MissingConfigError {
            field: "AI_STUDIO_KEY".to_string(),
        };
        assert_eq!(status_for(&missing), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_upload_mime_type_falls_back_to_extension() {
        assert_eq!(upload_mime_type(Some("image/jpeg"), "x").unwrap(), "image/jpeg");
        assert_eq!(
            upload_mime_type(Some("application/octet-stream"), "zone.PNG").unwrap(),
            "image/png"
        );
        assert!(upload_mime_type(None, "zone.gif").is_err());
    }

    #[test]
    fn test_zone_source_requires_exactly_one() {
        assert!(zone_source(ZoneRequest::default()).is_err());

        let both = ZoneRequest {
            pincode: Some("90210".to_string()),
            bounds: Some(BoundingBox::new(1.0, 0.0, 1.0, 0.0)),
            ..Default::default()
        };
        assert!(zone_source(both).is_err());

        let image = ZoneRequest {
            image_base64: Some(STANDARD.encode(b"png-bytes")),
            ..Default::default()
        };
        match zone_source(image).unwrap() {
            ZoneSource::MapImage { bytes, mime_type } => {
                assert_eq!(bytes, b"png-bytes");
                assert_eq!(mime_type, "image/png");
            }
            other => panic!("unexpected source: {:?}", other),
        }
    }
}
