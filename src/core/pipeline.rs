use crate::config::keys::AI_STUDIO_KEY;
use crate::config::{ApiKeys, ScoutConfig};
use crate::core::auditor::{audit_all, GroqAuditor};
use crate::core::geocoding::{CachedGeocoder, GoogleGeocoder};
use crate::core::http::build_client;
use crate::core::places::GooglePlacesClient;
use crate::core::report::{build_report, report_archive};
use crate::core::vision::GeminiMapReader;
use crate::core::{
    BoundingBox, ConfigProvider, Geocoder, LeadAuditor, MapReader, Pipeline, PlaceSearch,
    RawLeads, ScoutReport, ScoutRequest, Storage, ZoneSource,
};
use crate::utils::error::{Result, ScoutError};
use std::sync::Arc;

/// 外部服務集合。Vision 只有在設定 AI_STUDIO_KEY 時才可用。
#[derive(Clone)]
pub struct ScoutServices {
    pub geocoder: Arc<dyn Geocoder>,
    pub map_reader: Option<Arc<dyn MapReader>>,
    pub places: Arc<dyn PlaceSearch>,
    pub auditor: Arc<dyn LeadAuditor>,
}

impl ScoutServices {
    pub fn from_config(config: &ScoutConfig, keys: &ApiKeys) -> Result<Self> {
        let client = build_client(config.request_timeout())?;

        let map_reader: Option<Arc<dyn MapReader>> =
            match GeminiMapReader::from_config(client.clone(), config, keys) {
                Ok(reader) => Some(Arc::new(reader)),
                Err(e) => {
                    tracing::warn!("⚠️ Map screenshot input disabled: {}", e);
                    None
                }
            };

        Ok(Self {
            geocoder: Arc::new(GoogleGeocoder::from_config(client.clone(), config, keys)?),
            map_reader,
            places: Arc::new(GooglePlacesClient::from_config(client.clone(), config, keys)?),
            auditor: Arc::new(GroqAuditor::from_config(client, config, keys)?),
        })
    }

    /// 郵遞區號查詢加上記憶快取（web server 用）
    pub fn with_geocode_cache(mut self) -> Self {
        self.geocoder = Arc::new(CachedGeocoder::new(self.geocoder.clone()));
        self
    }

    pub fn vision_enabled(&self) -> bool {
        self.map_reader.is_some()
    }

    /// 把任一種區域來源轉成邊界
    pub async fn resolve_zone(&self, zone: &ZoneSource) -> Result<BoundingBox> {
        let bbox = match zone {
            ZoneSource::Pincode(pincode) => self.geocoder.bbox_from_pincode(pincode).await?,
            ZoneSource::MapImage { bytes, mime_type } => {
                let reader =
                    self.map_reader
                        .as_ref()
                        .ok_or_else(|| ScoutError::MissingConfigError {
                            field: AI_STUDIO_KEY.to_string(),
                        })?;
                reader.bbox_from_image(bytes, mime_type).await?
            }
            ZoneSource::Bounds(bbox) => *bbox,
        };

        bbox.validate()?;
        Ok(bbox)
    }

    /// Places search inside the zone; an empty result is `NoLeadsFound`.
    pub async fn find_leads(
        &self,
        query: &str,
        zone: BoundingBox,
        max_leads: Option<usize>,
    ) -> Result<RawLeads> {
        let mut places = self.places.search_in_zone(query, &zone).await?;

        if places.is_empty() {
            return Err(ScoutError::NoLeadsFound {
                query: query.trim().to_string(),
            });
        }

        if let Some(limit) = max_leads {
            if places.len() > limit {
                tracing::info!("✂️ Keeping the first {} of {} candidates", limit, places.len());
                places.truncate(limit);
            }
        }

        Ok(RawLeads { zone, places })
    }

    pub async fn audit_leads(
        &self,
        raw: RawLeads,
        query: &str,
        criteria: &str,
        concurrency: usize,
    ) -> ScoutReport {
        let leads = audit_all(self.auditor.as_ref(), raw.places, criteria, concurrency).await;
        let report = build_report(raw.zone, query.trim(), criteria, leads);

        tracing::info!(
            "✅ Audit complete: {} qualified, {} rejected, {} errored",
            report.approved.len(),
            report.rejected.len(),
            report.errored.len()
        );
        report
    }
}

pub struct ScoutPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    services: ScoutServices,
    request: ScoutRequest,
}

impl<S: Storage, C: ConfigProvider> ScoutPipeline<S, C> {
    pub fn new(storage: S, config: C, services: ScoutServices, request: ScoutRequest) -> Self {
        Self {
            storage,
            config,
            services,
            request,
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ScoutPipeline<S, C> {
    async fn extract(&self) -> Result<RawLeads> {
        if self.request.query.trim().is_empty() {
            return Err(ScoutError::ValidationError {
                message: "Please enter a search term.".to_string(),
            });
        }

        tracing::info!("📍 Resolving zone from {}", self.request.zone.describe());
        let zone = self.services.resolve_zone(&self.request.zone).await?;
        tracing::debug!("Zone locked: {}", zone);

        self.services
            .find_leads(&self.request.query, zone, self.config.max_leads())
            .await
    }

    async fn transform(&self, data: RawLeads) -> Result<ScoutReport> {
        Ok(self
            .services
            .audit_leads(
                data,
                &self.request.query,
                &self.request.criteria,
                self.config.concurrent_audits(),
            )
            .await)
    }

    async fn load(&self, report: &ScoutReport) -> Result<String> {
        let filename = self.config.report_filename();
        let output_path = format!("{}/{}", self.config.output_path(), filename);

        let archive = report_archive(report)?;
        tracing::debug!("Writing report ({} bytes) to storage", archive.len());
        self.storage.write_file(filename, &archive).await?;

        Ok(output_path)
    }
}
