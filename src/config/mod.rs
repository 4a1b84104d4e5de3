pub mod cli;
pub mod keys;
pub mod toml_config;

pub use keys::ApiKeys;
pub use toml_config::ScoutConfig;

#[cfg(feature = "cli")]
use crate::core::vision::mime_type_for;
#[cfg(feature = "cli")]
use crate::domain::model::{BoundingBox, ScoutRequest, ZoneSource};
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "zonescout")]
#[command(about = "Generate verified business leads from a map zone")]
#[command(group(
    clap::ArgGroup::new("zone")
        .required(true)
        .args(["pincode", "map_image", "bounds"])
))]
pub struct CliConfig {
    /// Postal code to geocode (e.g. 90210)
    #[arg(long)]
    pub pincode: Option<String>,

    /// Map screenshot (png/jpg) read by the vision model
    #[arg(long)]
    pub map_image: Option<String>,

    /// Explicit zone as north,south,east,west
    #[arg(long, allow_hyphen_values = true)]
    pub bounds: Option<String>,

    /// Business search term
    #[arg(short, long)]
    pub query: Option<String>,

    /// Criteria every lead must satisfy
    #[arg(short = 'k', long)]
    pub criteria: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long)]
    pub output_path: Option<String>,

    #[arg(long)]
    pub concurrent_audits: Option<usize>,

    #[arg(long)]
    pub max_leads: Option<usize>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per stage")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 命令列參數覆蓋檔案設定
    pub fn apply_to(&self, config: &mut ScoutConfig) {
        if let Some(output_path) = &self.output_path {
            config.output.output_path = output_path.clone();
        }
        if let Some(concurrent) = self.concurrent_audits {
            config.scout.concurrent_audits = concurrent;
        }
        if let Some(max_leads) = self.max_leads {
            config.scout.max_leads = Some(max_leads);
        }
    }

    pub async fn zone_source(&self) -> Result<ZoneSource> {
        if let Some(pincode) = &self.pincode {
            return Ok(ZoneSource::Pincode(pincode.clone()));
        }

        if let Some(path) = &self.map_image {
            let mime_type = mime_type_for(path)?;
            let bytes = tokio::fs::read(path).await?;
            return Ok(ZoneSource::MapImage {
                bytes,
                mime_type: mime_type.to_string(),
            });
        }

        let bounds = self.bounds.as_deref().unwrap_or_default();
        Ok(ZoneSource::Bounds(bounds.parse::<BoundingBox>()?))
    }

    pub async fn scout_request(&self, config: &ScoutConfig) -> Result<ScoutRequest> {
        Ok(ScoutRequest {
            zone: self.zone_source().await?,
            query: self
                .query
                .clone()
                .unwrap_or_else(|| config.scout.default_query.clone()),
            criteria: self
                .criteria
                .clone()
                .unwrap_or_else(|| config.scout.default_criteria.clone()),
        })
    }
}
