use crate::core::ConfigProvider;
use crate::utils::error::{Result, ScoutError};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_range,
    validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "zonescout.toml";

pub const DEFAULT_QUERY: &str = "Coffee Shop";
pub const DEFAULT_CRITERIA: &str = "Must be a small business. NO big chains like Starbucks.";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    pub google: GoogleConfig,
    pub vision: VisionConfig,
    pub auditor: AuditorConfig,
    pub scout: ScoutSettings,
    pub output: OutputConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    pub geocode_endpoint: String,
    pub places_endpoint: String,
    /// 第一次查無結果時附加的國家/地區，空字串代表不重試
    pub fallback_region: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            geocode_endpoint: "https://maps.googleapis.com/maps/api/geocode/json".to_string(),
            places_endpoint: "https://places.googleapis.com/v1/places:searchText".to_string(),
            fallback_region: "USA".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    pub endpoint: String,
    pub model: String,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-1.5-flash".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditorConfig {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
}

impl Default for AuditorConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            temperature: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutSettings {
    pub concurrent_audits: usize,
    pub request_timeout_seconds: u64,
    pub max_leads: Option<usize>,
    pub default_query: String,
    pub default_criteria: String,
}

impl Default for ScoutSettings {
    fn default() -> Self {
        Self {
            concurrent_audits: 8,
            request_timeout_seconds: 30,
            max_leads: None,
            default_query: DEFAULT_QUERY.to_string(),
            default_criteria: DEFAULT_CRITERIA.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub output_path: String,
    pub report_filename: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_path: "./output".to_string(),
            report_filename: "zonescout_report.zip".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub json_logs: bool,
    pub max_upload_mb: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
            json_logs: false,
            max_upload_mb: 10,
        }
    }
}

impl ScoutConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ScoutError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ScoutError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 指定路徑必須存在；未指定時使用 zonescout.toml，找不到就用預設值
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                Self::from_file(path)
            }
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                tracing::info!("📁 Loading configuration from: {}", DEFAULT_CONFIG_FILE);
                Self::from_file(DEFAULT_CONFIG_FILE)
            }
            None => {
                tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                Ok(Self::default())
            }
        }
    }

    /// 替換環境變數 (例如 ${GOOGLE_ENDPOINT})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ScoutError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.scout.request_timeout_seconds)
    }
}

impl ConfigProvider for ScoutConfig {
    fn output_path(&self) -> &str {
        &self.output.output_path
    }

    fn report_filename(&self) -> &str {
        &self.output.report_filename
    }

    fn concurrent_audits(&self) -> usize {
        self.scout.concurrent_audits
    }

    fn max_leads(&self) -> Option<usize> {
        self.scout.max_leads
    }
}

impl Validate for ScoutConfig {
    fn validate(&self) -> Result<()> {
        validate_url("google.geocode_endpoint", &self.google.geocode_endpoint)?;
        validate_url("google.places_endpoint", &self.google.places_endpoint)?;
        validate_url("vision.endpoint", &self.vision.endpoint)?;
        validate_non_empty_string("vision.model", &self.vision.model)?;
        validate_url("auditor.endpoint", &self.auditor.endpoint)?;
        validate_non_empty_string("auditor.model", &self.auditor.model)?;
        validate_range("auditor.temperature", self.auditor.temperature, 0.0, 2.0)?;

        validate_positive_number("scout.concurrent_audits", self.scout.concurrent_audits, 1)?;
        validate_range("scout.concurrent_audits", self.scout.concurrent_audits, 1, 64)?;
        validate_range(
            "scout.request_timeout_seconds",
            self.scout.request_timeout_seconds,
            1,
            300,
        )?;
        if let Some(max_leads) = self.scout.max_leads {
            validate_positive_number("scout.max_leads", max_leads, 1)?;
        }

        validate_path("output.output_path", &self.output.output_path)?;
        validate_path("output.report_filename", &self.output.report_filename)?;

        validate_non_empty_string("server.host", &self.server.host)?;
        validate_positive_number("server.port", self.server.port as usize, 1)?;
        validate_range("server.max_upload_mb", self.server.max_upload_mb, 1, 1024)?;

        Ok(())
    }
}
