use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoutError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[cfg(feature = "web")]
    #[error("Template rendering error: {0}")]
    TemplateError(#[from] askama::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Geocoding failed with status {status}")]
    GeocodingError {
        status: String,
        message: Option<String>,
    },

    #[error("No location found for '{pincode}'")]
    ZoneNotFound { pincode: String },

    #[error("Vision analysis failed: {message}")]
    VisionError { message: String },

    #[error("Places API returned HTTP {status}")]
    PlacesApiError { status: u16, body: String },

    #[error("Lead audit failed: {message}")]
    AuditError { message: String },

    #[error("No leads found in this zone for '{query}'")]
    NoLeadsFound { query: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    ExternalService,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ScoutError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ScoutError::ApiError(_) => ErrorCategory::Network,
            ScoutError::ConfigError { .. }
            | ScoutError::MissingConfigError { .. }
            | ScoutError::InvalidConfigValueError { .. }
            | ScoutError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            ScoutError::GeocodingError { .. }
            | ScoutError::VisionError { .. }
            | ScoutError::PlacesApiError { .. }
            | ScoutError::AuditError { .. } => ErrorCategory::ExternalService,
            ScoutError::ZoneNotFound { .. }
            | ScoutError::NoLeadsFound { .. }
            | ScoutError::ValidationError { .. }
            | ScoutError::ProcessingError { .. }
            | ScoutError::SerializationError(_)
            | ScoutError::CsvError(_) => ErrorCategory::Data,
            ScoutError::ZipError(_) | ScoutError::IoError(_) => ErrorCategory::System,
            #[cfg(feature = "web")]
            ScoutError::TemplateError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ScoutError::NoLeadsFound { .. } => ErrorSeverity::Low,
            ScoutError::ApiError(_)
            | ScoutError::GeocodingError { .. }
            | ScoutError::VisionError { .. }
            | ScoutError::PlacesApiError { .. }
            | ScoutError::AuditError { .. } => ErrorSeverity::Medium,
            ScoutError::ZoneNotFound { .. }
            | ScoutError::ValidationError { .. }
            | ScoutError::ProcessingError { .. }
            | ScoutError::SerializationError(_)
            | ScoutError::CsvError(_)
            | ScoutError::ConfigError { .. }
            | ScoutError::MissingConfigError { .. }
            | ScoutError::InvalidConfigValueError { .. }
            | ScoutError::ConfigValidationError { .. } => ErrorSeverity::High,
            ScoutError::ZipError(_) | ScoutError::IoError(_) => ErrorSeverity::Critical,
            #[cfg(feature = "web")]
            ScoutError::TemplateError(_) => ErrorSeverity::Critical,
        }
    }

    /// 給使用者的修復建議
    pub fn recovery_suggestion(&self) -> String {
        match self {
            ScoutError::ApiError(_) => {
                "Check your network connection and try again".to_string()
            }
            ScoutError::MissingConfigError { field } => {
                format!("Set {} in your environment or .env file", field)
            }
            ScoutError::InvalidConfigValueError { field, .. }
            | ScoutError::ConfigValidationError { field, .. } => {
                format!("Fix the '{}' setting in zonescout.toml or the command line", field)
            }
            ScoutError::ConfigError { .. } => {
                "Review zonescout.toml and the command line flags".to_string()
            }
            ScoutError::GeocodingError { status, .. } if status == "REQUEST_DENIED" => {
                "Enable the Geocoding API for GOOGLE_API_KEY and check billing".to_string()
            }
            ScoutError::GeocodingError { .. } => {
                "Run zonescout-check to verify the Geocoding API".to_string()
            }
            ScoutError::ZoneNotFound { .. } => {
                "Try a full address or add the country to the postal code".to_string()
            }
            ScoutError::VisionError { .. } => {
                "Use a sharper screenshot with visible street names, or enter a postal code"
                    .to_string()
            }
            ScoutError::PlacesApiError { status: 403, .. } => {
                "Enable the Places API (New) for GOOGLE_API_KEY".to_string()
            }
            ScoutError::PlacesApiError { .. } => {
                "Run zonescout-check to verify the Places API".to_string()
            }
            ScoutError::AuditError { .. } => "Check GROQ_API_KEY and retry".to_string(),
            ScoutError::NoLeadsFound { .. } => {
                "Widen the zone or use a broader search term".to_string()
            }
            ScoutError::ValidationError { .. } => "Correct the input and retry".to_string(),
            ScoutError::IoError(_) | ScoutError::ZipError(_) => {
                "Check that the output path exists and is writable".to_string()
            }
            _ => "Re-run with --verbose for details".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ScoutError::ApiError(e) if e.is_timeout() => "The request timed out".to_string(),
            ScoutError::ApiError(_) => "Could not reach an external service".to_string(),
            ScoutError::MissingConfigError { field } => format!("{} is not set", field),
            ScoutError::GeocodingError { status, message } => match message {
                Some(reason) => format!("Geocoding error: {} ({})", status, reason),
                None => format!("Geocoding error: {}", status),
            },
            ScoutError::ZoneNotFound { pincode } => {
                format!("Invalid pincode '{}': no location found", pincode)
            }
            ScoutError::VisionError { message } => format!("Vision AI error: {}", message),
            ScoutError::PlacesApiError { status, .. } => {
                format!("Google API error: {}", status)
            }
            ScoutError::NoLeadsFound { .. } => "No leads found in this zone.".to_string(),
            ScoutError::ValidationError { message } => message.clone(),
            other => other.to_string(),
        }
    }

    /// 上游回傳的原始內容（JSON 會排版），給 UI 顯示
    pub fn upstream_details(&self) -> Option<String> {
        match self {
            ScoutError::PlacesApiError { body, .. } if !body.trim().is_empty() => Some(
                serde_json::from_str::<serde_json::Value>(body)
                    .ok()
                    .and_then(|value| serde_json::to_string_pretty(&value).ok())
                    .unwrap_or_else(|| body.clone()),
            ),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScoutError>;
