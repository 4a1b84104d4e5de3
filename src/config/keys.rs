use crate::utils::error::Result;
use crate::utils::validation::validate_required_field;

pub const GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
pub const GROQ_API_KEY: &str = "GROQ_API_KEY";
pub const AI_STUDIO_KEY: &str = "AI_STUDIO_KEY";

/// 三組外部 API 金鑰。只有實際使用的元件才會要求對應的金鑰。
#[derive(Clone, Default)]
pub struct ApiKeys {
    google: Option<String>,
    groq: Option<String>,
    ai_studio: Option<String>,
}

impl std::fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeys")
            .field("google", &self.google.as_deref().map(mask_key))
            .field("groq", &self.groq.as_deref().map(mask_key))
            .field("ai_studio", &self.ai_studio.as_deref().map(mask_key))
            .finish()
    }
}

impl ApiKeys {
    /// 載入 `.env`（若存在）後從環境變數讀取
    pub fn from_env() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => tracing::debug!("No .env file found"),
            Err(e) => tracing::warn!("⚠️ Failed to read .env file: {}", e),
        }

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            google: clean_key(lookup(GOOGLE_API_KEY)),
            groq: clean_key(lookup(GROQ_API_KEY)),
            ai_studio: clean_key(lookup(AI_STUDIO_KEY)),
        }
    }

    pub fn google(&self) -> Result<&str> {
        validate_required_field(GOOGLE_API_KEY, &self.google).map(String::as_str)
    }

    pub fn groq(&self) -> Result<&str> {
        validate_required_field(GROQ_API_KEY, &self.groq).map(String::as_str)
    }

    pub fn ai_studio(&self) -> Result<&str> {
        validate_required_field(AI_STUDIO_KEY, &self.ai_studio).map(String::as_str)
    }

    /// Names of the keys that are not set.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            (GOOGLE_API_KEY, self.google.is_none()),
            (GROQ_API_KEY, self.groq.is_none()),
            (AI_STUDIO_KEY, self.ai_studio.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, missing)| missing.then_some(name))
        .collect()
    }
}

fn clean_key(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 只顯示前五個字元
pub fn mask_key(key: &str) -> String {
    let prefix: String = key.chars().take(5).collect();
    format!("{}...", prefix)
}
