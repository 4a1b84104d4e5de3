use crate::config::{ApiKeys, ScoutConfig};
use crate::core::social::social_link;
use crate::core::{AuditStatus, AuditedLead, LeadAuditor, Place, Verdict};
use crate::utils::error::{Result, ScoutError};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};

const SYSTEM_PROMPT: &str = "Return JSON only.";

/// 單筆稽核失敗時的理由（不中斷整批）
pub const AUDIT_FAILURE_REASON: &str = "AI Timeout";

pub fn audit_prompt(place: &Place, criteria: &str) -> String {
    format!(
        r#"Role: Strict Business Auditor.
User Criteria: "{criteria}"

Candidate:
- Name: {name}
- Types: [{types}]
- Summary: {summary}

Task: Does this STRICTLY match the criteria?
Return JSON only: {{"status": "APPROVED" | "REJECTED", "reason": "Short explanation"}}"#,
        criteria = criteria,
        name = place.name(),
        types = place.types.join(", "),
        summary = place.summary(),
    )
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    r#type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawVerdict {
    status: String,
    #[serde(default)]
    reason: Option<String>,
}

/// 解析模型回傳的 {"status", "reason"}
pub fn parse_verdict(content: &str) -> Result<Verdict> {
    let raw: RawVerdict = serde_json::from_str(content.trim())?;
    let reason = raw
        .reason
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| "No reason given".to_string());

    Ok(match AuditStatus::parse(&raw.status) {
        Some(status) => Verdict { status, reason },
        None => Verdict::error(format!("Unrecognized status '{}': {}", raw.status, reason)),
    })
}

/// Llama on Groq through the OpenAI-compatible chat completions API.
pub struct GroqAuditor {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
    temperature: f32,
}

impl GroqAuditor {
    pub fn new(client: Client, endpoint: String, model: String, api_key: String) -> Self {
        Self {
            client,
            endpoint,
            model,
            api_key,
            temperature: 0.0,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn from_config(client: Client, config: &ScoutConfig, keys: &ApiKeys) -> Result<Self> {
        Ok(Self::new(
            client,
            config.auditor.endpoint.clone(),
            config.auditor.model.clone(),
            keys.groq()?.to_string(),
        )
        .with_temperature(config.auditor.temperature))
    }
}

#[async_trait]
impl LeadAuditor for GroqAuditor {
    async fn audit(&self, place: &Place, criteria: &str) -> Result<Verdict> {
        let prompt = audit_prompt(place, criteria);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            temperature: self.temperature,
            response_format: ResponseFormat {
                r#type: "json_object",
            },
        };

        let response = self
            .client
            .post(format!(
                "{}/chat/completions",
                self.endpoint.trim_end_matches('/')
            ))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = crate::core::http::error_body(response).await;
            return Err(ScoutError::AuditError {
                message: format!("HTTP {}: {}", status, body),
            });
        }

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ScoutError::AuditError {
                message: "completion contained no message".to_string(),
            })?;

        parse_verdict(&content)
    }
}

/// 並行稽核所有候選（最多 `concurrency` 筆同時進行），回傳順序與輸入相同
pub async fn audit_all(
    auditor: &dyn LeadAuditor,
    places: Vec<Place>,
    criteria: &str,
    concurrency: usize,
) -> Vec<AuditedLead> {
    let total = places.len();
    tracing::info!(
        "🤖 Agent verification started for {} candidates (concurrency {})",
        total,
        concurrency
    );

    stream::iter(places)
        .map(|place| async move {
            let verdict = match auditor.audit(&place, criteria).await {
                Ok(verdict) => verdict,
                Err(e) => {
                    tracing::warn!("⚠️ Audit failed for '{}': {}", place.name(), e);
                    Verdict::error(AUDIT_FAILURE_REASON)
                }
            };
            tracing::debug!("{}: {} ({})", place.name(), verdict.status, verdict.reason);

            let social = social_link(place.name(), &place.types);
            AuditedLead {
                place,
                verdict,
                social,
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn place(name: &str, types: &[&str]) -> Place {
        serde_json::from_value(serde_json::json!({
            "displayName": {"text": name},
            "types": types,
        }))
        .unwrap()
    }

    fn completion(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
        })
    }

    fn auditor(server: &MockServer) -> GroqAuditor {
        GroqAuditor::new(
            Client::new(),
            server.url("/openai/v1"),
            "llama-3.3-70b-versatile".to_string(),
            "groq-key".to_string(),
        )
    }

    #[test]
    fn test_prompt_contains_candidate_details() {
        let prompt = audit_prompt(&place("Bean There", &["cafe", "food"]), "No chains");
        assert!(prompt.contains("User Criteria: \"No chains\""));
        assert!(prompt.contains("- Name: Bean There"));
        assert!(prompt.contains("- Types: [cafe, food]"));
        assert!(prompt.contains("- Summary: No summary provided"));
    }

    #[test]
    fn test_parse_verdict() {
        let verdict = parse_verdict(r#"{"status": "approved", "reason": "Independent cafe"}"#)
            .unwrap();
        assert_eq!(verdict, Verdict::approved("Independent cafe"));

        let unknown = parse_verdict(r#"{"status": "MAYBE", "reason": "Unclear"}"#).unwrap();
        assert_eq!(unknown.status, AuditStatus::Error);

        assert!(parse_verdict("not json").is_err());
    }

    #[tokio::test]
    async fn test_audit_request_shape() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/openai/v1/chat/completions")
                .header("Authorization", "Bearer groq-key")
                .body_contains("\"model\":\"llama-3.3-70b-versatile\"")
                .body_contains("\"response_format\":{\"type\":\"json_object\"}")
                .body_contains("\"temperature\":0.0")
                .body_contains("Return JSON only.");
            then.status(200).json_body(completion(
                r#"{"status": "REJECTED", "reason": "Starbucks is a big chain"}"#,
            ));
        });

        let verdict = auditor(&server)
            .audit(&place("Starbucks", &["cafe"]), "No big chains")
            .await
            .unwrap();

        api_mock.assert();
        assert_eq!(verdict, Verdict::rejected("Starbucks is a big chain"));
    }

    #[tokio::test]
    async fn test_audit_http_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/openai/v1/chat/completions");
            then.status(429).body("rate limited");
        });

        let result = auditor(&server)
            .audit(&place("Bean There", &["cafe"]), "No chains")
            .await;

        assert!(matches!(result, Err(ScoutError::AuditError { .. })));
    }

    #[tokio::test]
    async fn test_audit_all_marks_failures_and_keeps_order() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST)
                .path("/openai/v1/chat/completions")
                .body_contains("Bean There");
            then.status(200)
                .json_body(completion(r#"{"status": "APPROVED", "reason": "Independent"}"#));
        });
        server.mock(|when, then| {
            when.method(POST)
                .path("/openai/v1/chat/completions")
                .body_contains("Broken Cup");
            then.status(500);
        });

        let leads = audit_all(
            &auditor(&server),
            vec![place("Bean There", &["cafe"]), place("Broken Cup", &["cafe"])],
            "No chains",
            4,
        )
        .await;

        assert_eq!(leads.len(), 2);
        assert_eq!(leads[0].name(), "Bean There");
        assert_eq!(leads[0].verdict.status, AuditStatus::Approved);
        assert_eq!(leads[1].name(), "Broken Cup");
        assert_eq!(leads[1].verdict, Verdict::error(AUDIT_FAILURE_REASON));
        assert_eq!(
            leads[0].social.url,
            "https://www.instagram.com/explore/tags/beanthere/"
        );
    }

    struct SlowAuditor {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl LeadAuditor for SlowAuditor {
        async fn audit(&self, place: &Place, _criteria: &str) -> Result<Verdict> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(Verdict::approved(place.name()))
        }
    }

    #[tokio::test]
    async fn test_audit_all_respects_concurrency_limit() {
        let slow = Arc::new(SlowAuditor {
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let places: Vec<Place> = (0..8).map(|i| place(&format!("Shop {}", i), &[])).collect();

        let leads = audit_all(&*slow, places, "any", 3).await;

        assert_eq!(leads.len(), 8);
        assert!(slow.peak.load(Ordering::SeqCst) <= 3);
        assert!(slow.peak.load(Ordering::SeqCst) >= 2);
        for (i, lead) in leads.iter().enumerate() {
            assert_eq!(lead.verdict.reason, format!("Shop {}", i));
        }
    }
}
