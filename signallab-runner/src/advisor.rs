//! Advisory client — asks an OpenAI-compatible chat endpoint for strategy
//! suggestions based on a backtest summary.
//!
//! The client is configured explicitly through [`AdvisorConfig`]; nothing
//! here reads the environment. Failures never abort a run:
//! [`request_advice`] logs them and returns `None`.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

use crate::runner::BacktestResult;

const DEFAULT_MODEL: &str = "gpt-4";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const SYSTEM_PROMPT: &str = "You are an experienced quantitative developer.";

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// `[advisor]` section.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisorConfig {
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model_name: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl AdvisorConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model_name: default_model(),
            base_url: default_base_url(),
        }
    }

    pub fn with_model(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = model_name.into();
        self
    }
}

impl fmt::Debug for AdvisorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdvisorConfig")
            .field("api_key", &"<redacted>")
            .field("model_name", &self.model_name)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("advisor API key is empty")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("advisor returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed advisor response: {0}")]
    MalformedResponse(String),

    #[error("failed to serialize backtest summary: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// What the advisor is shown: the strategy, its parameters and the outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvisoryRequest {
    pub symbol: String,
    pub strategy: String,
    pub parameters: serde_json::Value,
    pub initial_cash: f64,
    pub final_cash: f64,
    /// Report entries; non-finite values become `null`.
    pub performance: serde_json::Map<String, serde_json::Value>,
    pub has_synthetic: bool,
}

impl AdvisoryRequest {
    pub fn from_result(result: &BacktestResult) -> Result<Self, AdvisorError> {
        let parameters = serde_json::to_value(&result.strategy).map_err(AdvisorError::Serialize)?;
        let performance = result
            .report
            .entries()
            .into_iter()
            .map(|(key, value)| (key.to_string(), json!(value)))
            .collect();

        Ok(Self {
            symbol: result.symbol.clone(),
            strategy: result.strategy_label(),
            parameters,
            initial_cash: result.initial_cash,
            final_cash: result.final_cash,
            performance,
            has_synthetic: result.has_synthetic,
        })
    }

    /// The user message sent to the model.
    pub fn prompt(&self) -> Result<String, AdvisorError> {
        let summary = serde_json::to_string_pretty(self).map_err(AdvisorError::Serialize)?;
        Ok(format!(
            "Below are the results of a long-only stock backtest.\n\
             {summary}\n\
             Based on these results, suggest better parameters for this strategy \
             and explain the expected effect of each change."
        ))
    }
}

/// Source of strategy suggestions.
pub trait Advisor: Send + Sync {
    fn name(&self) -> &str;

    fn suggest(&self, request: &AdvisoryRequest) -> Result<String, AdvisorError>;
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Chat-completions client for OpenAI-compatible APIs.
pub struct OpenAiAdvisor {
    client: reqwest::blocking::Client,
    config: AdvisorConfig,
}

impl OpenAiAdvisor {
    pub fn new(config: AdvisorConfig) -> Result<Self, AdvisorError> {
        if config.api_key.trim().is_empty() {
            return Err(AdvisorError::MissingApiKey);
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn body(&self, prompt: &str) -> serde_json::Value {
        json!({
            "model": self.config.model_name,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": prompt},
            ],
        })
    }
}

impl Advisor for OpenAiAdvisor {
    fn name(&self) -> &str {
        "openai"
    }

    fn suggest(&self, request: &AdvisoryRequest) -> Result<String, AdvisorError> {
        let prompt = request.prompt()?;
        debug!(model = %self.config.model_name, symbol = %request.symbol, "requesting advice");

        let resp = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&self.body(&prompt))
            .send()?;

        let status = resp.status();
        let text = resp.text()?;
        if !status.is_success() {
            return Err(AdvisorError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        parse_completion(&text)
    }
}

/// Extract the first choice's message content from a chat-completions body.
pub fn parse_completion(body: &str) -> Result<String, AdvisorError> {
    let completion: ChatCompletion = serde_json::from_str(body)
        .map_err(|e| AdvisorError::MalformedResponse(e.to_string()))?;
    completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| AdvisorError::MalformedResponse("no message content in choices".into()))
}

/// Ask `advisor` for a suggestion; failures are logged and yield `None`.
pub fn request_advice(advisor: &dyn Advisor, request: &AdvisoryRequest) -> Option<String> {
    match advisor.suggest(request) {
        Ok(text) => Some(text),
        Err(e) => {
            warn!(advisor = advisor.name(), error = %e, "advisory request failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::run_pipeline;
    use chrono::NaiveDate;
    use signallab_core::domain::PriceSeries;
    use signallab_core::strategy::MaCrossover;

    struct FixedAdvisor(Result<&'static str, ()>);

    impl Advisor for FixedAdvisor {
        fn name(&self) -> &str {
            "fixed"
        }

        fn suggest(&self, _request: &AdvisoryRequest) -> Result<String, AdvisorError> {
            self.0
                .map(str::to_string)
                .map_err(|_| AdvisorError::Status {
                    status: 500,
                    body: "boom".into(),
                })
        }
    }

    fn request() -> AdvisoryRequest {
        let closes = [100.0, 100.0, 100.0, 110.0, 120.0, 100.0, 80.0];
        let series =
            PriceSeries::from_closes("2267.T", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), &closes);
        let result = run_pipeline(&series, &MaCrossover::new(2, 3).into(), 1_000_000.0);
        AdvisoryRequest::from_result(&result).unwrap()
    }

    #[test]
    fn config_defaults() {
        let config: AdvisorConfig = toml::from_str("api_key = \"sk-x\"").unwrap();
        assert_eq!(config.model_name, "gpt-4");
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config, AdvisorConfig::new("sk-x"));
        assert_eq!(AdvisorConfig::new("k").with_model("gpt-4o").model_name, "gpt-4o");
    }

    #[test]
    fn debug_redacts_api_key() {
        let shown = format!("{:?}", AdvisorConfig::new("sk-secret"));
        assert!(!shown.contains("sk-secret"));
        assert!(shown.contains("gpt-4"));

        let mut config = crate::config::BacktestConfig::new(
            "SPY",
            signallab_core::strategy::MaCrossover::default(),
        );
        config.advisor = Some(AdvisorConfig::new("sk-secret"));
        assert!(!format!("{config:?}").contains("sk-secret"));
    }

    #[test]
    fn request_carries_parameters_and_report() {
        let req = request();
        assert_eq!(req.strategy, "ma_crossover(2,3)");
        assert_eq!(req.parameters["short_window"], 2);
        assert_eq!(req.performance.len(), 18);
        assert!(req.performance.contains_key("max_drawdown"));

        let prompt = req.prompt().unwrap();
        assert!(prompt.contains("2267.T"));
        assert!(prompt.contains("\"long_window\": 3"));
    }

    #[test]
    fn empty_key_is_rejected() {
        assert!(matches!(
            OpenAiAdvisor::new(AdvisorConfig::new("  ")),
            Err(AdvisorError::MissingApiKey)
        ));
    }

    #[test]
    fn endpoint_and_body() {
        let mut config = AdvisorConfig::new("sk-x").with_model("local-model");
        config.base_url = "http://localhost:8080/v1/".into();
        let advisor = OpenAiAdvisor::new(config).unwrap();
        assert_eq!(advisor.endpoint(), "http://localhost:8080/v1/chat/completions");

        let body = advisor.body("hi");
        assert_eq!(body["model"], "local-model");
        assert_eq!(body["messages"][1]["content"], "hi");
        assert_eq!(body["messages"][0]["role"], "system");
    }

    #[test]
    fn parses_completion_content() {
        let body = r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"Try 10/50."}}]}"#;
        assert_eq!(parse_completion(body).unwrap(), "Try 10/50.");
    }

    #[test]
    fn malformed_completion_is_an_error() {
        assert!(matches!(
            parse_completion(r#"{"choices":[]}"#),
            Err(AdvisorError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_completion("not json"),
            Err(AdvisorError::MalformedResponse(_))
        ));
    }

    #[test]
    fn request_advice_swallows_errors() {
        let req = request();
        assert_eq!(
            request_advice(&FixedAdvisor(Ok("raise the long window")), &req),
            Some("raise the long window".to_string())
        );
        assert_eq!(request_advice(&FixedAdvisor(Err(())), &req), None);
    }
}
