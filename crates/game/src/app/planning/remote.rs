use std::time::Duration;

use engine::Rect;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use super::extract::extract_first_json_object;
use super::plan::{normalize_plan, Plan};

pub(crate) const DEFAULT_PLAN_ENDPOINT: &str =
    "https://dashscope.aliyuncs.com/api/v1/services/aigc/text-generation/generation";
pub(crate) const DEFAULT_PLAN_MODEL: &str = "qwen-plus";
const REPLY_CONTENT_POINTER: &str = "/output/choices/0/message/content";

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RemoteConfig {
    pub(crate) endpoint: String,
    pub(crate) model: String,
    pub(crate) api_key: Option<String>,
    pub(crate) temperature: f32,
    pub(crate) max_tokens: u32,
    pub(crate) timeout: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_PLAN_ENDPOINT.to_string(),
            model: DEFAULT_PLAN_MODEL.to_string(),
            api_key: None,
            temperature: 0.8,
            max_tokens: 1000,
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum PlanSourceError {
    #[error("failed to build http client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    #[error("plan request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("plan endpoint answered with status {status}")]
    Status { status: u16 },
    #[error("reply has no output.choices[0].message.content")]
    MissingContent,
    #[error("reply content holds no JSON object")]
    NoJsonObject,
    #[error("plan JSON is malformed at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("none of the {received} received actions were usable")]
    EmptyPlan { received: usize },
}

/// Sends a completion request body and returns the decoded JSON reply.
pub(crate) trait RemoteBackend {
    async fn complete(&self, body: Value) -> Result<Value, PlanSourceError>;
}

#[derive(Debug, Clone)]
pub(crate) struct HttpBackend {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpBackend {
    pub(crate) fn new(config: &RemoteConfig, api_key: &str) -> Result<Self, PlanSourceError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(PlanSourceError::ClientBuild)?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: api_key.to_string(),
        })
    }
}

impl RemoteBackend for HttpBackend {
    async fn complete(&self, body: Value) -> Result<Value, PlanSourceError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlanSourceError::Status {
                status: status.as_u16(),
            });
        }

        Ok(response.json::<Value>().await?)
    }
}

pub(crate) fn completion_body(config: &RemoteConfig, prompt: &str) -> Value {
    json!({
        "model": config.model,
        "input": {
            "messages": [{
                "role": "user",
                "content": prompt,
            }]
        },
        "parameters": {
            "temperature": config.temperature,
            "max_tokens": config.max_tokens,
        }
    })
}

pub(crate) fn reply_content(reply: &Value) -> Result<&str, PlanSourceError> {
    reply
        .pointer(REPLY_CONTENT_POINTER)
        .and_then(Value::as_str)
        .filter(|content| !content.is_empty())
        .ok_or(PlanSourceError::MissingContent)
}

#[derive(Debug, Deserialize)]
struct RawPlanDocument {
    plan: Vec<Value>,
}

/// Pulls a plan out of model text: first object, strict document shape,
/// then per-action validation.
pub(crate) fn parse_plan_reply(content: &str, bounds: Rect) -> Result<Plan, PlanSourceError> {
    let object = extract_first_json_object(content).ok_or(PlanSourceError::NoJsonObject)?;
    let mut deserializer = serde_json::Deserializer::from_str(object);
    let document: RawPlanDocument =
        serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
            PlanSourceError::Parse {
                path: error.path().to_string(),
                source: error.into_inner(),
            }
        })?;

    let received = document.plan.len();
    let plan = normalize_plan(document.plan, bounds);
    if plan.is_empty() {
        return Err(PlanSourceError::EmptyPlan { received });
    }
    Ok(plan)
}
