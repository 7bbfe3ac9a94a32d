use rand::Rng;
use tracing::{debug, info, warn};

use super::mock::mock_plan;
use super::plan::{Plan, PlanRequest};
use super::prompt::build_prompt;
use super::remote::{
    completion_body, parse_plan_reply, reply_content, HttpBackend, PlanSourceError, RemoteBackend,
    RemoteConfig,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlanSourceMode {
    Remote,
    Mock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlanOrigin {
    Remote,
    Mock,
    Fallback,
}

impl PlanOrigin {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            PlanOrigin::Remote => "remote",
            PlanOrigin::Mock => "mock",
            PlanOrigin::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlanOutcome {
    pub(crate) plan: Plan,
    pub(crate) origin: PlanOrigin,
}

/// Produces plans from the remote model, degrading to the local mock on any failure.
#[derive(Debug)]
pub(crate) struct PlanSource<B> {
    config: RemoteConfig,
    backend: Option<B>,
}

impl PlanSource<HttpBackend> {
    /// Picks the mode from configuration. No key, or an explicit mock flag,
    /// means mock mode.
    pub(crate) fn from_config(config: RemoteConfig, use_mock_ai: bool) -> Self {
        if use_mock_ai {
            info!("plan_source_mock_forced");
            return Self::mock(config);
        }
        let Some(api_key) = config.api_key.clone() else {
            info!("plan_source_mock_no_api_key");
            return Self::mock(config);
        };
        match HttpBackend::new(&config, &api_key) {
            Ok(backend) => {
                info!(endpoint = %config.endpoint, model = %config.model, "plan_source_remote");
                Self::with_backend(config, backend)
            }
            Err(error) => {
                warn!(error = %error, "plan_source_mock_client_failed");
                Self::mock(config)
            }
        }
    }
}

impl<B: RemoteBackend> PlanSource<B> {
    pub(crate) fn with_backend(config: RemoteConfig, backend: B) -> Self {
        Self {
            config,
            backend: Some(backend),
        }
    }

    pub(crate) fn mock(config: RemoteConfig) -> Self {
        Self {
            config,
            backend: None,
        }
    }

    pub(crate) fn mode(&self) -> PlanSourceMode {
        if self.backend.is_some() {
            PlanSourceMode::Remote
        } else {
            PlanSourceMode::Mock
        }
    }

    /// Never fails; every remote problem becomes a mock plan.
    pub(crate) async fn request_plan(
        &self,
        request: &PlanRequest,
        rng: &mut impl Rng,
    ) -> PlanOutcome {
        let Some(backend) = self.backend.as_ref() else {
            let plan = mock_plan(request, rng);
            debug!(actions = plan.len(), "mock_plan_generated");
            return PlanOutcome {
                plan,
                origin: PlanOrigin::Mock,
            };
        };

        match self.request_remote(backend, request).await {
            Ok(plan) => {
                info!(
                    context = request.context.as_str(),
                    actions = plan.len(),
                    "remote_plan_received"
                );
                PlanOutcome {
                    plan,
                    origin: PlanOrigin::Remote,
                }
            }
            Err(error) => {
                warn!(error = %error, "remote_plan_failed_using_mock");
                PlanOutcome {
                    plan: mock_plan(request, rng),
                    origin: PlanOrigin::Fallback,
                }
            }
        }
    }

    async fn request_remote(&self, backend: &B, request: &PlanRequest) -> Result<Plan, PlanSourceError> {
        let prompt = build_prompt(request);
        let reply = backend.complete(completion_body(&self.config, &prompt)).await?;
        let content = reply_content(&reply)?;
        parse_plan_reply(content, request.bounds)
    }
}
