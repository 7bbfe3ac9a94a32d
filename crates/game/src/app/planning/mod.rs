mod extract;
mod mock;
mod plan;
mod prompt;
mod remote;
mod source;

/// Autonomous walks stay this far below the cake's bottom edge.
pub(crate) const FLOOR_MARGIN_PX: f32 = 50.0;

pub(crate) use mock::random_idle_kind;
pub(crate) use plan::{Action, IdleKind, Plan, PlanRequest};
pub(crate) use remote::{HttpBackend, RemoteConfig};
pub(crate) use source::{PlanOutcome, PlanSource};

#[cfg(test)]
pub(crate) use remote::{DEFAULT_PLAN_ENDPOINT, DEFAULT_PLAN_MODEL};
#[cfg(test)]
pub(crate) use source::PlanOrigin;
