use engine::{Rect, Vec2};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

pub(crate) const MIN_IDLE_DURATION_MS: u64 = 3_000;
pub(crate) const MAX_IDLE_DURATION_MS: u64 = 7_000;
/// Longest idle a remote plan may ask for.
const IDLE_DURATION_CEILING_MS: u64 = 60_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) enum IdleKind {
    LickPaw,
    SitDown,
}

impl IdleKind {
    pub(crate) fn from_wire(name: &str) -> Option<Self> {
        match name {
            "lickPaw" => Some(IdleKind::LickPaw),
            "sitDown" => Some(IdleKind::SitDown),
            _ => None,
        }
    }

    pub(crate) fn wire_name(self) -> &'static str {
        match self {
            IdleKind::LickPaw => "lickPaw",
            IdleKind::SitDown => "sitDown",
        }
    }
}

/// One step of a plan. Serializes to the `{"action", "details"}` wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "details", rename_all = "lowercase")]
pub(crate) enum Action {
    Walk {
        path: Vec<Vec2>,
    },
    Idle {
        #[serde(rename = "type")]
        kind: IdleKind,
        #[serde(rename = "duration")]
        duration_ms: u64,
    },
}

impl Action {
    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            Action::Walk { .. } => "walk",
            Action::Idle { .. } => "idle",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct Plan {
    #[serde(rename = "plan")]
    pub(crate) actions: Vec<Action>,
}

impl Plan {
    pub(crate) fn new(actions: Vec<Action>) -> Self {
        Self { actions }
    }

    pub(crate) fn len(&self) -> usize {
        self.actions.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub(crate) fn to_wire_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Why a plan is being asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlanContext {
    NewPlan,
}

impl PlanContext {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            PlanContext::NewPlan => "get_new_plan",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PlanRequest {
    pub(crate) context: PlanContext,
    pub(crate) position: Vec2,
    pub(crate) bounds: Rect,
    pub(crate) obstacle: Rect,
}

impl PlanRequest {
    pub(crate) fn new_plan(position: Vec2, bounds: Rect, obstacle: Rect) -> Self {
        Self {
            context: PlanContext::NewPlan,
            position,
            bounds,
            obstacle,
        }
    }

    /// Walk targets must sit strictly below this line.
    pub(crate) fn floor_line_y(&self) -> f32 {
        self.obstacle.bottom() + super::FLOOR_MARGIN_PX
    }
}

#[derive(Debug, Error)]
pub(crate) enum ActionRejected {
    #[error("action does not match the wire shape at {path}: {source}")]
    Shape {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("unknown action '{name}'")]
    UnknownAction { name: String },
    #[error("walk action has no waypoints")]
    EmptyPath,
    #[error("walk waypoint {index} is not finite")]
    NonFiniteWaypoint { index: usize },
    #[error("idle action needs a finite positive duration")]
    BadDuration,
}

#[derive(Debug, Deserialize)]
struct RawAction {
    action: String,
    #[serde(default)]
    details: RawDetails,
}

#[derive(Debug, Default, Deserialize)]
struct RawDetails {
    #[serde(default)]
    path: Option<Vec<RawPoint>>,
    #[serde(default, rename = "type")]
    kind: Option<Value>,
    #[serde(default)]
    duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawPoint {
    x: f64,
    y: f64,
}

/// Validates one raw wire action against the scene bounds.
pub(crate) fn normalize_action(raw: Value, bounds: Rect) -> Result<Action, ActionRejected> {
    let raw: RawAction = serde_path_to_error::deserialize(raw).map_err(|error| {
        ActionRejected::Shape {
            path: error.path().to_string(),
            source: error.into_inner(),
        }
    })?;

    match raw.action.as_str() {
        "walk" => {
            let points = raw.details.path.unwrap_or_default();
            if points.is_empty() {
                return Err(ActionRejected::EmptyPath);
            }
            let mut path = Vec::with_capacity(points.len());
            for (index, point) in points.into_iter().enumerate() {
                let waypoint = Vec2::new(point.x as f32, point.y as f32);
                if !waypoint.is_finite() {
                    return Err(ActionRejected::NonFiniteWaypoint { index });
                }
                path.push(bounds.clamp_point(waypoint));
            }
            Ok(Action::Walk { path })
        }
        "idle" => {
            let duration = raw.details.duration.ok_or(ActionRejected::BadDuration)?;
            if !duration.is_finite() || duration <= 0.0 {
                return Err(ActionRejected::BadDuration);
            }
            let kind = raw
                .details
                .kind
                .as_ref()
                .and_then(Value::as_str)
                .and_then(IdleKind::from_wire)
                .unwrap_or(IdleKind::LickPaw);
            let duration_ms = duration.round().max(1.0) as u64;
            if duration_ms > IDLE_DURATION_CEILING_MS {
                warn!(duration_ms, ceiling_ms = IDLE_DURATION_CEILING_MS, "idle_duration_clamped");
            }
            Ok(Action::Idle {
                kind,
                duration_ms: duration_ms.min(IDLE_DURATION_CEILING_MS),
            })
        }
        other => Err(ActionRejected::UnknownAction {
            name: other.to_string(),
        }),
    }
}

/// Keeps every action that survives validation, in order.
pub(crate) fn normalize_plan(raw_actions: Vec<Value>, bounds: Rect) -> Plan {
    let mut actions = Vec::with_capacity(raw_actions.len());
    for (index, raw) in raw_actions.into_iter().enumerate() {
        match normalize_action(raw, bounds) {
            Ok(action) => actions.push(action),
            Err(error) => warn!(index, error = %error, "plan_action_dropped"),
        }
    }
    Plan::new(actions)
}
