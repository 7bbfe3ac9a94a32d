use std::num::ParseIntError;
use std::str::FromStr;

use thiserror::Error;
use tracing::warn;

use super::planning::RemoteConfig;

const SCENE_SIZE_ENV_VAR: &str = "PARTY_SCENE_SIZE";
const TARGET_TPS_ENV_VAR: &str = "PARTY_TARGET_TPS";
const PLAN_ENDPOINT_ENV_VAR: &str = "PARTY_PLAN_ENDPOINT";
const PLAN_MODEL_ENV_VAR: &str = "PARTY_PLAN_MODEL";
const API_KEY_ENV_VAR: &str = "PARTY_API_KEY";
const USE_MOCK_AI_ENV_VAR: &str = "PARTY_USE_MOCK_AI";
const SEED_ENV_VAR: &str = "PARTY_SEED";
const RUN_SECONDS_ENV_VAR: &str = "PARTY_RUN_SECONDS";

const DEFAULT_SCENE_WIDTH: f32 = 800.0;
const DEFAULT_SCENE_HEIGHT: f32 = 600.0;
const DEFAULT_TARGET_TPS: u32 = 60;
const MAX_TARGET_TPS: u32 = 1_000;
const MAX_SCENE_EDGE_PX: f32 = 16_384.0;

#[derive(Debug, Error, PartialEq)]
pub(crate) enum ConfigError {
    #[error("{var}: expected <width>x<height>, got '{value}'")]
    SceneSize { var: &'static str, value: String },
    #[error("{var}: '{value}' is not a number")]
    Number {
        var: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },
    #[error("{var}: {value} is out of range")]
    OutOfRange { var: &'static str, value: String },
    #[error("{var}: expected a flag (1/0/true/false), got '{value}'")]
    Flag { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PartyConfig {
    pub(crate) scene_width: f32,
    pub(crate) scene_height: f32,
    pub(crate) target_tps: u32,
    pub(crate) remote: RemoteConfig,
    pub(crate) use_mock_ai: bool,
    /// Fixed seed for reproducible runs; `None` seeds from the OS.
    pub(crate) seed: Option<u64>,
    /// Headless runs stop after this long; `None` runs until `quit`.
    pub(crate) run_seconds: Option<u64>,
}

impl Default for PartyConfig {
    fn default() -> Self {
        Self {
            scene_width: DEFAULT_SCENE_WIDTH,
            scene_height: DEFAULT_SCENE_HEIGHT,
            target_tps: DEFAULT_TARGET_TPS,
            remote: RemoteConfig::default(),
            use_mock_ai: false,
            seed: None,
            run_seconds: None,
        }
    }
}

impl PartyConfig {
    pub(crate) fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Invalid values are logged and replaced by their defaults.
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some((width, height)) = read_or_warn(&lookup, SCENE_SIZE_ENV_VAR, parse_scene_size) {
            config.scene_width = width;
            config.scene_height = height;
        }
        if let Some(tps) = read_or_warn(&lookup, TARGET_TPS_ENV_VAR, parse_target_tps) {
            config.target_tps = tps;
        }
        if let Some(endpoint) = non_empty(&lookup, PLAN_ENDPOINT_ENV_VAR) {
            config.remote.endpoint = endpoint;
        }
        if let Some(model) = non_empty(&lookup, PLAN_MODEL_ENV_VAR) {
            config.remote.model = model;
        }
        config.remote.api_key = non_empty(&lookup, API_KEY_ENV_VAR);
        if let Some(flag) = read_or_warn(&lookup, USE_MOCK_AI_ENV_VAR, parse_flag) {
            config.use_mock_ai = flag;
        }
        config.seed = read_or_warn(&lookup, SEED_ENV_VAR, parse_number::<u64>);
        config.run_seconds = read_or_warn(&lookup, RUN_SECONDS_ENV_VAR, parse_number::<u64>);
        config
    }
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, var: &str) -> Option<String> {
    lookup(var)
        .map(|raw| raw.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn read_or_warn<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    parse: impl Fn(&'static str, &str) -> Result<T, ConfigError>,
) -> Option<T> {
    let raw = non_empty(lookup, var)?;
    match parse(var, &raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(error = %err, "config_value_ignored_using_default");
            None
        }
    }
}

fn parse_number<T: FromStr<Err = ParseIntError>>(
    var: &'static str,
    raw: &str,
) -> Result<T, ConfigError> {
    raw.parse::<T>().map_err(|source| ConfigError::Number {
        var,
        value: raw.to_string(),
        source,
    })
}

fn parse_target_tps(var: &'static str, raw: &str) -> Result<u32, ConfigError> {
    let tps = parse_number::<u32>(var, raw)?;
    if tps == 0 || tps > MAX_TARGET_TPS {
        return Err(ConfigError::OutOfRange {
            var,
            value: raw.to_string(),
        });
    }
    Ok(tps)
}

fn parse_scene_size(var: &'static str, raw: &str) -> Result<(f32, f32), ConfigError> {
    let malformed = || ConfigError::SceneSize {
        var,
        value: raw.to_string(),
    };
    let (width, height) = raw.split_once(['x', 'X']).ok_or_else(malformed)?;
    let width = width.trim().parse::<f32>().map_err(|_| malformed())?;
    let height = height.trim().parse::<f32>().map_err(|_| malformed())?;
    let in_range = |edge: f32| edge.is_finite() && edge > 0.0 && edge <= MAX_SCENE_EDGE_PX;
    if !in_range(width) || !in_range(height) {
        return Err(ConfigError::OutOfRange {
            var,
            value: raw.to_string(),
        });
    }
    Ok((width, height))
}

fn parse_flag(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Flag {
            var,
            value: raw.to_string(),
        }),
    }
}
