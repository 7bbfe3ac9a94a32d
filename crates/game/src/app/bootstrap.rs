use engine::LoopConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::config::PartyConfig;
use super::gameplay::PartyScene;
use super::planning::{HttpBackend, PlanSource};

pub(crate) struct AppWiring {
    pub(crate) config: PartyConfig,
    pub(crate) loop_config: LoopConfig,
    pub(crate) scene: PartyScene,
    pub(crate) plan_source: PlanSource<HttpBackend>,
    pub(crate) seed: u64,
}

pub(crate) fn build_app() -> AppWiring {
    init_tracing();
    info!("=== Party Cat Startup ===");

    let config = PartyConfig::from_env();
    let seed = config.seed.unwrap_or_else(rand::random::<u64>);
    let loop_config = LoopConfig {
        target_tps: config.target_tps,
        ..LoopConfig::default()
    };
    let scene = PartyScene::new(config.scene_width, config.scene_height, seed);
    let plan_source = PlanSource::from_config(config.remote.clone(), config.use_mock_ai);
    info!(
        width = config.scene_width,
        height = config.scene_height,
        target_tps = config.target_tps,
        seed,
        plan_source = ?plan_source.mode(),
        run_seconds = ?config.run_seconds,
        "config_loaded"
    );

    AppWiring {
        config,
        loop_config,
        scene,
        plan_source,
        seed,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
