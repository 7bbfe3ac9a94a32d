use std::process::ExitCode;
use std::rc::Rc;
use std::time::Duration;

use engine::{
    BubbleDraw, FixedStepper, LoopConfig, MetricsAccumulator, Notice, PointerInput, RenderSink,
    Scene, SpriteDraw, TapClassifier,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::LocalSet;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, trace, warn};

use super::bootstrap::AppWiring;
use super::console::{help_lines, parse_console_line, ConsoleCommand};
use super::gameplay::{PartyScene, CAKE_ASSET, CAT_ASSET};
use super::planning::{HttpBackend, PlanOutcome, PlanSource};

/// Keeps plan-task randomness independent of the scene's stream.
const PLAN_TASK_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to build async runtime")]
    Runtime(#[source] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopReason {
    Quit,
    TimeLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConsoleFlow {
    Continue,
    Quit,
}

pub(crate) fn run(app: AppWiring) -> ExitCode {
    let runtime = match build_runtime() {
        Ok(runtime) => runtime,
        Err(err) => {
            error!(error = %err, "startup_failed");
            return ExitCode::FAILURE;
        }
    };

    let local = LocalSet::new();
    let reason = local.block_on(&runtime, drive(app));
    info!(reason = ?reason, "shutdown");
    ExitCode::SUCCESS
}

fn build_runtime() -> Result<tokio::runtime::Runtime, AppError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(AppError::Runtime)
}

async fn drive(app: AppWiring) -> StopReason {
    let AppWiring {
        config,
        loop_config,
        mut scene,
        plan_source,
        seed,
    } = app;
    let plan_source = Rc::new(plan_source);
    let mut task_rng = StdRng::seed_from_u64(seed ^ PLAN_TASK_SEED_SALT);
    let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel::<PlanOutcome>();
    let mut console_lines = BufReader::new(tokio::io::stdin()).lines();
    let mut console_open = true;

    let mut stepper = FixedStepper::new(&loop_config);
    let mut metrics = MetricsAccumulator::new(loop_config.metrics_log_interval);
    let mut clock = SceneClock::new(loop_config.target_tps);
    let mut taps = TapClassifier::new();
    let mut sink = TracingSink::default();
    let mut last_title: Option<String> = None;
    let mut ticker = time::interval(stepper.fixed_dt());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let deadline = config
        .run_seconds
        .map(|seconds| Instant::now() + Duration::from_secs(seconds));
    log_loop_config(&loop_config);

    signal_headless_readiness(&mut scene);
    let mut last_frame = Instant::now();

    loop {
        spawn_plan_requests(&mut scene, &plan_source, &outcome_tx, &mut task_rng);

        tokio::select! {
            _ = ticker.tick() => {
                let now = Instant::now();
                let frame_dt = now - last_frame;
                last_frame = now;

                let step = stepper.push_frame(frame_dt);
                for _ in 0..step.ticks_to_run {
                    scene.update(clock.advance());
                }
                metrics.record_frame(frame_dt);
                metrics.record_ticks(step.ticks_to_run);
                if !step.dropped_backlog.is_zero() {
                    metrics.record_dropped_backlog(step.dropped_backlog);
                }

                sink.begin_frame();
                scene.render(&mut sink);
                sink.end_frame();

                let next_title = scene.debug_title();
                if next_title != last_title {
                    if let Some(title) = next_title.as_deref() {
                        debug!(title, "scene_title");
                    }
                    last_title = next_title;
                }

                if let Some(snapshot) = metrics.maybe_snapshot(now.into_std()) {
                    info!(
                        fps = snapshot.fps,
                        tps = snapshot.tps,
                        frame_time_ms = snapshot.frame_time_ms,
                        dropped_backlog_ms = snapshot.dropped_backlog_ms,
                        scene_ms = scene.now_ms(),
                        "loop_metrics"
                    );
                }
            }
            Some(outcome) = outcome_rx.recv() => {
                info!(
                    origin = outcome.origin.as_str(),
                    actions = outcome.plan.len(),
                    "plan_outcome_received"
                );
                debug!(plan = %outcome.plan.to_wire_json(), "plan_outcome_body");
                scene.apply_plan_outcome(outcome);
            }
            line = console_lines.next_line(), if console_open => {
                match line {
                    Ok(Some(line)) => {
                        if apply_console_line(&mut scene, &mut taps, &line) == ConsoleFlow::Quit {
                            info!(reason = "console_quit", "shutdown_requested");
                            return StopReason::Quit;
                        }
                    }
                    Ok(None) => {
                        debug!("console_closed");
                        console_open = false;
                    }
                    Err(err) => {
                        warn!(error = %err, "console_read_failed");
                        console_open = false;
                    }
                }
            }
            _ = wait_for_deadline(deadline) => {
                info!(reason = "run_seconds_elapsed", "shutdown_requested");
                return StopReason::TimeLimit;
            }
        }
    }
}

fn log_loop_config(loop_config: &LoopConfig) {
    info!(
        target_tps = loop_config.target_tps,
        max_frame_delta_ms = loop_config.max_frame_delta.as_millis() as u64,
        max_ticks_per_frame = loop_config.max_ticks_per_frame,
        metrics_log_interval_ms = loop_config.metrics_log_interval.as_millis() as u64,
        "loop_config"
    );
}

/// Headless runs have no splash or sprite loading, so both signals fire at once.
fn signal_headless_readiness(scene: &mut PartyScene) {
    for key in [CAT_ASSET, CAKE_ASSET] {
        if let Err(err) = scene.mark_asset_loaded(key) {
            error!(error = %err, key, "asset_signal_rejected");
        }
    }
    scene.finish_intro();
}

async fn wait_for_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}

/// Starts one local task per queued request; results come back over `outcomes`.
fn spawn_plan_requests(
    scene: &mut PartyScene,
    source: &Rc<PlanSource<HttpBackend>>,
    outcomes: &mpsc::UnboundedSender<PlanOutcome>,
    rng: &mut StdRng,
) {
    for request in scene.drain_plan_requests() {
        let source = Rc::clone(source);
        let outcomes = outcomes.clone();
        let task_seed = rng.random::<u64>();
        debug!(
            x = request.position.x,
            y = request.position.y,
            "plan_request_started"
        );
        tokio::task::spawn_local(async move {
            let mut task_rng = StdRng::seed_from_u64(task_seed);
            let outcome = source.request_plan(&request, &mut task_rng).await;
            if outcomes.send(outcome).is_err() {
                debug!("plan_outcome_dropped_loop_closed");
            }
        });
    }
}

fn apply_console_line(scene: &mut PartyScene, taps: &mut TapClassifier, line: &str) -> ConsoleFlow {
    let command = match parse_console_line(line) {
        Ok(Some(command)) => command,
        Ok(None) => return ConsoleFlow::Continue,
        Err(err) => {
            warn!(error = %err, "console_command_rejected");
            return ConsoleFlow::Continue;
        }
    };
    debug!(%command, "console_command");

    match command {
        ConsoleCommand::Click { pos } => scene.on_pointer(PointerInput::Click { pos }),
        ConsoleCommand::DoubleClick { pos } => scene.on_pointer(PointerInput::DoubleClick { pos }),
        ConsoleCommand::Tap { pos } => {
            for input in taps.tap(scene.now_ms(), pos) {
                scene.on_pointer(input);
            }
        }
        ConsoleCommand::Resize { width, height } => scene.resize(width, height),
        ConsoleCommand::Plan => {
            if !scene.request_plan() {
                info!("plan_request_not_sent");
            }
        }
        ConsoleCommand::Status => info!(status = %scene.status(), "scene_status"),
        ConsoleCommand::Help => {
            for line in help_lines() {
                info!(command = %line, "console_help");
            }
        }
        ConsoleCommand::Quit => return ConsoleFlow::Quit,
    }
    ConsoleFlow::Continue
}

/// Spreads whole milliseconds over ticks so the scene clock tracks wall time
/// when 1000 is not a multiple of the tick rate.
#[derive(Debug)]
struct SceneClock {
    ticks_per_second: u64,
    ticks: u64,
    elapsed_ms: u64,
}

impl SceneClock {
    fn new(target_tps: u32) -> Self {
        Self {
            ticks_per_second: u64::from(target_tps.max(1)),
            ticks: 0,
            elapsed_ms: 0,
        }
    }

    fn advance(&mut self) -> u64 {
        self.ticks += 1;
        let total_ms = self.ticks * 1_000 / self.ticks_per_second;
        let dt_ms = total_ms - self.elapsed_ms;
        self.elapsed_ms = total_ms;
        dt_ms
    }
}

/// Headless render target: notices and bubble changes go to the log,
/// per-frame draws only at trace level.
#[derive(Debug, Default)]
struct TracingSink {
    shown_bubble: Option<String>,
    bubble_drawn: bool,
}

impl TracingSink {
    fn begin_frame(&mut self) {
        self.bubble_drawn = false;
    }

    fn end_frame(&mut self) {
        if !self.bubble_drawn && self.shown_bubble.take().is_some() {
            debug!("bubble_hidden");
        }
    }
}

impl RenderSink for TracingSink {
    fn draw_sprite(&mut self, sprite: &SpriteDraw) {
        trace!(
            asset = sprite.asset,
            row = sprite.row,
            frame = sprite.frame,
            x = sprite.center.x,
            y = sprite.center.y,
            "draw_sprite"
        );
    }

    fn draw_bubble(&mut self, bubble: &BubbleDraw) {
        self.bubble_drawn = true;
        if self.shown_bubble.as_deref() != Some(bubble.text.as_str()) {
            info!(
                text = %bubble.text,
                x = bubble.anchor.x,
                y = bubble.anchor.y,
                "bubble_shown"
            );
            self.shown_bubble = Some(bubble.text.clone());
        }
    }

    fn notify(&mut self, notice: &Notice) {
        info!(kind = notice.kind, detail = %notice.detail, "scene_notice");
    }
}
