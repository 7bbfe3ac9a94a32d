mod animation;
mod input;
mod metrics;
mod scene;
mod stepping;
mod timers;

pub use animation::{FrameAnimator, Playback};
pub use input::{PointerInput, TapClassifier, DOUBLE_TAP_WINDOW_MS};
pub use metrics::{LoopMetricsSnapshot, MetricsAccumulator};
pub use scene::{BubbleDraw, Notice, RecordingSink, RenderSink, Scene, SpriteDraw};
pub use stepping::{
    clamp_frame_delta, normalize_non_zero_duration, plan_sim_steps, FixedStepper, LoopConfig,
    StepPlan,
};
pub use timers::TimerQueue;
