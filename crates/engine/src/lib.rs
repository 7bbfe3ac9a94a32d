pub mod app;
pub mod assets;
pub mod geometry;
pub mod nav;

pub use app::{
    clamp_frame_delta, normalize_non_zero_duration, plan_sim_steps, BubbleDraw, FixedStepper,
    FrameAnimator, LoopConfig, LoopMetricsSnapshot, MetricsAccumulator, Notice, Playback,
    PointerInput, RecordingSink, RenderSink, Scene, SpriteDraw, StepPlan, TapClassifier,
    TimerQueue, DOUBLE_TAP_WINDOW_MS,
};
pub use assets::{validate_asset_key, AssetKeyError, AssetRegistry, AssetStatus};
pub use geometry::{segments_intersect, Rect, Vec2};
pub use nav::{
    simple_detour_path, CellCoord, GridCell, NavGrid, NavGridError, PathPlanner,
    DEFAULT_CELL_SIZE_PX, DETOUR_MARGIN_PX,
};
