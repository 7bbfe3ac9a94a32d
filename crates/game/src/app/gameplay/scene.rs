use std::fmt;
use std::ops::Range;

use engine::{
    AssetKeyError, AssetRegistry, AssetStatus, FrameAnimator, Notice, PathPlanner, Playback,
    PointerInput, Rect, RenderSink, Scene, SpriteDraw, TimerQueue, Vec2, DEFAULT_CELL_SIZE_PX,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, error, info};

use super::character::{Character, CharacterEvent, CharacterMode};
use super::dialogue::Dialogue;
use super::executor::{ActionExecutor, Dequeued, EnqueueOutcome};
use super::interaction::{
    birthday_message, cat_message, classify_click, classify_double_click, ClickReaction,
    DoubleClickReaction, CANT_GET_THERE_TEXT, CAT_HITBOX_HEIGHT_PX, CAT_HITBOX_WIDTH_PX,
    CLICK_RESOLVE_DELAY_MS, COMING_MS, COMING_TEXT, GREETING_MS, GREETING_TEXT, HINT_MS,
    NOT_ON_CAKE_TEXT, ONLY_BELOW_CAKE_TEXT, WISH_MS,
};
use crate::app::planning::{Action, PlanOutcome, PlanRequest};

pub(crate) const CAT_ASSET: &str = "cat";
pub(crate) const CAKE_ASSET: &str = "cake";
pub(crate) const REQUIRED_ASSETS: [&str; 2] = [CAT_ASSET, CAKE_ASSET];
pub(crate) const CAKE_SIZE_PX: f32 = 250.0;
const CAKE_FRAME_COUNT: u32 = 2;
const CAKE_TICKS_PER_FRAME: u32 = 30;
const CAT_START_X_FRACTION: f32 = 0.2;
const CAT_START_Y_FRACTION: f32 = 0.8;
const AFTER_WALK_DELAY_MS: Range<u64> = 1_500..3_500;
const AFTER_IDLE_DELAY_MS: Range<u64> = 500..1_500;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum PartyTimer {
    IdleComplete { epoch: u64 },
    NextAction { epoch: u64 },
    RefillPlan { epoch: u64 },
    ResolveClick { pos: Vec2 },
}

impl PartyTimer {
    fn is_autonomous(&self) -> bool {
        !matches!(self, PartyTimer::ResolveClick { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SceneStatus {
    pub(crate) started: bool,
    pub(crate) position: Vec2,
    pub(crate) mode: CharacterMode,
    pub(crate) queued: usize,
    pub(crate) user_in_control: bool,
    pub(crate) epoch: u64,
    pub(crate) plan_in_flight: bool,
    pub(crate) pending_timers: usize,
    pub(crate) bubble: Option<String>,
    pub(crate) now_ms: u64,
}

impl fmt::Display for SceneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "started={} t={}ms cat=({:.1},{:.1}) mode={:?} queued={} user_control={} epoch={} plan_in_flight={} timers={}",
            self.started,
            self.now_ms,
            self.position.x,
            self.position.y,
            self.mode,
            self.queued,
            self.user_in_control,
            self.epoch,
            self.plan_in_flight,
            self.pending_timers,
        )?;
        if let Some(bubble) = &self.bubble {
            write!(f, " bubble={bubble:?}")?;
        }
        Ok(())
    }
}

/// The birthday scene: cat, cake, bubbles and the autonomy loop.
pub(crate) struct PartyScene {
    bounds: Rect,
    cake: Rect,
    planner: PathPlanner,
    character: Character,
    executor: ActionExecutor,
    dialogue: Dialogue,
    timers: TimerQueue<PartyTimer>,
    assets: AssetRegistry,
    cake_animator: FrameAnimator,
    intro_finished: bool,
    started: bool,
    plan_in_flight: bool,
    user_walk_active: bool,
    plan_requests: Vec<PlanRequest>,
    notices: Vec<Notice>,
    rng: StdRng,
}

impl PartyScene {
    pub(crate) fn new(width: f32, height: f32, seed: u64) -> Self {
        let bounds = Rect::from_size(width, height);
        Self {
            bounds,
            cake: cake_rect(bounds),
            planner: PathPlanner::new(),
            character: Character::new(cat_start(bounds)),
            executor: ActionExecutor::default(),
            dialogue: Dialogue::default(),
            timers: TimerQueue::new(),
            assets: AssetRegistry::new(),
            cake_animator: FrameAnimator::new(CAKE_FRAME_COUNT, CAKE_TICKS_PER_FRAME, Playback::Loop),
            intro_finished: false,
            started: false,
            plan_in_flight: false,
            user_walk_active: false,
            plan_requests: Vec::new(),
            notices: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    #[cfg(test)]
    pub(crate) fn is_started(&self) -> bool {
        self.started
    }

    #[cfg(test)]
    pub(crate) fn cake(&self) -> Rect {
        self.cake
    }

    #[cfg(test)]
    pub(crate) fn bounds(&self) -> Rect {
        self.bounds
    }

    #[cfg(test)]
    pub(crate) fn character(&self) -> &Character {
        &self.character
    }

    #[cfg(test)]
    pub(crate) fn executor(&self) -> &ActionExecutor {
        &self.executor
    }

    #[cfg(test)]
    pub(crate) fn bubble_text(&self) -> Option<&str> {
        self.dialogue.text()
    }

    pub(crate) fn now_ms(&self) -> u64 {
        self.timers.now_ms()
    }

    #[cfg(test)]
    pub(crate) fn pending_timers(&self) -> impl Iterator<Item = &PartyTimer> {
        self.timers.iter_pending()
    }

    pub(crate) fn finish_intro(&mut self) {
        self.intro_finished = true;
        self.try_start();
    }

    pub(crate) fn mark_asset_loaded(&mut self, key: &str) -> Result<(), AssetKeyError> {
        self.assets.mark_loaded(key)?;
        self.try_start();
        Ok(())
    }

    fn try_start(&mut self) {
        if self.started || !self.intro_finished || !self.assets.all_loaded(&REQUIRED_ASSETS) {
            return;
        }
        self.started = true;
        self.character = Character::new(cat_start(self.bounds));
        self.cake = cake_rect(self.bounds);
        self.rebuild_nav();
        self.dialogue
            .show(GREETING_TEXT, GREETING_MS, self.character.position(), false);
        info!(
            width = self.bounds.width,
            height = self.bounds.height,
            "scene_started"
        );
        self.notices.push(Notice::new("scene_started", ""));
        self.request_plan();
    }

    fn rebuild_nav(&mut self) {
        match self.planner.rebuild(
            self.bounds.width,
            self.bounds.height,
            self.cake,
            DEFAULT_CELL_SIZE_PX,
        ) {
            Ok(_) => {}
            Err(err) => {
                error!(error = %err, "nav_grid_rebuild_failed");
                self.planner.clear();
            }
        }
    }

    /// Queues an outbound plan request unless one is already out.
    pub(crate) fn request_plan(&mut self) -> bool {
        if !self.started {
            return false;
        }
        if self.plan_in_flight {
            debug!("plan_request_skipped_in_flight");
            return false;
        }
        self.plan_in_flight = true;
        self.plan_requests.push(PlanRequest::new_plan(
            self.character.position(),
            self.bounds,
            self.cake,
        ));
        true
    }

    pub(crate) fn drain_plan_requests(&mut self) -> Vec<PlanRequest> {
        std::mem::take(&mut self.plan_requests)
    }

    pub(crate) fn apply_plan_outcome(&mut self, outcome: PlanOutcome) {
        self.plan_in_flight = false;
        let origin = outcome.origin.as_str();
        match self.executor.enqueue_plan(outcome.plan) {
            EnqueueOutcome::Replaced { queued, .. } => {
                self.timers.cancel_where(PartyTimer::is_autonomous);
                self.notices
                    .push(Notice::new("plan_applied", format!("{origin}:{queued}")));
                self.dispatch_next();
            }
            EnqueueOutcome::DiscardedUserControl => {
                self.notices.push(Notice::new("plan_discarded", origin));
            }
        }
    }

    fn dispatch_next(&mut self) {
        let epoch = self.executor.epoch();
        match self.executor.dequeue_next(&mut self.rng) {
            Dequeued::Action(Action::Walk { path }) => {
                debug!(epoch, waypoints = path.len(), "walk_dispatched");
                if !self.character.set_path(path) {
                    self.timers.schedule_in(0, PartyTimer::NextAction { epoch });
                }
            }
            Dequeued::Action(Action::Idle { kind, duration_ms }) => {
                debug!(epoch, kind = kind.wire_name(), duration_ms, "idle_dispatched");
                self.character.set_idle(kind);
                self.timers
                    .schedule_in(duration_ms, PartyTimer::IdleComplete { epoch });
            }
            Dequeued::Refill { delay_ms } => {
                self.timers
                    .schedule_in(delay_ms, PartyTimer::RefillPlan { epoch });
            }
            Dequeued::Suppressed => {}
        }
    }

    fn handle_timer(&mut self, timer: PartyTimer) {
        let epoch = match timer {
            PartyTimer::ResolveClick { pos } => {
                self.resolve_click(pos);
                return;
            }
            PartyTimer::IdleComplete { epoch }
            | PartyTimer::NextAction { epoch }
            | PartyTimer::RefillPlan { epoch } => epoch,
        };
        if !self.executor.accepts(epoch) {
            debug!(
                ?timer,
                current_epoch = self.executor.epoch(),
                user_in_control = self.executor.user_in_control(),
                "stale_timer_dropped"
            );
            return;
        }

        match timer {
            PartyTimer::IdleComplete { .. } => {
                let delay_ms = self.rng.random_range(AFTER_IDLE_DELAY_MS);
                self.timers
                    .schedule_in(delay_ms, PartyTimer::NextAction { epoch });
            }
            PartyTimer::NextAction { .. } => self.dispatch_next(),
            PartyTimer::RefillPlan { .. } => {
                self.request_plan();
            }
            PartyTimer::ResolveClick { .. } => {}
        }
    }

    fn handle_character_event(&mut self, event: CharacterEvent) {
        match event {
            CharacterEvent::WalkCompleted if self.user_walk_active => {
                self.user_walk_active = false;
                self.executor.finish_user_command();
                self.notices.push(Notice::new("user_walk_completed", ""));
            }
            CharacterEvent::WalkCompleted => {
                self.notices.push(Notice::new("walk_completed", ""));
                let epoch = self.executor.epoch();
                if self.executor.accepts(epoch) {
                    let delay_ms = self.rng.random_range(AFTER_WALK_DELAY_MS);
                    self.timers
                        .schedule_in(delay_ms, PartyTimer::NextAction { epoch });
                }
            }
        }
    }

    fn resolve_click(&mut self, pos: Vec2) {
        let cat = self.character.position();
        match classify_click(pos, self.cake, cat) {
            ClickReaction::BirthdayWish => {
                let text = birthday_message(&mut self.rng);
                self.dialogue.show(text, WISH_MS, cat, true);
            }
            ClickReaction::CatChat => {
                let text = cat_message(&mut self.rng);
                self.dialogue.show(text, WISH_MS, cat, true);
            }
            ClickReaction::OnlyBelowCake => {
                self.dialogue.show(ONLY_BELOW_CAKE_TEXT, HINT_MS, cat, true);
            }
            ClickReaction::Nothing => {}
        }
    }

    fn handle_double_click(&mut self, pos: Vec2) {
        self.timers
            .cancel_where(|timer| matches!(timer, PartyTimer::ResolveClick { .. }));
        let cat = self.character.position();
        match classify_double_click(pos, self.cake) {
            DoubleClickReaction::OnCake => {
                self.dialogue.show(NOT_ON_CAKE_TEXT, HINT_MS, cat, true);
            }
            DoubleClickReaction::OnlyBelowCake => {
                self.dialogue.show(ONLY_BELOW_CAKE_TEXT, HINT_MS, cat, true);
            }
            DoubleClickReaction::Navigate => {
                self.dialogue.show(COMING_TEXT, COMING_MS, cat, true);
                self.executor.interrupt();
                let path = self
                    .planner
                    .find_path(cat, pos)
                    .filter(|path| !path.is_empty());
                match path {
                    Some(path) => {
                        info!(
                            target_x = pos.x,
                            target_y = pos.y,
                            waypoints = path.len(),
                            "user_walk_started"
                        );
                        self.character.set_path(path);
                        self.user_walk_active = true;
                    }
                    None => {
                        info!(target_x = pos.x, target_y = pos.y, "user_walk_no_path");
                        self.dialogue.show(CANT_GET_THERE_TEXT, HINT_MS, cat, true);
                        // An earlier user walk keeps control until it arrives.
                        if !self.user_walk_active {
                            self.executor.finish_user_command();
                        }
                        self.notices.push(Notice::new("no_path", ""));
                    }
                }
            }
        }
    }

    pub(crate) fn status(&self) -> SceneStatus {
        SceneStatus {
            started: self.started,
            position: self.character.position(),
            mode: self.character.mode(),
            queued: self.executor.queued(),
            user_in_control: self.executor.user_in_control(),
            epoch: self.executor.epoch(),
            plan_in_flight: self.plan_in_flight,
            pending_timers: self.timers.len(),
            bubble: self.dialogue.text().map(str::to_string),
            now_ms: self.timers.now_ms(),
        }
    }
}

impl Scene for PartyScene {
    fn resize(&mut self, width: f32, height: f32) {
        self.bounds = Rect::from_size(width, height);
        self.cake = cake_rect(self.bounds);
        info!(width, height, "scene_resized");
        if self.started {
            self.rebuild_nav();
        }
    }

    fn on_pointer(&mut self, input: PointerInput) {
        if !self.started {
            return;
        }
        match input {
            PointerInput::Click { pos } => {
                self.timers
                    .schedule_in(CLICK_RESOLVE_DELAY_MS, PartyTimer::ResolveClick { pos });
            }
            PointerInput::DoubleClick { pos } => self.handle_double_click(pos),
        }
    }

    fn update(&mut self, fixed_dt_ms: u64) {
        if !self.started {
            return;
        }
        if let Some(event) = self.character.tick(&mut self.rng) {
            self.handle_character_event(event);
        }
        self.cake_animator.tick();
        self.dialogue.tick(fixed_dt_ms, self.character.position());
        for timer in self.timers.advance(fixed_dt_ms) {
            self.handle_timer(timer);
        }
    }

    fn render(&mut self, sink: &mut dyn RenderSink) {
        for notice in std::mem::take(&mut self.notices) {
            sink.notify(&notice);
        }
        if !self.started {
            return;
        }
        sink.draw_sprite(&SpriteDraw {
            asset: CAKE_ASSET,
            row: 0,
            frame: self.cake_animator.frame(),
            center: self.cake.center(),
            size: Vec2::new(self.cake.width, self.cake.height),
        });
        sink.draw_sprite(&SpriteDraw {
            asset: CAT_ASSET,
            row: self.character.sprite_row(),
            frame: self.character.frame(),
            center: self.character.position(),
            size: Vec2::new(CAT_HITBOX_WIDTH_PX, CAT_HITBOX_HEIGHT_PX),
        });
        if let Some(bubble) = self.dialogue.draw() {
            sink.draw_bubble(&bubble);
        }
    }

    fn debug_title(&self) -> Option<String> {
        let next = self.executor.peek().map_or("-", Action::kind_name);
        Some(format!(
            "party | {:?} | queued {} (next {}) | epoch {}",
            self.character.mode(),
            self.executor.queued(),
            next,
            self.executor.epoch()
        ))
    }
}

fn cake_rect(bounds: Rect) -> Rect {
    Rect::new(
        bounds.x + (bounds.width - CAKE_SIZE_PX) / 2.0,
        bounds.y + (bounds.height - CAKE_SIZE_PX) / 2.0,
        CAKE_SIZE_PX,
        CAKE_SIZE_PX,
    )
}

fn cat_start(bounds: Rect) -> Vec2 {
    Vec2::new(
        bounds.x + bounds.width * CAT_START_X_FRACTION,
        bounds.y + bounds.height * CAT_START_Y_FRACTION,
    )
}
