use std::collections::VecDeque;

use engine::{FrameAnimator, Playback, Vec2};
use rand::Rng;

use crate::app::planning::{random_idle_kind, IdleKind};

pub(crate) const MOVE_SPEED_PX_PER_TICK: f32 = 1.0;
pub(crate) const CAT_FRAME_COUNT: u32 = 4;
const WALK_TICKS_PER_FRAME: u32 = 15;
const LICK_PAW_TICKS_PER_FRAME: u32 = 25;
const SIT_DOWN_TICKS_PER_FRAME: u32 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Facing {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CharacterMode {
    Idle,
    Walking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CharacterEvent {
    WalkCompleted,
}

#[derive(Debug, Clone)]
pub(crate) struct Character {
    position: Vec2,
    facing: Facing,
    mode: CharacterMode,
    idle_kind: IdleKind,
    path: VecDeque<Vec2>,
    move_speed: f32,
    animator: FrameAnimator,
}

impl Character {
    pub(crate) fn new(position: Vec2) -> Self {
        Self {
            position,
            facing: Facing::Down,
            mode: CharacterMode::Idle,
            idle_kind: IdleKind::LickPaw,
            path: VecDeque::new(),
            move_speed: MOVE_SPEED_PX_PER_TICK,
            animator: idle_animator(IdleKind::LickPaw),
        }
    }

    pub(crate) fn position(&self) -> Vec2 {
        self.position
    }

    #[cfg(test)]
    pub(crate) fn facing(&self) -> Facing {
        self.facing
    }

    pub(crate) fn mode(&self) -> CharacterMode {
        self.mode
    }

    pub(crate) fn idle_kind(&self) -> IdleKind {
        self.idle_kind
    }

    #[cfg(test)]
    pub(crate) fn remaining_path(&self) -> usize {
        self.path.len()
    }

    #[cfg(test)]
    pub(crate) fn is_walking(&self) -> bool {
        self.mode == CharacterMode::Walking
    }

    /// Starts walking. An empty path leaves the character as it is.
    pub(crate) fn set_path(&mut self, path: Vec<Vec2>) -> bool {
        if path.is_empty() {
            return false;
        }
        self.path = path.into();
        self.mode = CharacterMode::Walking;
        self.animator = walk_animator();
        true
    }

    pub(crate) fn set_idle(&mut self, kind: IdleKind) {
        self.path.clear();
        self.mode = CharacterMode::Idle;
        self.idle_kind = kind;
        self.animator = idle_animator(kind);
    }

    pub(crate) fn tick(&mut self, rng: &mut impl Rng) -> Option<CharacterEvent> {
        let event = if self.mode == CharacterMode::Walking {
            self.step_walk(rng)
        } else {
            None
        };
        self.animator.tick();
        event
    }

    fn step_walk(&mut self, rng: &mut impl Rng) -> Option<CharacterEvent> {
        let Some(target) = self.path.front().copied() else {
            self.set_idle(random_idle_kind(rng));
            return Some(CharacterEvent::WalkCompleted);
        };

        let dx = target.x - self.position.x;
        let dy = target.y - self.position.y;
        let distance = (dx * dx + dy * dy).sqrt();
        if distance < self.move_speed * 2.0 {
            self.position = target;
            self.path.pop_front();
            if self.path.is_empty() {
                self.set_idle(random_idle_kind(rng));
                return Some(CharacterEvent::WalkCompleted);
            }
            return None;
        }

        self.position = Vec2::new(
            self.position.x + dx / distance * self.move_speed,
            self.position.y + dy / distance * self.move_speed,
        );
        self.facing = facing_for(dx, dy);
        None
    }

    pub(crate) fn sprite_row(&self) -> u32 {
        match self.mode {
            CharacterMode::Walking => match self.facing {
                Facing::Down => 0,
                Facing::Right => 1,
                Facing::Up => 2,
                Facing::Left => 3,
            },
            CharacterMode::Idle => match self.idle_kind {
                IdleKind::SitDown => 4,
                IdleKind::LickPaw => 5,
            },
        }
    }

    pub(crate) fn frame(&self) -> u32 {
        self.animator.frame()
    }

    #[cfg(test)]
    /// True once a sit-down has played through and is holding its last frame.
    pub(crate) fn sit_settled(&self) -> bool {
        self.mode == CharacterMode::Idle
            && self.idle_kind == IdleKind::SitDown
            && self.animator.is_finished()
    }
}

fn facing_for(dx: f32, dy: f32) -> Facing {
    if dx.abs() > dy.abs() {
        if dx > 0.0 {
            Facing::Right
        } else {
            Facing::Left
        }
    } else if dy > 0.0 {
        Facing::Down
    } else {
        Facing::Up
    }
}

fn walk_animator() -> FrameAnimator {
    FrameAnimator::new(CAT_FRAME_COUNT, WALK_TICKS_PER_FRAME, Playback::Loop)
}

fn idle_animator(kind: IdleKind) -> FrameAnimator {
    match kind {
        IdleKind::LickPaw => {
            FrameAnimator::new(CAT_FRAME_COUNT, LICK_PAW_TICKS_PER_FRAME, Playback::Loop)
        }
        IdleKind::SitDown => {
            FrameAnimator::new(CAT_FRAME_COUNT, SIT_DOWN_TICKS_PER_FRAME, Playback::HoldLast)
        }
    }
}
