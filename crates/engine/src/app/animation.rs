#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    Loop,
    /// Play through once and stay on the last frame.
    HoldLast,
}

/// Tick-counted frame stepper for one sprite-sheet row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameAnimator {
    frame_count: u32,
    ticks_per_frame: u32,
    playback: Playback,
    frame: u32,
    tick_counter: u32,
}

impl FrameAnimator {
    pub fn new(frame_count: u32, ticks_per_frame: u32, playback: Playback) -> Self {
        Self {
            frame_count: frame_count.max(1),
            ticks_per_frame: ticks_per_frame.max(1),
            playback,
            frame: 0,
            tick_counter: 0,
        }
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn playback(&self) -> Playback {
        self.playback
    }

    pub fn is_finished(&self) -> bool {
        self.playback == Playback::HoldLast && self.frame + 1 >= self.frame_count
    }

    pub fn reset(&mut self) {
        self.frame = 0;
        self.tick_counter = 0;
    }

    pub fn tick(&mut self) {
        if self.is_finished() {
            return;
        }
        self.tick_counter += 1;
        if self.tick_counter < self.ticks_per_frame {
            return;
        }
        self.tick_counter = 0;
        self.frame = match self.playback {
            Playback::Loop => (self.frame + 1) % self.frame_count,
            Playback::HoldLast => (self.frame + 1).min(self.frame_count - 1),
        };
    }
}
