use crate::geometry::Vec2;

use super::input::PointerInput;

/// One frame cut from a sprite sheet, drawn centered on `center`.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteDraw {
    pub asset: &'static str,
    pub row: u32,
    pub frame: u32,
    pub center: Vec2,
    pub size: Vec2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BubbleDraw {
    pub text: String,
    pub anchor: Vec2,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: &'static str,
    pub detail: String,
}

impl Notice {
    pub fn new(kind: &'static str, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

/// Where a scene sends its output. Pixel work happens on the other side.
pub trait RenderSink {
    fn draw_sprite(&mut self, sprite: &SpriteDraw);
    fn draw_bubble(&mut self, bubble: &BubbleDraw);
    fn notify(&mut self, notice: &Notice);
}

pub trait Scene {
    fn resize(&mut self, width: f32, height: f32);
    fn on_pointer(&mut self, input: PointerInput);
    fn update(&mut self, fixed_dt_ms: u64);
    fn render(&mut self, sink: &mut dyn RenderSink);
    fn debug_title(&self) -> Option<String> {
        None
    }
}

/// Keeps everything it is given; handy for headless checks.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub sprites: Vec<SpriteDraw>,
    pub bubbles: Vec<BubbleDraw>,
    pub notices: Vec<Notice>,
}

impl RecordingSink {
    pub fn clear_frame(&mut self) {
        self.sprites.clear();
        self.bubbles.clear();
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn has_notice(&self, kind: &str) -> bool {
        self.notices.iter().any(|notice| notice.kind == kind)
    }
}

impl RenderSink for RecordingSink {
    fn draw_sprite(&mut self, sprite: &SpriteDraw) {
        self.sprites.push(sprite.clone());
    }

    fn draw_bubble(&mut self, bubble: &BubbleDraw) {
        self.bubbles.push(bubble.clone());
    }

    fn notify(&mut self, notice: &Notice) {
        self.notices.push(notice.clone());
    }
}
