use engine::{BubbleDraw, Vec2};

/// Bubble sits this far above its anchor.
pub(crate) const BUBBLE_OFFSET_Y_PX: f32 = 70.0;

#[derive(Debug, Clone, PartialEq)]
struct Bubble {
    text: String,
    anchor: Vec2,
    follow: bool,
    remaining_ms: u64,
}

/// At most one speech bubble; a new one replaces the old.
#[derive(Debug, Clone, Default)]
pub(crate) struct Dialogue {
    bubble: Option<Bubble>,
}

impl Dialogue {
    pub(crate) fn show(&mut self, text: impl Into<String>, duration_ms: u64, anchor: Vec2, follow: bool) {
        self.bubble = Some(Bubble {
            text: text.into(),
            anchor,
            follow,
            remaining_ms: duration_ms,
        });
    }

    pub(crate) fn text(&self) -> Option<&str> {
        self.bubble.as_ref().map(|bubble| bubble.text.as_str())
    }

    #[cfg(test)]
    pub(crate) fn is_visible(&self) -> bool {
        self.bubble.is_some()
    }

    /// Counts down the bubble and re-anchors a following one.
    pub(crate) fn tick(&mut self, elapsed_ms: u64, follow_target: Vec2) {
        let Some(bubble) = self.bubble.as_mut() else {
            return;
        };
        bubble.remaining_ms = bubble.remaining_ms.saturating_sub(elapsed_ms);
        if bubble.remaining_ms == 0 {
            self.bubble = None;
            return;
        }
        if bubble.follow {
            bubble.anchor = follow_target;
        }
    }

    pub(crate) fn draw(&self) -> Option<BubbleDraw> {
        self.bubble.as_ref().map(|bubble| BubbleDraw {
            text: bubble.text.clone(),
            anchor: Vec2::new(bubble.anchor.x, bubble.anchor.y - BUBBLE_OFFSET_Y_PX),
        })
    }
}
