use crate::geometry::Vec2;

/// Window in which a second tap turns into a double click.
pub const DOUBLE_TAP_WINDOW_MS: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    Click { pos: Vec2 },
    DoubleClick { pos: Vec2 },
}

impl PointerInput {
    pub fn pos(self) -> Vec2 {
        match self {
            PointerInput::Click { pos } | PointerInput::DoubleClick { pos } => pos,
        }
    }
}

/// Turns raw taps into clicks and double clicks.
///
/// Every tap yields a `Click`; a tap landing within the window of the
/// previous one additionally yields a `DoubleClick` and consumes the pair.
#[derive(Debug, Clone, Default)]
pub struct TapClassifier {
    last_tap_ms: Option<u64>,
    window_ms: u64,
}

impl TapClassifier {
    pub fn new() -> Self {
        Self::with_window(DOUBLE_TAP_WINDOW_MS)
    }

    pub fn with_window(window_ms: u64) -> Self {
        Self {
            last_tap_ms: None,
            window_ms,
        }
    }

    pub fn tap(&mut self, now_ms: u64, pos: Vec2) -> Vec<PointerInput> {
        match self.last_tap_ms {
            Some(last) if now_ms.saturating_sub(last) < self.window_ms => {
                self.last_tap_ms = None;
                vec![PointerInput::Click { pos }, PointerInput::DoubleClick { pos }]
            }
            _ => {
                self.last_tap_ms = Some(now_ms);
                vec![PointerInput::Click { pos }]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quick_second_tap_is_double_click() {
        let mut taps = TapClassifier::new();
        let pos = Vec2::new(10.0, 20.0);
        assert_eq!(taps.tap(1_000, pos), vec![PointerInput::Click { pos }]);
        assert_eq!(
            taps.tap(1_250, pos),
            vec![PointerInput::Click { pos }, PointerInput::DoubleClick { pos }]
        );
    }

    #[test]
    fn slow_taps_stay_single_and_pairs_are_consumed() {
        let mut taps = TapClassifier::new();
        let pos = Vec2::default();
        taps.tap(0, pos);
        assert_eq!(taps.tap(300, pos).len(), 1);
        assert_eq!(taps.tap(350, pos).len(), 2);
        assert_eq!(taps.tap(400, pos).len(), 1);
    }
}
