#[derive(Debug, Clone, PartialEq)]
struct PendingTimer<E> {
    seq: u64,
    due_at_ms: u64,
    event: E,
}

/// One-shot timers on a caller-driven millisecond clock.
///
/// Timers fire in due order; timers due at the same instant fire in the order
/// they were scheduled.
#[derive(Debug, Clone)]
pub struct TimerQueue<E> {
    now_ms: u64,
    next_seq: u64,
    pending: Vec<PendingTimer<E>>,
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self {
            now_ms: 0,
            next_seq: 0,
            pending: Vec::new(),
        }
    }
}

impl<E> TimerQueue<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn schedule_in(&mut self, delay_ms: u64, event: E) {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.saturating_add(1);
        self.pending.push(PendingTimer {
            seq,
            due_at_ms: self.now_ms.saturating_add(delay_ms),
            event,
        });
    }

    pub fn cancel_where(&mut self, mut predicate: impl FnMut(&E) -> bool) -> usize {
        let before = self.pending.len();
        self.pending.retain(|timer| !predicate(&timer.event));
        before - self.pending.len()
    }

    pub fn iter_pending(&self) -> impl Iterator<Item = &E> {
        self.pending.iter().map(|timer| &timer.event)
    }

    /// Moves the clock forward and returns every event that came due.
    pub fn advance(&mut self, elapsed_ms: u64) -> Vec<E> {
        self.now_ms = self.now_ms.saturating_add(elapsed_ms);
        let now_ms = self.now_ms;

        let mut due = Vec::new();
        let mut remaining = Vec::with_capacity(self.pending.len());
        for timer in self.pending.drain(..) {
            if timer.due_at_ms <= now_ms {
                due.push(timer);
            } else {
                remaining.push(timer);
            }
        }
        self.pending = remaining;

        due.sort_by_key(|timer| (timer.due_at_ms, timer.seq));
        due.into_iter().map(|timer| timer.event).collect()
    }
}
