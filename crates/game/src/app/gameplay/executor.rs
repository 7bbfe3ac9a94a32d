use std::collections::VecDeque;
use std::ops::Range;

use rand::Rng;
use tracing::{debug, info};

use crate::app::planning::{Action, Plan};

pub(crate) const DEFAULT_REFILL_DELAY_MS: Range<u64> = 4_000..9_000;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Dequeued {
    Action(Action),
    /// Queue is empty; ask for a new plan after this delay.
    Refill { delay_ms: u64 },
    /// Queue is empty and the user is in control; do nothing.
    Suppressed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EnqueueOutcome {
    Replaced { dropped: usize, queued: usize },
    DiscardedUserControl,
}

/// Pending autonomous actions plus the user-control flag.
#[derive(Debug, Clone)]
pub(crate) struct ActionExecutor {
    queue: VecDeque<Action>,
    user_in_control: bool,
    epoch: u64,
    refill_delay_ms: Range<u64>,
}

impl Default for ActionExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_REFILL_DELAY_MS)
    }
}

impl ActionExecutor {
    pub(crate) fn new(refill_delay_ms: Range<u64>) -> Self {
        Self {
            queue: VecDeque::new(),
            user_in_control: false,
            epoch: 0,
            refill_delay_ms,
        }
    }

    pub(crate) fn queued(&self) -> usize {
        self.queue.len()
    }

    pub(crate) fn user_in_control(&self) -> bool {
        self.user_in_control
    }

    pub(crate) fn epoch(&self) -> u64 {
        self.epoch
    }

    pub(crate) fn peek(&self) -> Option<&Action> {
        self.queue.front()
    }

    /// Replaces whatever is still queued.
    pub(crate) fn enqueue_plan(&mut self, plan: Plan) -> EnqueueOutcome {
        if self.user_in_control {
            debug!(actions = plan.len(), "plan_discarded_user_control");
            return EnqueueOutcome::DiscardedUserControl;
        }
        let dropped = self.queue.len();
        self.queue = plan.actions.into();
        let queued = self.queue.len();
        info!(queued, dropped, "plan_enqueued");
        EnqueueOutcome::Replaced { dropped, queued }
    }

    pub(crate) fn dequeue_next(&mut self, rng: &mut impl Rng) -> Dequeued {
        if let Some(action) = self.queue.pop_front() {
            debug!(action = action.kind_name(), remaining = self.queue.len(), "action_dequeued");
            return Dequeued::Action(action);
        }
        if self.user_in_control {
            return Dequeued::Suppressed;
        }
        let delay_ms = if self.refill_delay_ms.is_empty() {
            self.refill_delay_ms.start
        } else {
            rng.random_range(self.refill_delay_ms.clone())
        };
        debug!(delay_ms, "queue_exhausted");
        Dequeued::Refill { delay_ms }
    }

    /// Hands the character to the user. Every timer from the old epoch goes stale.
    pub(crate) fn interrupt(&mut self) {
        let dropped = self.queue.len();
        self.queue.clear();
        self.user_in_control = true;
        self.epoch = self.epoch.wrapping_add(1);
        info!(dropped, epoch = self.epoch, "autonomy_interrupted");
    }

    /// Ends the user command. Autonomy stays idle until something asks for a plan.
    pub(crate) fn finish_user_command(&mut self) {
        if self.user_in_control {
            self.user_in_control = false;
            info!(epoch = self.epoch, "user_command_finished");
        }
    }

    pub(crate) fn accepts(&self, epoch: u64) -> bool {
        !self.user_in_control && epoch == self.epoch
    }
}
