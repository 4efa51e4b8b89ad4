//! Deferred, cancellable effects flushed by the tick loop.

use arcade_defence_core::TowerId;

/// Side effect waiting on a tick countdown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PendingEffect {
    /// Start the next wave automatically after the clearing delay.
    AutoWaveStart,
    /// Apply the outcome of a dice tower's pending roll.
    DiceResolution {
        /// Tower whose roll is pending.
        tower: TowerId,
    },
}

#[derive(Clone, Copy, Debug)]
struct ScheduledEffect {
    remaining: u32,
    effect: PendingEffect,
}

/// Single-shot timer queue owned by the world.
///
/// Entries count down once per tick and fire in scheduling order. Restart
/// clears the queue wholesale so stale timers never leak into a fresh
/// session.
#[derive(Clone, Debug, Default)]
pub(crate) struct Scheduler {
    entries: Vec<ScheduledEffect>,
}

impl Scheduler {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn schedule(&mut self, delay: u32, effect: PendingEffect) {
        self.entries.push(ScheduledEffect {
            remaining: delay.max(1),
            effect,
        });
    }

    /// Advances every timer by one tick and drains the effects now due.
    pub(crate) fn collect_due(&mut self) -> Vec<PendingEffect> {
        let mut due = Vec::new();
        self.entries.retain_mut(|entry| {
            entry.remaining = entry.remaining.saturating_sub(1);
            if entry.remaining == 0 {
                due.push(entry.effect);
                false
            } else {
                true
            }
        });
        due
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
