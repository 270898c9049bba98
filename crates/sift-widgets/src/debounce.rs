#![forbid(unsafe_code)]

//! Trailing-edge debounce as an explicit, cancellable deferred update.
//!
//! [`Debounced`] holds a *settled* value and at most one [`PendingUpdate`].
//! Scheduling a new value supersedes the pending one: its ticket is retired
//! and it can never fire. The pending update fires on the first poll at or
//! after its deadline, which is `delay` after it was scheduled, so the
//! settled value only changes once input has been quiet for a full delay.
//!
//! Time is passed in explicitly (`*_at` methods) so behavior is
//! deterministic under test; the plain methods use [`Instant::now`].
//!
//! ```
//! use std::time::{Duration, Instant};
//! use sift_widgets::debounce::Debounced;
//!
//! let t0 = Instant::now();
//! let mut query = Debounced::new(String::new(), Duration::from_millis(500));
//! query.schedule_at("99".to_string(), t0);
//! query.schedule_at("9999".to_string(), t0 + Duration::from_millis(200));
//!
//! assert!(query.poll_at(t0 + Duration::from_millis(600)).is_none());
//! assert_eq!(query.poll_at(t0 + Duration::from_millis(700)).map(String::as_str), Some("9999"));
//! assert_eq!(query.settled(), "9999");
//! ```
//!
//! # Invariants
//!
//! - **Latest wins**: only the most recently scheduled value can settle.
//! - **Quiet period**: a value settles no earlier than `delay` after it was
//!   scheduled.
//! - **No resurrection**: a cancelled or superseded update never fires.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | `delay = 0` | `schedule_at` settles immediately, nothing is pending |
//! | poll with nothing pending | returns `None` |
//! | clock earlier than schedule time | treated as not yet due |

use std::time::{Duration, Instant};

/// Identity of one scheduled update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

/// A deferred update waiting for its deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpdate<T> {
    pub value: T,
    pub deadline: Instant,
    pub ticket: Ticket,
}

/// Counters for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebounceStats {
    pub scheduled: u64,
    /// Pending updates replaced by a newer schedule.
    pub superseded: u64,
    pub cancelled: u64,
    pub fired: u64,
}

#[derive(Debug, Clone)]
pub struct Debounced<T> {
    settled: T,
    pending: Option<PendingUpdate<T>>,
    delay: Duration,
    next_ticket: u64,
    stats: DebounceStats,
}

impl<T> Debounced<T> {
    pub fn new(initial: T, delay: Duration) -> Self {
        Self {
            settled: initial,
            pending: None,
            delay,
            next_ticket: 0,
            stats: DebounceStats::default(),
        }
    }

    /// The value consumers should act on.
    pub fn settled(&self) -> &T {
        &self.settled
    }

    pub fn pending(&self) -> Option<&PendingUpdate<T>> {
        self.pending.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn stats(&self) -> DebounceStats {
        self.stats
    }

    /// Whether `ticket` still identifies the pending update.
    pub fn is_live(&self, ticket: Ticket) -> bool {
        self.pending.as_ref().is_some_and(|p| p.ticket == ticket)
    }

    pub fn schedule(&mut self, value: T) -> Ticket {
        self.schedule_at(value, Instant::now())
    }

    /// Schedule `value` to settle at `now + delay`, superseding any pending
    /// update.
    pub fn schedule_at(&mut self, value: T, now: Instant) -> Ticket {
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        self.stats.scheduled += 1;
        if self.pending.take().is_some() {
            self.stats.superseded += 1;
        }

        if self.delay.is_zero() {
            self.settled = value;
            self.stats.fired += 1;
            return ticket;
        }
        self.pending = Some(PendingUpdate {
            value,
            deadline: now + self.delay,
            ticket,
        });
        ticket
    }

    /// Drop the pending update, returning its value.
    pub fn cancel(&mut self) -> Option<T> {
        let pending = self.pending.take()?;
        self.stats.cancelled += 1;
        Some(pending.value)
    }

    /// Cancel anything pending and settle `value` immediately.
    pub fn reset(&mut self, value: T) {
        self.cancel();
        self.settled = value;
    }

    pub fn poll(&mut self) -> Option<&T> {
        self.poll_at(Instant::now())
    }

    /// Fire the pending update if it is due. Returns the new settled value
    /// when it fired.
    pub fn poll_at(&mut self, now: Instant) -> Option<&T> {
        let due = self.pending.as_ref().is_some_and(|p| now >= p.deadline);
        if !due {
            return None;
        }
        let pending = self.pending.take()?;
        self.settled = pending.value;
        self.stats.fired += 1;
        Some(&self.settled)
    }

    /// How long until the pending update is due, `Duration::ZERO` if overdue,
    /// `None` if nothing is pending.
    pub fn time_until_fire(&self, now: Instant) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|p| p.deadline.saturating_duration_since(now))
    }

    /// The value that will be settled once everything pending fires.
    pub fn latest(&self) -> &T {
        self.pending.as_ref().map_or(&self.settled, |p| &p.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const DELAY: Duration = Duration::from_millis(500);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn settles_only_after_quiet_period() {
        let t0 = Instant::now();
        let mut d = Debounced::new(0, DELAY);
        d.schedule_at(1, t0);
        assert!(d.poll_at(t0 + ms(499)).is_none());
        assert_eq!(*d.settled(), 0);
        assert_eq!(d.poll_at(t0 + ms(500)), Some(&1));
        assert!(!d.is_pending());
    }

    #[test]
    fn new_schedule_restarts_the_wait() {
        let t0 = Instant::now();
        let mut d = Debounced::new(0, DELAY);
        d.schedule_at(1, t0);
        d.schedule_at(2, t0 + ms(400));
        assert!(d.poll_at(t0 + ms(500)).is_none());
        assert!(d.poll_at(t0 + ms(899)).is_none());
        assert_eq!(d.poll_at(t0 + ms(900)), Some(&2));
        assert_eq!(d.stats().superseded, 1);
        assert_eq!(d.stats().fired, 1);
    }

    #[test]
    fn superseded_ticket_is_not_live() {
        let t0 = Instant::now();
        let mut d = Debounced::new("", DELAY);
        let first = d.schedule_at("a", t0);
        let second = d.schedule_at("ab", t0);
        assert!(!d.is_live(first));
        assert!(d.is_live(second));
    }

    #[test]
    fn cancel_prevents_firing() {
        let t0 = Instant::now();
        let mut d = Debounced::new(0, DELAY);
        let ticket = d.schedule_at(7, t0);
        assert_eq!(d.cancel(), Some(7));
        assert!(!d.is_live(ticket));
        assert!(d.poll_at(t0 + ms(10_000)).is_none());
        assert_eq!(*d.settled(), 0);
        assert_eq!(d.cancel(), None);
    }

    #[test]
    fn reset_settles_immediately() {
        let t0 = Instant::now();
        let mut d = Debounced::new(String::from("old"), DELAY);
        d.schedule_at("typing".into(), t0);
        d.reset(String::new());
        assert_eq!(d.settled(), "");
        assert!(d.poll_at(t0 + ms(1000)).is_none());
    }

    #[test]
    fn zero_delay_settles_synchronously() {
        let mut d = Debounced::new(0, Duration::ZERO);
        d.schedule_at(5, Instant::now());
        assert_eq!(*d.settled(), 5);
        assert!(!d.is_pending());
    }

    #[test]
    fn time_until_fire_counts_down() {
        let t0 = Instant::now();
        let mut d = Debounced::new(0, DELAY);
        assert_eq!(d.time_until_fire(t0), None);
        d.schedule_at(1, t0);
        assert_eq!(d.time_until_fire(t0 + ms(100)), Some(ms(400)));
        assert_eq!(d.time_until_fire(t0 + ms(900)), Some(Duration::ZERO));
    }

    #[test]
    fn latest_reports_pending_value() {
        let t0 = Instant::now();
        let mut d = Debounced::new(1, DELAY);
        assert_eq!(*d.latest(), 1);
        d.schedule_at(2, t0);
        assert_eq!(*d.latest(), 2);
        assert_eq!(*d.settled(), 1);
    }

    proptest! {
        /// Whatever the typing rhythm, after the last keystroke plus the delay
        /// the settled value is the last one scheduled, and no value settles
        /// while a newer one is less than `delay` old.
        #[test]
        fn last_value_wins(gaps in proptest::collection::vec(0u64..1200, 1..30)) {
            let t0 = Instant::now();
            let mut d = Debounced::new(usize::MAX, DELAY);
            let mut now = t0;
            for (i, gap) in gaps.iter().enumerate() {
                now += ms(*gap);
                if let Some(&fired) = d.poll_at(now) {
                    // Fired value was scheduled earlier and left alone for a full delay.
                    prop_assert!(fired < i);
                    prop_assert!(*gap >= 500);
                }
                d.schedule_at(i, now);
            }
            prop_assert!(d.poll_at(now + ms(499)).is_none());
            prop_assert_eq!(d.poll_at(now + DELAY).copied(), Some(gaps.len() - 1));
        }
    }
}
