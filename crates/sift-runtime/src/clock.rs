#![forbid(unsafe_code)]

//! Time source shared by a program and its model.
//!
//! Widgets take time explicitly (`*_at(now)` methods). A model reads `now`
//! from a [`Clock`]: the system clock in production, or a manual clock that
//! a [`ProgramSimulator`](crate::ProgramSimulator) advances in tests.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Clock(Source);

#[derive(Debug, Clone)]
enum Source {
    System,
    /// Clones share the same instant.
    Manual(Rc<Cell<Instant>>),
}

impl Default for Clock {
    fn default() -> Self {
        Self::system()
    }
}

impl Clock {
    pub fn system() -> Self {
        Self(Source::System)
    }

    /// A clock frozen at `start` until [`advance`](Self::advance) is called.
    pub fn manual(start: Instant) -> Self {
        Self(Source::Manual(Rc::new(Cell::new(start))))
    }

    pub fn now(&self) -> Instant {
        match &self.0 {
            Source::System => Instant::now(),
            Source::Manual(now) => now.get(),
        }
    }

    pub fn is_manual(&self) -> bool {
        matches!(self.0, Source::Manual(_))
    }

    /// Move a manual clock forward. No effect on the system clock.
    pub fn advance(&self, by: Duration) {
        if let Source::Manual(now) = &self.0 {
            now.set(now.get() + by);
        }
    }
}
