//! Periodic flush timer.
//!
//! # Responsibility
//! - Decide when the session is due for a full flush.
//!
//! # Invariants
//! - Time is supplied by the caller as monotonic milliseconds; the timer
//!   never reads a clock or spawns threads.
//! - At most one flush runs per elapsed interval.

use crate::repo::note_store::NoteStore;
use crate::repo::settings_repo::SettingsRepository;
use crate::service::session::Session;

/// Default flush interval.
pub const FLUSH_INTERVAL_MS: u64 = 5_000;

/// Cooperative interval timer driving `Session::flush_all`.
#[derive(Debug, Clone, Copy)]
pub struct FlushTimer {
    interval_ms: u64,
    last_flush_ms: u64,
}

impl FlushTimer {
    /// Creates a timer armed at `now_ms`.
    pub const fn new(interval_ms: u64, now_ms: u64) -> Self {
        Self {
            interval_ms,
            last_flush_ms: now_ms,
        }
    }

    /// Creates a timer with the default five second interval.
    pub const fn with_default_interval(now_ms: u64) -> Self {
        Self::new(FLUSH_INTERVAL_MS, now_ms)
    }

    pub const fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Returns whether a flush is due at `now_ms`.
    pub const fn due(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_flush_ms) >= self.interval_ms
    }

    /// Milliseconds until the next flush; zero when already due.
    pub const fn remaining_ms(&self, now_ms: u64) -> u64 {
        self.interval_ms
            .saturating_sub(now_ms.saturating_sub(self.last_flush_ms))
    }

    /// Flushes `session` when due and re-arms; returns notes written.
    pub fn tick<S: NoteStore, R: SettingsRepository>(
        &mut self,
        now_ms: u64,
        session: &Session<S, R>,
    ) -> Option<usize> {
        if !self.due(now_ms) {
            return None;
        }
        self.last_flush_ms = now_ms;
        Some(session.flush_all())
    }
}
