//! Periodic auto-save timing.
//!
//! The scheduler owns no thread and no timer. The host's event loop polls [`tick`] with
//! the current instant; when a sweep is due it runs one synchronously. A tick that lands
//! while a sweep is still running is not dropped: it is recorded and the next poll sweeps
//! immediately, whatever the clock says.
//!
//! [`tick`]: AutoSaveScheduler::tick

use crate::commands::autosave::{self, SweepReport};
use crate::config::AutoSaveSettings;
use crate::registry::DocumentRegistry;
use crate::store::{SnapshotStore, StorageBackend};
use crate::view::DocumentView;
use std::time::{Duration, Instant};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
}

#[derive(Debug)]
pub enum TickOutcome {
    NotDue,
    /// A sweep is in progress; another one will run on the next poll.
    Deferred,
    Swept(SweepReport),
}

#[derive(Debug)]
pub struct AutoSaveScheduler {
    state: SchedulerState,
    interval: Duration,
    next_due: Instant,
    deferred: bool,
}

impl AutoSaveScheduler {
    pub fn new(interval: Duration, now: Instant) -> Self {
        info!(interval_secs = interval.as_secs(), "auto-save scheduler started");
        Self {
            state: SchedulerState::Idle,
            interval,
            next_due: now + interval,
            deferred: false,
        }
    }

    pub fn from_settings(settings: &AutoSaveSettings, now: Instant) -> Self {
        Self::new(settings.interval, now)
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_deferred(&self) -> bool {
        self.deferred
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.deferred || now >= self.next_due
    }

    /// Zero when a sweep is already due.
    pub fn time_until_due(&self, now: Instant) -> Duration {
        if self.deferred {
            return Duration::ZERO;
        }
        self.next_due.saturating_duration_since(now)
    }

    /// Enter `Running`. Returns false, and records a deferred sweep, if one is already running.
    pub fn begin(&mut self) -> bool {
        if self.state == SchedulerState::Running {
            self.deferred = true;
            debug!("sweep requested while running, deferred");
            return false;
        }
        self.state = SchedulerState::Running;
        self.deferred = false;
        true
    }

    /// Back to `Idle`; the next sweep is due one interval from `now`.
    pub fn finish(&mut self, now: Instant) {
        self.state = SchedulerState::Idle;
        self.next_due = now + self.interval;
    }

    pub fn tick<B, V>(
        &mut self,
        now: Instant,
        registry: &DocumentRegistry,
        store: &SnapshotStore<B>,
        view: &V,
    ) -> TickOutcome
    where
        B: StorageBackend,
        V: DocumentView + ?Sized,
    {
        if self.state == SchedulerState::Running {
            self.begin();
            return TickOutcome::Deferred;
        }
        if !self.is_due(now) {
            return TickOutcome::NotDue;
        }
        match self.force_sweep(now, registry, store, view) {
            Some(report) => TickOutcome::Swept(report),
            None => TickOutcome::Deferred,
        }
    }

    /// Sweep now regardless of the clock. `None` if a sweep is already running.
    pub fn force_sweep<B, V>(
        &mut self,
        now: Instant,
        registry: &DocumentRegistry,
        store: &SnapshotStore<B>,
        view: &V,
    ) -> Option<SweepReport>
    where
        B: StorageBackend,
        V: DocumentView + ?Sized,
    {
        if !self.begin() {
            return None;
        }
        let report = autosave::run(registry, store, view);
        self.finish(now);
        Some(report)
    }
}
