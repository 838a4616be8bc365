//! Debounced autosave state machine.
//!
//! # Responsibility
//! - Observe draft changes and persist the latest snapshot after a quiet period.
//! - Guarantee at most one persistence call in flight.
//! - Run explicit (manual) saves through the same in-flight guard.
//!
//! # Invariants
//! - At most one debounce timer is pending; a new change cancels the old one.
//! - A timer that fires while a save is in flight skips its cycle; it is not
//!   queued and does not supersede the running call.
//! - The snapshot handed to persistence is the last one observed before the
//!   timer fired; later edits belong to the next cycle.
//! - Failures keep `has_changes` set and never touch the in-memory draft.
//! - After `dispose`, no timer callback runs and no change is observed.

use crate::autosave::clock::Clock;
use crate::autosave::persistence::{DraftPersistence, SaveError, SaveResponse, TransportError};
use crate::model::draft::{ArticleStatus, Draft};
use crate::store::DraftStore;
use log::{debug, info, warn};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Default quiet period before an autosave fires.
pub const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_millis(30_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoSaveConfig {
    /// Debounce interval measured from the most recent change.
    pub interval: Duration,
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_AUTOSAVE_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoSavePhase {
    /// Nothing unsaved.
    Idle,
    /// Unsaved changes; a timer may be pending.
    Dirty,
    /// A persistence call is in flight.
    Saving,
}

/// Mutable autosave bookkeeping, owned by the coordinator.
#[derive(Debug, Default)]
pub struct AutoSaveState {
    pub has_changes: bool,
    pub is_saving: bool,
    /// Epoch milliseconds of the last successful save.
    pub last_saved: Option<i64>,
    pub pending_timer: Option<JoinHandle<()>>,
}

/// Read-only copy of [`AutoSaveState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoSaveStatus {
    pub has_changes: bool,
    pub is_saving: bool,
    pub last_saved: Option<i64>,
    pub has_pending_timer: bool,
    pub disposed: bool,
}

impl AutoSaveStatus {
    pub fn phase(&self) -> AutoSavePhase {
        if self.is_saving {
            AutoSavePhase::Saving
        } else if self.has_changes {
            AutoSavePhase::Dirty
        } else {
            AutoSavePhase::Idle
        }
    }
}

struct Inner {
    state: AutoSaveState,
    /// Last draft observed from the store.
    snapshot: Draft,
    /// Bumped per scheduled timer; a timer only acts if it is still current.
    timer_generation: u64,
    disposed: bool,
}

struct Shared {
    config: AutoSaveConfig,
    store: DraftStore,
    persistence: Arc<dyn DraftPersistence>,
    clock: Arc<dyn Clock>,
    inner: Mutex<Inner>,
}

/// Watches one [`DraftStore`] and persists it after quiet periods.
///
/// Must be created inside a tokio runtime. Dropping the coordinator disposes it.
pub struct AutoSaveCoordinator {
    shared: Arc<Shared>,
    watcher: JoinHandle<()>,
}

impl AutoSaveCoordinator {
    /// Starts observing `store`. Its current draft is the clean baseline.
    pub fn spawn(
        store: DraftStore,
        persistence: Arc<dyn DraftPersistence>,
        clock: Arc<dyn Clock>,
        config: AutoSaveConfig,
    ) -> Self {
        let mut changes = store.subscribe();
        let baseline = store.snapshot();
        let shared = Arc::new(Shared {
            config,
            store,
            persistence,
            clock,
            inner: Mutex::new(Inner {
                state: AutoSaveState::default(),
                snapshot: baseline,
                timer_generation: 0,
                disposed: false,
            }),
        });

        let watcher_shared = Arc::clone(&shared);
        let watcher = tokio::spawn(async move {
            while changes.changed().await.is_ok() {
                let draft = changes.borrow_and_update().clone();
                watcher_shared.observe(draft);
            }
        });

        info!(
            "event=autosave_start module=autosave status=ok interval_ms={}",
            config.interval.as_millis()
        );
        Self { shared, watcher }
    }

    pub fn config(&self) -> AutoSaveConfig {
        self.shared.config
    }

    pub fn status(&self) -> AutoSaveStatus {
        let inner = self.shared.lock();
        AutoSaveStatus {
            has_changes: inner.state.has_changes,
            is_saving: inner.state.is_saving,
            last_saved: inner.state.last_saved,
            has_pending_timer: inner.state.pending_timer.is_some(),
            disposed: inner.disposed,
        }
    }

    /// Feeds one draft snapshot directly, bypassing the store subscription.
    ///
    /// Returns whether the snapshot differed and (re)started the timer.
    pub fn observe(&self, draft: Draft) -> bool {
        self.shared.observe(draft)
    }

    /// Persists the store's current draft now with `status`.
    ///
    /// Bypasses debouncing but honors the in-flight guard. On success the
    /// store adopts `status` and the server echo.
    pub async fn save_now(&self, status: ArticleStatus) -> Result<SaveResponse, SaveError> {
        let outgoing = {
            let mut inner = self.shared.lock();
            if inner.disposed {
                return Err(SaveError::Disposed);
            }
            if inner.state.is_saving {
                debug!(
                    "event=manual_save module=autosave status=skipped reason=in_flight target_status={}",
                    status.as_str()
                );
                return Err(SaveError::Busy);
            }
            inner.state.is_saving = true;
            let mut draft = self.shared.store.snapshot();
            draft.status = status;
            draft
        };

        let started_at = Instant::now();
        info!(
            "event=manual_save module=autosave status=start target_status={}",
            status.as_str()
        );
        let result = self.shared.persistence.save(&outgoing, status).await;
        self.shared
            .finish_save(&outgoing, result, true, started_at, "manual_save")
    }

    /// Cancels the pending timer and stops observing changes.
    ///
    /// An in-flight save still completes and updates bookkeeping, but leaves
    /// the store untouched.
    pub fn dispose(&self) {
        let mut inner = self.shared.lock();
        if inner.disposed {
            return;
        }
        inner.disposed = true;
        inner.timer_generation += 1;
        if let Some(timer) = inner.state.pending_timer.take() {
            timer.abort();
        }
        drop(inner);

        self.watcher.abort();
        info!("event=autosave_stop module=autosave status=ok");
    }
}

impl Drop for AutoSaveCoordinator {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn observe(self: &Arc<Self>, draft: Draft) -> bool {
        let mut inner = self.lock();
        if inner.disposed || inner.snapshot == draft {
            return false;
        }

        inner.snapshot = draft;
        inner.state.has_changes = true;
        if let Some(timer) = inner.state.pending_timer.take() {
            timer.abort();
        }

        inner.timer_generation += 1;
        let generation = inner.timer_generation;
        let deadline = Instant::now() + self.config.interval;
        let shared = Arc::clone(self);
        inner.state.pending_timer = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            shared.on_timer(generation).await;
        }));

        debug!(
            "event=autosave_dirty module=autosave status=ok generation={} saving={}",
            generation, inner.state.is_saving
        );
        true
    }

    async fn on_timer(&self, generation: u64) {
        let outgoing = {
            let mut inner = self.lock();
            if inner.disposed || inner.timer_generation != generation {
                return;
            }
            inner.state.pending_timer = None;

            if inner.state.is_saving {
                debug!(
                    "event=autosave_fire module=autosave status=skipped reason=in_flight generation={}",
                    generation
                );
                return;
            }
            if !inner.state.has_changes {
                debug!(
                    "event=autosave_fire module=autosave status=skipped reason=clean generation={}",
                    generation
                );
                return;
            }

            inner.state.is_saving = true;
            inner.snapshot.clone()
        };

        let started_at = Instant::now();
        debug!(
            "event=autosave_fire module=autosave status=start generation={}",
            generation
        );
        let result = self.persistence.save(&outgoing, outgoing.status).await;
        // Autosave failures are logged inside finish_save and otherwise dropped.
        let _ = self.finish_save(&outgoing, result, false, started_at, "autosave_fire");
    }

    fn finish_save(
        &self,
        sent: &Draft,
        result: Result<SaveResponse, TransportError>,
        adopt_status: bool,
        started_at: Instant,
        event: &str,
    ) -> Result<SaveResponse, SaveError> {
        let duration_ms = started_at.elapsed().as_millis();
        let mut inner = self.lock();
        inner.state.is_saving = false;

        let response = match result {
            Err(err) => {
                warn!(
                    "event={} module=autosave status=error duration_ms={} error_code=transport error={}",
                    event, duration_ms, err
                );
                return Err(SaveError::Transport(err));
            }
            Ok(response) if !response.success => {
                let message = response
                    .message
                    .unwrap_or_else(|| "save rejected".to_string());
                warn!(
                    "event={} module=autosave status=error duration_ms={} error_code=rejected",
                    event, duration_ms
                );
                return Err(SaveError::Rejected(message));
            }
            Ok(response) => response,
        };

        inner.state.last_saved = Some(self.clock.now_ms());

        if inner.disposed {
            inner.state.has_changes = false;
            info!(
                "event={} module=autosave status=ok duration_ms={} disposed=true",
                event, duration_ms
            );
            return Ok(response);
        }

        if adopt_status {
            self.store.set_status(sent.status);
        }
        if self.store.snapshot() == *sent {
            if let Some(echo) = response.article.clone() {
                self.store.apply_server_echo(echo, sent);
            }
            // The store notification for the adopted state must not re-dirty.
            inner.snapshot = self.store.snapshot();
            inner.state.has_changes = false;
        } else {
            // Edited while in flight; the next cycle persists the newer draft.
            inner.state.has_changes = true;
        }

        info!(
            "event={} module=autosave status=ok duration_ms={} pending_changes={}",
            event, duration_ms, inner.state.has_changes
        );
        Ok(response)
    }
}
