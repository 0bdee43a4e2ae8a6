//! Inactivity monitor. After a fixed idle budget with no tracked user
//! interaction, the session is cleared and the navigator is sent to the
//! login route. This is the only automatic state change in the whole
//! client.
//!
//! States and transitions:
//!
//! | state               | event            | next                              |
//! |---------------------|------------------|-----------------------------------|
//! | stopped (initial)   | `start()`        | armed; listener registered, `reset()` runs once |
//! | armed               | `start()`        | armed (no-op, single-init guard)  |
//! | armed               | activity/`reset()` | armed; pending timer replaced iff authenticated |
//! | armed, timer elapse | (none)           | armed-but-idle; session cleared, redirect issued |
//! | armed               | `stop()`         | stopped; timer cancelled, guard cleared |
//!
//! `reset()` while signed out schedules nothing; the monitor sits
//! armed-but-idle until the first `reset()` after a later login. At most
//! one timer is pending at any instant: the previous handle is always
//! aborted before a new one is spawned.
//!
//! Activity events arrive over a channel instead of DOM listeners; event
//! sources hold an [`ActivitySensor`] and may fire at pointer-move rates.
//! A reset is only an abort-and-respawn, cheap to call arbitrarily often.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::session::SessionStore;

/// Inactivity budget before the session is forcibly closed.
pub const IDLE_TIME_LIMIT: Duration = Duration::from_secs(30 * 60);

/// Route the monitor redirects to after a forced logout.
pub const LOGIN_ROUTE: &str = "/auth/login";

/// Abstract "go to route" collaborator; the monitor only ever calls it
/// with [`LOGIN_ROUTE`].
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Interaction kinds that count as user activity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Activity {
    PointerMove,
    KeyPress,
    Click,
    Scroll,
    TouchStart,
}

/// Cheap clonable handle for event sources to report activity through.
#[derive(Clone, Debug)]
pub struct ActivitySensor {
    tx: mpsc::UnboundedSender<Activity>,
}

impl ActivitySensor {
    pub fn record(&self, activity: Activity) {
        // a closed receiver only means the monitor is gone
        let _ = self.tx.send(activity);
    }
}

pub struct IdleMonitor {
    inner: Arc<Inner>,
}

struct Inner {
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
    idle_limit: Duration,
    timer: Mutex<Option<JoinHandle<()>>>,
    started: AtomicBool,
    sensor_tx: mpsc::UnboundedSender<Activity>,
    events: Mutex<Option<mpsc::UnboundedReceiver<Activity>>>,
}

impl IdleMonitor {
    #[must_use]
    pub fn new(session: SessionStore, navigator: Arc<dyn Navigator>) -> Self {
        Self::with_idle_limit(session, navigator, IDLE_TIME_LIMIT)
    }

    #[must_use]
    pub fn with_idle_limit(
        session: SessionStore,
        navigator: Arc<dyn Navigator>,
        idle_limit: Duration,
    ) -> Self {
        let (sensor_tx, events) = mpsc::unbounded_channel();

        Self {
            inner: Arc::new(Inner {
                session,
                navigator,
                idle_limit,
                timer: Mutex::new(None),
                started: AtomicBool::new(false),
                sensor_tx,
                events: Mutex::new(Some(events)),
            }),
        }
    }

    /// Handle for interaction sources (pointer, keyboard, touch plumbing)
    /// to feed activity into the monitor.
    #[must_use]
    pub fn sensor(&self) -> ActivitySensor {
        ActivitySensor {
            tx: self.inner.sensor_tx.clone(),
        }
    }

    /// Registers the activity listener and performs the initial [`reset`].
    /// No-op when already started. Must be called within a Tokio runtime.
    ///
    /// [`reset`]: IdleMonitor::reset
    pub fn start(&self) {
        if self.inner.started.swap(true, Ordering::SeqCst) {
            return;
        }

        // The listener is registered once per monitor and survives stop();
        // a re-start only re-arms the timer logic. See DESIGN.md.
        if let Some(mut events) = lock(&self.inner.events).take() {
            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move {
                while let Some(activity) = events.recv().await {
                    debug!(?activity, "user activity");
                    reset_timer(&inner);
                }
            });
        }

        reset_timer(&self.inner);
    }

    /// Cancels any pending timer and, when a session is present, schedules
    /// a fresh one for the full idle budget.
    pub fn reset(&self) {
        reset_timer(&self.inner);
    }

    /// Cancels the pending timer and clears the single-init guard.
    pub fn stop(&self) {
        if let Some(pending) = lock(&self.inner.timer).take() {
            pending.abort();
        }

        self.inner.started.store(false, Ordering::SeqCst);
    }
}

/// Cancel-then-set: the previous handle is aborted before a replacement
/// is spawned, so at most one timer is ever pending.
fn reset_timer(inner: &Arc<Inner>) {
    let mut timer = lock(&inner.timer);

    if let Some(pending) = timer.take() {
        pending.abort();
    }

    if !inner.session.is_authenticated() {
        return;
    }

    let inner = Arc::clone(inner);
    *timer = Some(tokio::spawn(async move {
        tokio::time::sleep(inner.idle_limit).await;
        inner.expire();
    }));
}

impl Inner {
    fn expire(&self) {
        info!(
            "idle for {} seconds, logging out",
            self.idle_limit.as_secs()
        );

        self.session.logout();
        self.navigator.navigate(LOGIN_ROUTE);
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(pending) = lock(&self.timer).take() {
            pending.abort();
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
