//! Hysteresis controller
//!
//! Maps gated packet loss to a [`QualityLevel`], debounces it with one timer
//! per level and commits the level once its window elapses. Scheduling a new
//! level cancels every other pending timer, so only the most recent tendency
//! can ever commit.
//!
//! Timers are spawned tokio tasks that post a [`DebounceElapsed`] back to the
//! owning session task. A message whose token no longer matches the pending
//! entry was cancelled after it was queued and is ignored.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::config::GovernorConfig;
use crate::context::ContextReader;
use crate::effects::{ConferenceSession, MediaEffects, Notification};
use crate::gate::{self, GateDecision};
use crate::level::{LevelTable, QualityLevel};
use crate::stats::QualityEvent;

/// Debounce timer fired for `level`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceElapsed {
    pub level: QualityLevel,
    pub token: u64,
}

struct PendingTimer {
    token: u64,
    task: JoinHandle<()>,
}

/// Per-session quality state machine
pub struct QualityController {
    levels: LevelTable,
    notifications_enabled: bool,

    /// Last committed level
    current_level: QualityLevel,
    pending: HashMap<QualityLevel, PendingTimer>,
    next_token: u64,
    timer_tx: mpsc::UnboundedSender<DebounceElapsed>,
    level_tx: watch::Sender<QualityLevel>,

    session: Weak<dyn ConferenceSession>,
    effects: Arc<dyn MediaEffects>,
    context: Arc<dyn ContextReader>,
}

impl QualityController {
    /// Create a controller starting at `Normal`
    ///
    /// The returned receiver yields timer firings that must be fed back
    /// through [`QualityController::on_debounce_elapsed`].
    pub fn new(
        config: &GovernorConfig,
        session: Weak<dyn ConferenceSession>,
        effects: Arc<dyn MediaEffects>,
        context: Arc<dyn ContextReader>,
    ) -> (Self, mpsc::UnboundedReceiver<DebounceElapsed>) {
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();
        let (level_tx, _) = watch::channel(QualityLevel::Normal);

        let controller = Self {
            levels: config.levels.clone(),
            notifications_enabled: config.notifications.enabled,
            current_level: QualityLevel::Normal,
            pending: HashMap::new(),
            next_token: 0,
            timer_tx,
            level_tx,
            session,
            effects,
            context,
        };
        (controller, timer_rx)
    }

    pub fn current_level(&self) -> QualityLevel {
        self.current_level
    }

    /// Level whose debounce timer is running, if any
    pub fn pending_level(&self) -> Option<QualityLevel> {
        self.pending.keys().max().copied()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Receiver notified on every committed level change
    pub fn subscribe_level(&self) -> watch::Receiver<QualityLevel> {
        self.level_tx.subscribe()
    }

    pub fn classify(&self, loss_percent: f64) -> QualityLevel {
        self.levels.classify(loss_percent)
    }

    /// Run one sample through the gate and, if accepted, schedule its level
    pub fn handle_event(&mut self, event: &QualityEvent) {
        let context = self.context.snapshot();
        match gate::evaluate(&context, event) {
            GateDecision::Accept(loss) => {
                let target = self.classify(loss);
                tracing::trace!(loss, %target, "Classified sample");
                self.schedule(target);
            }
            GateDecision::Drop(reason) => {
                tracing::debug!(%reason, "Ignoring quality sample");
            }
        }
    }

    /// Start the debounce timer for `target`, cancelling any other
    pub fn schedule(&mut self, target: QualityLevel) {
        if self.pending.contains_key(&target) {
            return;
        }

        self.pending.retain(|level, timer| {
            tracing::debug!(%level, "Cancelling pending quality change");
            timer.task.abort();
            false
        });

        let token = self.next_token;
        self.next_token = self.next_token.wrapping_add(1);

        let delay = self.levels.profile(target).debounce();
        let tx = self.timer_tx.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(DebounceElapsed { level: target, token });
        });

        tracing::debug!(%target, ?delay, "Scheduled quality change");
        self.pending.insert(target, PendingTimer { token, task });
    }

    /// Commit a level whose timer fired, unless it was cancelled meanwhile
    pub fn on_debounce_elapsed(&mut self, fired: DebounceElapsed) {
        let live = self
            .pending
            .get(&fired.level)
            .is_some_and(|timer| timer.token == fired.token);
        if !live {
            tracing::trace!(level = %fired.level, "Dropping stale debounce timer");
            return;
        }
        self.pending.remove(&fired.level);
        self.apply(fired.level);
    }

    /// Commit `target` and drive its side effects
    ///
    /// Returns `false` without touching state if `target` is already current
    /// or the conference session is gone.
    pub fn apply(&mut self, target: QualityLevel) -> bool {
        if target == self.current_level {
            return false;
        }

        let Some(session) = self.session.upgrade() else {
            tracing::debug!(%target, "No active session, skipping quality change");
            return false;
        };

        let previous = std::mem::replace(&mut self.current_level, target);
        self.level_tx.send_replace(target);
        tracing::info!(session = session.id(), %previous, %target, "Quality level committed");

        if target == QualityLevel::Critical {
            self.effects.set_audio_only(true);
            self.notify(Notification::network_critical());
            return true;
        }

        if self.context.snapshot().audio_only_active {
            self.effects.set_audio_only(false);
        }

        let max_height = self.levels.profile(target).max_height;
        if let Err(e) = session.set_receiver_max_height(max_height) {
            tracing::warn!("Failed to push receiver constraint: {}", e);
        }

        if target == QualityLevel::Low {
            self.notify(Notification::network_unstable());
        }

        true
    }

    /// Abort every pending timer
    pub fn cancel_all(&mut self) {
        if !self.pending.is_empty() {
            tracing::debug!("Cancelling {} pending quality change(s)", self.pending.len());
        }
        for (_, timer) in self.pending.drain() {
            timer.task.abort();
        }
    }

    fn notify(&self, notification: Notification) {
        if self.notifications_enabled {
            self.effects.notify(notification);
        }
    }
}

impl Drop for QualityController {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
