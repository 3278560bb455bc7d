//! Session attach/detach
//!
//! Every conference session gets its own controller running on a dedicated
//! task. Samples and timer firings are handled one at a time on that task;
//! detaching unsubscribes, aborts every pending timer and drops the
//! controller, so the next session starts again at `Normal`.

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::config::GovernorConfig;
use crate::context::ContextReader;
use crate::controller::{DebounceElapsed, QualityController};
use crate::effects::{ConferenceSession, MediaEffects};
use crate::error::Result;
use crate::level::QualityLevel;
use crate::session::hub::{QualityEventSource, Subscription};

/// Factory for per-session controllers
pub struct QualityGovernor {
    config: GovernorConfig,
    context: Arc<dyn ContextReader>,
    effects: Arc<dyn MediaEffects>,
}

impl QualityGovernor {
    /// Create a governor, validating the config first
    pub fn new(
        config: GovernorConfig,
        context: Arc<dyn ContextReader>,
        effects: Arc<dyn MediaEffects>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            context,
            effects,
        })
    }

    pub fn config(&self) -> &GovernorConfig {
        &self.config
    }

    /// Start governing `session`, fed by `source`
    ///
    /// Must be called from within a tokio runtime.
    pub fn attach(
        &self,
        session: &Arc<dyn ConferenceSession>,
        source: &dyn QualityEventSource,
    ) -> SessionHandle {
        let subscription = source.subscribe();
        let (controller, timers) = QualityController::new(
            &self.config,
            Arc::downgrade(session),
            self.effects.clone(),
            self.context.clone(),
        );
        let level_rx = controller.subscribe_level();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let session_id = session.id().to_string();
        tracing::info!(session = %session_id, "Quality governor attached");

        let task = tokio::spawn(run_session(
            session_id.clone(),
            controller,
            subscription,
            timers,
            shutdown_rx,
        ));

        SessionHandle {
            session_id,
            level_rx,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }
}

async fn run_session(
    session_id: String,
    mut controller: QualityController,
    mut subscription: Subscription,
    mut timers: mpsc::UnboundedReceiver<DebounceElapsed>,
    mut shutdown: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => break,

            Some(fired) = timers.recv() => controller.on_debounce_elapsed(fired),

            event = subscription.recv() => match event {
                Some(event) => controller.handle_event(&event),
                None => {
                    tracing::debug!(session = %session_id, "Quality event source closed");
                    break;
                }
            },
        }
    }

    controller.cancel_all();
    subscription.unsubscribe();
    tracing::info!(
        session = %session_id,
        level = %controller.current_level(),
        "Quality governor detached"
    );
}

/// Handle to a governed session
///
/// Dropping the handle also tears the session down.
pub struct SessionHandle {
    session_id: String,
    level_rx: watch::Receiver<QualityLevel>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl SessionHandle {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Last committed level
    pub fn current_level(&self) -> QualityLevel {
        *self.level_rx.borrow()
    }

    /// Receiver updated on every committed level change
    pub fn watch(&self) -> watch::Receiver<QualityLevel> {
        self.level_rx.clone()
    }

    /// Unsubscribe, cancel pending timers and wait for the task to finish
    ///
    /// Returns the level that was committed when the session ended.
    pub async fn detach(mut self) -> QualityLevel {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(session = %self.session_id, "Session task failed: {}", e);
            }
        }
        self.current_level()
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}
