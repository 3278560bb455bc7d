//! Sinks that only log, used by the replay tool

use std::sync::Arc;

use crate::context::SharedContext;
use crate::effects::{ConferenceSession, MediaEffects, Notification};
use crate::error::SessionError;

/// Application effects that log and track audio-only state
pub struct LoggingEffects {
    context: Arc<SharedContext>,
}

impl LoggingEffects {
    pub fn new(context: Arc<SharedContext>) -> Self {
        Self { context }
    }
}

impl MediaEffects for LoggingEffects {
    fn set_audio_only(&self, enabled: bool) {
        self.context.set_audio_only_active(enabled);
        tracing::info!("Audio-only mode {}", if enabled { "on" } else { "off" });
    }

    fn notify(&self, notification: Notification) {
        tracing::info!(
            uid = %notification.uid,
            timeout = ?notification.timeout,
            "Notification: {}",
            notification.title_key
        );
    }
}

/// Conference session that logs receiver constraints
pub struct LoggingSession {
    id: String,
}

impl LoggingSession {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl ConferenceSession for LoggingSession {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_receiver_max_height(&self, max_height: u32) -> Result<(), SessionError> {
        tracing::info!(session = %self.id, "Receiver constraint: max height {}", max_height);
        Ok(())
    }
}
