//! Sink that records every effect in order
//!
//! Used for dry runs and tests. One instance can stand in for both the
//! conference session and the application effects.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::context::SharedContext;
use crate::effects::{ConferenceSession, MediaEffects, Notification};
use crate::error::SessionError;

/// A recorded side effect
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    AudioOnly(bool),
    ReceiverMaxHeight(u32),
    Notification(Notification),
}

/// Recording sink
#[derive(Default)]
pub struct RecordingEffects {
    id: String,
    effects: Mutex<Vec<Effect>>,
    /// Mirror audio-only changes into this context
    context: Option<Arc<SharedContext>>,
    reject_constraints: AtomicBool,
}

impl RecordingEffects {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Keep `audio_only_active` in the given context in sync
    pub fn with_context(mut self, context: Arc<SharedContext>) -> Self {
        self.context = Some(context);
        self
    }

    /// Make subsequent constraint pushes fail
    pub fn set_reject_constraints(&self, reject: bool) {
        self.reject_constraints.store(reject, Ordering::Relaxed);
    }

    /// Copy of all effects so far
    pub fn effects(&self) -> Vec<Effect> {
        self.effects.lock().clone()
    }

    /// Remove and return all effects so far
    pub fn take(&self) -> Vec<Effect> {
        std::mem::take(&mut *self.effects.lock())
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.effects
            .lock()
            .iter()
            .filter_map(|effect| match effect {
                Effect::Notification(notification) => Some(notification.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.lock().is_empty()
    }

    fn record(&self, effect: Effect) {
        self.effects.lock().push(effect);
    }
}

impl ConferenceSession for RecordingEffects {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_receiver_max_height(&self, max_height: u32) -> Result<(), SessionError> {
        if self.reject_constraints.load(Ordering::Relaxed) {
            return Err(SessionError::ConstraintRejected(format!(
                "max height {} refused by {}",
                max_height, self.id
            )));
        }
        self.record(Effect::ReceiverMaxHeight(max_height));
        Ok(())
    }
}

impl MediaEffects for RecordingEffects {
    fn set_audio_only(&self, enabled: bool) {
        if let Some(context) = &self.context {
            context.set_audio_only_active(enabled);
        }
        self.record(Effect::AudioOnly(enabled));
    }

    fn notify(&self, notification: Notification) {
        self.record(Effect::Notification(notification));
    }
}
