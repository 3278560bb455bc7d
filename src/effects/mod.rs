//! Side-effect sinks driven by the controller
//!
//! The controller never changes media routing itself. It asks the active
//! conference session for a receiver constraint and asks the application
//! for audio-only mode and user notifications.

pub mod logging;
pub mod recording;

use std::time::Duration;

use crate::constants::{NETWORK_CRITICAL_UID, NETWORK_UNSTABLE_UID, NOTIFICATION_TIMEOUT_MS};
use crate::error::SessionError;

pub use logging::{LoggingEffects, LoggingSession};
pub use recording::{Effect, RecordingEffects};

/// The active conference session
pub trait ConferenceSession: Send + Sync {
    /// Session identifier used in logs
    fn id(&self) -> &str;

    /// Limit the maximum received video height
    fn set_receiver_max_height(&self, max_height: u32) -> Result<(), SessionError>;
}

/// Application-level effects
pub trait MediaEffects: Send + Sync {
    fn set_audio_only(&self, enabled: bool);

    fn notify(&self, notification: Notification);
}

/// Transient user notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub uid: String,
    pub title_key: String,
    pub description_key: String,
    /// How long the notification stays on screen
    pub timeout: Duration,
}

impl Notification {
    /// Emitted on entering audio-only because of critical loss
    pub fn network_critical() -> Self {
        Self {
            uid: NETWORK_CRITICAL_UID.to_string(),
            title_key: "notify.networkCriticalTitle".to_string(),
            description_key: "notify.networkCriticalDescription".to_string(),
            timeout: Duration::from_millis(NOTIFICATION_TIMEOUT_MS),
        }
    }

    /// Emitted on dropping to the low tier
    pub fn network_unstable() -> Self {
        Self {
            uid: NETWORK_UNSTABLE_UID.to_string(),
            title_key: "notify.networkUnstableTitle".to_string(),
            description_key: "notify.networkUnstableDescription".to_string(),
            timeout: Duration::from_millis(NOTIFICATION_TIMEOUT_MS),
        }
    }
}
