//! Application context read on every sample

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Snapshot of the application state the gate and controller consult
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppContext {
    /// Feature flag for adaptive quality
    pub adaptive_enabled: bool,
    /// Direct peer-to-peer topology instead of a relaying server
    pub peer_to_peer: bool,
    /// User manually switched to audio-only
    pub user_audio_only: bool,
    /// User pinned the lowest-definition tier
    pub pinned_low_definition: bool,
    /// A screen-share track is being sent
    pub screen_share_active: bool,
    /// Audio-only mode is currently in effect, whoever enabled it
    pub audio_only_active: bool,
}

impl Default for AppContext {
    fn default() -> Self {
        Self {
            adaptive_enabled: true,
            peer_to_peer: false,
            user_audio_only: false,
            pinned_low_definition: false,
            screen_share_active: false,
            audio_only_active: false,
        }
    }
}

/// Synchronous read access to application state
pub trait ContextReader: Send + Sync {
    fn snapshot(&self) -> AppContext;
}

/// In-process context store
#[derive(Debug, Default)]
pub struct SharedContext {
    inner: RwLock<AppContext>,
}

impl SharedContext {
    /// Mutate the stored context in place
    pub fn update(&self, f: impl FnOnce(&mut AppContext)) {
        f(&mut self.inner.write());
    }

    /// Replace the user-controlled flags, keeping the effective audio-only state
    pub fn apply_overrides(&self, overrides: AppContext) {
        self.update(|context| {
            let audio_only_active = context.audio_only_active;
            *context = overrides;
            context.audio_only_active = audio_only_active;
        });
    }

    pub fn set_audio_only_active(&self, active: bool) {
        self.inner.write().audio_only_active = active;
    }
}

impl ContextReader for SharedContext {
    fn snapshot(&self) -> AppContext {
        *self.inner.read()
    }
}
