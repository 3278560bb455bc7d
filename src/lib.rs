//! # Video Quality Governor
//!
//! Loss-driven adaptive video quality for conference sessions.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                    Quality event source (session::hub)               │
//! │          (quality_score, stats.packet_loss: 6 | { total: 6 })        │
//! └──────────────────────────────────┬───────────────────────────────────┘
//!                                    │ Subscription (owned handle)
//!                                    ▼
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                 Session task (session::governor)                     │
//! │                                                                      │
//! │   ┌──────────────┐  accept   ┌──────────────┐   target  ┌──────────┐ │
//! │   │     Gate     │──────────▶│   classify   │──────────▶│ schedule │ │
//! │   │  (gate.rs)   │           │  (level.rs)  │           │          │ │
//! │   └──────┬───────┘           └──────────────┘           └────┬─────┘ │
//! │          │ drop                                              │       │
//! │          ▼                          one debounce timer,      ▼       │
//! │      (ignored)                      others cancelled   ┌──────────┐  │
//! │                                                        │  apply   │  │
//! │                                                        └────┬─────┘  │
//! └─────────────────────────────────────────────────────────────┼────────┘
//!                                                               │
//!                    ┌──────────────────────────┬───────────────┴──────┐
//!                    ▼                          ▼                      ▼
//!          ┌──────────────────┐     ┌──────────────────────┐  ┌───────────────┐
//!          │ audio-only on/off│     │ receiver max height  │  │ notification  │
//!          │  (MediaEffects)  │     │ (ConferenceSession)  │  │ (MediaEffects)│
//!          └──────────────────┘     └──────────────────────┘  └───────────────┘
//! ```
//!
//! | level    | loss above | debounce | max height |
//! |----------|-----------:|---------:|-----------:|
//! | normal   | –          | 15 s     | 720        |
//! | standard | 2 %        | 5 s      | 360        |
//! | low      | 5 %        | 10 s     | 180        |
//! | critical | 15 %       | 10 s     | audio-only |

pub mod config;
pub mod context;
pub mod controller;
pub mod effects;
pub mod error;
pub mod gate;
pub mod level;
pub mod session;
pub mod stats;

pub use config::GovernorConfig;
pub use context::{AppContext, ContextReader, SharedContext};
pub use controller::QualityController;
pub use error::{Error, Result};
pub use level::{LevelProfile, LevelTable, QualityLevel};
pub use session::{
    QualityEventHub, QualityEventSource, QualityGovernor, SessionHandle, Subscription,
};
pub use stats::{PacketLoss, QualityEvent};

/// Default tuning
pub mod constants {
    /// Loss percentage above which `Standard` applies
    pub const STANDARD_LOSS_THRESHOLD: f64 = 2.0;

    /// Loss percentage above which `Low` applies
    pub const LOW_LOSS_THRESHOLD: f64 = 5.0;

    /// Loss percentage above which `Critical` applies
    pub const CRITICAL_LOSS_THRESHOLD: f64 = 15.0;

    pub const NORMAL_DEBOUNCE_MS: u64 = 15_000;
    pub const STANDARD_DEBOUNCE_MS: u64 = 5_000;
    pub const LOW_DEBOUNCE_MS: u64 = 10_000;
    pub const CRITICAL_DEBOUNCE_MS: u64 = 10_000;

    pub const NORMAL_MAX_HEIGHT: u32 = 720;
    pub const STANDARD_MAX_HEIGHT: u32 = 360;
    pub const LOW_MAX_HEIGHT: u32 = 180;

    /// Notification id for critical loss
    pub const NETWORK_CRITICAL_UID: &str = "network-critical";

    /// Notification id for unstable network
    pub const NETWORK_UNSTABLE_UID: &str = "network-unstable";

    /// On-screen time of the built-in notifications
    pub const NOTIFICATION_TIMEOUT_MS: u64 = 2_000;
}
