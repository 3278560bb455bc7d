//! Conference session wiring

pub mod governor;
pub mod hub;

pub use governor::{QualityGovernor, SessionHandle};
pub use hub::{QualityEventHub, QualityEventSource, Subscription};
