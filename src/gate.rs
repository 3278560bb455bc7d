//! Sample gate
//!
//! Decides whether a quality sample may influence the controller at all.
//! Dropped samples leave every piece of controller state untouched.

use std::fmt;

use crate::context::AppContext;
use crate::stats::QualityEvent;

/// Why a sample was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    Disabled,
    PeerToPeer,
    MalformedLoss,
    UserAudioOnly,
    PinnedLowDefinition,
    ScreenSharing,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            DropReason::Disabled => "adaptive quality disabled",
            DropReason::PeerToPeer => "peer-to-peer session",
            DropReason::MalformedLoss => "no usable packet loss",
            DropReason::UserAudioOnly => "user forced audio-only",
            DropReason::PinnedLowDefinition => "user pinned low definition",
            DropReason::ScreenSharing => "screen-share active",
        };
        f.write_str(reason)
    }
}

/// Gate outcome
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateDecision {
    /// Sample accepted with its normalized loss percentage
    Accept(f64),
    Drop(DropReason),
}

/// Evaluate a sample against the current context
pub fn evaluate(context: &AppContext, event: &QualityEvent) -> GateDecision {
    if !context.adaptive_enabled {
        return GateDecision::Drop(DropReason::Disabled);
    }
    if context.peer_to_peer {
        return GateDecision::Drop(DropReason::PeerToPeer);
    }
    let Some(loss) = event.loss_percent() else {
        return GateDecision::Drop(DropReason::MalformedLoss);
    };
    if context.user_audio_only {
        return GateDecision::Drop(DropReason::UserAudioOnly);
    }
    if context.pinned_low_definition {
        return GateDecision::Drop(DropReason::PinnedLowDefinition);
    }
    if context.screen_share_active {
        return GateDecision::Drop(DropReason::ScreenSharing);
    }
    GateDecision::Accept(loss)
}

/// Whether the sample should be classified
pub fn should_evaluate(context: &AppContext, event: &QualityEvent) -> bool {
    matches!(evaluate(context, event), GateDecision::Accept(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::PacketLoss;

    fn event(loss: f64) -> QualityEvent {
        QualityEvent::with_loss(loss)
    }

    #[test]
    fn test_accepts_default_context() {
        let context = AppContext::default();
        assert_eq!(evaluate(&context, &event(3.0)), GateDecision::Accept(3.0));
        assert!(should_evaluate(&context, &event(0.0)));
    }

    #[test]
    fn test_each_condition_drops() {
        let cases = [
            (
                AppContext {
                    adaptive_enabled: false,
                    ..AppContext::default()
                },
                DropReason::Disabled,
            ),
            (
                AppContext {
                    peer_to_peer: true,
                    ..AppContext::default()
                },
                DropReason::PeerToPeer,
            ),
            (
                AppContext {
                    user_audio_only: true,
                    ..AppContext::default()
                },
                DropReason::UserAudioOnly,
            ),
            (
                AppContext {
                    pinned_low_definition: true,
                    ..AppContext::default()
                },
                DropReason::PinnedLowDefinition,
            ),
            (
                AppContext {
                    screen_share_active: true,
                    ..AppContext::default()
                },
                DropReason::ScreenSharing,
            ),
        ];

        for (context, reason) in cases {
            assert_eq!(evaluate(&context, &event(99.0)), GateDecision::Drop(reason));
            assert!(!should_evaluate(&context, &event(99.0)));
        }
    }

    #[test]
    fn test_malformed_loss_dropped() {
        let context = AppContext::default();
        let unusable = QualityEvent::with_loss(PacketLoss::Unrecognized(serde_json::json!("n/a")));
        assert_eq!(
            evaluate(&context, &unusable),
            GateDecision::Drop(DropReason::MalformedLoss)
        );
        assert!(!should_evaluate(&context, &event(f64::NAN)));
    }

    #[test]
    fn test_disabled_checked_first() {
        let context = AppContext {
            adaptive_enabled: false,
            peer_to_peer: true,
            screen_share_active: true,
            ..AppContext::default()
        };
        assert_eq!(
            evaluate(&context, &event(50.0)),
            GateDecision::Drop(DropReason::Disabled)
        );
    }

    #[test]
    fn test_audio_only_effect_does_not_gate() {
        let context = AppContext {
            audio_only_active: true,
            ..AppContext::default()
        };
        assert!(should_evaluate(&context, &event(0.0)));
    }
}
