//! Connection quality samples
//!
//! Event sources report packet loss either as a flat percentage or as a
//! `{ "total": .. }` object. Both shapes are accepted at the boundary and
//! normalized once by [`PacketLoss::percent`]; anything else is kept as
//! [`PacketLoss::Unrecognized`] and carries no signal.

use serde::{Deserialize, Serialize};

/// Packet loss as reported by the event source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PacketLoss {
    Flat(f64),
    Structured { total: f64 },
    Unrecognized(serde_json::Value),
}

impl PacketLoss {
    /// Normalized loss percentage, `None` if the value is not usable
    pub fn percent(&self) -> Option<f64> {
        let value = match self {
            PacketLoss::Flat(value) => *value,
            PacketLoss::Structured { total } => *total,
            PacketLoss::Unrecognized(_) => return None,
        };
        (value.is_finite() && value >= 0.0).then_some(value)
    }
}

impl From<f64> for PacketLoss {
    fn from(value: f64) -> Self {
        PacketLoss::Flat(value)
    }
}

/// Connection statistics attached to a quality event
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConnectionStats {
    #[serde(default, alias = "packetLoss", skip_serializing_if = "Option::is_none")]
    pub packet_loss: Option<PacketLoss>,
}

/// One sample from the quality event source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityEvent {
    /// Source-computed connection score, not used for classification
    #[serde(default, alias = "qualityScore")]
    pub quality_score: f64,
    #[serde(default)]
    pub stats: ConnectionStats,
}

impl QualityEvent {
    /// Event carrying only a packet loss value
    pub fn with_loss(loss: impl Into<PacketLoss>) -> Self {
        Self {
            quality_score: 0.0,
            stats: ConnectionStats {
                packet_loss: Some(loss.into()),
            },
        }
    }

    /// Parse a JSON-encoded event
    pub fn from_json(source: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn loss_percent(&self) -> Option<f64> {
        self.stats.packet_loss.as_ref().and_then(PacketLoss::percent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_and_structured_shapes() {
        let flat =
            QualityEvent::from_json(r#"{"quality_score": 80, "stats": {"packet_loss": 6}}"#)
                .unwrap();
        assert_eq!(flat.loss_percent(), Some(6.0));

        let structured = QualityEvent::from_json(
            r#"{"qualityScore": 40, "stats": {"packetLoss": {"total": 16.5, "upload": 3}}}"#,
        )
        .unwrap();
        assert_eq!(
            structured.stats.packet_loss,
            Some(PacketLoss::Structured { total: 16.5 })
        );
        assert_eq!(structured.loss_percent(), Some(16.5));
    }

    #[test]
    fn test_unrecognized_shapes_carry_no_signal() {
        for body in [
            r#"{"stats": {"packet_loss": "12"}}"#,
            r#"{"stats": {"packet_loss": {"download": 4}}}"#,
            r#"{"stats": {"packet_loss": [1, 2]}}"#,
            r#"{"stats": {}}"#,
            r#"{}"#,
        ] {
            let event = QualityEvent::from_json(body).unwrap();
            assert_eq!(event.loss_percent(), None, "{}", body);
        }
    }

    #[test]
    fn test_non_finite_and_negative_rejected() {
        assert_eq!(PacketLoss::Flat(f64::NAN).percent(), None);
        assert_eq!(PacketLoss::Flat(f64::INFINITY).percent(), None);
        assert_eq!(PacketLoss::Structured { total: -1.0 }.percent(), None);
        assert_eq!(PacketLoss::Flat(0.0).percent(), Some(0.0));
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(QualityEvent::from_json("{not json").is_err());
    }
}
