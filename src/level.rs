//! Quality tiers and their loss thresholds
//!
//! Each tier carries the packet-loss percentage a sample must exceed to
//! qualify for it, how long that tendency must persist before it is
//! committed, and the receiver height constraint it maps to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::constants::*;
use crate::error::ConfigError;

/// Degraded-quality tier, ordered by severity (`Normal` lowest)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum QualityLevel {
    #[default]
    Normal,
    Standard,
    Low,
    Critical,
}

impl QualityLevel {
    /// All levels from least to most severe
    pub const ALL: [QualityLevel; 4] = [
        QualityLevel::Normal,
        QualityLevel::Standard,
        QualityLevel::Low,
        QualityLevel::Critical,
    ];

    /// Severity rank, 0 for `Normal`
    pub fn rank(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QualityLevel::Normal => "normal",
            QualityLevel::Standard => "standard",
            QualityLevel::Low => "low",
            QualityLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-level tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelProfile {
    /// Loss percentage a sample must strictly exceed to qualify
    pub loss_threshold: f64,
    /// Milliseconds the tendency must persist before commit
    pub debounce_ms: u64,
    /// Receiver height constraint; 0 means audio-only
    pub max_height: u32,
}

impl LevelProfile {
    pub const fn new(loss_threshold: f64, debounce_ms: u64, max_height: u32) -> Self {
        Self {
            loss_threshold,
            debounce_ms,
            max_height,
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn is_audio_only(&self) -> bool {
        self.max_height == 0
    }
}

/// Full table of level profiles
///
/// Debounce windows are not monotonic in severity. `Standard` has the
/// shortest window and `Normal` the longest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelTable {
    pub normal: LevelProfile,
    pub standard: LevelProfile,
    pub low: LevelProfile,
    pub critical: LevelProfile,
}

impl Default for LevelTable {
    fn default() -> Self {
        Self {
            normal: LevelProfile::new(0.0, NORMAL_DEBOUNCE_MS, NORMAL_MAX_HEIGHT),
            standard: LevelProfile::new(
                STANDARD_LOSS_THRESHOLD,
                STANDARD_DEBOUNCE_MS,
                STANDARD_MAX_HEIGHT,
            ),
            low: LevelProfile::new(LOW_LOSS_THRESHOLD, LOW_DEBOUNCE_MS, LOW_MAX_HEIGHT),
            critical: LevelProfile::new(CRITICAL_LOSS_THRESHOLD, CRITICAL_DEBOUNCE_MS, 0),
        }
    }
}

impl LevelTable {
    /// Get the profile for a level
    pub fn profile(&self, level: QualityLevel) -> &LevelProfile {
        match level {
            QualityLevel::Normal => &self.normal,
            QualityLevel::Standard => &self.standard,
            QualityLevel::Low => &self.low,
            QualityLevel::Critical => &self.critical,
        }
    }

    /// Map a loss percentage to the most severe level whose threshold it exceeds
    pub fn classify(&self, loss_percent: f64) -> QualityLevel {
        QualityLevel::ALL
            .iter()
            .rev()
            .copied()
            .find(|level| loss_percent > self.profile(*level).loss_threshold)
            .unwrap_or(QualityLevel::Normal)
    }

    /// Longest debounce window across all levels
    pub fn max_debounce(&self) -> Duration {
        QualityLevel::ALL
            .iter()
            .map(|level| self.profile(*level).debounce())
            .max()
            .unwrap_or_default()
    }

    /// Check that thresholds are usable and strictly increase with severity,
    /// and that only `Critical` is audio-only
    pub fn validate(&self) -> Result<(), ConfigError> {
        for level in QualityLevel::ALL {
            let profile = self.profile(level);
            if !profile.loss_threshold.is_finite() || profile.loss_threshold < 0.0 {
                return Err(ConfigError::InvalidThreshold {
                    level,
                    value: profile.loss_threshold,
                });
            }
            if profile.debounce_ms == 0 {
                return Err(ConfigError::ZeroDebounce(level));
            }
            if profile.is_audio_only() != (level == QualityLevel::Critical) {
                return Err(ConfigError::AudioOnlyMismatch {
                    level,
                    max_height: profile.max_height,
                });
            }
        }

        for pair in QualityLevel::ALL.windows(2) {
            let (lower, higher) = (pair[0], pair[1]);
            if self.profile(lower).loss_threshold >= self.profile(higher).loss_threshold {
                return Err(ConfigError::ThresholdOrder { lower, higher });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_classify_examples() {
        let table = LevelTable::default();
        assert_eq!(table.classify(6.0), QualityLevel::Low);
        assert_eq!(table.classify(16.0), QualityLevel::Critical);
        assert_eq!(table.classify(1.0), QualityLevel::Normal);
    }

    #[test]
    fn test_classify_boundaries() {
        let table = LevelTable::default();
        assert_eq!(table.classify(0.0), QualityLevel::Normal);
        assert_eq!(table.classify(1.9), QualityLevel::Normal);
        assert_eq!(table.classify(2.0), QualityLevel::Normal);
        assert_eq!(table.classify(2.1), QualityLevel::Standard);
        assert_eq!(table.classify(5.0), QualityLevel::Standard);
        assert_eq!(table.classify(5.1), QualityLevel::Low);
        assert_eq!(table.classify(15.0), QualityLevel::Low);
        assert_eq!(table.classify(15.1), QualityLevel::Critical);
        assert_eq!(table.classify(100.0), QualityLevel::Critical);
    }

    #[test]
    fn test_default_debounce_asymmetry() {
        let table = LevelTable::default();
        assert!(table.standard.debounce() < table.normal.debounce());
        assert!(table.standard.debounce() < table.critical.debounce());
        assert_eq!(table.max_debounce(), table.normal.debounce());
    }

    #[test]
    fn test_critical_is_audio_only() {
        let table = LevelTable::default();
        assert!(table.critical.is_audio_only());
        assert!(!table.low.is_audio_only());
    }

    #[test]
    fn test_level_ordering() {
        assert!(QualityLevel::Normal < QualityLevel::Standard);
        assert!(QualityLevel::Low < QualityLevel::Critical);
        assert_eq!(QualityLevel::Critical.rank(), 3);
        assert_eq!(QualityLevel::default(), QualityLevel::Normal);
    }

    #[test]
    fn test_validate_rejects_unordered_thresholds() {
        let mut table = LevelTable::default();
        table.low.loss_threshold = 1.0;
        assert!(matches!(
            table.validate(),
            Err(ConfigError::ThresholdOrder {
                lower: QualityLevel::Standard,
                higher: QualityLevel::Low,
            })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut table = LevelTable::default();
        table.critical.loss_threshold = f64::NAN;
        assert!(matches!(table.validate(), Err(ConfigError::InvalidThreshold { .. })));

        let mut table = LevelTable::default();
        table.standard.debounce_ms = 0;
        assert!(matches!(
            table.validate(),
            Err(ConfigError::ZeroDebounce(QualityLevel::Standard))
        ));

        assert!(LevelTable::default().validate().is_ok());
    }

    #[test]
    fn test_validate_audio_only_reserved_for_critical() {
        let mut table = LevelTable::default();
        table.low.max_height = 0;
        assert!(matches!(
            table.validate(),
            Err(ConfigError::AudioOnlyMismatch {
                level: QualityLevel::Low,
                max_height: 0,
            })
        ));

        let mut table = LevelTable::default();
        table.critical.max_height = 720;
        assert!(matches!(
            table.validate(),
            Err(ConfigError::AudioOnlyMismatch {
                level: QualityLevel::Critical,
                max_height: 720,
            })
        ));
    }

    proptest! {
        #[test]
        fn classify_is_monotonic(a in 0.0f64..100.0, b in 0.0f64..100.0) {
            let table = LevelTable::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(table.classify(lo) <= table.classify(hi));
        }
    }
}
