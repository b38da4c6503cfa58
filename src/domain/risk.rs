//! Risk banding and the scoring result.
//!
//! Maps the classifier probability to a risk category and guidance text.

use serde::{Deserialize, Serialize};

use super::ScoringError;

/// Probability at or above which the binary decision is positive.
///
/// Fixed; independent of the banding thresholds below.
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Risk category for diabetes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskCategory {
    /// Probability below 0.33
    Low,
    /// Probability in [0.33, 0.66)
    Medium,
    /// Probability in [0.66, 1.0]
    High,
}

impl RiskCategory {
    /// Get a human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Low => "Low risk - keep healthy habits",
            Self::Medium => "Moderate risk - lifestyle review suggested",
            Self::High => "High risk - discuss screening with a clinician",
        }
    }

    /// Display colour (RGB).
    #[must_use]
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            Self::Low => (46, 204, 113),    // #2ECC71
            Self::Medium => (241, 196, 15), // #F1C40F
            Self::High => (231, 76, 60),    // #E74C3C
        }
    }
}

impl std::fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

/// One row of the banding table.
#[derive(Debug, Clone, Copy)]
pub struct RiskBand {
    /// Exclusive upper bound; `None` closes the band at 1.0 inclusive.
    pub upper_bound: Option<f64>,
    pub category: RiskCategory,
    pub guidance: &'static [&'static str],
}

impl RiskBand {
    fn contains(&self, p: f64) -> bool {
        self.upper_bound.map_or(true, |upper| p < upper)
    }
}

/// Bands in ascending order. Lower bounds are the previous row's upper bound.
pub static RISK_BANDS: [RiskBand; 3] = [
    RiskBand {
        upper_bound: Some(0.33),
        category: RiskCategory::Low,
        guidance: &[
            "Risk appears low based on the inputs.",
            "Keep healthy habits and schedule regular checkups.",
        ],
    },
    RiskBand {
        upper_bound: Some(0.66),
        category: RiskCategory::Medium,
        guidance: &[
            "Risk appears moderate based on the inputs.",
            "Consider lifestyle improvements and consult a clinician if concerned.",
        ],
    },
    RiskBand {
        upper_bound: None,
        category: RiskCategory::High,
        guidance: &[
            "Risk appears high based on the inputs.",
            "It may be worth discussing screening/testing with a medical professional.",
        ],
    },
];

/// Look up the band containing `p`.
///
/// Plain `<` comparisons, no tolerance: `0.33` is Medium and `0.66` is High.
///
/// # Errors
/// Returns `ScoringError::InvariantViolation` if `p` is NaN or outside [0, 1].
pub fn band(p: f64) -> Result<&'static RiskBand, ScoringError> {
    if !(0.0..=1.0).contains(&p) {
        return Err(ScoringError::invariant(format!(
            "Probability {p} outside [0, 1]"
        )));
    }

    RISK_BANDS
        .iter()
        .find(|b| b.contains(p))
        .ok_or_else(|| ScoringError::invariant(format!("No risk band covers {p}")))
}

/// Outcome of one scoring call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringResult {
    /// Probability of the positive class (0.0 to 1.0)
    pub probability: f64,

    /// `probability >= DECISION_THRESHOLD`
    pub decision: bool,

    pub risk_category: RiskCategory,

    /// Ordered, non-empty guidance messages for the category
    pub guidance: Vec<&'static str>,
}

impl ScoringResult {
    /// Build a result from a classifier probability.
    ///
    /// # Errors
    /// Returns `ScoringError::InvariantViolation` if `probability` is outside [0, 1].
    pub fn from_probability(probability: f64) -> Result<Self, ScoringError> {
        let band = band(probability)?;
        Ok(Self {
            probability,
            decision: probability >= DECISION_THRESHOLD,
            risk_category: band.category,
            guidance: band.guidance.to_vec(),
        })
    }

    /// Probability as a percentage.
    #[must_use]
    pub fn percent(&self) -> f64 {
        self.probability * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(p: f64) -> RiskCategory {
        band(p).expect("in range").category
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(category(0.0), RiskCategory::Low);
        assert_eq!(category(0.329999), RiskCategory::Low);
        assert_eq!(category(0.33), RiskCategory::Medium);
        assert_eq!(category(0.659999), RiskCategory::Medium);
        assert_eq!(category(0.66), RiskCategory::High);
        assert_eq!(category(1.0), RiskCategory::High);
    }

    #[test]
    fn test_bands_cover_unit_interval_in_order() {
        let mut previous = RiskCategory::Low;
        for i in 0..=10_000 {
            let p = f64::from(i) / 10_000.0;
            let c = category(p);
            assert!(c >= previous, "bands must be monotonic at p={p}");
            previous = c;
        }
        assert_eq!(previous, RiskCategory::High);
    }

    #[test]
    fn test_out_of_range_probability_is_invariant_violation() {
        for p in [-0.0001, 1.0001, f64::NAN, f64::INFINITY] {
            match band(p) {
                Err(ScoringError::InvariantViolation(_)) => {}
                other => panic!("expected invariant violation for {p}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_guidance_is_non_empty_for_every_band() {
        for b in &RISK_BANDS {
            assert!(!b.guidance.is_empty());
            assert!(b.guidance.iter().all(|g| !g.is_empty()));
        }
    }

    #[test]
    fn test_decision_threshold() {
        assert!(ScoringResult::from_probability(0.5).unwrap().decision);
        assert!(!ScoringResult::from_probability(0.499999).unwrap().decision);
        assert!(ScoringResult::from_probability(1.0).unwrap().decision);
        assert!(!ScoringResult::from_probability(0.0).unwrap().decision);
    }

    #[test]
    fn test_result_carries_band_guidance() {
        let result = ScoringResult::from_probability(0.72).unwrap();
        assert_eq!(result.risk_category, RiskCategory::High);
        assert_eq!(result.guidance, RISK_BANDS[2].guidance.to_vec());
        assert!((result.percent() - 72.0).abs() < 1e-9);
    }

    #[test]
    fn test_display() {
        assert_eq!(RiskCategory::Medium.to_string(), "Medium");
    }
}
