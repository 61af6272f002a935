//! Result of comparing developer activity against an external metric.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::models::{entity::EntityId, period::Period};

/// Qualitative band of the strongest coefficient in a [`CorrelationResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    Weak,
    Moderate,
    Notable,
    Strong,
}

impl Strength {
    /// Bands `|r|`: below 0.3 weak, below 0.5 moderate, below 0.7 notable, else strong.
    pub fn from_coefficient(r: f64) -> Self {
        let r = if r.is_finite() { r.abs() } else { 0.0 };
        if r < 0.3 {
            Strength::Weak
        } else if r < 0.5 {
            Strength::Moderate
        } else if r < 0.7 {
            Strength::Notable
        } else {
            Strength::Strong
        }
    }

    pub fn sentence(self) -> &'static str {
        match self {
            Strength::Weak => {
                "Weak correlation: developer activity shows little linear relationship with this metric."
            }
            Strength::Moderate => {
                "Moderate correlation: developer activity and this metric tend to move together on some days."
            }
            Strength::Notable => {
                "Notable correlation: developer activity tracks this metric fairly consistently."
            }
            Strength::Strong => {
                "Strong correlation: developer activity and this metric move closely together."
            }
        }
    }
}

/// `{entityId, period, correlations, confidence, dataPoints, interpretation}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationResult {
    pub entity_id: EntityId,
    pub period: Period,
    /// Pair name (e.g. `commits_price`) to Pearson coefficient in `[-1, 1]`.
    pub correlations: IndexMap<String, f64>,
    /// In `[0, 1]`; see [`crate::correlation::confidence`].
    pub confidence: f64,
    /// Number of date-aligned point pairs the coefficients were computed on.
    pub data_points: usize,
    pub interpretation: String,
}

impl CorrelationResult {
    /// The coefficient with the largest magnitude, `0.0` when there are none.
    pub fn strongest(&self) -> f64 {
        self.correlations
            .values()
            .copied()
            .filter(|r| r.is_finite())
            .fold(0.0_f64, |best, r| if r.abs() > best.abs() { r } else { best })
    }

    pub fn strength(&self) -> Strength {
        Strength::from_coefficient(self.strongest())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_follow_thresholds() {
        assert_eq!(Strength::from_coefficient(0.0), Strength::Weak);
        assert_eq!(Strength::from_coefficient(-0.29), Strength::Weak);
        assert_eq!(Strength::from_coefficient(0.3), Strength::Moderate);
        assert_eq!(Strength::from_coefficient(-0.55), Strength::Notable);
        assert_eq!(Strength::from_coefficient(0.7), Strength::Strong);
        assert_eq!(Strength::from_coefficient(f64::NAN), Strength::Weak);
    }

    #[test]
    fn strongest_keeps_sign() {
        let mut correlations = IndexMap::new();
        correlations.insert("commits_price".to_string(), 0.4);
        correlations.insert("stars_price".to_string(), -0.8);
        let result = CorrelationResult {
            entity_id: EntityId::new("bitcoin").unwrap(),
            period: Period::Month,
            correlations,
            confidence: 0.9,
            data_points: 30,
            interpretation: String::new(),
        };
        assert_eq!(result.strongest(), -0.8);
        assert_eq!(result.strength(), Strength::Strong);
    }

    #[test]
    fn wire_shape_is_camel_case() {
        let json = r#"{
            "entityId": "bitcoin",
            "period": 7,
            "correlations": {"commits_price": 0.5},
            "confidence": 0.8,
            "dataPoints": 7,
            "interpretation": "x"
        }"#;
        let result: CorrelationResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.period, Period::Week);
        assert_eq!(result.data_points, 7);
    }
}
