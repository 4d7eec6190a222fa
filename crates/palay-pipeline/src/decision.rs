//! Threshold cascade and confidence scoring.
//!
//! Two paths lead to a tungro call: intensity alone at or above the
//! high threshold, or moderate intensity corroborated by sufficient
//! affected area. Everything else is healthy. Confidence is driven by
//! intensity on both paths, floored so a positive call is never
//! reported as a coin flip.

use crate::types::{DetectorConfig, Prediction, YellowAnalysis};

/// Confidence reported when an image contains no plant tissue at all.
///
/// High but not absolute: absence of tissue cannot evidence disease,
/// but neither does it prove health.
pub const NO_PLANT_CONFIDENCE: u8 = 95;

/// Minimum confidence for any positive tungro call.
const TUNGRO_CONFIDENCE_FLOOR: u8 = 70;
/// Minimum confidence for a healthy call.
const HEALTHY_CONFIDENCE_FLOOR: u8 = 75;
/// Intensity at which tungro confidence saturates at 100.
const CONFIDENCE_FULL_SCALE_INTENSITY: f64 = 0.5;
/// Confidence points deducted per unit of residual intensity on the
/// healthy path.
const HEALTHY_INTENSITY_PENALTY: f64 = 200.0;

/// Outcome of the decision cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// The classification.
    pub prediction: Prediction,
    /// Confidence as an integer percentage (0-100).
    pub confidence: u8,
}

/// Run the decision cascade over an analysis and write the outcome
/// back into it.
///
/// The first matching rule wins:
///
/// 1. `intensity >= config.high_intensity_threshold`: tungro on
///    intensity alone, independent of area.
/// 2. `intensity >= config.min_intensity_score` and
///    `area >= config.min_area_percentage`: tungro.
/// 3. Otherwise healthy.
///
/// The analysis record's `is_detected` flag and fractional
/// `confidence` are updated so the returned record is self-consistent
/// with the decision: a tungro call stores `confidence / 100`, a
/// healthy call stores `(100 - confidence) / 100` (the residual
/// suspicion, not the certainty of health).
pub fn decide(analysis: &mut YellowAnalysis, config: &DetectorConfig) -> Decision {
    let intensity = analysis.yellow_intensity_score;
    let area = analysis.yellow_area_percentage;

    let is_tungro = intensity >= config.high_intensity_threshold
        || (intensity >= config.min_intensity_score && area >= config.min_area_percentage);

    let (prediction, confidence) = if is_tungro {
        (Prediction::Tungro, tungro_confidence(intensity))
    } else {
        (Prediction::Healthy, healthy_confidence(intensity))
    };

    analysis.is_detected = is_tungro;
    analysis.confidence = if is_tungro {
        f64::from(confidence) / 100.0
    } else {
        f64::from(100 - confidence) / 100.0
    };

    Decision {
        prediction,
        confidence,
    }
}

/// Confidence for a tungro call: intensity scaled so that
/// [`CONFIDENCE_FULL_SCALE_INTENSITY`] maps to 100, floored at
/// [`TUNGRO_CONFIDENCE_FLOOR`].
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn tungro_confidence(intensity: f64) -> u8 {
    let scaled = (intensity / CONFIDENCE_FULL_SCALE_INTENSITY).min(1.0);
    let percent = (scaled * 100.0).round() as u8;
    percent.max(TUNGRO_CONFIDENCE_FLOOR)
}

/// Confidence for a healthy call: drops as residual yellow intensity
/// rises, floored at [`HEALTHY_CONFIDENCE_FLOOR`].
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn healthy_confidence(intensity: f64) -> u8 {
    let penalty = (intensity * HEALTHY_INTENSITY_PENALTY).round();
    (100.0 - penalty).max(f64::from(HEALTHY_CONFIDENCE_FLOOR)) as u8
}
