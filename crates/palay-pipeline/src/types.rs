//! Shared types for the palay detection pipeline.

use serde::{Deserialize, Serialize};

use crate::ranges::{self, HsvRange, YellowRange};

/// Re-export `RgbImage` so downstream crates can hand rasters to the
/// pipeline without depending on `image` directly.
pub use image::RgbImage;

/// One pixel in HSV space, scaled to the byte ranges used by the
/// acceptance tables.
///
/// `h` is the hue in degrees halved and rounded (0-180), `s` and `v`
/// are saturation and value scaled to 0-255.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsvPixel {
    /// Hue, half-degrees (0-180).
    pub h: u8,
    /// Saturation (0-255).
    pub s: u8,
    /// Value / brightness (0-255).
    pub v: u8,
}

impl HsvPixel {
    /// Create a new HSV pixel.
    #[must_use]
    pub const fn new(h: u8, s: u8, v: u8) -> Self {
        Self { h, s, v }
    }
}

/// Per-pixel plant-tissue classification for one image.
///
/// One boolean per pixel, `true` iff the pixel was accepted as plant
/// tissue. Same pixel ordering as the source raster. Immutable after
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlantMask(Vec<bool>);

impl PlantMask {
    /// Wrap a per-pixel boolean vector as a mask.
    #[must_use]
    pub const fn new(flags: Vec<bool>) -> Self {
        Self(flags)
    }

    /// Number of entries (equal to the image pixel count).
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the mask covers zero pixels.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the pixel at `index` is plant tissue.
    ///
    /// Out-of-range indices are treated as background.
    #[must_use]
    pub fn is_plant(&self, index: usize) -> bool {
        self.0.get(index).copied().unwrap_or(false)
    }

    /// Number of pixels classified as plant tissue.
    #[must_use]
    pub fn plant_pixel_count(&self) -> u64 {
        self.0.iter().filter(|&&flag| flag).count() as u64
    }

    /// Per-pixel flags, in raster order.
    #[must_use]
    pub fn flags(&self) -> &[bool] {
        &self.0
    }
}

/// Classification outcome for one leaf image.
///
/// Serializes to the exact lowercase literals `"tungro"` and
/// `"healthy"`; downstream alerting matches on the substring `tungro`,
/// so these strings must never change shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Prediction {
    /// Yellow discoloration consistent with tungro infection.
    Tungro,
    /// No sufficient evidence of infection.
    Healthy,
}

impl Prediction {
    /// The wire literal for this prediction.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tungro => "tungro",
            Self::Healthy => "healthy",
        }
    }
}

impl std::fmt::Display for Prediction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregated yellow-discoloration metrics for one image.
///
/// Produced by the analyzer with `confidence` at zero and
/// `is_detected` false; the decision stage writes both back so the
/// record is self-consistent with the top-level prediction.
///
/// `yellow_pixels_total` sums matches across all yellow sub-ranges and
/// a pixel inside several overlapping ranges is counted once per range,
/// so `yellow_area_percentage` can exceed 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YellowAnalysis {
    /// Yellow matches as a percentage of plant pixels (may exceed 100).
    pub yellow_area_percentage: f64,
    /// Maximum per-range intensity, in [0, 1].
    pub yellow_intensity_score: f64,
    /// Sum of per-range match counts.
    pub yellow_pixels_total: u64,
    /// Pixels classified as plant tissue.
    pub total_plant_pixels: u64,
    /// Decision confidence as a fraction, written back by the decision
    /// stage.
    pub confidence: f64,
    /// Whether tungro was detected, written back by the decision stage.
    pub is_detected: bool,
    /// Placeholder, currently always `"none"`.
    pub severity: String,
    /// Maximum per-range intensity (same value as
    /// `yellow_intensity_score`).
    pub max_intensity: f64,
    /// Mean of the nonzero per-range intensities.
    pub avg_intensity: f64,
}

impl YellowAnalysis {
    /// An all-zero analysis, used when no plant tissue was found.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            yellow_area_percentage: 0.0,
            yellow_intensity_score: 0.0,
            yellow_pixels_total: 0,
            total_plant_pixels: 0,
            confidence: 0.0,
            is_detected: false,
            severity: "none".to_string(),
            max_intensity: 0.0,
            avg_intensity: 0.0,
        }
    }
}

/// Final result of one detection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    /// The classification outcome.
    pub prediction: Prediction,
    /// Confidence as an integer percentage (0-100).
    pub confidence: u8,
    /// The underlying discoloration metrics.
    pub yellow_analysis: YellowAnalysis,
    /// Wall-clock duration of the detection run in seconds.
    ///
    /// Serialized as `processingTimeSeconds` to match the persisted
    /// record consumed downstream.
    #[serde(rename = "processingTimeSeconds")]
    pub processing_time_seconds: f64,
}

/// Configuration for one detection run.
///
/// A config value is immutable for the duration of a call; sharing one
/// across threads is safe because nothing in the pipeline mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Brightness floor: pixels with `v` below this are never plant
    /// tissue, regardless of hue and saturation.
    pub value_floor: u8,

    /// Intensity at or above which tungro is called on intensity alone.
    pub high_intensity_threshold: f64,

    /// Minimum intensity for the moderate-intensity decision path.
    pub min_intensity_score: f64,

    /// Minimum yellow area percentage for the moderate-intensity
    /// decision path.
    pub min_area_percentage: f64,

    /// Relative weight of intensity evidence.
    ///
    /// Not consulted by the decision cascade, which applies hard
    /// thresholds rather than a weighted blend. Retained for
    /// configuration compatibility.
    pub intensity_weight: f64,

    /// Relative weight of area evidence. See `intensity_weight`.
    pub area_weight: f64,

    /// HSV acceptance ranges for plant tissue.
    pub plant_ranges: Vec<HsvRange>,

    /// Named HSV ranges for yellow discoloration, broadest first.
    pub yellow_ranges: Vec<YellowRange>,
}

impl DetectorConfig {
    /// Default brightness floor for plant-tissue acceptance.
    pub const DEFAULT_VALUE_FLOOR: u8 = 50;
    /// Default intensity threshold for the intensity-only tungro path.
    pub const DEFAULT_HIGH_INTENSITY_THRESHOLD: f64 = 0.35;
    /// Default minimum intensity for the moderate path.
    pub const DEFAULT_MIN_INTENSITY_SCORE: f64 = 0.25;
    /// Default minimum area percentage for the moderate path.
    pub const DEFAULT_MIN_AREA_PERCENTAGE: f64 = 0.5;
    /// Default intensity weight.
    pub const DEFAULT_INTENSITY_WEIGHT: f64 = 0.95;
    /// Default area weight.
    pub const DEFAULT_AREA_WEIGHT: f64 = 0.05;
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            value_floor: Self::DEFAULT_VALUE_FLOOR,
            high_intensity_threshold: Self::DEFAULT_HIGH_INTENSITY_THRESHOLD,
            min_intensity_score: Self::DEFAULT_MIN_INTENSITY_SCORE,
            min_area_percentage: Self::DEFAULT_MIN_AREA_PERCENTAGE,
            intensity_weight: Self::DEFAULT_INTENSITY_WEIGHT,
            area_weight: Self::DEFAULT_AREA_WEIGHT,
            plant_ranges: ranges::default_plant_ranges(),
            yellow_ranges: ranges::default_yellow_ranges(),
        }
    }
}

/// Errors that can occur during a detection run.
///
/// All variants are unrecoverable within the pipeline: the run aborts
/// and no partial result is produced.
#[derive(Debug, thiserror::Error, Serialize, Deserialize)]
pub enum DetectError {
    /// The raster data was empty.
    #[error("input raster data is empty")]
    EmptyInput,

    /// The raster byte count does not match the declared dimensions.
    #[error("raster layout mismatch: expected {expected} bytes, got {actual}")]
    RasterLayout {
        /// Expected byte count (`width * height * 3`).
        expected: u64,
        /// Actual byte count supplied.
        actual: u64,
    },

    /// An internal consistency check failed during analysis.
    #[error("processing failed: {0}")]
    Processing(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // --- HsvPixel ---

    #[test]
    fn hsv_pixel_new() {
        let px = HsvPixel::new(30, 200, 150);
        assert_eq!(px.h, 30);
        assert_eq!(px.s, 200);
        assert_eq!(px.v, 150);
    }

    // --- PlantMask ---

    #[test]
    fn plant_mask_counts_and_indexing() {
        let mask = PlantMask::new(vec![true, false, true, true]);
        assert_eq!(mask.len(), 4);
        assert!(!mask.is_empty());
        assert_eq!(mask.plant_pixel_count(), 3);
        assert!(mask.is_plant(0));
        assert!(!mask.is_plant(1));
    }

    #[test]
    fn plant_mask_out_of_range_is_background() {
        let mask = PlantMask::new(vec![true]);
        assert!(!mask.is_plant(5));
    }

    #[test]
    fn plant_mask_empty() {
        let mask = PlantMask::new(vec![]);
        assert!(mask.is_empty());
        assert_eq!(mask.plant_pixel_count(), 0);
    }

    // --- Prediction ---

    #[test]
    fn prediction_wire_literals() {
        assert_eq!(Prediction::Tungro.as_str(), "tungro");
        assert_eq!(Prediction::Healthy.as_str(), "healthy");
        assert_eq!(Prediction::Tungro.to_string(), "tungro");
    }

    #[test]
    fn prediction_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Prediction::Tungro).unwrap(),
            "\"tungro\"",
        );
        assert_eq!(
            serde_json::to_string(&Prediction::Healthy).unwrap(),
            "\"healthy\"",
        );
    }

    // --- YellowAnalysis ---

    #[test]
    fn empty_analysis_is_all_zero() {
        let analysis = YellowAnalysis::empty();
        assert_eq!(analysis.yellow_pixels_total, 0);
        assert_eq!(analysis.total_plant_pixels, 0);
        assert!((analysis.yellow_area_percentage).abs() < f64::EPSILON);
        assert!((analysis.yellow_intensity_score).abs() < f64::EPSILON);
        assert!(!analysis.is_detected);
        assert_eq!(analysis.severity, "none");
    }

    #[test]
    fn analysis_wire_field_names() {
        let json = serde_json::to_value(YellowAnalysis::empty()).unwrap();
        let object = json.as_object().unwrap();
        for key in [
            "yellow_area_percentage",
            "yellow_intensity_score",
            "yellow_pixels_total",
            "total_plant_pixels",
            "confidence",
            "is_detected",
            "severity",
            "max_intensity",
            "avg_intensity",
        ] {
            assert!(object.contains_key(key), "missing wire field {key}");
        }
    }

    // --- DetectionResult ---

    #[test]
    fn result_serializes_processing_time_camel_case() {
        let result = DetectionResult {
            prediction: Prediction::Healthy,
            confidence: 95,
            yellow_analysis: YellowAnalysis::empty(),
            processing_time_seconds: 0.25,
        };
        let json = serde_json::to_value(&result).unwrap();
        let object = json.as_object().unwrap();
        assert!(object.contains_key("processingTimeSeconds"));
        assert!(!object.contains_key("processing_time_seconds"));
    }

    #[test]
    fn result_serde_round_trip() {
        let result = DetectionResult {
            prediction: Prediction::Tungro,
            confidence: 83,
            yellow_analysis: YellowAnalysis::empty(),
            processing_time_seconds: 1.5,
        };
        let json = serde_json::to_string(&result).unwrap();
        let back: DetectionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result, back);
    }

    // --- DetectorConfig ---

    #[test]
    fn config_defaults_match_consts() {
        let config = DetectorConfig::default();
        assert_eq!(config.value_floor, DetectorConfig::DEFAULT_VALUE_FLOOR);
        assert!(
            (config.high_intensity_threshold - DetectorConfig::DEFAULT_HIGH_INTENSITY_THRESHOLD)
                .abs()
                < f64::EPSILON,
        );
        assert!(
            (config.min_intensity_score - DetectorConfig::DEFAULT_MIN_INTENSITY_SCORE).abs()
                < f64::EPSILON,
        );
        assert!(
            (config.min_area_percentage - DetectorConfig::DEFAULT_MIN_AREA_PERCENTAGE).abs()
                < f64::EPSILON,
        );
        assert_eq!(config.plant_ranges.len(), 3);
        assert_eq!(config.yellow_ranges.len(), 4);
    }

    #[test]
    fn config_serde_round_trip() {
        let config = DetectorConfig {
            value_floor: 40,
            high_intensity_threshold: 0.4,
            ..DetectorConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: DetectorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }

    // --- DetectError ---

    #[test]
    fn error_display_strings() {
        assert_eq!(
            DetectError::EmptyInput.to_string(),
            "input raster data is empty",
        );
        assert_eq!(
            DetectError::RasterLayout {
                expected: 12,
                actual: 11,
            }
            .to_string(),
            "raster layout mismatch: expected 12 bytes, got 11",
        );
        assert_eq!(
            DetectError::Processing("sample count mismatch".to_string()).to_string(),
            "processing failed: sample count mismatch",
        );
    }
}
