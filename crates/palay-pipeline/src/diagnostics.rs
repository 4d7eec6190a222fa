//! Detection diagnostics: timing, counts, and per-range metrics.
//!
//! These diagnostics are permanent instrumentation for threshold
//! tuning and field validation. [`detect_with_diagnostics`] runs the
//! same pipeline as [`detect`](crate::detect) while recording how long
//! each stage took and what it found.
//!
//! Timestamps are captured through the [`Clock`] trait so the pure
//! crate does not hard-bind a platform timer; [`SystemClock`] is the
//! `std::time::Instant` implementation used by default. Durations are
//! serialized as fractional seconds (`f64`) for JSON compatibility.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::{
    DetectError, DetectionResult, DetectorConfig, Prediction, RgbImage, YellowAnalysis,
};
use crate::yellow::RangeStats;
use crate::{decision, hsv, mask, yellow};

/// Source of timestamps for duration measurement.
pub trait Clock {
    /// Opaque instant type produced by [`now`](Self::now).
    type Instant;

    /// The current instant.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// [`Clock`] backed by [`std::time::Instant`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    type Instant = std::time::Instant;

    fn now(&self) -> std::time::Instant {
        std::time::Instant::now()
    }

    fn elapsed(&self, since: &std::time::Instant) -> Duration {
        since.elapsed()
    }
}

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single detection run.
///
/// Stages that are skipped on the no-plant early exit have `Option`
/// fields that are `None` when the stage did not run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionDiagnostics {
    /// Stage 0: RGB to HSV conversion.
    pub convert: StageDiagnostics,
    /// Stage 1: plant-tissue segmentation.
    pub mask: StageDiagnostics,
    /// Stage 2: yellow-range analysis (`None` when no plant tissue was
    /// found).
    pub analysis: Option<StageDiagnostics>,
    /// Stage 3: decision cascade (`None` when no plant tissue was
    /// found).
    pub decision: Option<StageDiagnostics>,
    /// Total wall-clock duration of the run (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary of the run.
    pub summary: DetectionSummary,
}

/// Diagnostics for a single stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics that vary by pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// HSV conversion metrics.
    Convert {
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
        /// Total pixel count (`width * height`).
        pixel_count: u64,
    },
    /// Plant segmentation metrics.
    Mask {
        /// Pixels classified as plant tissue.
        plant_pixel_count: u64,
        /// Total pixel count.
        total_pixel_count: u64,
        /// Plant pixels as a percentage of the image.
        plant_density: f64,
    },
    /// Yellow-range analysis metrics.
    Analysis {
        /// Per-range statistics for ranges with at least one match.
        ranges: Vec<RangeStats>,
        /// Sum of per-range match counts.
        yellow_pixels_total: u64,
        /// Yellow area as a percentage of plant pixels.
        area_percentage: f64,
        /// Maximum per-range intensity.
        intensity_score: f64,
        /// Mean of the nonzero per-range intensities.
        avg_intensity: f64,
    },
    /// Decision cascade metrics.
    Decision {
        /// The classification.
        prediction: Prediction,
        /// Confidence as an integer percentage.
        confidence: u8,
        /// Whether the intensity-only rule fired (as opposed to the
        /// intensity-plus-area rule).
        intensity_only: bool,
    },
}

/// High-level summary of a detection run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionSummary {
    /// Source image width in pixels.
    pub image_width: u32,
    /// Source image height in pixels.
    pub image_height: u32,
    /// Total pixel count.
    pub pixel_count: u64,
    /// Pixels classified as plant tissue.
    pub plant_pixel_count: u64,
    /// The final classification.
    pub prediction: Prediction,
    /// Final confidence as an integer percentage.
    pub confidence: u8,
}

impl DetectionDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Detection Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Image: {}x{} ({} pixels)",
            self.summary.image_width, self.summary.image_height, self.summary.pixel_count,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<18} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(76));

        let total_ms = duration_ms(self.total_duration);
        let stages: Vec<(&str, &StageDiagnostics)> = {
            let mut s = vec![("Convert", &self.convert), ("Plant Mask", &self.mask)];
            if let Some(ref a) = self.analysis {
                s.push(("Yellow Analysis", a));
            }
            if let Some(ref d) = self.decision {
                s.push(("Decision", d));
            }
            s
        };

        for (name, diag) in &stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<18} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        if let Some(ref stage) = self.analysis
            && let StageMetrics::Analysis { ref ranges, .. } = stage.metrics
        {
            lines.push(String::new());
            for range in ranges {
                lines.push(format!(
                    "{}: {} pixels, intensity {:.3}",
                    range.label, range.pixel_count, range.intensity,
                ));
            }
        }

        lines.push(String::new());
        lines.push(format!(
            "Prediction: {} ({}%)  |  Plant pixels: {}",
            self.summary.prediction, self.summary.confidence, self.summary.plant_pixel_count,
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Convert { width, height, .. } => format!("{width}x{height}"),
        StageMetrics::Mask {
            plant_pixel_count,
            total_pixel_count,
            plant_density,
        } => {
            format!("plant={plant_pixel_count}/{total_pixel_count} ({plant_density:.1}%)")
        }
        StageMetrics::Analysis {
            ranges,
            yellow_pixels_total,
            area_percentage,
            intensity_score,
            ..
        } => {
            format!(
                "{} ranges, yellow={yellow_pixels_total} area={area_percentage:.2}% intensity={intensity_score:.3}",
                ranges.len(),
            )
        }
        StageMetrics::Decision {
            prediction,
            confidence,
            intensity_only,
        } => {
            let rule = if *intensity_only {
                "intensity"
            } else {
                "intensity+area"
            };
            format!("{prediction} ({confidence}%) via {rule}")
        }
    }
}

/// Run the detection pipeline, collecting per-stage diagnostics.
///
/// Produces exactly the same [`DetectionResult`] as
/// [`detect_with_clock`](crate::detect_with_clock) for the same input.
///
/// # Errors
///
/// Returns [`DetectError`] if the analysis stage fails; no partial
/// diagnostics are produced.
#[allow(clippy::cast_precision_loss)]
pub fn detect_with_diagnostics<C: Clock>(
    image: &RgbImage,
    config: &DetectorConfig,
    clock: &C,
) -> Result<(DetectionResult, DetectionDiagnostics), DetectError> {
    let run_start = clock.now();
    let pixel_count = u64::from(image.width()) * u64::from(image.height());

    let stage_start = clock.now();
    let samples = hsv::convert(image);
    let convert = StageDiagnostics {
        duration: clock.elapsed(&stage_start),
        metrics: StageMetrics::Convert {
            width: image.width(),
            height: image.height(),
            pixel_count,
        },
    };

    let stage_start = clock.now();
    let plant_mask = mask::build(&samples, config);
    let plant_pixel_count = plant_mask.plant_pixel_count();
    let plant_density = if pixel_count > 0 {
        plant_pixel_count as f64 / pixel_count as f64 * 100.0
    } else {
        0.0
    };
    let mask_diag = StageDiagnostics {
        duration: clock.elapsed(&stage_start),
        metrics: StageMetrics::Mask {
            plant_pixel_count,
            total_pixel_count: pixel_count,
            plant_density,
        },
    };

    if plant_pixel_count == 0 {
        let total_duration = clock.elapsed(&run_start);
        let result = DetectionResult {
            prediction: Prediction::Healthy,
            confidence: decision::NO_PLANT_CONFIDENCE,
            yellow_analysis: YellowAnalysis::empty(),
            processing_time_seconds: total_duration.as_secs_f64(),
        };
        let diagnostics = DetectionDiagnostics {
            convert,
            mask: mask_diag,
            analysis: None,
            decision: None,
            total_duration,
            summary: DetectionSummary {
                image_width: image.width(),
                image_height: image.height(),
                pixel_count,
                plant_pixel_count: 0,
                prediction: result.prediction,
                confidence: result.confidence,
            },
        };
        return Ok((result, diagnostics));
    }

    let stage_start = clock.now();
    let (mut analysis, range_stats) =
        yellow::analyze(&samples, &plant_mask, plant_pixel_count, config)?;
    let analysis_diag = StageDiagnostics {
        duration: clock.elapsed(&stage_start),
        metrics: StageMetrics::Analysis {
            ranges: range_stats,
            yellow_pixels_total: analysis.yellow_pixels_total,
            area_percentage: analysis.yellow_area_percentage,
            intensity_score: analysis.yellow_intensity_score,
            avg_intensity: analysis.avg_intensity,
        },
    };

    let stage_start = clock.now();
    let intensity_only = analysis.yellow_intensity_score >= config.high_intensity_threshold;
    let decided = decision::decide(&mut analysis, config);
    let decision_diag = StageDiagnostics {
        duration: clock.elapsed(&stage_start),
        metrics: StageMetrics::Decision {
            prediction: decided.prediction,
            confidence: decided.confidence,
            intensity_only,
        },
    };

    let total_duration = clock.elapsed(&run_start);
    let result = DetectionResult {
        prediction: decided.prediction,
        confidence: decided.confidence,
        yellow_analysis: analysis,
        processing_time_seconds: total_duration.as_secs_f64(),
    };
    let diagnostics = DetectionDiagnostics {
        convert,
        mask: mask_diag,
        analysis: Some(analysis_diag),
        decision: Some(decision_diag),
        total_duration,
        summary: DetectionSummary {
            image_width: image.width(),
            image_height: image.height(),
            pixel_count,
            plant_pixel_count,
            prediction: result.prediction,
            confidence: result.confidence,
        },
    };
    Ok((result, diagnostics))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// [`Clock`] that reports a fixed 5ms for every elapsed query.
    struct FixedClock;

    impl Clock for FixedClock {
        type Instant = ();

        fn now(&self) {}

        fn elapsed(&self, _since: &()) -> Duration {
            Duration::from_millis(5)
        }
    }

    /// Uniform image in a tungro-grade yellow: HSV (18, 199, 220).
    fn intense_yellow_image(width: u32, height: u32) -> RgbImage {
        RgbImage::from_pixel(width, height, image::Rgb([220, 150, 48]))
    }

    /// Uniform healthy-green image: HSV (64, 170, 180).
    fn green_image(width: u32, height: u32) -> RgbImage {
        RgbImage::from_pixel(width, height, image::Rgb([60, 180, 75]))
    }

    #[test]
    fn early_exit_skips_analysis_and_decision() {
        let image = RgbImage::from_pixel(4, 4, image::Rgb([0, 0, 0]));
        let (result, diagnostics) =
            detect_with_diagnostics(&image, &DetectorConfig::default(), &FixedClock).unwrap();

        assert_eq!(result.prediction, Prediction::Healthy);
        assert_eq!(result.confidence, 95);
        assert!(diagnostics.analysis.is_none());
        assert!(diagnostics.decision.is_none());
        assert_eq!(diagnostics.summary.plant_pixel_count, 0);
    }

    #[test]
    fn full_run_records_every_stage() {
        let image = intense_yellow_image(8, 8);
        let (result, diagnostics) =
            detect_with_diagnostics(&image, &DetectorConfig::default(), &FixedClock).unwrap();

        assert_eq!(result.prediction, Prediction::Tungro);
        assert!(diagnostics.analysis.is_some());
        assert!(diagnostics.decision.is_some());
        assert_eq!(diagnostics.summary.pixel_count, 64);
        assert_eq!(diagnostics.summary.plant_pixel_count, 64);
        assert_eq!(diagnostics.summary.prediction, result.prediction);
        assert_eq!(diagnostics.summary.confidence, result.confidence);
    }

    #[test]
    fn fixed_clock_yields_deterministic_timing() {
        let image = green_image(4, 4);
        let (result, diagnostics) =
            detect_with_diagnostics(&image, &DetectorConfig::default(), &FixedClock).unwrap();

        assert!((result.processing_time_seconds - 0.005).abs() < 1e-12);
        assert_eq!(diagnostics.total_duration, Duration::from_millis(5));
        assert_eq!(diagnostics.convert.duration, Duration::from_millis(5));
    }

    #[test]
    fn result_matches_plain_detect() {
        let image = intense_yellow_image(6, 6);
        let config = DetectorConfig::default();

        let plain = crate::detect_with_clock(&image, &config, &FixedClock).unwrap();
        let (instrumented, _) = detect_with_diagnostics(&image, &config, &FixedClock).unwrap();

        assert_eq!(plain, instrumented);
    }

    #[test]
    fn decision_metrics_name_the_rule() {
        let image = intense_yellow_image(4, 4);
        let (_, diagnostics) =
            detect_with_diagnostics(&image, &DetectorConfig::default(), &FixedClock).unwrap();

        let decision = diagnostics.decision.unwrap();
        assert!(matches!(
            decision.metrics,
            StageMetrics::Decision {
                intensity_only: true,
                ..
            },
        ));
    }

    #[test]
    fn report_names_stages_and_ranges() {
        let image = intense_yellow_image(4, 4);
        let (_, diagnostics) =
            detect_with_diagnostics(&image, &DetectorConfig::default(), &FixedClock).unwrap();

        let report = diagnostics.report();
        assert!(report.contains("Detection Diagnostics Report"));
        assert!(report.contains("Plant Mask"));
        assert!(report.contains("Yellow Analysis"));
        assert!(report.contains("intense_yellow"));
        assert!(report.contains("Prediction: tungro"));
    }

    #[test]
    fn diagnostics_serde_round_trip() {
        let image = intense_yellow_image(4, 4);
        let (_, diagnostics) =
            detect_with_diagnostics(&image, &DetectorConfig::default(), &FixedClock).unwrap();

        let json = serde_json::to_string(&diagnostics).unwrap();
        let back: DetectionDiagnostics = serde_json::from_str(&json).unwrap();
        assert_eq!(back.summary.pixel_count, 16);
        assert_eq!(back.total_duration, diagnostics.total_duration);
        assert!(back.analysis.is_some());
    }
}
