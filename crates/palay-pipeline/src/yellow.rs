//! Yellow-discoloration analysis over plant-masked pixels.
//!
//! Each configured yellow range is evaluated independently against the
//! plant pixels: matches are counted and their saturation and value
//! averaged, giving a per-range intensity. The aggregate keeps the
//! maximum intensity as the image's score and the sum of per-range
//! counts as the yellow pixel total.
//!
//! Ranges may overlap, and a pixel inside several ranges is counted
//! once per range. The area percentage therefore has no upper bound at
//! 100; consumers treat it as a relative signal, not a proportion.

use serde::{Deserialize, Serialize};

use crate::types::{DetectError, DetectorConfig, HsvPixel, PlantMask, YellowAnalysis};

/// Normalization for per-range intensity: full-scale saturation times
/// full-scale value.
const INTENSITY_NORM: f64 = 255.0 * 255.0;

/// Statistics for one yellow range with at least one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeStats {
    /// Label of the matched range, e.g. `"intense_yellow"`.
    pub label: String,
    /// Number of plant pixels inside the range.
    pub pixel_count: u64,
    /// Mean saturation of the matched pixels (0-255).
    pub mean_saturation: f64,
    /// Mean value of the matched pixels (0-255).
    pub mean_value: f64,
    /// `mean_saturation * mean_value / 255^2`, in [0, 1].
    pub intensity: f64,
}

/// Analyze yellow discoloration within the plant mask.
///
/// Returns the aggregate analysis (with `confidence`/`is_detected`
/// still unset) plus per-range statistics for the ranges that matched
/// at least one pixel. Ranges with zero matches contribute nothing to
/// the maximum or the nonzero-mean intensity.
///
/// # Errors
///
/// Returns [`DetectError::Processing`] if `samples` and `mask`
/// disagree on pixel count.
#[allow(clippy::cast_precision_loss)]
pub fn analyze(
    samples: &[HsvPixel],
    mask: &PlantMask,
    total_plant_pixels: u64,
    config: &DetectorConfig,
) -> Result<(YellowAnalysis, Vec<RangeStats>), DetectError> {
    if samples.len() != mask.len() {
        return Err(DetectError::Processing(format!(
            "HSV sample count {} does not match plant mask length {}",
            samples.len(),
            mask.len(),
        )));
    }

    let mut yellow_pixels_total = 0u64;
    let mut max_intensity = 0.0f64;
    let mut intensity_sum = 0.0f64;
    let mut per_range = Vec::with_capacity(config.yellow_ranges.len());

    for range in &config.yellow_ranges {
        let mut pixel_count = 0u64;
        let mut saturation_sum = 0u64;
        let mut value_sum = 0u64;

        for (index, &px) in samples.iter().enumerate() {
            if mask.is_plant(index) && range.bounds.contains(px) {
                pixel_count += 1;
                saturation_sum += u64::from(px.s);
                value_sum += u64::from(px.v);
            }
        }

        yellow_pixels_total += pixel_count;
        if pixel_count == 0 {
            continue;
        }

        let mean_saturation = saturation_sum as f64 / pixel_count as f64;
        let mean_value = value_sum as f64 / pixel_count as f64;
        let intensity = mean_saturation * mean_value / INTENSITY_NORM;

        max_intensity = max_intensity.max(intensity);
        intensity_sum += intensity;
        per_range.push(RangeStats {
            label: range.label.clone(),
            pixel_count,
            mean_saturation,
            mean_value,
            intensity,
        });
    }

    let yellow_area_percentage = if total_plant_pixels > 0 {
        yellow_pixels_total as f64 / total_plant_pixels as f64 * 100.0
    } else {
        0.0
    };
    let avg_intensity = if per_range.is_empty() {
        0.0
    } else {
        intensity_sum / per_range.len() as f64
    };

    let analysis = YellowAnalysis {
        yellow_area_percentage,
        yellow_intensity_score: max_intensity,
        yellow_pixels_total,
        total_plant_pixels,
        confidence: 0.0,
        is_detected: false,
        severity: "none".to_string(),
        max_intensity,
        avg_intensity,
    };

    Ok((analysis, per_range))
}
