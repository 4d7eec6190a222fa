//! palay-pipeline: Pure HSV leaf-color analysis pipeline (sans-IO).
//!
//! Classifies a rice-leaf photograph as showing tungro infection or
//! healthy tissue, from raw pixel data alone, through:
//! HSV conversion -> plant segmentation -> yellow-range analysis ->
//! threshold decision.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! rasters and returns structured data. Image decoding, persistence,
//! and alert dispatch are the caller's concern.

pub mod decision;
pub mod diagnostics;
pub mod hsv;
pub mod mask;
pub mod ranges;
pub mod types;
pub mod yellow;

pub use diagnostics::{Clock, DetectionDiagnostics, SystemClock, detect_with_diagnostics};
pub use ranges::{HsvRange, YellowRange};
pub use types::{
    DetectError, DetectionResult, DetectorConfig, HsvPixel, PlantMask, Prediction, RgbImage,
    YellowAnalysis,
};

/// Run the full detection pipeline over one decoded raster.
///
/// The run is timed with [`SystemClock`]; use
/// [`detect_with_clock`] to supply a different timer.
///
/// # Pipeline steps
///
/// 1. Convert the raster to per-pixel HSV samples
/// 2. Build the plant-tissue mask and count plant pixels
/// 3. With zero plant pixels, return healthy at 95% confidence
///    immediately; an image without tissue cannot evidence disease
/// 4. Score yellow discoloration per configured range
/// 5. Apply the threshold cascade and confidence scoring
///
/// Every invocation is independent and allocates its own
/// intermediates; a shared config is read-only, so concurrent calls
/// need no coordination.
///
/// # Errors
///
/// Returns [`DetectError::Processing`] if an internal consistency
/// check fails during analysis. No partial result is produced.
pub fn detect(
    image: &RgbImage,
    config: &DetectorConfig,
) -> Result<DetectionResult, DetectError> {
    detect_with_clock(image, config, &SystemClock)
}

/// Run the full detection pipeline, timing it with the given clock.
///
/// See [`detect`] for the pipeline steps and semantics.
///
/// # Errors
///
/// Returns [`DetectError::Processing`] if an internal consistency
/// check fails during analysis.
pub fn detect_with_clock<C: Clock>(
    image: &RgbImage,
    config: &DetectorConfig,
    clock: &C,
) -> Result<DetectionResult, DetectError> {
    let start = clock.now();

    let samples = hsv::convert(image);
    let plant_mask = mask::build(&samples, config);
    let total_plant_pixels = plant_mask.plant_pixel_count();

    if total_plant_pixels == 0 {
        return Ok(DetectionResult {
            prediction: Prediction::Healthy,
            confidence: decision::NO_PLANT_CONFIDENCE,
            yellow_analysis: YellowAnalysis::empty(),
            processing_time_seconds: clock.elapsed(&start).as_secs_f64(),
        });
    }

    let (mut analysis, _ranges) =
        yellow::analyze(&samples, &plant_mask, total_plant_pixels, config)?;
    let decided = decision::decide(&mut analysis, config);

    Ok(DetectionResult {
        prediction: decided.prediction,
        confidence: decided.confidence,
        yellow_analysis: analysis,
        processing_time_seconds: clock.elapsed(&start).as_secs_f64(),
    })
}

/// Run detection over a raw interleaved RGB buffer.
///
/// The buffer must hold exactly `width * height * 3` bytes in
/// row-major R,G,B order. The bytes are copied into a fresh raster;
/// the caller keeps ownership of its slice.
///
/// # Errors
///
/// Returns [`DetectError::EmptyInput`] if `data` is empty,
/// [`DetectError::RasterLayout`] if the byte count does not match the
/// declared dimensions, and [`DetectError::Processing`] if analysis
/// fails.
pub fn detect_raw(
    width: u32,
    height: u32,
    data: &[u8],
    config: &DetectorConfig,
) -> Result<DetectionResult, DetectError> {
    if data.is_empty() {
        return Err(DetectError::EmptyInput);
    }

    let expected = u64::from(width) * u64::from(height) * 3;
    let actual = data.len() as u64;
    if actual != expected {
        return Err(DetectError::RasterLayout { expected, actual });
    }

    let image = RgbImage::from_raw(width, height, data.to_vec())
        .ok_or_else(|| DetectError::Processing("raster construction failed".to_string()))?;
    detect(&image, config)
}
