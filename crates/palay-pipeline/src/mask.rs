//! Plant-tissue segmentation.
//!
//! Classifies each HSV sample as plant tissue or background by
//! membership in any of the configured plant acceptance ranges, then
//! rejects pixels below the brightness floor so underexposed
//! background cannot pass as tissue on hue alone.

use crate::types::{DetectorConfig, HsvPixel, PlantMask};

/// Build the plant mask for one image.
///
/// A pixel is plant tissue iff it falls inside any configured plant
/// range and its value is at least `config.value_floor`. Membership is
/// all that matters; which range matched is not recorded.
#[must_use = "returns the per-pixel plant mask"]
pub fn build(samples: &[HsvPixel], config: &DetectorConfig) -> PlantMask {
    let flags = samples
        .iter()
        .map(|&px| {
            px.v >= config.value_floor
                && config.plant_ranges.iter().any(|range| range.contains(px))
        })
        .collect();
    PlantMask::new(flags)
}
