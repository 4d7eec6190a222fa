//! HSV acceptance ranges for plant tissue and yellow discoloration.
//!
//! Matching is table-driven: each rule is an inclusive lower/upper
//! bound triple over (h, s, v), and a pixel matches a rule iff every
//! component falls inside its bounds. The tables below are the
//! defaults; callers can supply their own via
//! [`DetectorConfig`](crate::DetectorConfig).

use serde::{Deserialize, Serialize};

use crate::types::HsvPixel;

/// An inclusive HSV bound triple.
///
/// Components are ordered (h, s, v), on the same scales as
/// [`HsvPixel`]: hue in half-degrees (0-180), saturation and value in
/// 0-255.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsvRange {
    /// Inclusive lower bounds (h, s, v).
    pub lower: [u8; 3],
    /// Inclusive upper bounds (h, s, v).
    pub upper: [u8; 3],
}

impl HsvRange {
    /// Create a range from inclusive bound triples.
    #[must_use]
    pub const fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    /// Whether `pixel` falls inside this range on all three components.
    #[must_use]
    pub const fn contains(&self, pixel: HsvPixel) -> bool {
        pixel.h >= self.lower[0]
            && pixel.h <= self.upper[0]
            && pixel.s >= self.lower[1]
            && pixel.s <= self.upper[1]
            && pixel.v >= self.lower[2]
            && pixel.v <= self.upper[2]
    }
}

/// A named yellow-discoloration range.
///
/// The four default ranges are progressively narrower and shifted
/// toward lower hue and higher saturation/value, modeling increasing
/// discoloration severity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YellowRange {
    /// Range label, e.g. `"intense_yellow"`.
    pub label: String,
    /// The HSV bounds for this severity band.
    pub bounds: HsvRange,
}

impl YellowRange {
    /// Create a named yellow range.
    #[must_use]
    pub fn new(label: &str, lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self {
            label: label.to_string(),
            bounds: HsvRange::new(lower, upper),
        }
    }
}

/// Default plant-tissue acceptance bounds: broad green, yellow-green,
/// and a third more yellow-leaning band. Leaves are not assumed pure
/// green; natural yellow-green tones must still count as tissue.
const PLANT_RANGE_BOUNDS: [([u8; 3], [u8; 3]); 3] = [
    ([30, 50, 50], [80, 255, 255]),
    ([20, 60, 80], [30, 255, 255]),
    ([10, 80, 100], [25, 255, 255]),
];

/// Default yellow-discoloration bounds, broadest band first.
const YELLOW_RANGE_BOUNDS: [(&str, [u8; 3], [u8; 3]); 4] = [
    ("light_yellow", [18, 100, 120], [25, 255, 255]),
    ("medium_yellow", [15, 120, 140], [22, 255, 255]),
    ("intense_yellow", [12, 140, 160], [20, 255, 255]),
    ("deep_yellow", [10, 160, 120], [18, 255, 220]),
];

/// The default plant-tissue acceptance table.
#[must_use]
pub fn default_plant_ranges() -> Vec<HsvRange> {
    PLANT_RANGE_BOUNDS
        .iter()
        .map(|&(lower, upper)| HsvRange::new(lower, upper))
        .collect()
}

/// The default yellow-discoloration table.
#[must_use]
pub fn default_yellow_ranges() -> Vec<YellowRange> {
    YELLOW_RANGE_BOUNDS
        .iter()
        .map(|&(label, lower, upper)| YellowRange::new(label, lower, upper))
        .collect()
}
