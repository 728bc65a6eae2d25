//! Plate math: weight rounding and per-side plate breakdowns.
//!
//! The resolver is a greedy largest-plate-first walk. With the standard
//! denominations (45, 25, 10, 5, 2.5) greedy is exact for any load that is a
//! multiple of 5; it is not a general bin-packing solver for arbitrary plate
//! sets.

use crate::config::PlateConfig;
use serde::Serialize;

/// Prescribed loads are rounded to this increment
pub const ROUNDING_INCREMENT: f64 = 5.0;

/// Round a computed load to the nearest 5.
///
/// Ties round away from zero (`f64::round`), so 102.5 becomes 105.
pub fn round_weight(exact: f64) -> f64 {
    (exact / ROUNDING_INCREMENT).round() * ROUNDING_INCREMENT
}

/// A plate size and how many of it go on each side
#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct PlateCount {
    pub plate: f64,
    pub count: u32,
}

/// Result of resolving a target load
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct PlateBreakdown {
    pub target: f64,
    pub bar_weight: f64,
    /// Load needed on each side of the bar (0 when bar only)
    pub per_side: f64,
    /// Plates per side, largest first
    pub plates: Vec<PlateCount>,
    /// Per-side load the available plates could not make up
    pub remainder: f64,
}

impl PlateBreakdown {
    pub fn is_bar_only(&self) -> bool {
        self.plates.is_empty()
    }
}

/// Converts bar loads into plates per side
#[derive(Clone, Debug)]
pub struct PlateResolver {
    bar_weight: f64,
    /// Sorted descending
    plates: Vec<f64>,
}

impl Default for PlateResolver {
    fn default() -> Self {
        Self::from_config(&PlateConfig::default())
    }
}

impl PlateResolver {
    pub fn new(bar_weight: f64, plates: impl IntoIterator<Item = f64>) -> Self {
        let mut plates: Vec<f64> = plates.into_iter().filter(|p| *p > 0.0).collect();
        plates.sort_by(|a, b| b.total_cmp(a));
        plates.dedup();
        Self { bar_weight, plates }
    }

    pub fn from_config(config: &PlateConfig) -> Self {
        Self::new(config.bar_weight, config.available.iter().copied())
    }

    pub fn bar_weight(&self) -> f64 {
        self.bar_weight
    }

    /// Plates per side for a total bar load
    ///
    /// Loads at or below the bar weight resolve to "bar only".
    pub fn resolve(&self, target: f64) -> PlateBreakdown {
        if target <= self.bar_weight {
            tracing::debug!("Target {} is at or below the bar, bar only", target);
            return PlateBreakdown {
                target,
                bar_weight: self.bar_weight,
                per_side: 0.0,
                plates: Vec::new(),
                remainder: 0.0,
            };
        }

        let per_side = (target - self.bar_weight) / 2.0;
        let mut remaining = per_side;
        let mut plates = Vec::new();

        for &plate in &self.plates {
            let count = (remaining / plate).floor() as u32;
            if count > 0 {
                plates.push(PlateCount { plate, count });
                remaining -= f64::from(count) * plate;
            }
        }

        if remaining > 0.0 {
            tracing::debug!(
                "Target {} leaves {} per side unloaded with the available plates",
                target,
                remaining
            );
        }

        PlateBreakdown {
            target,
            bar_weight: self.bar_weight,
            per_side,
            plates,
            remainder: remaining,
        }
    }
}
