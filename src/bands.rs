//! Threshold tables mapping the scaled signal onto discrete actuator tiers.
//!
//! Rotation and contrast are plain data: ordered, non-overlapping half-open
//! bands plus an explicit policy for keys that fall between them. The color
//! channel has a single level and no table.

use crate::config::PipelineConfig;
use crate::error::{CaptureError, Result};

/// Half-open band `[lower, upper)` carrying the tier it selects.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Band<T> {
    pub lower: f64,
    pub upper: f64,
    pub tier: T,
}

impl<T> Band<T> {
    pub fn contains(&self, key: f64) -> bool {
        key >= self.lower && key < self.upper
    }
}

/// What a lookup yields when no band covers the key.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MissPolicy<T> {
    /// Emit this tier.
    Fallback(T),
    /// Emit nothing so the actuator keeps its last applied tier.
    HoldPrevious,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BandTable<T> {
    bands: Vec<Band<T>>,
    miss: MissPolicy<T>,
}

impl<T: Copy> BandTable<T> {
    pub fn new(bands: Vec<Band<T>>, miss: MissPolicy<T>) -> Result<Self> {
        let mut previous_upper = f64::NEG_INFINITY;
        for (idx, band) in bands.iter().enumerate() {
            if !(band.lower.is_finite() && band.upper.is_finite() && band.lower < band.upper) {
                return Err(CaptureError::InvalidBands(format!(
                    "band {idx} [{}, {}) is empty or unbounded",
                    band.lower, band.upper
                )));
            }
            if band.lower < previous_upper {
                return Err(CaptureError::InvalidBands(format!(
                    "band {idx} [{}, {}) overlaps or precedes the band before it",
                    band.lower, band.upper
                )));
            }
            previous_upper = band.upper;
        }

        Ok(Self { bands, miss })
    }

    fn from_rows(rows: &[(f64, f64, T)], miss: MissPolicy<T>) -> Self {
        let bands = rows
            .iter()
            .map(|&(lower, upper, tier)| Band { lower, upper, tier })
            .collect();
        Self { bands, miss }
    }

    pub fn bands(&self) -> &[Band<T>] {
        &self.bands
    }

    pub fn miss_policy(&self) -> MissPolicy<T> {
        self.miss
    }

    /// First band containing `key`, if any.
    pub fn band_for(&self, key: f64) -> Option<&Band<T>> {
        self.bands.iter().find(|band| band.contains(key))
    }

    /// Tier for `key`, falling back to the miss policy.
    pub fn lookup(&self, key: f64) -> Option<T> {
        match self.band_for(key) {
            Some(band) => Some(band.tier),
            None => match self.miss {
                MissPolicy::Fallback(tier) => Some(tier),
                MissPolicy::HoldPrevious => None,
            },
        }
    }

    /// Uncovered ranges of `[0, inf)`.
    pub fn gaps(&self) -> Vec<(f64, f64)> {
        let mut gaps = Vec::new();
        let mut cursor = 0.0;
        for band in &self.bands {
            if band.lower > cursor {
                gaps.push((cursor, band.lower));
            }
            cursor = f64::max(cursor, band.upper);
        }
        gaps.push((cursor, f64::INFINITY));
        gaps
    }
}

/// Rotation in degrees per band. Misses rotate by 0.
const ROTATION_BANDS: [(f64, f64, i32); 13] = [
    (100.0, 200.0, 1),
    (200.0, 300.0, 2),
    (300.0, 400.0, 3),
    (400.0, 500.0, 4),
    (600.0, 700.0, 5),
    (700.0, 800.0, 6),
    (800.0, 900.0, 7),
    (900.0, 1000.0, 8),
    (1100.0, 1200.0, 9),
    (1200.0, 1300.0, 13),
    (1300.0, 1400.0, 19),
    (1400.0, 1500.0, 28),
    (1500.0, 1600.0, 41),
];

/// Display range multiplier (of 255) per band. Misses keep the current contrast.
const CONTRAST_BANDS: [(f64, f64, f64); 8] = [
    (0.0, 100.0, 1.0),
    (100.0, 150.0, 0.95),
    (150.0, 200.0, 0.90),
    (250.0, 350.0, 0.85),
    (350.0, 500.0, 0.80),
    (500.0, 900.0, 0.65),
    (900.0, 1500.0, 0.50),
    (1500.0, 2500.0, 0.30),
];

pub fn rotation_table() -> BandTable<i32> {
    BandTable::from_rows(&ROTATION_BANDS, MissPolicy::Fallback(0))
}

pub fn contrast_table() -> BandTable<f64> {
    BandTable::from_rows(&CONTRAST_BANDS, MissPolicy::HoldPrevious)
}

/// Percentage of `reference` the signal represents; the tables are keyed on it.
pub fn band_key(signal: i32, reference: f64) -> f64 {
    f64::from(signal) * 100.0 / reference
}

/// Pure signal → tier mapping for all three channels.
#[derive(Clone, Debug, PartialEq)]
pub struct BandClassifier {
    rotation: BandTable<i32>,
    contrast: BandTable<f64>,
    band_reference: f64,
    trigger_level: i32,
}

impl BandClassifier {
    pub fn new(config: &PipelineConfig) -> Self {
        Self::with_tables(
            rotation_table(),
            contrast_table(),
            config.band_reference,
            config.palette_trigger_level,
        )
    }

    pub fn with_tables(
        rotation: BandTable<i32>,
        contrast: BandTable<f64>,
        band_reference: f64,
        trigger_level: i32,
    ) -> Self {
        Self {
            rotation,
            contrast,
            band_reference,
            trigger_level,
        }
    }

    pub fn rotation(&self) -> &BandTable<i32> {
        &self.rotation
    }

    pub fn contrast(&self) -> &BandTable<f64> {
        &self.contrast
    }

    pub fn trigger_level(&self) -> i32 {
        self.trigger_level
    }

    pub fn classify_rotation(&self, signal: i32) -> i32 {
        self.rotation
            .lookup(band_key(signal, self.band_reference))
            .unwrap_or(0)
    }

    /// `None` when the signal sits in a contrast gap.
    pub fn classify_contrast(&self, signal: i32) -> Option<f64> {
        self.contrast.lookup(band_key(signal, self.band_reference))
    }

    pub fn color_triggered(&self, signal: i32) -> bool {
        signal > self.trigger_level
    }
}

impl Default for BandClassifier {
    fn default() -> Self {
        Self::new(&PipelineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tables_are_well_formed() {
        let rotation = rotation_table();
        assert!(BandTable::new(rotation.bands().to_vec(), rotation.miss_policy()).is_ok());
        let contrast = contrast_table();
        assert!(BandTable::new(contrast.bands().to_vec(), contrast.miss_policy()).is_ok());
    }

    #[test]
    fn rotation_matches_literal_bands() {
        let classifier = BandClassifier::default();
        let cases = [
            (0, 0),
            (99, 0),
            (100, 1),
            (199, 1),
            (200, 2),
            (350, 3),
            (499, 4),
            (500, 0),
            (599, 0),
            (600, 5),
            (650, 5),
            (700, 6),
            (850, 7),
            (900, 8),
            (999, 8),
            (1000, 0),
            (1099, 0),
            (1100, 9),
            (1250, 13),
            (1300, 19),
            (1450, 28),
            (1500, 41),
            (1599, 41),
            (1600, 0),
            (5000, 0),
        ];
        for (signal, degrees) in cases {
            assert_eq!(
                classifier.classify_rotation(signal),
                degrees,
                "signal {signal}"
            );
        }
    }

    #[test]
    fn contrast_matches_literal_bands() {
        let classifier = BandClassifier::default();
        let cases = [
            (0, Some(1.0)),
            (99, Some(1.0)),
            (100, Some(0.95)),
            (150, Some(0.90)),
            (199, Some(0.90)),
            (200, None),
            (249, None),
            (250, Some(0.85)),
            (349, Some(0.85)),
            (350, Some(0.80)),
            (500, Some(0.65)),
            (899, Some(0.65)),
            (900, Some(0.50)),
            (1000, Some(0.50)),
            (1500, Some(0.30)),
            (2499, Some(0.30)),
            (2500, None),
        ];
        for (signal, multiplier) in cases {
            assert_eq!(
                classifier.classify_contrast(signal),
                multiplier,
                "signal {signal}"
            );
        }
    }

    #[test]
    fn color_triggers_strictly_above_level() {
        let classifier = BandClassifier::default();
        assert!(!classifier.color_triggered(700));
        assert!(classifier.color_triggered(701));
        assert!(classifier.color_triggered(1000));
    }

    #[test]
    fn lookups_are_repeatable() {
        let classifier = BandClassifier::default();
        for signal in (0..=1000).step_by(7) {
            assert_eq!(
                classifier.classify_rotation(signal),
                classifier.classify_rotation(signal)
            );
            assert_eq!(
                classifier.classify_contrast(signal),
                classifier.classify_contrast(signal)
            );
        }
    }

    #[test]
    fn gaps_are_listed() {
        assert_eq!(
            rotation_table().gaps(),
            vec![
                (0.0, 100.0),
                (500.0, 600.0),
                (1000.0, 1100.0),
                (1600.0, f64::INFINITY)
            ]
        );
        assert_eq!(
            contrast_table().gaps(),
            vec![(200.0, 250.0), (2500.0, f64::INFINITY)]
        );
    }

    #[test]
    fn smaller_reference_reaches_upper_bands() {
        let classifier =
            BandClassifier::with_tables(rotation_table(), contrast_table(), 50.0, 700);
        // key = 650 * 100 / 50 = 1300
        assert_eq!(classifier.classify_rotation(650), 19);
        assert_eq!(classifier.classify_contrast(650), Some(0.50));
    }

    #[test]
    fn overlapping_bands_are_rejected() {
        let bands = vec![
            Band {
                lower: 0.0,
                upper: 200.0,
                tier: 1,
            },
            Band {
                lower: 150.0,
                upper: 300.0,
                tier: 2,
            },
        ];
        assert!(matches!(
            BandTable::new(bands, MissPolicy::Fallback(0)),
            Err(CaptureError::InvalidBands(_))
        ));
    }

    #[test]
    fn empty_band_is_rejected() {
        let bands = vec![Band {
            lower: 10.0,
            upper: 10.0,
            tier: 1,
        }];
        assert!(BandTable::new(bands, MissPolicy::HoldPrevious).is_err());
    }

    #[test]
    fn hold_previous_yields_nothing_on_miss() {
        let table = BandTable::new(
            vec![Band {
                lower: 0.0,
                upper: 10.0,
                tier: 0.5,
            }],
            MissPolicy::HoldPrevious,
        )
        .unwrap();
        assert_eq!(table.lookup(5.0), Some(0.5));
        assert_eq!(table.lookup(10.0), None);
        assert_eq!(table.lookup(f64::NAN), None);
    }
}
