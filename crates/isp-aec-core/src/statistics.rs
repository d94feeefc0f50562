//! Hardware statistics frame and its reduction to a measured brightness.
//!
//! The frame layout is the register-level contract of the statistics
//! block: 25 zone means (8 bit) followed by 16 histogram bins (16 bit).

use crate::common::{
    GRID_SIZE, HIST_BIN_COUNT, OVER_EXPOSED_BINS, UNDER_EXPOSED_BINS, ZONE_COUNT,
};
use crate::error::Error;
use crate::modes::MeasuringMode;

/// One frame of exposure statistics as written by the hardware.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatisticsFrame {
    /// Mean luminance per zone, row-major over the 5x5 grid.
    pub exp_mean: [u8; ZONE_COUNT],
    /// Histogram bin counts, darkest bin first.
    pub hist_bins: [u16; HIST_BIN_COUNT],
}

impl Default for StatisticsFrame {
    fn default() -> Self {
        Self {
            exp_mean: [0; ZONE_COUNT],
            hist_bins: [0; HIST_BIN_COUNT],
        }
    }
}

impl StatisticsFrame {
    /// A frame whose zones all report `mean`, with every pixel counted in
    /// the matching histogram bin.
    pub fn uniform(mean: u8) -> Self {
        let mut hist_bins = [0; HIST_BIN_COUNT];
        hist_bins[mean as usize * HIST_BIN_COUNT / 256] = u16::MAX;
        Self {
            exp_mean: [mean; ZONE_COUNT],
            hist_bins,
        }
    }
}

/// Per-zone weights of the 5x5 measurement grid.
///
/// Weights need not sum to anything in particular; the reducer normalizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneWeights(pub [[u8; GRID_SIZE]; GRID_SIZE]);

impl Default for ZoneWeights {
    /// Center-weighted grid.
    fn default() -> Self {
        Self([
            [1, 1, 1, 1, 1],
            [1, 2, 2, 2, 1],
            [1, 2, 4, 2, 1],
            [1, 2, 2, 2, 1],
            [1, 1, 1, 1, 1],
        ])
    }
}

impl ZoneWeights {
    pub fn uniform(weight: u8) -> Self {
        Self([[weight; GRID_SIZE]; GRID_SIZE])
    }

    /// Row-major flattening matching the zone order of [`StatisticsFrame`].
    pub fn flatten(&self) -> [u8; ZONE_COUNT] {
        let mut out = [0; ZONE_COUNT];
        for (dst, src) in out.iter_mut().zip(self.0.iter().flatten()) {
            *dst = *src;
        }
        out
    }

    pub fn from_flat(flat: &[u8; ZONE_COUNT]) -> Self {
        let mut grid = [[0; GRID_SIZE]; GRID_SIZE];
        for (i, w) in flat.iter().enumerate() {
            grid[i / GRID_SIZE][i % GRID_SIZE] = *w;
        }
        Self(grid)
    }

    /// Number of zones with a non-zero weight.
    pub fn active_zones(&self) -> usize {
        self.0.iter().flatten().filter(|&&w| w > 0).count()
    }
}

/// Distribution summary of the histogram bins.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HistogramSummary {
    /// Total number of counted pixels.
    pub total: u32,
    /// Fraction of pixels in the darkest bins.
    pub under_exposed: f32,
    /// Fraction of pixels in the brightest bins.
    pub over_exposed: f32,
    /// Mean bin index.
    pub mean_bin: f32,
    /// Standard deviation of the bin index.
    pub spread: f32,
    /// Bin counts normalized to sum to one (all zero for an empty histogram).
    pub distribution: [f32; HIST_BIN_COUNT],
}

impl HistogramSummary {
    pub fn from_bins(bins: &[u16; HIST_BIN_COUNT]) -> Self {
        let total: u32 = bins.iter().map(|&b| b as u32).sum();
        if total == 0 {
            return Self::default();
        }
        let inv_total = 1.0 / total as f32;
        let mut distribution = [0.0; HIST_BIN_COUNT];
        for (d, &b) in distribution.iter_mut().zip(bins.iter()) {
            *d = b as f32 * inv_total;
        }

        let mean_bin: f32 = distribution
            .iter()
            .enumerate()
            .map(|(i, p)| i as f32 * p)
            .sum();
        let variance: f32 = distribution
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let d = i as f32 - mean_bin;
                d * d * p
            })
            .sum();

        Self {
            total,
            under_exposed: distribution[..UNDER_EXPOSED_BINS].iter().sum(),
            over_exposed: distribution[HIST_BIN_COUNT - OVER_EXPOSED_BINS..].iter().sum(),
            mean_bin,
            spread: variance.sqrt(),
            distribution,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Half the L1 distance between two normalized histograms, in `[0, 1]`.
    ///
    /// Returns 0 if either histogram is empty.
    pub fn distance(&self, other: &Self) -> f32 {
        if self.is_empty() || other.is_empty() {
            return 0.0;
        }
        0.5 * self
            .distribution
            .iter()
            .zip(other.distribution.iter())
            .map(|(a, b)| (a - b).abs())
            .sum::<f32>()
    }
}

/// Output of [`reduce`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reduction {
    /// Weighted mean luminance on the full-range scale.
    pub brightness: f32,
    /// Number of zones that contributed.
    pub active_zones: usize,
    pub histogram: HistogramSummary,
}

/// Reduces a statistics frame to a single measured brightness.
///
/// Zone means are mapped back to full range according to `mode`, then
/// averaged with `weights`. Zones with zero weight do not contribute.
pub fn reduce(
    frame: &StatisticsFrame,
    weights: &ZoneWeights,
    mode: MeasuringMode,
) -> Result<Reduction, Error> {
    let mut weighted_sum = 0.0f32;
    let mut weight_sum = 0u32;
    let mut active_zones = 0;
    for (&mean, &w) in frame.exp_mean.iter().zip(weights.0.iter().flatten()) {
        if w == 0 {
            continue;
        }
        active_zones += 1;
        weight_sum += w as u32;
        weighted_sum += w as f32 * mode.normalize(mean);
    }
    if weight_sum == 0 {
        return Err(Error::NoActiveZones);
    }

    Ok(Reduction {
        brightness: weighted_sum / weight_sum as f32,
        active_zones,
        histogram: HistogramSummary::from_bins(&frame.hist_bins),
    })
}
