//! Gain-range lookup table mapping analog gain onto register codes.
//!
//! The table holds up to four rows of seven columns:
//! `[gain_min, gain_max, slope, intercept, reg_step, reg_min, reg_max]`.
//! Within a row the code is `round((slope * gain + intercept) / reg_step) *
//! reg_step`, clamped to `[reg_min, reg_max]`. Rows with `gain_max <=
//! gain_min` are unused.

use derive_more::Debug;

use crate::common::{GAIN_RANGE_COLUMNS, GAIN_RANGE_LEN, GAIN_RANGE_ROWS, all_finite};
use crate::error::ConfigError;

/// One usable row of the table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainRangeRow {
    pub gain_min: f32,
    pub gain_max: f32,
    pub slope: f32,
    pub intercept: f32,
    pub reg_step: f32,
    pub reg_min: f32,
    pub reg_max: f32,
}

impl GainRangeRow {
    fn from_columns(c: &[f32]) -> Self {
        Self {
            gain_min: c[0],
            gain_max: c[1],
            slope: c[2],
            intercept: c[3],
            reg_step: c[4],
            reg_min: c[5],
            reg_max: c[6],
        }
    }

    fn is_used(&self) -> bool {
        self.gain_max > self.gain_min
    }

    fn register(&self, gain: f32) -> i32 {
        let code = ((self.slope * gain + self.intercept) / self.reg_step).round() * self.reg_step;
        code.clamp(self.reg_min, self.reg_max).round() as i32
    }
}

/// Flat gain-range table as configured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainRange(#[debug("[{} rows]", GAIN_RANGE_ROWS)] pub [f32; GAIN_RANGE_LEN]);

impl Default for GainRange {
    /// Four doubling ranges from 1x to 16x, 16 codes each.
    #[rustfmt::skip]
    fn default() -> Self {
        Self([
            1.0, 2.0, 16.0, 0.0, 1.0, 16.0, 32.0,
            2.0, 4.0, 8.0, 16.0, 1.0, 32.0, 48.0,
            4.0, 8.0, 4.0, 32.0, 1.0, 48.0, 64.0,
            8.0, 16.0, 2.0, 48.0, 1.0, 64.0, 80.0,
        ])
    }
}

impl GainRange {
    /// Iterates over the rows that are in use.
    pub fn rows(&self) -> impl Iterator<Item = GainRangeRow> + '_ {
        self.0
            .chunks_exact(GAIN_RANGE_COLUMNS)
            .map(GainRangeRow::from_columns)
            .filter(GainRangeRow::is_used)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut prev_max: Option<f32> = None;
        let mut any_used = false;
        for (i, chunk) in self.0.chunks_exact(GAIN_RANGE_COLUMNS).enumerate() {
            if !all_finite(chunk) {
                return Err(ConfigError::GainRangeRow(i));
            }
            let row = GainRangeRow::from_columns(chunk);
            if !row.is_used() {
                continue;
            }
            let ascending = prev_max.is_none_or(|m| row.gain_min >= m);
            if row.gain_min <= 0.0
                || row.slope <= 0.0
                || row.reg_step < 1.0
                || row.reg_min > row.reg_max
                || !ascending
            {
                return Err(ConfigError::GainRangeRow(i));
            }
            prev_max = Some(row.gain_max);
            any_used = true;
        }
        if !any_used {
            return Err(ConfigError::EmptyGainRange);
        }
        Ok(())
    }

    /// Smallest and largest gain covered by the table.
    pub fn span(&self) -> (f32, f32) {
        let mut rows = self.rows();
        let first = rows.next();
        let last = rows.last().or(first);
        match (first, last) {
            (Some(first), Some(last)) => (first.gain_min, last.gain_max),
            _ => (1.0, 1.0),
        }
    }

    /// Register code for `gain`, using the highest row starting at or below
    /// it. Gains outside the table use the nearest row.
    pub fn register(&self, gain: f32) -> i32 {
        let mut selected = None;
        for row in self.rows() {
            if selected.is_none() || row.gain_min <= gain {
                selected = Some(row);
            }
        }
        selected.map_or(0, |row| row.register(gain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_is_valid_and_continuous() {
        let table = GainRange::default();
        table.validate().unwrap();
        assert_eq!(table.span(), (1.0, 16.0));
        assert_eq!(table.register(1.0), 16);
        assert_eq!(table.register(2.0), 32);
        assert_eq!(table.register(3.0), 40);
        assert_eq!(table.register(4.0), 48);
        assert_eq!(table.register(8.0), 64);
        assert_eq!(table.register(16.0), 80);
    }

    #[test]
    fn register_is_monotonic_over_span() {
        let table = GainRange::default();
        let mut prev = table.register(1.0);
        let mut gain = 1.0;
        while gain <= 16.0 {
            let code = table.register(gain);
            assert!(code >= prev, "code {code} < {prev} at gain {gain}");
            prev = code;
            gain += 0.05;
        }
    }

    #[test]
    fn unused_rows_are_skipped() {
        let mut table = GainRange([0.0; GAIN_RANGE_LEN]);
        table.0[7..14].copy_from_slice(&[1.0, 8.0, 10.0, 0.0, 2.0, 10.0, 80.0]);
        table.validate().unwrap();
        assert_eq!(table.rows().count(), 1);
        assert_eq!(table.span(), (1.0, 8.0));
        assert_eq!(table.register(2.5), 26);
        assert_eq!(table.register(20.0), 80);
        assert_eq!(table.register(0.5), 10);
    }

    #[test]
    fn empty_table_is_rejected() {
        let table = GainRange([0.0; GAIN_RANGE_LEN]);
        assert_eq!(table.validate(), Err(ConfigError::EmptyGainRange));
    }

    #[test]
    fn overlapping_rows_are_rejected() {
        let mut table = GainRange::default();
        table.0[7] = 1.5;
        assert_eq!(table.validate(), Err(ConfigError::GainRangeRow(1)));
    }

    #[test]
    fn non_finite_rows_are_rejected() {
        let mut table = GainRange::default();
        table.0[20] = f32::INFINITY;
        assert_eq!(table.validate(), Err(ConfigError::GainRangeRow(2)));
    }
}
