//! Heatmap binner.
//!
//! Buckets a secondary quantity (edits per editor, byte delta, editors per
//! article) into fixed-width ranges per month and assembles a dense,
//! bucket-major count matrix over the canonical time index.

use crate::time_index::{Month, TimeIndex};
use serde::Serialize;

/// Fixed-width, half-open bins `[lower + i*width, lower + (i+1)*width)`.
///
/// Values outside `[lower, upper)` are clipped into the first or last bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinSpec {
    pub lower: i64,
    pub width: i64,
    pub bins: usize,
}

impl BinSpec {
    /// `bins` is raised to at least one and `width` to at least 1.
    pub fn new(lower: i64, width: i64, bins: usize) -> Self {
        Self {
            lower,
            width: width.max(1),
            bins: bins.max(1),
        }
    }

    /// Smallest spec starting at `lower` whose bins reach `max`.
    pub fn covering(lower: i64, width: i64, max: i64) -> Self {
        let width = width.max(1);
        let span = (max - lower + 1).max(1);
        Self::new(lower, width, ((span + width - 1) / width) as usize)
    }

    /// Exclusive upper bound of the last bin.
    pub fn upper(&self) -> i64 {
        self.lower + self.width * self.bins as i64
    }

    pub fn clip(&self, value: i64) -> i64 {
        value.clamp(self.lower, self.upper() - 1)
    }

    /// Bin a value falls in after clipping.
    pub fn bucket(&self, value: i64) -> usize {
        ((self.clip(value) - self.lower) / self.width) as usize
    }

    /// Lower bound of every bin.
    pub fn bounds(&self) -> Vec<i64> {
        (0..self.bins as i64)
            .map(|i| self.lower + i * self.width)
            .collect()
    }
}

/// Month × bucket count matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatMap {
    pub index: Vec<Month>,
    /// Lower bound of each bucket
    pub buckets: Vec<i64>,
    /// `matrix[bucket][month]`
    pub matrix: Vec<Vec<u64>>,
    /// Meaning of a cell value
    pub z_label: String,
}

impl HeatMap {
    /// Count `(month, value)` observations into `spec` bins.
    ///
    /// Months are placed by calendar position in the index; observations
    /// for months outside it are ignored.
    pub fn bin<I>(index: &TimeIndex, spec: &BinSpec, observations: I, z_label: &str) -> Self
    where
        I: IntoIterator<Item = (Month, i64)>,
    {
        let mut matrix = vec![vec![0u64; index.len()]; spec.bins];
        let mut dropped = 0usize;

        for (month, value) in observations {
            match index.position(month) {
                Some(col) => matrix[spec.bucket(value)][col] += 1,
                None => dropped += 1,
            }
        }

        if dropped > 0 {
            tracing::warn!(dropped, "Heatmap observations outside the time index");
        }

        Self {
            index: index.months().to_vec(),
            buckets: spec.bounds(),
            matrix,
            z_label: z_label.to_string(),
        }
    }

    /// Number of observations binned for each month.
    pub fn month_totals(&self) -> Vec<u64> {
        let mut totals = vec![0u64; self.index.len()];
        for row in &self.matrix {
            for (total, cell) in totals.iter_mut().zip(row) {
                *total += cell;
            }
        }
        totals
    }

    pub fn total(&self) -> u64 {
        self.matrix.iter().flatten().sum()
    }
}
