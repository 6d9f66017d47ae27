//! Pointy-top hexagonal bucketing, cell-for-cell compatible with d3-hexbin.
//!
//! Rows of cells are `1.5 * r` apart; odd rows are shifted right by half a
//! cell width (`r * sqrt(3)`). A point is assigned to the nearest cell centre
//! among the two candidates around its row.

use std::collections::HashMap;
use std::f64::consts::FRAC_PI_3;

use serde::Serialize;

use crate::aggregate::{AggregateError, Result};

/// One occupied hexagonal cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HexBin {
    /// Cell centre.
    pub x: f64,
    pub y: f64,
    /// Indices into the input point slice.
    pub indices: Vec<usize>,
}

impl HexBin {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

// Math.round semantics: halves go towards +inf, so negative
// coordinates land in the same cells as d3 puts them
fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

#[derive(Debug, Clone, Copy)]
pub struct HexBinner {
    radius: f64,
    dx: f64,
    dy: f64,
}

impl HexBinner {
    pub fn new(radius: f64) -> Result<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(AggregateError::InvalidParameter(format!(
                "hex radius must be positive, got {radius}"
            )));
        }
        Ok(Self {
            radius,
            dx: radius * 2.0 * FRAC_PI_3.sin(),
            dy: radius * 1.5,
        })
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Axial cell coordinates (column, row) for a point.
    fn cell(&self, x: f64, y: f64) -> (i64, i64) {
        let py = y / self.dy;
        let mut pj = round_half_up(py);
        let odd = |row: f64| (row as i64) & 1 == 1;
        let px = x / self.dx - if odd(pj) { 0.5 } else { 0.0 };
        let mut pi = round_half_up(px);
        let py1 = py - pj;

        // Near the row boundary the neighbouring row's cell may be closer
        if py1.abs() * 3.0 > 1.0 {
            let px1 = px - pi;
            let pi2 = pi + if px < pi { -0.5 } else { 0.5 };
            let pj2 = pj + if py < pj { -1.0 } else { 1.0 };
            let px2 = px - pi2;
            let py2 = py - pj2;
            if px1 * px1 + py1 * py1 > px2 * px2 + py2 * py2 {
                pi = pi2 + if odd(pj) { 0.5 } else { -0.5 };
                pj = pj2;
            }
        }

        (pi as i64, pj as i64)
    }

    fn centre(&self, (i, j): (i64, i64)) -> (f64, f64) {
        let shift = if j & 1 == 1 { 0.5 } else { 0.0 };
        ((i as f64 + shift) * self.dx, j as f64 * self.dy)
    }

    /// Bucket points into cells. Bins come out in order of first occupancy;
    /// every input index appears in exactly one bin. Non-finite points are
    /// placed in the cell at the origin so the count is conserved.
    pub fn bin(&self, points: &[(f64, f64)]) -> Vec<HexBin> {
        let mut by_cell: HashMap<(i64, i64), usize> = HashMap::new();
        let mut bins: Vec<HexBin> = Vec::new();

        for (idx, &(x, y)) in points.iter().enumerate() {
            let (x, y) = if x.is_finite() && y.is_finite() { (x, y) } else { (0.0, 0.0) };
            let cell = self.cell(x, y);
            match by_cell.get(&cell) {
                Some(&b) => bins[b].indices.push(idx),
                None => {
                    let (cx, cy) = self.centre(cell);
                    by_cell.insert(cell, bins.len());
                    bins.push(HexBin { x: cx, y: cy, indices: vec![idx] });
                }
            }
        }

        log::trace!("hexbin r={}: {} points -> {} bins", self.radius, points.len(), bins.len());
        bins
    }

    /// Corner offsets of one cell relative to its centre, starting at the top.
    pub fn hexagon(&self) -> [(f64, f64); 6] {
        let mut corners = [(0.0, 0.0); 6];
        for (k, corner) in corners.iter_mut().enumerate() {
            let angle = k as f64 * FRAC_PI_3;
            *corner = (angle.sin() * self.radius, -angle.cos() * self.radius);
        }
        corners
    }
}
