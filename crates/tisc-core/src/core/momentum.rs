use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::ops::Neg;

/// An in-plane momentum, stored as the dimensionless phases `kx·a` and `ky·a`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MomentumPoint {
    pub kx: f64,
    pub ky: f64,
}

impl MomentumPoint {
    pub const GAMMA: MomentumPoint = MomentumPoint { kx: 0.0, ky: 0.0 };

    pub fn new(kx: f64, ky: f64) -> Self {
        Self { kx, ky }
    }
}

impl Neg for MomentumPoint {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self {
            kx: -self.kx,
            ky: -self.ky,
        }
    }
}

/// A square, regular grid of momentum points spanning `[-extent, extent]` on both axes.
///
/// Points are numbered row-major with `kx` varying fastest, so the index of a
/// point is `ix + iy · points_per_axis`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MomentumGrid {
    pub points_per_axis: usize,
    pub extent: f64,
}

impl Default for MomentumGrid {
    fn default() -> Self {
        Self {
            points_per_axis: 11,
            extent: PI,
        }
    }
}

impl MomentumGrid {
    pub fn new(points_per_axis: usize, extent: f64) -> Self {
        Self {
            points_per_axis,
            extent,
        }
    }

    /// A grid holding only the given point's axis values; used for single-point runs.
    pub fn single() -> Self {
        Self {
            points_per_axis: 1,
            extent: 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.points_per_axis * self.points_per_axis
    }

    pub fn is_empty(&self) -> bool {
        self.points_per_axis == 0
    }

    fn coordinate(&self, i: usize) -> f64 {
        if self.points_per_axis <= 1 {
            return 0.0;
        }
        let step = 2.0 * self.extent / (self.points_per_axis - 1) as f64;
        -self.extent + step * i as f64
    }

    pub fn point(&self, index: usize) -> Option<MomentumPoint> {
        if index >= self.len() {
            return None;
        }
        let ix = index % self.points_per_axis;
        let iy = index / self.points_per_axis;
        Some(MomentumPoint::new(self.coordinate(ix), self.coordinate(iy)))
    }

    /// Index of the point at `-k`; the grid is symmetric about the origin.
    pub fn mirror_index(&self, index: usize) -> Option<usize> {
        if index >= self.len() {
            return None;
        }
        let n = self.points_per_axis;
        let ix = index % n;
        let iy = index / n;
        Some((n - 1 - ix) + (n - 1 - iy) * n)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, MomentumPoint)> + '_ {
        (0..self.len()).filter_map(move |i| self.point(i).map(|k| (i, k)))
    }
}
