use super::observables::ObservableResults;
use crate::core::momentum::{MomentumGrid, MomentumPoint};
use crate::core::pairing::{ConvergenceMetric, OrderParameterState};
use serde::Serialize;
use std::fmt;

/// Terminal status of one momentum point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PointStatus {
    Converged,
    /// The iteration cap was reached before the tolerance was met.
    Exhausted,
    /// The eigen-decomposition failed; no results exist for the point.
    Failed,
}

impl fmt::Display for PointStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PointStatus::Converged => "converged",
            PointStatus::Exhausted => "exhausted",
            PointStatus::Failed => "failed",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolvedPoint {
    pub index: usize,
    pub momentum: MomentumPoint,
    pub status: PointStatus,
    pub iterations: usize,
    pub final_metric: Option<ConvergenceMetric>,
    /// `max_abs_delta` of every measured iteration, in order.
    pub delta_trace: Vec<f64>,
    pub order_parameter: OrderParameterState,
    pub observables: ObservableResults,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointFailure {
    pub index: usize,
    pub momentum: MomentumPoint,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum PointResult {
    Solved(Box<SolvedPoint>),
    Failed(PointFailure),
}

impl PointResult {
    pub fn index(&self) -> usize {
        match self {
            PointResult::Solved(point) => point.index,
            PointResult::Failed(failure) => failure.index,
        }
    }

    pub fn momentum(&self) -> MomentumPoint {
        match self {
            PointResult::Solved(point) => point.momentum,
            PointResult::Failed(failure) => failure.momentum,
        }
    }

    pub fn status(&self) -> PointStatus {
        match self {
            PointResult::Solved(point) => point.status,
            PointResult::Failed(_) => PointStatus::Failed,
        }
    }

    pub fn solved(&self) -> Option<&SolvedPoint> {
        match self {
            PointResult::Solved(point) => Some(point.as_ref()),
            PointResult::Failed(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StatusCounts {
    pub converged: usize,
    pub exhausted: usize,
    pub failed: usize,
}

/// Results of every momentum point of a run, ordered by grid index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalResultGrid {
    pub grid: MomentumGrid,
    /// Energy samples shared by every LDOS array.
    pub energies: Vec<f64>,
    pub points: Vec<PointResult>,
}

impl GlobalResultGrid {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PointResult> {
        self.points.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PointResult> {
        self.points.iter()
    }

    pub fn solved(&self) -> impl Iterator<Item = &SolvedPoint> {
        self.points.iter().filter_map(PointResult::solved)
    }

    pub fn failures(&self) -> impl Iterator<Item = &PointFailure> {
        self.points.iter().filter_map(|p| match p {
            PointResult::Failed(failure) => Some(failure),
            PointResult::Solved(_) => None,
        })
    }

    pub fn status_counts(&self) -> StatusCounts {
        self.points
            .iter()
            .fold(StatusCounts::default(), |mut counts, point| {
                match point.status() {
                    PointStatus::Converged => counts.converged += 1,
                    PointStatus::Exhausted => counts.exhausted += 1,
                    PointStatus::Failed => counts.failed += 1,
                }
                counts
            })
    }
}
