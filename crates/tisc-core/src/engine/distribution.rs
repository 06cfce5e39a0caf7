use super::error::EngineError;
use super::state::PointResult;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The grid indices owned by one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkAssignment {
    pub worker: usize,
    pub indices: Vec<usize>,
}

/// Static partition of the momentum grid over workers, with a one-time
/// parameter broadcast before the work and a single gather after it.
pub trait WorkDistributor: Send + Sync {
    fn worker_count(&self) -> usize;

    /// Deterministic owner of a grid index.
    fn owner_of(&self, index: usize) -> usize {
        index % self.worker_count().max(1)
    }

    fn partition(&self, total: usize) -> Vec<WorkAssignment> {
        let mut assignments: Vec<WorkAssignment> = (0..self.worker_count().max(1))
            .map(|worker| WorkAssignment {
                worker,
                indices: Vec::new(),
            })
            .collect();
        for index in 0..total {
            assignments[self.owner_of(index)].indices.push(index);
        }
        assignments
    }

    /// One copy of the run parameters per worker.
    fn broadcast_parameters<P: Clone>(&self, parameters: &P) -> Vec<P> {
        vec![parameters.clone(); self.worker_count().max(1)]
    }

    /// Runs `job` once per worker with that worker's assignment and parameter
    /// copy. Returns after every worker has finished.
    fn execute<P, F>(
        &self,
        assignments: Vec<WorkAssignment>,
        parameters: Vec<P>,
        job: F,
    ) -> Vec<Result<Vec<PointResult>, EngineError>>
    where
        P: Send + Sync,
        F: Fn(&WorkAssignment, &P) -> Result<Vec<PointResult>, EngineError> + Send + Sync;

    /// Places every worker's results at their grid index. Every index in
    /// `[0, total)` must be present exactly once.
    fn gather_results(
        &self,
        total: usize,
        per_worker: Vec<Result<Vec<PointResult>, EngineError>>,
    ) -> Result<Vec<PointResult>, EngineError> {
        let mut slots: Vec<Option<PointResult>> = (0..total).map(|_| None).collect();
        for worker_results in per_worker {
            for result in worker_results? {
                let index = result.index();
                let slot = slots.get_mut(index).ok_or_else(|| {
                    EngineError::Distribution(format!("result for index {index} is outside the grid of {total} points"))
                })?;
                if slot.replace(result).is_some() {
                    return Err(EngineError::Distribution(format!(
                        "index {index} was reported by more than one worker"
                    )));
                }
            }
        }
        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| EngineError::Distribution(format!("no result was gathered for index {index}")))
            })
            .collect()
    }
}

/// Workers on the local machine, run as rayon tasks when the `parallel`
/// feature is enabled and one after another otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalDistributor {
    workers: usize,
}

impl LocalDistributor {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    /// One worker per thread of the global pool.
    pub fn with_available_threads() -> Self {
        #[cfg(feature = "parallel")]
        let workers = rayon::current_num_threads();
        #[cfg(not(feature = "parallel"))]
        let workers = 1;
        Self::new(workers)
    }
}

impl WorkDistributor for LocalDistributor {
    fn worker_count(&self) -> usize {
        self.workers
    }

    fn execute<P, F>(
        &self,
        assignments: Vec<WorkAssignment>,
        parameters: Vec<P>,
        job: F,
    ) -> Vec<Result<Vec<PointResult>, EngineError>>
    where
        P: Send + Sync,
        F: Fn(&WorkAssignment, &P) -> Result<Vec<PointResult>, EngineError> + Send + Sync,
    {
        #[cfg(not(feature = "parallel"))]
        let iterator = assignments.iter().zip(parameters.iter());
        #[cfg(feature = "parallel")]
        let iterator = assignments.par_iter().zip(parameters.par_iter());

        iterator
            .map(|(assignment, params)| job(assignment, params))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::momentum::MomentumPoint;
    use crate::engine::state::PointFailure;

    fn placeholder(index: usize) -> PointResult {
        PointResult::Failed(PointFailure {
            index,
            momentum: MomentumPoint::GAMMA,
            message: String::new(),
        })
    }

    #[test]
    fn partition_is_strided_and_complete() {
        let distributor = LocalDistributor::new(3);
        let assignments = distributor.partition(8);
        assert_eq!(assignments[0].indices, vec![0, 3, 6]);
        assert_eq!(assignments[1].indices, vec![1, 4, 7]);
        assert_eq!(assignments[2].indices, vec![2, 5]);
        for index in 0..8 {
            assert_eq!(distributor.owner_of(index), index % 3);
        }
    }

    #[test]
    fn more_workers_than_points_leaves_some_idle() {
        let assignments = LocalDistributor::new(5).partition(2);
        assert_eq!(assignments.len(), 5);
        assert!(assignments[2..].iter().all(|a| a.indices.is_empty()));
    }

    #[test]
    fn broadcast_hands_every_worker_a_copy() {
        let copies = LocalDistributor::new(4).broadcast_parameters(&String::from("params"));
        assert_eq!(copies.len(), 4);
        assert!(copies.iter().all(|c| c == "params"));
    }

    #[test]
    fn execute_then_gather_restores_grid_order() {
        let distributor = LocalDistributor::new(3);
        let assignments = distributor.partition(10);
        let parameters = distributor.broadcast_parameters(&());
        let per_worker = distributor.execute(assignments, parameters, |assignment, _| {
            Ok(assignment.indices.iter().rev().map(|&i| placeholder(i)).collect())
        });
        let gathered = distributor.gather_results(10, per_worker).unwrap();
        let order: Vec<usize> = gathered.iter().map(PointResult::index).collect();
        assert_eq!(order, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn gather_rejects_missing_and_duplicate_indices() {
        let distributor = LocalDistributor::new(2);
        let missing = distributor.gather_results(3, vec![Ok(vec![placeholder(0)]), Ok(vec![placeholder(1)])]);
        assert!(matches!(missing, Err(EngineError::Distribution(_))));

        let duplicate = distributor.gather_results(2, vec![Ok(vec![placeholder(0)]), Ok(vec![placeholder(0), placeholder(1)])]);
        assert!(matches!(duplicate, Err(EngineError::Distribution(_))));
    }

    #[test]
    fn worker_error_propagates_through_gather() {
        let distributor = LocalDistributor::new(2);
        let result = distributor.gather_results(1, vec![Err(EngineError::Internal("boom".into()))]);
        assert!(matches!(result, Err(EngineError::Internal(_))));
    }
}
