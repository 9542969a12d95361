//! A fixed pool of worker threads for the batch operations of the prover
//! and verifier.
//!
//! Every operation has a sequential path that produces the same result; it
//! is taken when the pool has a single worker or when the batch is shorter
//! than [`PARALLEL_THRESHOLD`]. Workers only ever see disjoint index ranges,
//! and partial results are merged in index order by the calling thread.

use std::cmp;
use std::ops::Range;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use curve::Group;
use errors::ProofError;

/// Batches shorter than this run on the calling thread.
pub const PARALLEL_THRESHOLD: usize = 16;

/// Worker pool used by [`Prover`](::Prover) and [`Verifier`](::Verifier).
pub struct WorkerPool {
    pool: Option<ThreadPool>,
    workers: usize,
}

impl Default for WorkerPool {
    /// One worker per core, as reported by rayon.
    fn default() -> Self {
        WorkerPool::new(rayon::current_num_threads()).unwrap_or_else(|_| WorkerPool::sequential())
    }
}

impl WorkerPool {
    /// Creates a pool with `workers` threads. A single worker means no
    /// threads are spawned at all.
    pub fn new(workers: usize) -> Result<WorkerPool, ProofError> {
        if workers == 0 {
            return Err(ProofError::InvalidParameters("worker count must be positive"));
        }
        if workers == 1 {
            return Ok(WorkerPool::sequential());
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|_| ProofError::WorkerPoolError)?;
        Ok(WorkerPool {
            pool: Some(pool),
            workers,
        })
    }

    /// A pool that runs everything on the calling thread.
    pub fn sequential() -> WorkerPool {
        WorkerPool {
            pool: None,
            workers: 1,
        }
    }

    /// Number of workers.
    pub fn workers(&self) -> usize {
        self.workers
    }

    fn parallel_for(&self, len: usize) -> Option<&ThreadPool> {
        match self.pool {
            Some(ref pool) if len >= PARALLEL_THRESHOLD => Some(pool),
            _ => None,
        }
    }

    fn ranges(&self, len: usize) -> Vec<Range<usize>> {
        let parts = cmp::max(1, cmp::min(self.workers, len / 8));
        (0..parts)
            .map(|t| (t * len / parts)..((t + 1) * len / parts))
            .collect()
    }

    /// Applies `f` to disjoint ranges covering `0..len` and returns the
    /// results in range order.
    pub fn map_ranges<T, F>(&self, len: usize, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(Range<usize>) -> T + Sync + Send,
    {
        match self.parallel_for(len) {
            Some(pool) => {
                let ranges = self.ranges(len);
                pool.install(|| ranges.into_par_iter().map(|r| f(r)).collect())
            }
            None => vec![f(0..len)],
        }
    }

    /// Returns `[f(0), f(1), .., f(len - 1)]`.
    pub fn map_indices<T, F>(&self, len: usize, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send,
    {
        match self.parallel_for(len) {
            Some(pool) => pool.install(|| (0..len).into_par_iter().map(|i| f(i)).collect()),
            None => (0..len).map(|i| f(i)).collect(),
        }
    }

    /// Calls `f(&mut left[i], &right[i])` for every index.
    pub fn zip_apply<T, U, F>(&self, left: &mut [T], right: &[U], f: F)
    where
        T: Send,
        U: Sync,
        F: Fn(&mut T, &U) + Sync + Send,
    {
        debug_assert_eq!(left.len(), right.len());
        match self.parallel_for(left.len()) {
            Some(pool) => pool.install(|| {
                left.par_iter_mut()
                    .zip(right.par_iter())
                    .for_each(|(l, r)| f(l, r))
            }),
            None => {
                for (l, r) in left.iter_mut().zip(right.iter()) {
                    f(l, r);
                }
            }
        }
    }

    /// Computes `Σ scalars[i]·points[i]`, splitting the sum across workers.
    pub fn multiscalar_mul<G: Group>(&self, scalars: &[G::Scalar], points: &[G]) -> G {
        debug_assert_eq!(scalars.len(), points.len());
        self.map_ranges(scalars.len(), |r| {
            G::multiscalar_mul(&scalars[r.start..r.end], &points[r.start..r.end])
        })
        .into_iter()
        .fold(G::identity(), |acc, p| acc + p)
    }
}
