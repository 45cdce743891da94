//! Fixed-size worker fan-out over disjoint index ranges.
//!
//! Work over `n` items is cut into one contiguous range per thread, each of
//! `n / threads` items with the remainder folded into the last range. The
//! output slice is split with `split_at_mut` along the same boundaries, so
//! every worker owns its own `&mut` chunk and no locking is needed.

use std::ops::Range;

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::{PhrasaurusError, Result};

/// Contiguous, roughly equal ranges covering `0..total`.
///
/// Never yields more ranges than items, and yields nothing for `total == 0`.
pub fn partition_ranges(total: usize, threads: usize) -> Vec<Range<usize>> {
    if total == 0 {
        return Vec::new();
    }
    let threads = threads.clamp(1, total);
    let size = total / threads;
    (0..threads)
        .map(|t| {
            let start = t * size;
            let end = if t == threads - 1 { total } else { start + size };
            start..end
        })
        .collect()
}

/// A rayon pool with a fixed thread count.
pub struct Partitioner {
    pool: ThreadPool,
    threads: usize,
}

impl Partitioner {
    pub fn new(threads: usize) -> Result<Self> {
        if threads == 0 {
            return Err(PhrasaurusError::invalid_argument(
                "Thread count must be at least 1",
            ));
        }
        let pool = ThreadPoolBuilder::new().num_threads(threads).build()?;
        Ok(Partitioner { pool, threads })
    }

    /// One thread per logical CPU.
    pub fn with_available_parallelism() -> Result<Self> {
        Self::new(num_cpus::get())
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Fill `output[i]` with `f(i)` for every index, one range per worker.
    pub fn fill<T, F>(&self, output: &mut [T], f: F)
    where
        T: Send,
        F: Fn(usize) -> T + Sync,
    {
        let ranges = partition_ranges(output.len(), self.threads);
        let mut chunks = Vec::with_capacity(ranges.len());
        let mut rest = output;
        for range in &ranges {
            let (head, tail) = rest.split_at_mut(range.len());
            chunks.push((range.start, head));
            rest = tail;
        }

        let f = &f;
        self.pool.scope(|scope| {
            for (start, chunk) in chunks {
                scope.spawn(move |_| {
                    for (offset, slot) in chunk.iter_mut().enumerate() {
                        *slot = f(start + offset);
                    }
                });
            }
        });
    }

    /// Collect `f(i)` for `0..len` into a new vector.
    pub fn map<T, F>(&self, len: usize, f: F) -> Vec<T>
    where
        T: Send + Default + Clone,
        F: Fn(usize) -> T + Sync,
    {
        let mut output = vec![T::default(); len];
        self.fill(&mut output, f);
        output
    }
}

impl std::fmt::Debug for Partitioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Partitioner")
            .field("threads", &self.threads)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_ranges_fold_remainder_into_last() {
        let ranges = partition_ranges(10, 3);
        assert_eq!(ranges, vec![0..3, 3..6, 6..10]);
    }

    #[test]
    fn test_partition_ranges_edge_cases() {
        assert!(partition_ranges(0, 4).is_empty());
        assert_eq!(partition_ranges(2, 8), vec![0..1, 1..2]);
        assert_eq!(partition_ranges(5, 1), vec![0..5]);
        assert_eq!(partition_ranges(5, 0), vec![0..5]);
    }

    #[test]
    fn test_fill_writes_every_index() {
        let partitioner = Partitioner::new(3).unwrap();
        let squares: Vec<usize> = partitioner.map(1000, |i| i * i);
        assert_eq!(squares.len(), 1000);
        assert!(squares.iter().enumerate().all(|(i, v)| *v == i * i));
    }

    #[test]
    fn test_zero_threads_rejected() {
        assert!(Partitioner::new(0).is_err());
    }
}
