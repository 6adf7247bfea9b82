use std::sync::Mutex;

/// Pair counters shared by the scan workers.
pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

struct Metrics {
    completed: usize,
    with_failures: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics {
                completed: 0,
                with_failures: 0,
            }),
        }
    }

    /// Records one finished pair and returns the number finished so far.
    pub fn record_pair(&self, had_failures: bool) -> usize {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.completed += 1;
            if had_failures {
                metrics.with_failures += 1;
            }
            metrics.completed
        } else {
            0
        }
    }

    /// `(completed pairs, pairs with at least one failed sample or segment)`
    pub fn snapshot(&self) -> (usize, usize) {
        if let Ok(metrics) = self.inner.lock() {
            (metrics.completed, metrics.with_failures)
        } else {
            (0, 0)
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn counts_pairs_from_parallel_workers() {
        let recorder = MetricsRecorder::new();
        (0..64).into_par_iter().for_each(|i| {
            recorder.record_pair(i % 4 == 0);
        });
        assert_eq!(recorder.snapshot(), (64, 16));
    }
}
