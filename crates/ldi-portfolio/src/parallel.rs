//! Conditional parallel iteration for shift sweeps.
//!
//! Shift evaluations are independent pure computations, so they can be
//! dispatched across worker threads with no coordination beyond collecting
//! ordered results. Parallelism is used only when the `parallel` feature is
//! enabled, the config asks for it, and the sweep is large enough to beat
//! thread overhead.

use crate::types::SensitivityConfig;

/// Maps a function over items, conditionally using parallel iteration.
///
/// Output order always matches input order.
#[allow(unused_variables)]
pub fn maybe_parallel_map<T, U, F>(items: &[T], config: &SensitivityConfig, f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> U + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        if config.should_parallelize(items.len()) {
            return items.par_iter().map(f).collect();
        }
    }

    items.iter().map(f).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_preserves_order() {
        let config = SensitivityConfig::sequential();
        let items = vec![1, 2, 3, 4, 5];
        let results: Vec<i32> = maybe_parallel_map(&items, &config, |x| x * 2);
        assert_eq!(results, vec![2, 4, 6, 8, 10]);
    }

    #[test]
    fn test_threshold_gate() {
        let config = SensitivityConfig::default().with_threshold(10);
        assert!(!config.should_parallelize(5));

        // Only true when the parallel feature is compiled in.
        #[cfg(feature = "parallel")]
        assert!(config.should_parallelize(100));
    }
}
