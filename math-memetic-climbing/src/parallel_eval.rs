use rayon::prelude::*;

/// Parallel cycle execution configuration
#[derive(Debug, Clone, Default)]
pub struct ParallelConfig {
    /// Run restart cycles on a rayon pool
    pub enabled: bool,
    /// Number of threads to use (None = use rayon default)
    pub num_threads: Option<usize>,
}

/// Run `task` once per cycle, keeping results in cycle order.
///
/// Each cycle receives its index and its own sub-seed, so the output is the
/// same whether cycles run sequentially or in parallel. Sequential execution
/// stops at the first failing cycle.
pub fn run_cycles<T, E, F>(seeds: &[u64], task: F, config: &ParallelConfig) -> Result<Vec<T>, E>
where
    T: Send,
    E: Send,
    F: Fn(usize, u64) -> Result<T, E> + Sync,
{
    if !config.enabled || seeds.len() < 2 {
        return seeds
            .iter()
            .enumerate()
            .map(|(cycle, &seed)| task(cycle, seed))
            .collect();
    }

    let run = || -> Vec<Result<T, E>> {
        seeds
            .par_iter()
            .enumerate()
            .map(|(cycle, &seed)| task(cycle, seed))
            .collect()
    };

    let results = match config.num_threads {
        Some(n) => match rayon::ThreadPoolBuilder::new().num_threads(n).build() {
            Ok(pool) => pool.install(run),
            Err(e) => {
                log::warn!("could not build a {n}-thread pool ({e}), using the global pool");
                run()
            }
        },
        None => run(),
    };

    // lowest-numbered failure wins
    results.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallel_matches_sequential() {
        let seeds: Vec<u64> = (0..64).map(|i| i * 7919).collect();
        let task = |cycle: usize, seed: u64| -> Result<u64, String> {
            Ok(seed.wrapping_mul(31) ^ cycle as u64)
        };

        let config = ParallelConfig {
            enabled: true,
            num_threads: Some(2),
        };
        let parallel = run_cycles(&seeds, task, &config).unwrap();

        let config_seq = ParallelConfig {
            enabled: false,
            num_threads: None,
        };
        let sequential = run_cycles(&seeds, task, &config_seq).unwrap();

        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_first_failure_is_reported() {
        let seeds: Vec<u64> = (0..32).collect();
        let task = |cycle: usize, _seed: u64| -> Result<usize, String> {
            if cycle == 5 || cycle == 20 {
                Err(format!("cycle {cycle} failed"))
            } else {
                Ok(cycle)
            }
        };

        let config = ParallelConfig {
            enabled: true,
            num_threads: None,
        };
        assert_eq!(
            run_cycles(&seeds, task, &config).unwrap_err(),
            "cycle 5 failed"
        );
        assert_eq!(
            run_cycles(&seeds, task, &ParallelConfig::default()).unwrap_err(),
            "cycle 5 failed"
        );
    }

    #[test]
    fn test_sequential_stops_at_first_failure() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let calls = AtomicUsize::new(0);
        let seeds = [1u64, 2, 3, 4];
        let task = |cycle: usize, _seed: u64| -> Result<(), ()> {
            calls.fetch_add(1, Ordering::SeqCst);
            if cycle == 1 { Err(()) } else { Ok(()) }
        };
        assert!(run_cycles(&seeds, task, &ParallelConfig::default()).is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
