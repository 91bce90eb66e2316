use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info, warn};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::ack::Evaluate;
use crate::config::SearchConfig;
use crate::error::{EvalError, SearchError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Smallest register in range that produces the target output.
    Found(u16),
    NotFound,
    /// Stopped by the cancel flag; `next` is the first register not checked.
    Cancelled { next: u16 },
    Aborted { register: u16, error: EvalError },
}

#[derive(Debug)]
enum Trial {
    Match,
    Miss,
    Skipped,
    Abort(EvalError),
}

pub struct RegisterSearch {
    config: SearchConfig,
    cancel: Arc<AtomicBool>,
}

impl RegisterSearch {
    pub fn new(config: SearchConfig) -> Result<Self, SearchError> {
        Self::with_cancel(config, Arc::new(AtomicBool::new(false)))
    }

    pub fn with_cancel(config: SearchConfig, cancel: Arc<AtomicBool>) -> Result<Self, SearchError> {
        config.validate()?;
        Ok(RegisterSearch { config, cancel })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Try registers in ascending order, calling `progress` with every
    /// register divisible by `progress_every`. With more than one job the
    /// progress calls arrive out of order, but the outcome is the same.
    pub fn run<P>(&self, progress: P) -> Result<SearchOutcome, SearchError>
        where P: Fn(u16) + Sync
    {
        let pool = self.pool(self.config.jobs)?;
        info!(
            "searching registers {}..{} for f({}, {}) = {} with {} job(s)",
            self.config.start,
            self.config.range_size,
            self.config.target_x,
            self.config.target_y,
            self.config.target_output,
            self.config.jobs
        );
        let outcome = if self.config.jobs == 1 {
            pool.install(|| self.sequential(&progress))
        } else {
            pool.install(|| self.parallel(&progress))
        };
        match &outcome {
            SearchOutcome::Found(r) => info!("register {} passes the check", r),
            SearchOutcome::NotFound => info!("no register in range passes the check"),
            SearchOutcome::Cancelled { next } => {
                warn!("search cancelled before register {}", next)
            }
            SearchOutcome::Aborted { register, error } => {
                warn!("search aborted at register {}: {}", register, error)
            }
        }
        Ok(outcome)
    }

    /// Recompute the check for `r` with the evaluator the search did not use.
    pub fn verify(&self, r: u16) -> Result<bool, SearchError> {
        let config = &self.config;
        let kind = config.evaluator.other();
        let pool = self.pool(1)?;
        let value = pool.install(|| {
            kind.build(config.max_depth)
                .evaluate(config.target_x, config.target_y, r)
        })?;
        debug!("verify register {} with {:?} evaluator: got {}", r, kind, value);
        Ok(value == config.target_output)
    }

    fn pool(&self, threads: usize) -> Result<ThreadPool, SearchError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .stack_size(self.config.stack_size)
            .build()?;
        Ok(pool)
    }

    fn should_report(&self, r: u16) -> bool {
        let every = self.config.progress_every;
        every != 0 && r % every == 0
    }

    fn trial(&self, evaluator: &mut dyn Evaluate, r: u16) -> Trial {
        let config = &self.config;
        evaluator.reset();
        match evaluator.evaluate(config.target_x, config.target_y, r) {
            Ok(v) if v == config.target_output => Trial::Match,
            Ok(v) => {
                debug!("register {}: got {}", r, v);
                Trial::Miss
            }
            Err(e) => Trial::Abort(e),
        }
    }

    fn sequential(&self, progress: &(dyn Fn(u16) + Sync)) -> SearchOutcome {
        let mut evaluator = self.config.evaluator.build(self.config.max_depth);
        for r in self.config.start..self.config.range_size {
            if self.cancel.load(Ordering::Relaxed) {
                return SearchOutcome::Cancelled { next: r };
            }
            if self.should_report(r) {
                progress(r);
            }
            match self.trial(&mut *evaluator, r) {
                Trial::Match => return SearchOutcome::Found(r),
                Trial::Miss | Trial::Skipped => (),
                Trial::Abort(error) => return SearchOutcome::Aborted { register: r, error },
            }
        }
        SearchOutcome::NotFound
    }

    fn parallel(&self, progress: &(dyn Fn(u16) + Sync)) -> SearchOutcome {
        let config = &self.config;
        let first = (config.start..config.range_size)
            .into_par_iter()
            .map_init(
                || config.evaluator.build(config.max_depth),
                |evaluator, r| {
                    if self.cancel.load(Ordering::Relaxed) {
                        return (r, Trial::Skipped);
                    }
                    if self.should_report(r) {
                        progress(r);
                    }
                    (r, self.trial(&mut **evaluator, r))
                },
            )
            .find_first(|(_, trial)| !matches!(trial, Trial::Miss));
        match first {
            None => SearchOutcome::NotFound,
            Some((r, Trial::Match)) => SearchOutcome::Found(r),
            Some((r, Trial::Skipped)) => SearchOutcome::Cancelled { next: r },
            Some((r, Trial::Abort(error))) => SearchOutcome::Aborted { register: r, error },
            Some((_, Trial::Miss)) => SearchOutcome::NotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ack::pure_ack;
    use crate::config::EvaluatorKind;
    use std::sync::Mutex;

    fn config(x: u16, y: u16, output: u16) -> SearchConfig {
        SearchConfig {
            target_x: x,
            target_y: y,
            target_output: output,
            stack_size: 256 << 20,
            ..SearchConfig::default()
        }
    }

    fn run(config: SearchConfig) -> SearchOutcome {
        RegisterSearch::new(config).unwrap().run(|_| ()).unwrap()
    }

    fn brute_force(x: u32, y: u32, output: u32, below: u32) -> Option<u16> {
        (0..below).find(|&r| pure_ack(x, y, r) == output).map(|r| r as u16)
    }

    #[test]
    fn every_register_matches_so_smallest_wins() {
        assert_eq!(run(config(0, 5, 6)), SearchOutcome::Found(0));
        let resumed = SearchConfig { start: 10, ..config(0, 5, 6) };
        assert_eq!(run(resumed), SearchOutcome::Found(10));
    }

    #[test]
    fn finds_smallest_register_for_small_targets() {
        for &kind in &[EvaluatorKind::Recursive, EvaluatorKind::Iterative] {
            let one = SearchConfig { evaluator: kind, ..config(1, 1, 6) };
            assert_eq!(run(one), SearchOutcome::Found(4));
            let two = SearchConfig { evaluator: kind, ..config(2, 1, 11) };
            assert_eq!(run(two), SearchOutcome::Found(3));
        }
        assert_eq!(brute_force(1, 1, 6, 50), Some(4));
        assert_eq!(brute_force(2, 1, 11, 50), Some(3));
    }

    #[test]
    fn exhausted_range_is_not_found() {
        let config = SearchConfig { range_size: 200, ..config(0, 5, 7) };
        assert_eq!(run(config), SearchOutcome::NotFound);
    }

    #[test]
    fn parallel_returns_the_smallest_match() {
        let all = SearchConfig { jobs: 4, ..config(0, 5, 6) };
        assert_eq!(run(all), SearchOutcome::Found(0));
        let two = SearchConfig { jobs: 4, ..config(2, 1, 11) };
        assert_eq!(run(two), SearchOutcome::Found(3));
        let none = SearchConfig { jobs: 3, range_size: 300, ..config(0, 5, 7) };
        assert_eq!(run(none), SearchOutcome::NotFound);
    }

    #[test]
    fn cancel_flag_stops_before_first_trial() {
        let cancel = Arc::new(AtomicBool::new(true));
        let resumed = SearchConfig { start: 7, ..config(0, 5, 6) };
        let search = RegisterSearch::with_cancel(resumed, cancel).unwrap();
        assert_eq!(search.run(|_| ()).unwrap(), SearchOutcome::Cancelled { next: 7 });

        let search = RegisterSearch::new(SearchConfig { jobs: 2, ..config(0, 5, 6) }).unwrap();
        search.cancel_flag().store(true, Ordering::SeqCst);
        assert_eq!(search.run(|_| ()).unwrap(), SearchOutcome::Cancelled { next: 0 });
    }

    #[test]
    fn depth_limit_aborts_search() {
        for &jobs in &[1, 2] {
            let config = SearchConfig { max_depth: 2, jobs, ..config(2, 2, 6) };
            assert_eq!(
                run(config),
                SearchOutcome::Aborted { register: 0, error: EvalError::DepthLimit { limit: 2 } }
            );
        }
    }

    #[test]
    fn progress_reports_every_hundredth_register() {
        let seen = Mutex::new(Vec::new());
        let config = SearchConfig { range_size: 350, ..config(0, 5, 7) };
        let outcome = RegisterSearch::new(config)
            .unwrap()
            .run(|r| seen.lock().unwrap().push(r))
            .unwrap();
        assert_eq!(outcome, SearchOutcome::NotFound);
        assert_eq!(seen.into_inner().unwrap(), vec![0, 100, 200, 300]);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SearchConfig { range_size: 40000, ..SearchConfig::default() };
        assert!(RegisterSearch::new(config).is_err());
    }

    #[test]
    fn window_around_known_answer() {
        let config = SearchConfig { start: 25730, range_size: 25740, ..config(4, 1, 6) };
        let search = RegisterSearch::new(config).unwrap();
        assert_eq!(search.run(|_| ()).unwrap(), SearchOutcome::Found(25734));
        assert!(search.verify(25734).unwrap());
        assert!(!search.verify(25733).unwrap());
    }

    #[test]
    #[ignore = "tries ~25k registers"]
    fn seeded_search() {
        let jobs = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        let search = RegisterSearch::new(SearchConfig { jobs, ..config(4, 1, 6) }).unwrap();
        let r = match search.run(|_| ()).unwrap() {
            SearchOutcome::Found(r) => r,
            other => panic!("expected an answer, got {:?}", other),
        };
        assert!(search.verify(r).unwrap());
        assert_eq!(r, 25734);
    }
}
