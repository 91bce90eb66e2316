//! Iterative evaluator.
//!
//! Same recurrence and cache semantics as [`MemoizedEvaluator`], but pending
//! work lives on a heap-allocated stack so deep chains cannot exhaust the
//! thread's call stack. The result of the most recently finished evaluation
//! is kept in a single `ret` register, which is all `Apply` and `Store` need.
//!
//! [`MemoizedEvaluator`]: crate::ack::MemoizedEvaluator

use std::collections::HashMap;

use log::trace;

use crate::ack::{Cache, Evaluate, Stats};
use crate::error::EvalError;
use crate::mod_arith::{checked_dec, is_register, reg_inc};

#[derive(Debug, Clone, Copy)]
enum Task {
    /// Compute `f(x, y)` into `ret`.
    Eval(u16, u16),
    /// Compute `f(x, ret)` into `ret`.
    Apply(u16),
    /// Record `ret` as the value of `f(x, y)`.
    Store(u16, u16),
}

#[derive(Debug)]
pub struct StackEvaluator {
    memo: Cache,
    stats: Stats,
    max_depth: usize,
    work: Vec<Task>,
    peak: usize,
}

impl StackEvaluator {
    pub fn new(max_depth: usize) -> Self {
        StackEvaluator {
            memo: HashMap::new(),
            stats: Stats::default(),
            max_depth,
            work: Vec::new(),
            peak: 0,
        }
    }

    pub fn cached(&self, x: u16, y: u16) -> Option<u16> {
        self.memo.get(&(x, y)).copied()
    }

    /// Deepest the work stack grew since the last reset.
    pub fn peak_depth(&self) -> usize {
        self.peak
    }

    fn push(&mut self, task: Task) -> Result<(), EvalError> {
        self.work.push(task);
        self.peak = self.peak.max(self.work.len());
        if self.work.len() > self.max_depth {
            return Err(EvalError::DepthLimit { limit: self.max_depth });
        }
        Ok(())
    }
}

impl Evaluate for StackEvaluator {
    fn evaluate(&mut self, x: u16, y: u16, r: u16) -> Result<u16, EvalError> {
        if !is_register(r) {
            return Err(EvalError::RegisterOutOfRange(r));
        }
        self.work.clear();
        let mut ret = 0;
        self.push(Task::Eval(x, y))?;
        while let Some(task) = self.work.pop() {
            match task {
                Task::Eval(x, y) => {
                    self.stats.calls += 1;
                    if let Some(&ans) = self.memo.get(&(x, y)) {
                        self.stats.hits += 1;
                        ret = ans;
                        continue;
                    }
                    match (checked_dec(&x), checked_dec(&y)) {
                        (None, _) => {
                            ret = reg_inc(y);
                            self.memo.insert((x, y), ret);
                            self.stats.misses += 1;
                        }
                        (Some(x1), None) => {
                            self.push(Task::Store(x, y))?;
                            self.push(Task::Eval(x1, r))?;
                        }
                        (Some(x1), Some(y1)) => {
                            self.push(Task::Store(x, y))?;
                            self.push(Task::Apply(x1))?;
                            self.push(Task::Eval(x, y1))?;
                        }
                    }
                }
                Task::Apply(x1) => self.push(Task::Eval(x1, ret))?,
                Task::Store(x, y) => {
                    self.memo.insert((x, y), ret);
                    self.stats.misses += 1;
                }
            }
        }
        trace!("f({}, {}) with r = {} -> {}, peak stack {}", x, y, r, ret, self.peak);
        Ok(ret)
    }

    fn reset(&mut self) {
        self.memo.clear();
        self.work.clear();
        self.stats = Stats::default();
        self.peak = 0;
    }

    fn stats(&self) -> Stats {
        self.stats
    }
}
