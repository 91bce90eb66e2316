use std::collections::HashMap;

use crate::error::EvalError;
use crate::mod_arith::{checked_dec, is_register, reg_inc};

/// Results for one trial, keyed on `(x, y)`. The register is fixed per trial
/// so it is not part of the key.
pub type Cache = HashMap<(u16, u16), u16>;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub calls: u64,
    pub hits: u64,
    pub misses: u64,
}

/// The Ackermann-style check `f(x, y)` with register `r` substituted at the
/// `y == 0` branch.
///
/// An implementation owns one cache. Entries are trusted regardless of `r`,
/// so `reset` must be called before evaluating under a different register.
pub trait Evaluate {
    fn evaluate(&mut self, x: u16, y: u16, r: u16) -> Result<u16, EvalError>;
    fn reset(&mut self);
    fn stats(&self) -> Stats;
}

/// Direct recurrence with no cache. Only usable for tiny inputs.
pub fn pure_ack(x: u32, y: u32, r: u32) -> u32 {
    if x == 0 {
        return (y + 1) % 32768;
    }
    if y == 0 {
        return pure_ack(x - 1, r, r);
    }
    let intermediate = pure_ack(x, y - 1, r);
    pure_ack(x - 1, intermediate, r)
}

#[derive(Debug)]
pub struct MemoizedEvaluator {
    memo: Cache,
    stats: Stats,
    max_depth: usize,
}

impl MemoizedEvaluator {
    pub fn new(max_depth: usize) -> Self {
        MemoizedEvaluator {
            memo: HashMap::new(),
            stats: Stats::default(),
            max_depth,
        }
    }

    pub fn cached(&self, x: u16, y: u16) -> Option<u16> {
        self.memo.get(&(x, y)).copied()
    }

    pub fn len(&self) -> usize {
        self.memo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memo.is_empty()
    }

    fn memo_ack(&mut self, x: u16, y: u16, r: u16, depth: usize) -> Result<u16, EvalError> {
        self.stats.calls += 1;
        if let Some(&ans) = self.memo.get(&(x, y)) {
            self.stats.hits += 1;
            return Ok(ans);
        }
        if depth > self.max_depth {
            return Err(EvalError::DepthLimit { limit: self.max_depth });
        }
        let ret = match (checked_dec(&x), checked_dec(&y)) {
            (None, _) => reg_inc(y),
            (Some(x1), None) => self.memo_ack(x1, r, r, depth + 1)?,
            (Some(x1), Some(y1)) => {
                let intermediate = self.memo_ack(x, y1, r, depth + 1)?;
                self.memo_ack(x1, intermediate, r, depth + 1)?
            }
        };
        self.memo.insert((x, y), ret);
        self.stats.misses += 1;
        Ok(ret)
    }
}

impl Evaluate for MemoizedEvaluator {
    fn evaluate(&mut self, x: u16, y: u16, r: u16) -> Result<u16, EvalError> {
        if !is_register(r) {
            return Err(EvalError::RegisterOutOfRange(r));
        }
        self.memo_ack(x, y, r, 1)
    }

    fn reset(&mut self) {
        self.memo.clear();
        self.stats = Stats::default();
    }

    fn stats(&self) -> Stats {
        self.stats
    }
}
