//! Search parameters and the command line that fills them in.

use clap::{Parser, ValueEnum};

use crate::ack::{Evaluate, MemoizedEvaluator};
use crate::error::SearchError;
use crate::mod_arith::MODULUS;
use crate::stack::StackEvaluator;

pub const DEFAULT_TARGET_X: u16 = 4;
pub const DEFAULT_TARGET_Y: u16 = 1;
pub const DEFAULT_TARGET_OUTPUT: u16 = 6;
pub const DEFAULT_RANGE_SIZE: u16 = MODULUS;
pub const DEFAULT_PROGRESS_EVERY: u16 = 100;
pub const DEFAULT_MAX_DEPTH: usize = 1_000_000;
pub const DEFAULT_STACK_SIZE: usize = 1 << 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EvaluatorKind {
    /// Plain recursion; needs a large thread stack.
    Recursive,
    /// Explicit work stack on the heap.
    Iterative,
}

impl EvaluatorKind {
    pub fn build(self, max_depth: usize) -> Box<dyn Evaluate + Send> {
        match self {
            EvaluatorKind::Recursive => Box::new(MemoizedEvaluator::new(max_depth)),
            EvaluatorKind::Iterative => Box::new(StackEvaluator::new(max_depth)),
        }
    }

    pub fn other(self) -> Self {
        match self {
            EvaluatorKind::Recursive => EvaluatorKind::Iterative,
            EvaluatorKind::Iterative => EvaluatorKind::Recursive,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    pub target_x: u16,
    pub target_y: u16,
    pub target_output: u16,
    /// First register tried.
    pub start: u16,
    /// Registers `start..range_size` are tried.
    pub range_size: u16,
    pub jobs: usize,
    /// Report progress on every register divisible by this; 0 disables it.
    pub progress_every: u16,
    pub evaluator: EvaluatorKind,
    pub max_depth: usize,
    /// Stack size in bytes for the search threads.
    pub stack_size: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            target_x: DEFAULT_TARGET_X,
            target_y: DEFAULT_TARGET_Y,
            target_output: DEFAULT_TARGET_OUTPUT,
            start: 0,
            range_size: DEFAULT_RANGE_SIZE,
            jobs: 1,
            progress_every: DEFAULT_PROGRESS_EVERY,
            evaluator: EvaluatorKind::Iterative,
            max_depth: DEFAULT_MAX_DEPTH,
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.range_size > MODULUS {
            return Err(SearchError::InvalidConfig(format!(
                "range size {} exceeds {}",
                self.range_size, MODULUS
            )));
        }
        if self.start > self.range_size {
            return Err(SearchError::InvalidConfig(format!(
                "start {} is past range size {}",
                self.start, self.range_size
            )));
        }
        if self.jobs == 0 {
            return Err(SearchError::InvalidConfig("jobs must be at least 1".to_string()));
        }
        if self.max_depth == 0 {
            return Err(SearchError::InvalidConfig("max depth must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Search for the register value that makes the teleporter check pass.
#[derive(Parser, Debug)]
#[command(name = "teleporter-search", version)]
pub struct CliArgs {
    /// First argument of the checked call
    #[arg(long, default_value_t = DEFAULT_TARGET_X)]
    pub target_x: u16,
    /// Second argument of the checked call
    #[arg(long, default_value_t = DEFAULT_TARGET_Y)]
    pub target_y: u16,
    /// Result the check must produce
    #[arg(long, default_value_t = DEFAULT_TARGET_OUTPUT)]
    pub target_output: u16,
    /// Register to resume from
    #[arg(long, default_value_t = 0)]
    pub start: u16,
    /// Number of register values in the search space
    #[arg(long, default_value_t = DEFAULT_RANGE_SIZE)]
    pub range_size: u16,
    /// Worker threads; 1 searches strictly in order
    #[arg(short, long, default_value_t = 1)]
    pub jobs: usize,
    /// Print a progress line every N registers (0 = never)
    #[arg(long, default_value_t = DEFAULT_PROGRESS_EVERY)]
    pub progress_every: u16,
    #[arg(long, value_enum, default_value_t = EvaluatorKind::Iterative)]
    pub evaluator: EvaluatorKind,
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,
    /// Stack size in bytes for search threads
    #[arg(long, default_value_t = DEFAULT_STACK_SIZE)]
    pub stack_size: usize,
    /// Re-check a found answer with the other evaluator
    #[arg(long)]
    pub verify: bool,
}

impl From<&CliArgs> for SearchConfig {
    fn from(args: &CliArgs) -> Self {
        SearchConfig {
            target_x: args.target_x,
            target_y: args.target_y,
            target_output: args.target_output,
            start: args.start,
            range_size: args.range_size,
            jobs: args.jobs,
            progress_every: args.progress_every,
            evaluator: args.evaluator,
            max_depth: args.max_depth,
            stack_size: args.stack_size,
        }
    }
}
