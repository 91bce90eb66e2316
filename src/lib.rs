//! Brute-force search for the register value that makes a modified
//! Ackermann function, seeded with that value, return a target output.
//!
//! ```no_run
//! use teleporter_search::{RegisterSearch, SearchConfig, SearchOutcome};
//!
//! let search = RegisterSearch::new(SearchConfig::default()).unwrap();
//! if let SearchOutcome::Found(r) = search.run(|r| println!("Trying: {}", r)).unwrap() {
//!     println!("Found Answer: {}", r);
//! }
//! ```

pub mod ack;
pub mod config;
pub mod error;
pub mod mod_arith;
pub mod search;
pub mod stack;

pub use ack::{Evaluate, MemoizedEvaluator, Stats};
pub use config::{CliArgs, EvaluatorKind, SearchConfig};
pub use error::{EvalError, SearchError};
pub use search::{RegisterSearch, SearchOutcome};
pub use stack::StackEvaluator;
