use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("register value `{0}` is outside 0..32768")]
    RegisterOutOfRange(u16),
    #[error("recursion limit {limit} exceeded")]
    DepthLimit { limit: usize },
}

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("invalid search configuration: {0}")]
    InvalidConfig(String),
    #[error("could not build worker pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}
