use thiserror::Error;

/// Fatal conditions for a single invocation. Everything else degrades to
/// absence instead of surfacing here.
#[derive(Error, Debug)]
pub enum HowlError {
    #[error("stdin parse error: {0}")]
    InvalidInput(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HowlError>;
