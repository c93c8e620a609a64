use std::error::Error;

use uuid::Uuid;

#[derive(thiserror::Error, Debug)]
pub enum FloodgateError {
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    #[error("invalid limiter id")]
    InvalidLimiterId,
    #[error("invalid limiter configuration: capacity and interval must be positive")]
    InvalidLimiterConfig,
    #[error("limiter {0} not found")]
    LimiterNotFound(Uuid),
    #[error("rate limit exceeded: {count} actions in the current window")]
    RateLimitExceeded { count: u64 },
    #[error("failed to parse URL: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
    #[error(transparent)]
    Other(Box<dyn Error + Send + Sync>),
}

impl FloodgateError {
    pub fn other<E: Error + Send + Sync + 'static>(err: E) -> Self {
        Self::Other(Box::new(err))
    }
}
