pub mod db;
mod rate_limiting;

pub use db::connect_to_db;
pub use rate_limiting::{cleanup_all, window_start, RateLimiter};
