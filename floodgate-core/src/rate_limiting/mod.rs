mod limiter;
mod window;

pub use limiter::{cleanup_all, RateLimiter};
pub use window::window_start;
