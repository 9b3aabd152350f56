pub mod cache;

pub use cache::{TrendingCache, TrendingSnapshot, DEFAULT_CACHE_TTL_SECONDS, DEFAULT_WINDOW_DAYS};
