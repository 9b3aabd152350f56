pub mod context;
pub mod views;

pub use context::AppContext;
