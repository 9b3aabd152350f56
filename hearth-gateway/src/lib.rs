pub mod app_config;
pub mod auth;
pub mod feed;
pub mod images;
pub mod memory;
pub mod rest;

pub use auth::AuthClient;
pub use feed::ChangeFeedHub;
pub use images::ImgurClient;
pub use memory::InMemoryBackend;
pub use rest::RestGateway;
