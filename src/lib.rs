pub mod api;
pub mod api_docs;
pub mod domain;
pub mod frontend;
pub mod infrastructure;
pub mod jobs;
pub mod models;

pub use infrastructure::AppState;
pub use infrastructure::auth;
pub use infrastructure::config;
pub use infrastructure::db;
pub use infrastructure::seed;
pub use infrastructure::server;
