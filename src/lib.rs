pub mod app;
pub mod backup;
pub mod coach;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod state;
pub mod stats;
pub mod storage;
pub mod validation;

pub use app::router;
pub use config::Config;
pub use repository::Repository;
pub use state::AppState;
pub use storage::{FileStore, MemoryStore, resolve_data_dir};
