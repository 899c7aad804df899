//! Application state containing repositories and shared resources

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::domain::{BookRepository, DomainError, ReviewRepository};
use crate::infrastructure::config::Config;
use crate::infrastructure::{SeaOrmBookRepository, SeaOrmReviewRepository};
use crate::jobs::{CoverGenerator, CoverQueue};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection (used directly by the login handler)
    db: DatabaseConnection,
    /// Book repository
    pub book_repo: Arc<dyn BookRepository>,
    /// Review repository
    pub review_repo: Arc<dyn ReviewRepository>,
    /// Cover generation jobs
    pub cover_queue: CoverQueue,
}

impl AppState {
    /// Create a new AppState, starting the cover worker configured from `config`
    pub fn new(db: DatabaseConnection, config: &Config) -> Result<Self, DomainError> {
        let generator = CoverGenerator::from_config(config)?;
        Ok(Self::with_cover_generator(
            db,
            generator,
            config.cover_queue_capacity,
        ))
    }

    /// Create a new AppState around an already-built cover generator
    pub fn with_cover_generator(
        db: DatabaseConnection,
        generator: CoverGenerator,
        queue_capacity: usize,
    ) -> Self {
        let book_repo: Arc<dyn BookRepository> = Arc::new(SeaOrmBookRepository::new(db.clone()));
        let review_repo: Arc<dyn ReviewRepository> =
            Arc::new(SeaOrmReviewRepository::new(db.clone()));
        let cover_queue = CoverQueue::start(book_repo.clone(), Arc::new(generator), queue_capacity);

        Self {
            db,
            book_repo,
            review_repo,
            cover_queue,
        }
    }

    /// Get the database connection
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

// Implement FromRef to allow extracting DatabaseConnection from AppState
impl axum::extract::FromRef<AppState> for DatabaseConnection {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}
