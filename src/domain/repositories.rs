//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;

use super::DomainError;
use crate::models::{Book, Review};

pub const DEFAULT_ITEMS_PER_PAGE: u64 = 30;
pub const MAX_ITEMS_PER_PAGE: u64 = 100;

/// Filter criteria for book queries
#[derive(Debug, Clone)]
pub struct BookFilter {
    /// `Some(true)`: archived only, `Some(false)`: exclude archived
    pub archived: Option<bool>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub sort: Option<String>,
    /// 1-based
    pub page: u64,
    pub items_per_page: u64,
}

impl Default for BookFilter {
    fn default() -> Self {
        Self {
            archived: None,
            title: None,
            author: None,
            isbn: None,
            sort: None,
            page: 1,
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
        }
    }
}

/// Paginated result with total count
#[derive(Debug)]
pub struct PaginatedBooks {
    pub books: Vec<Book>,
    pub total: u64,
    pub page: u64,
    pub items_per_page: u64,
}

impl PaginatedBooks {
    pub fn last_page(&self) -> u64 {
        if self.items_per_page == 0 {
            return 1;
        }
        self.total.div_ceil(self.items_per_page).max(1)
    }
}

/// Validated book values, ready to be persisted
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub isbn: Option<String>,
    pub title: String,
    pub description: String,
    pub author: String,
    pub publication_date: String,
    pub archived: bool,
    pub cover: Option<String>,
}

/// Validated review values, ready to be persisted
#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub book_id: String,
    pub body: String,
    pub rating: i32,
    pub author: Option<String>,
    pub publication_date: Option<String>,
}

/// Repository trait for Book entity
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Find all books matching the filter criteria with pagination support
    async fn find_all(&self, filter: BookFilter) -> Result<PaginatedBooks, DomainError>;

    /// Find a single book by ID, reviews included
    async fn find_by_id(&self, id: &str) -> Result<Option<Book>, DomainError>;

    /// Create a new book
    async fn create(&self, book: NewBook) -> Result<Book, DomainError>;

    /// Replace the writable fields of an existing book. The stored cover is
    /// only written when `replace_cover` is set.
    async fn update(
        &self,
        id: &str,
        book: NewBook,
        replace_cover: bool,
    ) -> Result<Book, DomainError>;

    /// Persist only the cover field
    async fn set_cover(&self, id: &str, cover: Option<String>) -> Result<(), DomainError>;

    /// Delete a book and its reviews
    async fn delete(&self, id: &str) -> Result<(), DomainError>;
}

/// Repository trait for Review entity
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn find_by_book(&self, book_id: &str) -> Result<Vec<Review>, DomainError>;

    async fn create(&self, review: NewReview) -> Result<Review, DomainError>;

    async fn delete(&self, id: &str) -> Result<(), DomainError>;
}
