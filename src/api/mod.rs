pub mod auth;
pub mod books;
pub mod error;
pub mod health;
pub mod reviews;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::infrastructure::AppState;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Auth
        .route("/login", post(auth::login))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route(
            "/books/:id",
            get(books::get_book)
                .patch(books::update_book)
                .delete(books::delete_book),
        )
        .route("/books/:id/generate-cover", put(books::generate_cover))
        // Reviews
        .route("/books/:id/reviews", get(reviews::list_book_reviews))
        .route("/reviews", post(reviews::create_review))
        .route("/reviews/:id", axum::routing::delete(reviews::delete_review))
        .with_state(state)
}
