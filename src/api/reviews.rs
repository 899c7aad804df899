use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::api::error::{ApiError, JsonBody};
use crate::domain::validation::validate_review;
use crate::domain::{DomainError, Violation};
use crate::infrastructure::AppState;
use crate::infrastructure::auth::Claims;
use crate::models::review::ReviewDraft;

pub const UNKNOWN_BOOK: &str = "This book does not exist.";

#[utoipa::path(
    get,
    path = "/api/books/{id}/reviews",
    params(("id" = String, Path, description = "Book identifier")),
    responses(
        (status = 200, description = "Reviews of the book, oldest first"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn list_book_reviews(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if state.book_repo.find_by_id(&id).await?.is_none() {
        return Err(DomainError::NotFound.into());
    }

    let reviews = state.review_repo.find_by_book(&id).await?;
    Ok(Json(json!({
        "reviews": reviews,
        "total": reviews.len()
    })))
}

#[utoipa::path(
    post,
    path = "/api/reviews",
    responses(
        (status = 201, description = "Review created"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn create_review(
    State(state): State<AppState>,
    draft: JsonBody<ReviewDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(draft) = draft?;
    let new_review = validate_review(draft)?;

    if state.book_repo.find_by_id(&new_review.book_id).await?.is_none() {
        return Err(DomainError::Validation(vec![Violation::new("bookId", UNKNOWN_BOOK)]).into());
    }

    let review = state.review_repo.create(new_review).await?;
    tracing::info!("Review {} added to book {}", review.id, review.book_id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Review created successfully",
            "review": review
        })),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/reviews/{id}",
    params(("id" = String, Path, description = "Review identifier")),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "Review not found")
    ),
    security(("bearer" = []))
)]
pub async fn delete_review(
    claims: Claims,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !claims.is_admin() {
        return Err(ApiError::Forbidden);
    }

    state.review_repo.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
