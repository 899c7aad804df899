use axum::{
    extract::{
        Json, Path, Query, State,
        rejection::QueryRejection,
    },
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::api::error::{ApiError, JsonBody};
use crate::domain::validation::validate_book;
use crate::domain::{BookFilter, DEFAULT_ITEMS_PER_PAGE, DomainError, MAX_ITEMS_PER_PAGE};
use crate::infrastructure::AppState;
use crate::infrastructure::auth::Claims;
use crate::jobs::GenerateCover;
use crate::models::book::{BookDraft, BookPatch};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBooksQuery {
    pub page: Option<u64>,
    pub items_per_page: Option<u64>,
    pub archived: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub sort: Option<String>,
}

impl ListBooksQuery {
    pub fn into_filter(self) -> BookFilter {
        BookFilter {
            archived: self.archived.as_deref().and_then(parse_archived),
            title: self.title,
            author: self.author,
            isbn: self.isbn,
            sort: self.sort,
            page: self.page.unwrap_or(1).max(1),
            items_per_page: self
                .items_per_page
                .unwrap_or(DEFAULT_ITEMS_PER_PAGE)
                .clamp(1, MAX_ITEMS_PER_PAGE),
        }
    }
}

/// `true`/`1` and `false`/`0`; anything else disables the filter
pub fn parse_archived(value: &str) -> Option<bool> {
    match value {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

#[utoipa::path(
    get,
    path = "/api/books",
    params(
        ("page" = Option<u64>, Query, description = "1-based page number"),
        ("itemsPerPage" = Option<u64>, Query, description = "Page size, at most 100"),
        ("archived" = Option<String>, Query, description = "true/1: archived only, false/0: exclude archived"),
        ("title" = Option<String>, Query, description = "Title contains"),
        ("author" = Option<String>, Query, description = "Author contains"),
        ("isbn" = Option<String>, Query, description = "Exact ISBN"),
        ("sort" = Option<String>, Query, description = "title_asc, title_desc or recent")
    ),
    responses(
        (status = 200, description = "Paginated list of books")
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    query: Result<Query<ListBooksQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query?;
    let result = state.book_repo.find_all(query.into_filter()).await?;
    let last_page = result.last_page();

    Ok(Json(json!({
        "books": result.books,
        "total": result.total,
        "page": result.page,
        "itemsPerPage": result.items_per_page,
        "lastPage": last_page,
    })))
}

#[utoipa::path(
    get,
    path = "/api/books/{id}",
    params(("id" = String, Path, description = "Book identifier")),
    responses(
        (status = 200, description = "The book with its reviews"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let book = state
        .book_repo
        .find_by_id(&id)
        .await?
        .ok_or(DomainError::NotFound)?;

    Ok(Json(book))
}

#[utoipa::path(
    post,
    path = "/api/books",
    responses(
        (status = 201, description = "Book created"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    draft: JsonBody<BookDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(draft) = draft?;
    let new_book = validate_book(draft)?;
    let book = state.book_repo.create(new_book).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Book created successfully",
            "book": book
        })),
    ))
}

#[utoipa::path(
    patch,
    path = "/api/books/{id}",
    params(("id" = String, Path, description = "Book identifier")),
    responses(
        (status = 200, description = "Book updated"),
        (status = 404, description = "Book not found"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    patch: JsonBody<BookPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(patch) = patch?;
    let existing = state
        .book_repo
        .find_by_id(&id)
        .await?
        .ok_or(DomainError::NotFound)?;

    let replace_cover = patch.cover.is_some();
    let updated = validate_book(patch.apply_to(&existing))?;
    let book = state.book_repo.update(&id, updated, replace_cover).await?;

    Ok(Json(json!({
        "message": "Book updated successfully",
        "book": book
    })))
}

#[utoipa::path(
    delete,
    path = "/api/books/{id}",
    params(("id" = String, Path, description = "Book identifier")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Not an admin"),
        (status = 404, description = "Book not found")
    ),
    security(("bearer" = []))
)]
pub async fn delete_book(
    claims: Claims,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !claims.is_admin() {
        tracing::warn!("User {} tried to delete book {}", claims.sub, id);
        return Err(ApiError::Forbidden);
    }

    state.book_repo.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/api/books/{id}/generate-cover",
    params(("id" = String, Path, description = "Book identifier")),
    responses(
        (status = 202, description = "Cover generation queued"),
        (status = 404, description = "Book not found"),
        (status = 503, description = "Cover worker unavailable")
    )
)]
pub async fn generate_cover(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if state.book_repo.find_by_id(&id).await?.is_none() {
        return Err(DomainError::NotFound.into());
    }

    // The outcome is published on the queue's broadcast; this request does not wait for it
    let _outcome = state
        .cover_queue
        .dispatch(GenerateCover {
            book_id: id.clone(),
        })
        .await?;

    tracing::info!("Cover generation queued for book {}", id);
    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "message": "Cover generation queued",
            "bookId": id
        })),
    ))
}
