use crate::api::error::ApiError;
use crate::auth::{create_jwt, verify_password};
use crate::models::user;
use axum::{Json, extract::State};
use sea_orm::*;
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    token: String,
}

#[utoipa::path(
    post,
    path = "/api/login",
    responses(
        (status = 200, description = "Bearer token issued"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    tracing::info!("Login attempt for user: {}", payload.username);

    let Some(user) = user::Entity::find()
        .filter(user::Column::Username.eq(&payload.username))
        .one(&db)
        .await
        .map_err(crate::domain::DomainError::from)?
    else {
        tracing::warn!("User not found: {}", payload.username);
        return Err(ApiError::Unauthorized);
    };

    // a malformed stored hash is treated like a wrong password
    if !matches!(verify_password(&payload.password, &user.password_hash), Ok(true)) {
        tracing::warn!("Password verification failed for user: {}", user.username);
        return Err(ApiError::Unauthorized);
    }

    tracing::info!("Password verified successfully for user: {}", user.username);
    let token = create_jwt(&user.username, &user.role)?;
    Ok(Json(LoginResponse { token }))
}
