// handlers.rs
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::{
    auth::{AdminToken, AuthError},
    error::AppError,
    extract::{bearer_token, AdminGuard, Payload},
    models::{LoginRequest, Quiz, QuizInput, Recipe, RecipeInput},
    state::AppState,
};

/// An id that is not a UUID cannot name a stored row.
fn parse_id(raw: &str, resource: &'static str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(resource))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Create a quiz with its questions
pub async fn create_quiz(
    State(state): State<AppState>,
    _admin: AdminGuard,
    Payload(input): Payload<QuizInput>,
) -> Result<Json<Quiz>, AppError> {
    let quiz = state.store.create_quiz(input.validate()?).await?;
    info!(quiz_id = %quiz.id, "Quiz created");
    Ok(Json(quiz))
}

pub async fn list_quizzes(State(state): State<AppState>) -> Result<Json<Vec<Quiz>>, AppError> {
    Ok(Json(state.store.list_quizzes().await?))
}

pub async fn get_quiz(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Quiz>, AppError> {
    let id = parse_id(&id, "Quiz")?;
    Ok(Json(state.store.get_quiz(id).await?))
}

/// Replace a quiz; its questions are recreated from the body
pub async fn update_quiz(
    State(state): State<AppState>,
    _admin: AdminGuard,
    Path(id): Path<String>,
    Payload(input): Payload<QuizInput>,
) -> Result<Json<Quiz>, AppError> {
    let quiz = input.validate()?;
    let id = parse_id(&id, "Quiz")?;
    let quiz = state.store.update_quiz(id, quiz).await?;
    info!(quiz_id = %id, "Quiz updated");
    Ok(Json(quiz))
}

pub async fn delete_quiz(
    State(state): State<AppState>,
    _admin: AdminGuard,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(&id, "Quiz")?;
    state.store.delete_quiz(id).await?;
    info!(quiz_id = %id, "Quiz deleted");
    Ok(Json(json!({ "message": "Quiz deleted successfully" })))
}

pub async fn create_recipe(
    State(state): State<AppState>,
    _admin: AdminGuard,
    Payload(input): Payload<RecipeInput>,
) -> Result<Json<Recipe>, AppError> {
    let recipe = state.store.create_recipe(input.validate()?).await?;
    info!(recipe_id = %recipe.id, "Recipe created");
    Ok(Json(recipe))
}

pub async fn list_recipes(State(state): State<AppState>) -> Result<Json<Vec<Recipe>>, AppError> {
    Ok(Json(state.store.list_recipes().await?))
}

pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Recipe>, AppError> {
    let id = parse_id(&id, "Recipe")?;
    Ok(Json(state.store.get_recipe(id).await?))
}

pub async fn update_recipe(
    State(state): State<AppState>,
    _admin: AdminGuard,
    Path(id): Path<String>,
    Payload(input): Payload<RecipeInput>,
) -> Result<Json<Recipe>, AppError> {
    let recipe = input.validate()?;
    let id = parse_id(&id, "Recipe")?;
    let recipe = state.store.update_recipe(id, recipe).await?;
    info!(recipe_id = %id, "Recipe updated");
    Ok(Json(recipe))
}

pub async fn delete_recipe(
    State(state): State<AppState>,
    _admin: AdminGuard,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(&id, "Recipe")?;
    state.store.delete_recipe(id).await?;
    info!(recipe_id = %id, "Recipe deleted");
    Ok(Json(json!({ "message": "Recipe deleted successfully" })))
}

/// Exchange the admin password for a signed, expiring token
pub async fn login(
    State(state): State<AppState>,
    Payload(request): Payload<LoginRequest>,
) -> Result<Json<AdminToken>, AppError> {
    let admin = state.admin.as_ref().ok_or(AuthError::Disabled)?;
    let token = admin.login(&request.password)?;
    info!(expires_at = %token.expires_at, "Admin logged in");
    Ok(Json(token))
}

/// Report whether the presented token is still valid
pub async fn session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let admin = state.admin.as_ref().ok_or(AuthError::Disabled)?;
    let token = bearer_token(&headers).ok_or(AuthError::MissingToken)?;
    let expires_at = admin.signer.verify(token)?;
    Ok(Json(json!({ "valid": true, "expiresAt": expires_at })))
}
