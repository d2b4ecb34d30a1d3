use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    auth::{self, CurrentUser},
    error::AppError,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(landing))
        .route("/register", post(register_submit))
        .route("/login", post(login_submit))
        .route("/me", get(me))
}

async fn landing() -> Json<Value> {
    Json(json!({ "data": "Welcome to the Travel Assistant API" }))
}

#[derive(Deserialize)]
struct CredentialsForm {
    username: Option<String>,
    password: Option<String>,
}

async fn register_submit(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsForm>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(form) = payload?;
    auth::register_user(&state, form.username, form.password).await?;
    Ok(Json(json!({ "message": "User registered successfully" })))
}

async fn login_submit(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsForm>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(form) = payload?;
    let token = auth::login(&state, form.username, form.password).await?;
    Ok(Json(json!({ "token": token })))
}

async fn me(current: CurrentUser) -> Json<Value> {
    Json(json!({
        "username": current.username,
        "expires_at": current.expires_at,
    }))
}
