use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use chrono::{DateTime, Utc};
use tracing::info;

use crate::{
    error::AppError,
    models::{trip::normalize, user::User},
    services::identity::hash_password,
    state::AppState,
};

/// The user behind a valid `Authorization: Bearer` token.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::Unauthorized)?;
        let claims = state.identity.verify_token(bearer.token())?;
        let expires_at =
            DateTime::from_timestamp(claims.exp, 0).ok_or(AppError::Unauthorized)?;
        Ok(Self {
            username: claims.sub,
            expires_at,
        })
    }
}

fn credentials(
    username: Option<String>,
    password: Option<String>,
) -> Result<(String, String), AppError> {
    let username = normalize(username);
    let password = password.filter(|password| !password.is_empty());
    match (username, password) {
        (Some(username), Some(password)) => Ok((username, password)),
        _ => Err(AppError::validation("Username and password are required")),
    }
}

pub async fn register_user(
    state: &AppState,
    username: Option<String>,
    password: Option<String>,
) -> Result<User, AppError> {
    let (username, password) = credentials(username, password)?;
    if state.identity.find_user(&username).await?.is_some() {
        return Err(AppError::UsernameTaken);
    }
    let password_hash = hash_password(password).await?;
    let user = state
        .identity
        .store_credential(&username, &password_hash)
        .await?;
    info!(username = %user.username, "user registered");
    Ok(user)
}

/// Checks the credentials and returns a fresh session token.
pub async fn login(
    state: &AppState,
    username: Option<String>,
    password: Option<String>,
) -> Result<String, AppError> {
    let (username, password) = credentials(username, password)?;
    if !state.identity.verify_credential(&username, &password).await? {
        return Err(AppError::InvalidCredentials);
    }
    let token = state.identity.issue_token(&username)?;
    info!(%username, "user logged in");
    Ok(token)
}
