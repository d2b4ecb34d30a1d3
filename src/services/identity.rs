use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sha2::{Digest, Sha512};
use tracing::{debug, warn};

use crate::{
    db::DbPool,
    error::AppError,
    models::user::{Claims, User},
};

#[derive(Clone)]
struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    fn from_secret(secret: &str) -> Self {
        let digest = Sha512::digest(secret.as_bytes());
        Self {
            encoding: EncodingKey::from_secret(&digest),
            decoding: DecodingKey::from_secret(&digest),
        }
    }
}

/// Usernames, password hashes and session tokens.
#[derive(Clone)]
pub struct IdentityStore {
    db: DbPool,
    keys: TokenKeys,
    token_ttl: Duration,
}

impl IdentityStore {
    pub fn new(db: DbPool, secret: &str, token_ttl_hours: i64) -> Self {
        Self {
            db,
            keys: TokenKeys::from_secret(secret),
            token_ttl: Duration::hours(token_ttl_hours),
        }
    }

    /// Inserts a new credential. An existing username is never overwritten.
    pub async fn store_credential(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<User, AppError> {
        let result = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password_hash, created_at) VALUES (?, ?, ?) \
             RETURNING id, username, password_hash, created_at",
        )
        .bind(username)
        .bind(password_hash)
        .bind(Utc::now())
        .fetch_one(&self.db)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
                Err(AppError::UsernameTaken)
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn find_user(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    pub async fn verify_credential(&self, username: &str, password: &str) -> Result<bool, AppError> {
        let Some(user) = self.find_user(username).await? else {
            debug!(%username, "login for unknown user");
            return Ok(false);
        };
        verify_password(user.password_hash, password.to_string()).await
    }

    pub fn issue_token(&self, username: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: username.to_string(),
            iat: now.timestamp(),
            exp: (now + self.token_ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.keys.encoding)
            .map_err(|err| AppError::Other(err.into()))
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AppError> {
        let data = decode::<Claims>(token, &self.keys.decoding, &Validation::new(Algorithm::HS256))
            .map_err(|err| {
                warn!("rejected session token: {err}");
                AppError::Unauthorized
            })?;
        Ok(data.claims)
    }
}

/// Argon2 hashing runs on the blocking pool.
pub async fn hash_password(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| AppError::Other(anyhow::anyhow!("password hashing failed: {err}")))
    })
    .await
    .map_err(|err| AppError::Other(err.into()))?
}

async fn verify_password(hash: String, password: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&hash)
            .map_err(|err| AppError::Other(anyhow::anyhow!("stored hash unreadable: {err}")))?;
        let matches = Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok();
        Ok::<_, AppError>(matches)
    })
    .await
    .map_err(|err| AppError::Other(err.into()))?
}
