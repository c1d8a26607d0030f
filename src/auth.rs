//! Session and identity layer: Argon2 password hashing and bearer-token
//! sessions. The token carries the account id; authorization is a role
//! lookup on the loaded account, never an id comparison.

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Validation, decode, encode};
use password_hash::{PasswordHash, SaltString, rand_core::OsRng};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::{Deserialize, Serialize};

use crate::entities::user;
use crate::error;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub uid: i32,
    pub exp: i64,
}

pub fn hash_password(password: &str) -> poem::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(error::internal)
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

pub fn issue_token(secret: &str, user_id: i32) -> poem::Result<String> {
    let claims = Claims {
        uid: user_id,
        exp: (Utc::now() + Duration::days(1)).timestamp(),
    };
    encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(error::internal)
}

/// Resolves the acting account from an `Authorization` header, if any.
/// A missing, malformed or expired token counts as anonymous; only a
/// database failure is an error.
pub async fn authenticate(
    db: &DatabaseConnection,
    secret: &str,
    authorization: Option<&str>,
) -> poem::Result<Option<user::Model>> {
    let Some(header) = authorization else {
        return Ok(None);
    };
    let token = header.strip_prefix("Bearer ").unwrap_or(header);
    let Ok(data) = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    ) else {
        return Ok(None);
    };
    user::Entity::find_by_id(data.claims.uid)
        .one(db)
        .await
        .map_err(error::internal)
}

/// Admin-only handlers answer 403 to every other identity, anonymous
/// callers included.
pub async fn require_admin(
    db: &DatabaseConnection,
    secret: &str,
    authorization: Option<&str>,
) -> poem::Result<user::Model> {
    match authenticate(db, secret, authorization).await? {
        Some(account) if account.is_admin => Ok(account),
        _ => Err(error::forbidden()),
    }
}
