use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{LoginRequest, RegisterRequest, Role, User},
    queries::user_queries,
    services::password_service::{self, MAX_PASSWORD_BYTES},
};

pub const MIN_PASSWORD_LENGTH: usize = 6;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

pub fn validate_credentials(username: &str, password: &str) -> Result<()> {
    if username.trim().is_empty() {
        return Err(AppError::BadRequest("Username cannot be empty".to_string()));
    }

    validate_password(password)
}

pub fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AppError::BadRequest(format!(
            "Password must be at most {} bytes",
            MAX_PASSWORD_BYTES
        )));
    }

    Ok(())
}

pub fn authorize(user: &User, required: Role) -> Result<()> {
    if user.role().grants(required) {
        return Ok(());
    }

    Err(AppError::Forbidden(format!("{} access required", required)))
}

/// Creates a `USER` account. Promotion happens through [`change_role`].
pub async fn register(pool: &PgPool, payload: &RegisterRequest, bcrypt_cost: u32) -> Result<User> {
    validate_credentials(&payload.username, &payload.password)?;

    let username = payload.username.trim();

    if user_queries::find_by_username(pool, username)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Username already registered".to_string()));
    }

    let password_hash = password_service::hash_password(&payload.password, bcrypt_cost)?;
    let draft = User::new(None, username, password_hash, Role::User);

    let user = user_queries::insert(pool, &draft).await?;

    tracing::info!("Registered user {}", user.username());

    Ok(user)
}

/// Unknown usernames and wrong passwords fail alike, in message and in time
/// spent hashing.
pub async fn authenticate(pool: &PgPool, payload: &LoginRequest, bcrypt_cost: u32) -> Result<User> {
    let Some(user) = user_queries::find_by_username(pool, payload.username.trim()).await? else {
        password_service::equalize_timing(&payload.password, bcrypt_cost);
        tracing::warn!("Login attempt for unknown user");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    };

    if !password_service::verify_password(&payload.password, user.password())? {
        tracing::warn!("Failed login for user {}", user.username());
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    Ok(user)
}

pub async fn change_role(pool: &PgPool, actor: &User, target_id: Uuid, role: &str) -> Result<User> {
    authorize(actor, Role::Admin)?;
    let role: Role = role.parse()?;

    let user = user_queries::update_role(pool, target_id, role)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    tracing::info!(
        "User {} set role of {} to {}",
        actor.username(),
        user.username(),
        role
    );

    Ok(user)
}

pub async fn rotate_password(
    pool: &PgPool,
    user_id: Uuid,
    new_password: &str,
    bcrypt_cost: u32,
) -> Result<User> {
    validate_password(new_password)?;

    let password_hash = password_service::hash_password(new_password, bcrypt_cost)?;

    user_queries::update_password(pool, user_id, &password_hash)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

pub async fn remove_account(pool: &PgPool, actor: &User, target_id: Uuid) -> Result<()> {
    authorize(actor, Role::Admin)?;

    if user_queries::delete(pool, target_id).await? == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    tracing::info!("User {} removed account {}", actor.username(), target_id);

    Ok(())
}
