use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{Document, Role, User},
};

fn set_field_sql(key: &str) -> Result<String> {
    User::MAPPING
        .set_field_sql(key)
        .ok_or_else(|| AppError::InternalError(format!("users has no `{}` field", key)))
}

pub async fn insert(pool: &PgPool, user: &User) -> Result<User> {
    let sql = User::MAPPING.insert_sql();

    let user = sqlx::query_as::<_, User>(&sql)
        .bind(user.username())
        .bind(user.password())
        .bind(user.role().as_str())
        .fetch_one(pool)
        .await?;

    Ok(user)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>> {
    let sql = User::MAPPING.select_by_key_sql();

    let user = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<User>> {
    let sql = format!(
        "{} WHERE {} = $1",
        User::MAPPING.select_all_sql(),
        User::MAPPING.column_for("username").unwrap_or("username")
    );

    let user = sqlx::query_as::<_, User>(&sql)
        .bind(username)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn update_role(pool: &PgPool, id: Uuid, role: Role) -> Result<Option<User>> {
    let sql = set_field_sql("role")?;

    let user = sqlx::query_as::<_, User>(&sql)
        .bind(role.as_str())
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn update_password(pool: &PgPool, id: Uuid, password_hash: &str) -> Result<Option<User>> {
    let sql = set_field_sql("password")?;

    let user = sqlx::query_as::<_, User>(&sql)
        .bind(password_hash)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<u64> {
    let result = sqlx::query(&User::MAPPING.delete_by_key_sql())
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
