use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    error::Result,
    models::{Document, Sweet, SweetQuery, SweetRequest},
};

fn column(key: &'static str) -> &'static str {
    Sweet::MAPPING.column_for(key).unwrap_or(key)
}

pub async fn insert(pool: &PgPool, sweet: &Sweet) -> Result<Sweet> {
    let sql = Sweet::MAPPING.insert_sql();

    let sweet = sqlx::query_as::<_, Sweet>(&sql)
        .bind(sweet.name())
        .bind(sweet.category())
        .bind(sweet.price())
        .bind(sweet.quantity())
        .bind(sweet.image_url())
        .fetch_one(pool)
        .await?;

    Ok(sweet)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Sweet>> {
    let sql = Sweet::MAPPING.select_by_key_sql();

    let sweet = sqlx::query_as::<_, Sweet>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(sweet)
}

pub async fn find_all(pool: &PgPool) -> Result<Vec<Sweet>> {
    let sql = format!(
        "{} ORDER BY {} ASC",
        Sweet::MAPPING.select_all_sql(),
        column("name")
    );

    let sweets = sqlx::query_as::<_, Sweet>(&sql).fetch_all(pool).await?;

    Ok(sweets)
}

pub async fn search(pool: &PgPool, params: &SweetQuery) -> Result<Vec<Sweet>> {
    let mut query: QueryBuilder<Postgres> = QueryBuilder::new(Sweet::MAPPING.select_all_sql());
    query.push(" WHERE 1=1");

    // name substring
    if let Some(name) = params.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        query.push(format!(" AND {} ILIKE ", column("name")));
        query.push_bind(format!("%{}%", escape_like(name)));
    }

    // category
    if let Some(category) = params
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
    {
        query.push(format!(" AND LOWER({}) = LOWER(", column("category")));
        query.push_bind(category.to_string());
        query.push(")");
    }

    // price range
    if let Some(min_price) = params.min_price {
        query.push(format!(" AND {} >= ", column("price")));
        query.push_bind(min_price);
    }

    if let Some(max_price) = params.max_price {
        query.push(format!(" AND {} <= ", column("price")));
        query.push_bind(max_price);
    }

    query.push(format!(" ORDER BY {} ASC", column("name")));

    let sweets = query.build_query_as::<Sweet>().fetch_all(pool).await?;

    Ok(sweets)
}

pub async fn update(pool: &PgPool, id: Uuid, req: &SweetRequest) -> Result<Option<Sweet>> {
    let sql = Sweet::MAPPING.coalesce_update_sql();

    let sweet = sqlx::query_as::<_, Sweet>(&sql)
        .bind(&req.name)
        .bind(&req.category)
        .bind(req.price)
        .bind(req.quantity)
        .bind(&req.image_url)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(sweet)
}

/// Removes `amount` units only if the stock covers it. `None` means the sweet
/// does not exist or has too few units.
pub async fn decrement_quantity(pool: &PgPool, id: Uuid, amount: i32) -> Result<Option<Sweet>> {
    let quantity = column("quantity");
    let sql = format!(
        "UPDATE {table} SET {quantity} = {quantity} - $1 \
         WHERE {key} = $2 AND {quantity} >= $1 RETURNING {columns}",
        table = Sweet::MAPPING.collection,
        key = Sweet::MAPPING.key_column(),
        columns = Sweet::MAPPING.columns(),
    );

    let sweet = sqlx::query_as::<_, Sweet>(&sql)
        .bind(amount)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(sweet)
}

fn increment_sql() -> String {
    let quantity = column("quantity");
    format!(
        "UPDATE {table} SET {quantity} = {quantity} + $1 \
         WHERE {key} = $2 AND {quantity} <= {max} - $1 RETURNING {columns}",
        table = Sweet::MAPPING.collection,
        key = Sweet::MAPPING.key_column(),
        max = i32::MAX,
        columns = Sweet::MAPPING.columns(),
    )
}

/// Adds `amount` (positive) units unless the total would overflow the stock
/// column. `None` means the sweet does not exist or the total is too large.
pub async fn increment_quantity(pool: &PgPool, id: Uuid, amount: i32) -> Result<Option<Sweet>> {
    let sql = increment_sql();

    let sweet = sqlx::query_as::<_, Sweet>(&sql)
        .bind(amount)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(sweet)
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<u64> {
    let result = sqlx::query(&Sweet::MAPPING.delete_by_key_sql())
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
