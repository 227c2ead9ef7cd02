use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{Role, Sweet, SweetQuery, SweetRequest, User},
    queries::sweet_queries,
    services::account_service::authorize,
};

fn required_text<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str> {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(AppError::BadRequest(format!("{} is required", field))),
    }
}

fn check_price(price: f64) -> Result<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::BadRequest(
            "price must be a non-negative number".to_string(),
        ));
    }
    Ok(())
}

fn check_quantity(quantity: i32) -> Result<()> {
    if quantity < 0 {
        return Err(AppError::BadRequest(
            "quantity cannot be negative".to_string(),
        ));
    }
    Ok(())
}

fn check_amount(amount: i32) -> Result<()> {
    if amount <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

/// Turns a creation payload into an unsaved sweet, rejecting missing or
/// negative values.
pub fn validate_new_sweet(req: &SweetRequest) -> Result<Sweet> {
    let name = required_text(req.name.as_deref(), "name")?;
    let category = required_text(req.category.as_deref(), "category")?;

    let price = req
        .price
        .ok_or_else(|| AppError::BadRequest("price is required".to_string()))?;
    check_price(price)?;

    let quantity = req.quantity.unwrap_or(0);
    check_quantity(quantity)?;

    Ok(Sweet::new(
        None,
        name,
        category,
        price,
        quantity,
        req.image_url.as_deref().unwrap_or_default().trim(),
    ))
}

pub fn validate_update(req: &SweetRequest) -> Result<()> {
    if req.name.is_some() {
        required_text(req.name.as_deref(), "name")?;
    }

    if req.category.is_some() {
        required_text(req.category.as_deref(), "category")?;
    }

    if let Some(price) = req.price {
        check_price(price)?;
    }

    if let Some(quantity) = req.quantity {
        check_quantity(quantity)?;
    }

    Ok(())
}

pub fn validate_query(params: &SweetQuery) -> Result<()> {
    for price in [params.min_price, params.max_price].into_iter().flatten() {
        check_price(price)?;
    }

    if let (Some(min), Some(max)) = (params.min_price, params.max_price) {
        if min > max {
            return Err(AppError::BadRequest(
                "minPrice cannot exceed maxPrice".to_string(),
            ));
        }
    }

    Ok(())
}

pub async fn list_sweets(pool: &PgPool) -> Result<Vec<Sweet>> {
    sweet_queries::find_all(pool).await
}

pub async fn get_sweet(pool: &PgPool, id: Uuid) -> Result<Sweet> {
    sweet_queries::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Sweet not found".to_string()))
}

pub async fn search_sweets(pool: &PgPool, params: &SweetQuery) -> Result<Vec<Sweet>> {
    validate_query(params)?;
    sweet_queries::search(pool, params).await
}

pub async fn add_sweet(pool: &PgPool, actor: &User, req: &SweetRequest) -> Result<Sweet> {
    authorize(actor, Role::Admin)?;
    let draft = validate_new_sweet(req)?;

    let sweet = sweet_queries::insert(pool, &draft).await?;

    tracing::info!("Added sweet {} ({})", sweet.name(), sweet.category());

    Ok(sweet)
}

pub async fn update_sweet(
    pool: &PgPool,
    actor: &User,
    id: Uuid,
    req: &SweetRequest,
) -> Result<Sweet> {
    authorize(actor, Role::Admin)?;
    validate_update(req)?;

    let trimmed = SweetRequest {
        name: req.name.as_deref().map(|n| n.trim().to_string()),
        category: req.category.as_deref().map(|c| c.trim().to_string()),
        image_url: req.image_url.as_deref().map(|u| u.trim().to_string()),
        ..req.clone()
    };

    sweet_queries::update(pool, id, &trimmed)
        .await?
        .ok_or_else(|| AppError::NotFound("Sweet not found".to_string()))
}

pub async fn remove_sweet(pool: &PgPool, actor: &User, id: Uuid) -> Result<()> {
    authorize(actor, Role::Admin)?;

    if sweet_queries::delete(pool, id).await? == 0 {
        return Err(AppError::NotFound("Sweet not found".to_string()));
    }

    tracing::info!("Removed sweet {}", id);

    Ok(())
}

/// Takes `quantity` units out of stock. The decrement is a single guarded
/// update, so concurrent purchases can never drive stock below zero.
pub async fn purchase(pool: &PgPool, id: Uuid, quantity: i32) -> Result<Sweet> {
    check_amount(quantity)?;

    if let Some(sweet) = sweet_queries::decrement_quantity(pool, id, quantity).await? {
        tracing::info!(
            "Sold {} of {}, {} left",
            quantity,
            sweet.name(),
            sweet.quantity()
        );
        return Ok(sweet);
    }

    match sweet_queries::find_by_id(pool, id).await? {
        Some(sweet) => Err(AppError::Conflict(format!(
            "Insufficient stock for {}: {} available",
            sweet.name(),
            sweet.quantity()
        ))),
        None => Err(AppError::NotFound("Sweet not found".to_string())),
    }
}

pub async fn restock(pool: &PgPool, actor: &User, id: Uuid, quantity: i32) -> Result<Sweet> {
    authorize(actor, Role::Admin)?;
    check_amount(quantity)?;

    let Some(sweet) = sweet_queries::increment_quantity(pool, id, quantity).await? else {
        return match sweet_queries::find_by_id(pool, id).await? {
            Some(sweet) => Err(AppError::Conflict(format!(
                "Restocking {} by {} exceeds the stock limit of {}",
                sweet.name(),
                quantity,
                i32::MAX
            ))),
            None => Err(AppError::NotFound("Sweet not found".to_string())),
        };
    };

    tracing::info!(
        "Restocked {} with {}, {} in stock",
        sweet.name(),
        quantity,
        sweet.quantity()
    );

    Ok(sweet)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, category: &str, price: f64) -> SweetRequest {
        SweetRequest {
            name: Some(name.to_string()),
            category: Some(category.to_string()),
            price: Some(price),
            quantity: Some(20),
            image_url: Some("https://cdn.example.com/img.png".to_string()),
        }
    }

    #[test]
    fn new_sweet_carries_request_values() {
        let sweet = validate_new_sweet(&request(" Gulab Jamun ", "Indian", 5.0)).unwrap();

        assert_eq!(sweet.id(), None);
        assert_eq!(sweet.name(), "Gulab Jamun");
        assert_eq!(sweet.category(), "Indian");
        assert_eq!(sweet.price(), 5.0);
        assert_eq!(sweet.quantity(), 20);
        assert_eq!(sweet.image_url(), "https://cdn.example.com/img.png");
    }

    #[test]
    fn new_sweet_defaults_stock_and_image() {
        let req = SweetRequest {
            quantity: None,
            image_url: None,
            ..request("Barfi", "Indian", 2.0)
        };

        let sweet = validate_new_sweet(&req).unwrap();
        assert_eq!(sweet.quantity(), 0);
        assert_eq!(sweet.image_url(), "");
    }

    #[test]
    fn new_sweet_requires_name_category_and_price() {
        let missing_name = SweetRequest {
            name: Some("  ".to_string()),
            ..request("x", "Indian", 1.0)
        };
        assert!(matches!(
            validate_new_sweet(&missing_name),
            Err(AppError::BadRequest(msg)) if msg == "name is required"
        ));

        let missing_category = SweetRequest {
            category: None,
            ..request("Barfi", "x", 1.0)
        };
        assert!(validate_new_sweet(&missing_category).is_err());

        let missing_price = SweetRequest {
            price: None,
            ..request("Barfi", "Indian", 1.0)
        };
        assert!(validate_new_sweet(&missing_price).is_err());
    }

    #[test]
    fn negative_values_are_rejected() {
        assert!(validate_new_sweet(&request("Barfi", "Indian", -0.5)).is_err());
        assert!(validate_new_sweet(&request("Barfi", "Indian", f64::NAN)).is_err());

        let negative_stock = SweetRequest {
            quantity: Some(-1),
            ..request("Barfi", "Indian", 1.0)
        };
        assert!(validate_new_sweet(&negative_stock).is_err());
    }

    #[test]
    fn partial_update_checks_only_present_fields() {
        assert!(validate_update(&SweetRequest::default()).is_ok());

        let price_only = SweetRequest {
            price: Some(3.25),
            ..Default::default()
        };
        assert!(validate_update(&price_only).is_ok());

        let blank_name = SweetRequest {
            name: Some(String::new()),
            ..Default::default()
        };
        assert!(validate_update(&blank_name).is_err());

        let negative_quantity = SweetRequest {
            quantity: Some(-3),
            ..Default::default()
        };
        assert!(validate_update(&negative_quantity).is_err());
    }

    #[test]
    fn price_range_must_be_ordered() {
        let inverted = SweetQuery {
            min_price: Some(10.0),
            max_price: Some(2.0),
            ..Default::default()
        };
        assert!(validate_query(&inverted).is_err());

        let open_ended = SweetQuery {
            min_price: Some(2.0),
            ..Default::default()
        };
        assert!(validate_query(&open_ended).is_ok());
    }

    #[test]
    fn purchase_amount_must_be_positive() {
        assert!(check_amount(0).is_err());
        assert!(check_amount(-2).is_err());
        assert!(check_amount(1).is_ok());
    }
}
