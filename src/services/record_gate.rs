//! Field validation and uniqueness checks run before catalog, customer and
//! account writes.
//!
//! The lookups here give callers a field-named `Conflict` up front. The
//! store's unique and foreign-key constraints still back every check, so a
//! racing writer surfaces as the same `Conflict` through `AppError::from(DbErr)`.

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    entity::{
        accounts::{Column as AccountCol, Entity as Accounts},
        customers::{Column as CustomerCol, Entity as Customers},
        products::{Column as ProdCol, Entity as Products},
        sale_lines::{Column as LineCol, Entity as SaleLines},
        sales::{Column as SaleCol, Entity as Sales},
    },
    error::{AppError, AppResult},
};

/// Trims the value and maps blank strings to `None`.
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Update semantics for optional text: absent leaves the field alone,
/// blank clears it, anything else replaces it trimmed.
pub fn normalize_patch(value: Option<String>) -> Option<Option<String>> {
    value.map(|v| normalize_optional(Some(v)))
}

pub fn require_text(field: &'static str, value: Option<String>) -> AppResult<String> {
    normalize_optional(value).ok_or_else(|| AppError::invalid(field, format!("{field} is required")))
}

pub fn validate_price(price: i64) -> AppResult<i64> {
    if price <= 0 {
        return Err(AppError::invalid("price", "Price must be positive"));
    }
    Ok(price)
}

pub fn validate_stock(stock: i32) -> AppResult<i32> {
    if stock < 0 {
        return Err(AppError::invalid("stock", "Stock cannot be negative"));
    }
    Ok(stock)
}

/// `exclude` is the record's own id when updating.
pub async fn ensure_sku_available<C: ConnectionTrait>(
    conn: &C,
    sku: &str,
    exclude: Option<Uuid>,
) -> AppResult<()> {
    let existing = Products::find()
        .filter(ProdCol::Sku.eq(sku))
        .one(conn)
        .await?;
    match existing {
        Some(p) if Some(p.id) != exclude => Err(AppError::conflict("sku", "SKU already exists")),
        _ => Ok(()),
    }
}

pub async fn ensure_email_available<C: ConnectionTrait>(
    conn: &C,
    email: &str,
    exclude: Option<Uuid>,
) -> AppResult<()> {
    let existing = Customers::find()
        .filter(CustomerCol::Email.eq(email))
        .one(conn)
        .await?;
    match existing {
        Some(c) if Some(c.id) != exclude => {
            Err(AppError::conflict("email", "Email already exists"))
        }
        _ => Ok(()),
    }
}

pub async fn ensure_phone_available<C: ConnectionTrait>(
    conn: &C,
    phone: &str,
    exclude: Option<Uuid>,
) -> AppResult<()> {
    let existing = Customers::find()
        .filter(CustomerCol::Phone.eq(phone))
        .one(conn)
        .await?;
    match existing {
        Some(c) if Some(c.id) != exclude => {
            Err(AppError::conflict("phone", "Phone number already exists"))
        }
        _ => Ok(()),
    }
}

pub async fn ensure_username_available<C: ConnectionTrait>(
    conn: &C,
    username: &str,
) -> AppResult<()> {
    let taken = Accounts::find()
        .filter(AccountCol::Username.eq(username))
        .count(conn)
        .await?;
    if taken > 0 {
        return Err(AppError::conflict("username", "Username already exists"));
    }
    Ok(())
}

pub async fn ensure_product_unreferenced<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<()> {
    let lines = SaleLines::find()
        .filter(LineCol::ProductId.eq(id))
        .count(conn)
        .await?;
    if lines > 0 {
        return Err(AppError::conflict(
            "product",
            "Cannot delete product that is part of existing sales",
        ));
    }
    Ok(())
}

pub async fn ensure_customer_unreferenced<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<()> {
    let sales = Sales::find()
        .filter(SaleCol::CustomerId.eq(id))
        .count(conn)
        .await?;
    if sales > 0 {
        return Err(AppError::conflict(
            "customer",
            "Cannot delete customer that is linked to existing sales",
        ));
    }
    Ok(())
}
