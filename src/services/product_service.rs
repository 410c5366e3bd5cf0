use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    Set, TransactionTrait,
};
use uuid::Uuid;

use crate::dto::products::{CreateProductRequest, ProductList, UpdateProductRequest};
use crate::{
    audit,
    entity::products::{ActiveModel, Column, Entity as Products},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, RoleSet, ensure_admin, ensure_role},
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    services::record_gate::{
        ensure_product_unreferenced, ensure_sku_available, normalize_optional, normalize_patch,
        require_text, validate_price, validate_stock,
    },
    state::AppState,
};

pub async fn list_products(
    state: &AppState,
    user: &AuthUser,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    ensure_role(user, RoleSet::ADMIN_OR_STAFF)?;
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_ref().filter(|s| !s.trim().is_empty()) {
        let pattern = format!("%{}%", search.trim());
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern.clone()))
                .add(Expr::col(Column::Sku).ilike(pattern)),
        );
    }

    let sort_col = match query.sort_by.unwrap_or_default() {
        ProductSortBy::CreatedAt => Column::CreatedAt,
        ProductSortBy::Price => Column::Price,
        ProductSortBy::Name => Column::Name,
    };

    let mut finder = Products::find().filter(condition);
    finder = match query.sort_order.unwrap_or_default() {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

pub async fn get_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Product>> {
    ensure_role(user, RoleSet::ADMIN_OR_STAFF)?;
    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Product", id))?;
    Ok(ApiResponse::single("Product", Product::from(product)))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    let name = require_text("name", payload.name)?;
    let price = payload
        .price
        .ok_or_else(|| AppError::invalid("price", "price is required"))
        .and_then(validate_price)?;
    let stock = payload
        .stock
        .ok_or_else(|| AppError::invalid("stock", "stock is required"))
        .and_then(validate_stock)?;
    let sku = normalize_optional(payload.sku);

    if let Some(sku) = sku.as_deref() {
        ensure_sku_available(&state.orm, sku, None).await?;
    }

    let product = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        description: Set(normalize_optional(payload.description)),
        price: Set(price),
        stock: Set(stock),
        sku: Set(sku),
        is_refundable: Set(payload.is_refundable.unwrap_or(false)),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        user.account_id,
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::single("Product created", Product::from(product)))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    let price = payload.price.map(validate_price).transpose()?;
    let stock = payload.stock.map(validate_stock).transpose()?;
    let name = match payload.name {
        Some(name) => Some(require_text("name", Some(name))?),
        None => None,
    };
    let sku = normalize_patch(payload.sku);

    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Product", id))?;

    if let Some(Some(sku)) = sku.as_ref() {
        ensure_sku_available(&state.orm, sku, Some(id)).await?;
    }

    let mut active: ActiveModel = existing.into();
    if let Some(name) = name {
        active.name = Set(name);
    }
    if let Some(description) = normalize_patch(payload.description) {
        active.description = Set(description);
    }
    if let Some(price) = price {
        active.price = Set(price);
    }
    if let Some(stock) = stock {
        active.stock = Set(stock);
    }
    if let Some(sku) = sku {
        active.sku = Set(sku);
    }
    if let Some(is_refundable) = payload.is_refundable {
        active.is_refundable = Set(is_refundable);
    }
    active.updated_at = Set(Utc::now().into());

    let product = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        user.account_id,
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::single("Updated", Product::from(product)))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;
    ensure_product_unreferenced(&txn, id).await?;
    let result = Products::delete_by_id(id).exec(&txn).await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found("Product", id));
    }
    txn.commit().await?;

    audit::record(
        &state.orm,
        user.account_id,
        "product_delete",
        "products",
        serde_json::json!({ "product_id": id }),
    )
    .await;

    Ok(ApiResponse::single("Product deleted successfully", serde_json::json!({})))
}
