use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::customers::{CreateCustomerRequest, CustomerList, UpdateCustomerRequest},
    entity::customers::{ActiveModel, Column, Entity as Customers},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, RoleSet, ensure_admin, ensure_role},
    models::Customer,
    response::{ApiResponse, Meta},
    routes::params::CustomerQuery,
    services::record_gate::{
        ensure_customer_unreferenced, ensure_email_available, ensure_phone_available,
        normalize_optional, normalize_patch, require_text,
    },
    state::AppState,
};

pub async fn list_customers(
    state: &AppState,
    user: &AuthUser,
    query: CustomerQuery,
) -> AppResult<ApiResponse<CustomerList>> {
    ensure_role(user, RoleSet::ADMIN_OR_STAFF)?;
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_ref().filter(|s| !s.trim().is_empty()) {
        let pattern = format!("%{}%", search.trim());
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Name).ilike(pattern.clone()))
                .add(Expr::col(Column::Email).ilike(pattern.clone()))
                .add(Expr::col(Column::Phone).ilike(pattern)),
        );
    }
    if query.members_only.unwrap_or(false) {
        condition = condition.add(Column::IsMember.eq(true));
    }

    let finder = Customers::find()
        .filter(condition)
        .order_by_asc(Column::Name);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Customer::from)
        .collect();

    Ok(ApiResponse::success(
        "Customers",
        CustomerList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_customer(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Customer>> {
    ensure_role(user, RoleSet::ADMIN_OR_STAFF)?;
    let customer = Customers::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Customer", id))?;
    Ok(ApiResponse::single("Customer", Customer::from(customer)))
}

pub async fn create_customer(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCustomerRequest,
) -> AppResult<ApiResponse<Customer>> {
    ensure_role(user, RoleSet::ADMIN_OR_STAFF)?;
    let name = require_text("name", payload.name)?;
    let email = normalize_optional(payload.email);
    let phone = normalize_optional(payload.phone);

    if let Some(email) = email.as_deref() {
        ensure_email_available(&state.orm, email, None).await?;
    }
    if let Some(phone) = phone.as_deref() {
        ensure_phone_available(&state.orm, phone, None).await?;
    }

    let customer = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        email: Set(email),
        phone: Set(phone),
        is_member: Set(payload.is_member.unwrap_or(false)),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        user.account_id,
        "customer_create",
        "customers",
        serde_json::json!({ "customer_id": customer.id }),
    )
    .await;

    Ok(ApiResponse::single("Customer created", Customer::from(customer)))
}

pub async fn update_customer(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCustomerRequest,
) -> AppResult<ApiResponse<Customer>> {
    ensure_role(user, RoleSet::ADMIN_OR_STAFF)?;
    let name = require_text("name", payload.name)?;
    let email = normalize_patch(payload.email);
    let phone = normalize_patch(payload.phone);

    let existing = Customers::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Customer", id))?;

    if let Some(Some(email)) = email.as_ref() {
        ensure_email_available(&state.orm, email, Some(id)).await?;
    }
    if let Some(Some(phone)) = phone.as_ref() {
        ensure_phone_available(&state.orm, phone, Some(id)).await?;
    }

    let mut active: ActiveModel = existing.into();
    active.name = Set(name);
    if let Some(email) = email {
        active.email = Set(email);
    }
    if let Some(phone) = phone {
        active.phone = Set(phone);
    }
    if let Some(is_member) = payload.is_member {
        active.is_member = Set(is_member);
    }
    active.updated_at = Set(Utc::now().into());

    let customer = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        user.account_id,
        "customer_update",
        "customers",
        serde_json::json!({ "customer_id": customer.id }),
    )
    .await;

    Ok(ApiResponse::single("Updated", Customer::from(customer)))
}

pub async fn delete_customer(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;
    ensure_customer_unreferenced(&txn, id).await?;
    let result = Customers::delete_by_id(id).exec(&txn).await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found("Customer", id));
    }
    txn.commit().await?;

    audit::record(
        &state.orm,
        user.account_id,
        "customer_delete",
        "customers",
        serde_json::json!({ "customer_id": id }),
    )
    .await;

    Ok(ApiResponse::single("Customer deleted successfully", serde_json::json!({})))
}
