use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, EntityTrait, PaginatorTrait, QueryOrder, QuerySelect,
    Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::accounts::{AccountList, CreateAccountRequest},
    entity::accounts::{ActiveModel as AccountActive, Column as AccountCol, Entity as Accounts},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Account,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::{
        auth_service::hash_password,
        record_gate::{ensure_username_available, require_text},
    },
    state::AppState,
};

pub async fn create_account(
    state: &AppState,
    user: &AuthUser,
    payload: CreateAccountRequest,
) -> AppResult<ApiResponse<Account>> {
    ensure_admin(user)?;
    let username = require_text("username", payload.username)?;
    let password = payload
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::invalid("password", "password is required"))?;
    let role = payload
        .role
        .ok_or_else(|| AppError::invalid("role", "role is required"))?;

    ensure_username_available(&state.orm, &username).await?;

    let password_hash = hash_password(&password)?;
    let account = AccountActive {
        id: Set(Uuid::new_v4()),
        username: Set(username),
        password_hash: Set(password_hash),
        role: Set(role.as_str().to_string()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        user.account_id,
        "account_create",
        "accounts",
        serde_json::json!({ "account_id": account.id, "role": account.role }),
    )
    .await;

    Ok(ApiResponse::single("Account created", Account::try_from(account)?))
}

pub async fn list_accounts(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<AccountList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = pagination.normalize();

    let finder = Accounts::find().order_by_asc(AccountCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Account::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ApiResponse::success(
        "Accounts",
        AccountList { items },
        Some(Meta::new(page, limit, total)),
    ))
}
