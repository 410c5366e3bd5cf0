use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::accounts::{AccountList, CreateAccountRequest},
    error::AppResult,
    middleware::auth::AdminUser,
    models::Account,
    response::ApiResponse,
    routes::params::Pagination,
    services::account_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_accounts).post(create_account))
}

#[utoipa::path(
    post,
    path = "/api/accounts",
    request_body = CreateAccountRequest,
    responses(
        (status = 201, description = "Create account (admin only)", body = ApiResponse<Account>),
        (status = 400, description = "Missing field"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Username already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
pub async fn create_account(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Json(payload): Json<CreateAccountRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Account>>)> {
    let resp = account_service::create_account(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/accounts",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "List accounts (admin only)", body = ApiResponse<AccountList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
pub async fn list_accounts(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<AccountList>>> {
    let resp = account_service::list_accounts(&state, &user, pagination).await?;
    Ok(Json(resp))
}
