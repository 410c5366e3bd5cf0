use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::sales::{CreateSaleRequest, SaleReceipt, SaleWithLines},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::sale_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_sale))
        .route("/{id}", get(get_sale))
}

#[utoipa::path(
    post,
    path = "/api/sales",
    request_body = CreateSaleRequest,
    responses(
        (status = 201, description = "Sale committed", body = ApiResponse<SaleReceipt>),
        (status = 400, description = "Empty cart or invalid quantity"),
        (status = 401, description = "Unauthenticated"),
        (status = 404, description = "Product not found"),
        (status = 409, description = "Insufficient stock"),
        (status = 503, description = "Store busy, safe to retry")
    ),
    security(("bearer_auth" = [])),
    tag = "Sales"
)]
pub async fn create_sale(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateSaleRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<SaleReceipt>>)> {
    let resp = sale_service::commit_sale(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/sales/{id}",
    params(("id" = Uuid, Path, description = "Sale ID")),
    responses(
        (status = 200, description = "Sale with its lines", body = ApiResponse<SaleWithLines>),
        (status = 404, description = "Sale not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Sales"
)]
pub async fn get_sale(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<SaleWithLines>>> {
    let resp = sale_service::get_sale(&state, &user, id).await?;
    Ok(Json(resp))
}
