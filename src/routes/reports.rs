use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::reports::{SalesReport, SalesReportQuery},
    error::AppResult,
    middleware::auth::AdminUser,
    response::ApiResponse,
    services::report_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/sales", get(sales_report))
}

#[utoipa::path(
    get,
    path = "/api/reports/sales",
    params(
        ("start_date" = Option<String>, Query, description = "First day included, YYYY-MM-DD (UTC)"),
        ("end_date" = Option<String>, Query, description = "Last day included, YYYY-MM-DD (UTC)")
    ),
    responses(
        (status = 200, description = "Sales with revenue and discount summary (admin only)", body = ApiResponse<SalesReport>),
        (status = 400, description = "Invalid date range"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn sales_report(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Query(query): Query<SalesReportQuery>,
) -> AppResult<Json<ApiResponse<SalesReport>>> {
    let resp = report_service::sales_report(&state, &user, query).await?;
    Ok(Json(resp))
}
