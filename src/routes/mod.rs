use axum::Router;

use crate::state::AppState;

pub mod accounts;
pub mod auth;
pub mod customers;
pub mod doc;
pub mod health;
pub mod params;
pub mod products;
pub mod reports;
pub mod sales;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/accounts", accounts::router())
        .nest("/products", products::router())
        .nest("/customers", customers::router())
        .nest("/sales", sales::router())
        .nest("/reports", reports::router())
}
