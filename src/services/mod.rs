pub mod account_service;
pub mod auth_service;
pub mod customer_service;
pub mod product_service;
pub mod record_gate;
pub mod report_service;
pub mod sale_service;
