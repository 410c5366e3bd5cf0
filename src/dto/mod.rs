pub mod accounts;
pub mod auth;
pub mod customers;
pub mod products;
pub mod reports;
pub mod sales;
