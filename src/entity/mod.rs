pub mod accounts;
pub mod audit_logs;
pub mod customers;
pub mod products;
pub mod sale_lines;
pub mod sales;

pub use accounts::Entity as Accounts;
pub use audit_logs::Entity as AuditLogs;
pub use customers::Entity as Customers;
pub use products::Entity as Products;
pub use sale_lines::Entity as SaleLines;
pub use sales::Entity as Sales;
