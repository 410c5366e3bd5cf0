use chrono::Duration;
use sea_orm::DatabaseConnection;

use crate::{
    config::{AppConfig, UnknownCustomerPolicy},
    credentials::CredentialKeys,
};

/// Checkout behaviour knobs read from configuration.
#[derive(Debug, Clone, Copy)]
pub struct SalePolicy {
    pub unknown_customer: UnknownCustomerPolicy,
    pub commit_retries: u32,
}

impl Default for SalePolicy {
    fn default() -> Self {
        Self {
            unknown_customer: UnknownCustomerPolicy::WalkIn,
            commit_retries: 3,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub orm: DatabaseConnection,
    pub credentials: CredentialKeys,
    pub sales: SalePolicy,
}

impl AppState {
    pub fn new(orm: DatabaseConnection, config: &AppConfig) -> Self {
        Self {
            orm,
            credentials: CredentialKeys::new(
                &config.jwt_secret,
                Duration::seconds(config.token_ttl_secs),
            ),
            sales: SalePolicy {
                unknown_customer: config.unknown_customer,
                commit_retries: config.sale_commit_retries,
            },
        }
    }
}
