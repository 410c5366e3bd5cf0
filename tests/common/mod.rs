#![allow(dead_code)]

use chrono::Duration;
use pos_backend::{
    credentials::CredentialKeys,
    db::{create_orm_conn, run_migrations},
    entity::{
        accounts::ActiveModel as AccountActive, customers::ActiveModel as CustomerActive,
        products::ActiveModel as ProductActive,
    },
    middleware::auth::AuthUser,
    models::Role,
    services::auth_service::hash_password,
    state::{AppState, SalePolicy},
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use uuid::Uuid;

pub const TEST_SECRET: &str = "test-secret";

/// Store URL for integration tests, or `None` to skip them.
pub fn database_url() -> Option<String> {
    match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
        Ok(url) => Some(url),
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run store-backed tests.");
            None
        }
    }
}

pub fn keys() -> CredentialKeys {
    CredentialKeys::new(TEST_SECRET, Duration::hours(1))
}

/// State for tests that never reach the store.
pub fn offline_state() -> AppState {
    AppState {
        orm: DatabaseConnection::Disconnected,
        credentials: keys(),
        sales: SalePolicy::default(),
    }
}

// Tests share one database and run in parallel, so fixtures use unique
// values instead of truncating tables.
pub async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;
    Ok(AppState {
        orm,
        credentials: keys(),
        sales: SalePolicy::default(),
    })
}

pub fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

pub async fn create_account(state: &AppState, role: Role, password: &str) -> anyhow::Result<AuthUser> {
    let account = AccountActive {
        id: Set(Uuid::new_v4()),
        username: Set(unique(role.as_str())),
        password_hash: Set(hash_password(password)?),
        role: Set(role.as_str().to_string()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        account_id: account.id,
        role,
    })
}

pub async fn create_product(
    state: &AppState,
    price: i64,
    stock: i32,
    is_refundable: bool,
) -> anyhow::Result<Uuid> {
    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        name: Set(unique("Test Widget")),
        description: Set(Some("A product for testing".into())),
        price: Set(price),
        stock: Set(stock),
        sku: Set(Some(unique("SKU"))),
        is_refundable: Set(is_refundable),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(product.id)
}

pub async fn create_customer(state: &AppState, is_member: bool) -> anyhow::Result<Uuid> {
    let customer = CustomerActive {
        id: Set(Uuid::new_v4()),
        name: Set("Test Customer".into()),
        email: Set(Some(format!("{}@example.com", unique("customer")))),
        phone: Set(None),
        is_member: Set(is_member),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(customer.id)
}
