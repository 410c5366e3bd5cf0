use pos_backend::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::{
        accounts::{ActiveModel as AccountActive, Column as AccountCol, Entity as Accounts},
        products::{ActiveModel as ProductActive, Column as ProdCol, Entity as Products},
    },
    models::Role,
    services::auth_service::hash_password,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

const DEFAULT_ADMIN_PASSWORD: &str = "12345";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pos_backend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let orm = create_orm_conn(&config.database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&orm).await?;

    let password = std::env::var("SEED_ADMIN_PASSWORD")
        .ok()
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| DEFAULT_ADMIN_PASSWORD.to_string());
    let admin_id = ensure_account(&orm, "admin", &password, Role::Admin).await?;
    seed_products(&orm).await?;

    tracing::info!(%admin_id, "seed completed");
    Ok(())
}

async fn ensure_account(
    orm: &DatabaseConnection,
    username: &str,
    password: &str,
    role: Role,
) -> anyhow::Result<Uuid> {
    if let Some(existing) = Accounts::find()
        .filter(AccountCol::Username.eq(username))
        .one(orm)
        .await?
    {
        tracing::info!(username, "account already exists, leaving it unchanged");
        return Ok(existing.id);
    }

    let password_hash =
        hash_password(password).map_err(|e| anyhow::anyhow!("hash password: {e}"))?;
    let account = AccountActive {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        password_hash: Set(password_hash),
        role: Set(role.as_str().to_string()),
        created_at: NotSet,
    }
    .insert(orm)
    .await?;

    tracing::info!(username, %role, "account created");
    Ok(account.id)
}

async fn seed_products(orm: &DatabaseConnection) -> anyhow::Result<()> {
    let products = [
        ("Mineral Water 600ml", "SKU-WATER-600", 350, 120, false),
        ("Instant Noodles", "SKU-NOODLE-01", 300, 200, false),
        ("USB-C Cable 1m", "SKU-CABLE-USBC", 4500, 40, true),
        ("Wireless Mouse", "SKU-MOUSE-WL", 12500, 25, true),
    ];

    for (name, sku, price, stock, is_refundable) in products {
        let exists = Products::find()
            .filter(ProdCol::Sku.eq(sku))
            .one(orm)
            .await?
            .is_some();
        if exists {
            continue;
        }
        ProductActive {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            description: Set(None),
            price: Set(price),
            stock: Set(stock),
            sku: Set(Some(sku.to_string())),
            is_refundable: Set(is_refundable),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(orm)
        .await?;
    }

    tracing::info!("seeded products");
    Ok(())
}
