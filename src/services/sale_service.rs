//! Sale commit: stock reservation, pricing and the atomic write.
//!
//! A commit runs in one store transaction:
//!
//! 1. resolve the customer (membership flag) under a share lock,
//! 2. lock every product in the cart with `SELECT … FOR UPDATE`, ordered by id,
//! 3. check cumulative demand per product against stock, in cart order,
//! 4. price the cart,
//! 5. insert the sale and its lines, then decrement stock with
//!    `stock = stock - n WHERE stock >= n`.
//!
//! Any error drops the transaction, which rolls it back, so a sale never
//! exists without its stock decrements or the reverse. Serialization
//! failures and deadlocks are retried a bounded number of times before the
//! caller sees `TransientStoreFailure`.

use std::{collections::{BTreeMap, HashMap}, time::Duration};

use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    config::UnknownCustomerPolicy,
    dto::sales::{CartItemRequest, CreateSaleRequest, SaleReceipt, SaleWithLines},
    entity::{
        customers::Entity as Customers,
        products::{Column as ProdCol, Entity as Products, Model as ProductModel},
        sale_lines::{ActiveModel as SaleLineActive, Column as LineCol, Entity as SaleLines},
        sales::{ActiveModel as SaleActive, Entity as Sales},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, RoleSet, ensure_role},
    models::{Sale, SaleLine},
    pricing::{self, PricedLine},
    response::ApiResponse,
    state::{AppState, SalePolicy},
};

const RETRY_BACKOFF_MS: u64 = 25;

/// Rejects empty carts and non-positive quantities before touching the store.
pub fn validate_cart(items: &[CartItemRequest]) -> AppResult<()> {
    if items.is_empty() {
        return Err(AppError::EmptyCart);
    }
    if let Some(bad) = items.iter().find(|item| item.quantity <= 0) {
        return Err(AppError::invalid(
            "quantity",
            format!("Quantity for product {} must be at least 1", bad.product_id),
        ));
    }
    Ok(())
}

pub async fn commit_sale(
    state: &AppState,
    user: &AuthUser,
    payload: CreateSaleRequest,
) -> AppResult<ApiResponse<SaleReceipt>> {
    ensure_role(user, RoleSet::ADMIN_OR_STAFF)?;

    let receipt = commit_with_retry(
        &state.orm,
        state.sales,
        user.account_id,
        payload.customer_id,
        &payload.cart_items,
    )
    .await?;

    tracing::info!(
        sale_id = %receipt.sale_id,
        account_id = %user.account_id,
        final_amount = receipt.final_amount,
        "sale committed"
    );

    audit::record(
        &state.orm,
        user.account_id,
        "sale_commit",
        "sales",
        serde_json::json!({
            "sale_id": receipt.sale_id,
            "final_amount": receipt.final_amount,
        }),
    )
    .await;

    Ok(ApiResponse::single("Sale completed successfully!", receipt))
}

/// Validates the cart and commits it, retrying transient store failures.
pub async fn commit_with_retry(
    conn: &DatabaseConnection,
    policy: SalePolicy,
    cashier_id: Uuid,
    customer_id: Option<Uuid>,
    cart: &[CartItemRequest],
) -> AppResult<SaleReceipt> {
    validate_cart(cart)?;

    let mut attempt: u32 = 0;
    loop {
        match try_commit(conn, policy.unknown_customer, cashier_id, customer_id, cart).await {
            Err(AppError::TransientStoreFailure) if attempt < policy.commit_retries => {
                attempt += 1;
                tracing::warn!(attempt, account_id = %cashier_id, "sale commit conflicted, retrying");
                tokio::time::sleep(Duration::from_millis(RETRY_BACKOFF_MS * u64::from(attempt)))
                    .await;
            }
            other => return other,
        }
    }
}

async fn try_commit(
    conn: &DatabaseConnection,
    unknown_customer: UnknownCustomerPolicy,
    cashier_id: Uuid,
    customer_id: Option<Uuid>,
    cart: &[CartItemRequest],
) -> AppResult<SaleReceipt> {
    let txn = conn.begin().await?;

    let (customer_id, is_member) = resolve_customer(&txn, unknown_customer, customer_id).await?;
    let products = lock_products(&txn, cart).await?;

    let mut demand: BTreeMap<Uuid, i32> = BTreeMap::new();
    let mut lines = Vec::with_capacity(cart.len());
    for item in cart {
        let product = products
            .get(&item.product_id)
            .ok_or_else(|| AppError::not_found("Product", item.product_id))?;

        let wanted = demand.entry(product.id).or_insert(0);
        *wanted = wanted
            .checked_add(item.quantity)
            .ok_or_else(|| AppError::invalid("quantity", "Quantity is too large"))?;
        if *wanted > product.stock {
            return Err(insufficient(product));
        }

        lines.push(PricedLine {
            product_id: product.id,
            quantity: item.quantity,
            unit_price: product.price,
            refund_eligible: product.is_refundable,
        });
    }

    let breakdown = pricing::price(&lines, is_member)?;

    let sale_id = Uuid::new_v4();
    SaleActive {
        id: Set(sale_id),
        account_id: Set(cashier_id),
        customer_id: Set(customer_id),
        total_amount: Set(breakdown.total),
        discount_amount: Set(breakdown.discount),
        final_amount: Set(breakdown.final_amount),
        sold_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut line_models = Vec::with_capacity(lines.len());
    for (position, line) in lines.iter().enumerate() {
        let position = i32::try_from(position)
            .map_err(|_| AppError::invalid("cart_items", "Cart has too many lines"))?;
        line_models.push(SaleLineActive {
            id: Set(Uuid::new_v4()),
            sale_id: Set(sale_id),
            product_id: Set(line.product_id),
            position: Set(position),
            quantity: Set(line.quantity),
            unit_price: Set(line.unit_price),
        });
    }
    SaleLines::insert_many(line_models).exec(&txn).await?;

    for (product_id, quantity) in &demand {
        let result = Products::update_many()
            .col_expr(ProdCol::Stock, Expr::col(ProdCol::Stock).sub(*quantity))
            .filter(ProdCol::Id.eq(*product_id))
            .filter(ProdCol::Stock.gte(*quantity))
            .exec(&txn)
            .await?;
        if result.rows_affected != 1 {
            // Unreachable while the row lock is held; abort rather than oversell.
            let product = products
                .get(product_id)
                .ok_or_else(|| AppError::not_found("Product", *product_id))?;
            return Err(insufficient(product));
        }
    }

    txn.commit().await?;

    Ok(SaleReceipt {
        sale_id,
        total_amount: breakdown.total,
        discount: breakdown.discount,
        final_amount: breakdown.final_amount,
    })
}

fn insufficient(product: &ProductModel) -> AppError {
    AppError::InsufficientStock {
        product_id: product.id,
        product: product.name.clone(),
        available: product.stock,
    }
}

async fn resolve_customer(
    txn: &DatabaseTransaction,
    policy: UnknownCustomerPolicy,
    customer_id: Option<Uuid>,
) -> AppResult<(Option<Uuid>, bool)> {
    let Some(id) = customer_id else {
        return Ok((None, false));
    };

    let customer = Customers::find_by_id(id)
        .lock(LockType::Share)
        .one(txn)
        .await?;
    match (customer, policy) {
        (Some(customer), _) => Ok((Some(customer.id), customer.is_member)),
        (None, UnknownCustomerPolicy::Reject) => Err(AppError::not_found("Customer", id)),
        (None, UnknownCustomerPolicy::WalkIn) => {
            tracing::warn!(customer_id = %id, "unknown customer, recording walk-in sale");
            Ok((None, false))
        }
    }
}

/// Locks the cart's product rows in id order so concurrent commits queue instead of deadlocking.
async fn lock_products<C: ConnectionTrait>(
    conn: &C,
    cart: &[CartItemRequest],
) -> AppResult<HashMap<Uuid, ProductModel>> {
    let mut ids: Vec<Uuid> = cart.iter().map(|item| item.product_id).collect();
    ids.sort();
    ids.dedup();

    let products = Products::find()
        .filter(ProdCol::Id.is_in(ids))
        .order_by_asc(ProdCol::Id)
        .lock(LockType::Update)
        .all(conn)
        .await?;

    Ok(products.into_iter().map(|p| (p.id, p)).collect())
}

pub async fn get_sale(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<SaleWithLines>> {
    ensure_role(user, RoleSet::ADMIN_OR_STAFF)?;
    let sale = Sales::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Sale", id))?;

    let lines = SaleLines::find()
        .filter(LineCol::SaleId.eq(sale.id))
        .order_by_asc(LineCol::Position)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(SaleLine::from)
        .collect();

    Ok(ApiResponse::single(
        "Sale",
        SaleWithLines {
            sale: Sale::from(sale),
            lines,
        },
    ))
}
