use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Sale, SaleLine};

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub struct CartItemRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CreateSaleRequest {
    #[serde(default)]
    pub cart_items: Vec<CartItemRequest>,
    #[serde(default)]
    pub customer_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct SaleReceipt {
    pub sale_id: Uuid,
    pub total_amount: i64,
    pub discount: i64,
    pub final_amount: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SaleWithLines {
    pub sale: Sale,
    pub lines: Vec<SaleLine>,
}
