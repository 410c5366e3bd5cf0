use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Product;

/// Required fields are optional here so that a missing one is reported as a
/// field-named validation error rather than a body rejection.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub stock: Option<i32>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub is_refundable: Option<bool>,
}

/// Absent fields are left unchanged. A blank `description` or `sku` clears it.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub stock: Option<i32>,
    pub sku: Option<String>,
    pub is_refundable: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<Product>,
}
