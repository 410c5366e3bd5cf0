use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "staff" => Ok(Role::Staff),
            other => Err(format!("unknown role `{other}`")),
        }
    }
}

/// Account as exposed over the API. The password hash never leaves the store layer.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Minor currency units.
    pub price: i64,
    pub stock: i32,
    pub sku: Option<String>,
    pub is_refundable: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_member: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Sale {
    pub id: Uuid,
    pub account_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub total_amount: i64,
    pub discount_amount: i64,
    pub final_amount: i64,
    pub sold_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SaleLine {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub product_id: Uuid,
    pub position: i32,
    pub quantity: i32,
    /// Unit price frozen at sale time.
    pub unit_price: i64,
}

impl TryFrom<entity::accounts::Model> for Account {
    type Error = anyhow::Error;

    fn try_from(model: entity::accounts::Model) -> Result<Self, Self::Error> {
        let role = model.role.parse::<Role>().map_err(anyhow::Error::msg)?;
        Ok(Account {
            id: model.id,
            username: model.username,
            role,
            created_at: model.created_at.with_timezone(&Utc),
        })
    }
}

impl From<entity::products::Model> for Product {
    fn from(model: entity::products::Model) -> Self {
        Product {
            id: model.id,
            name: model.name,
            description: model.description,
            price: model.price,
            stock: model.stock,
            sku: model.sku,
            is_refundable: model.is_refundable,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<entity::customers::Model> for Customer {
    fn from(model: entity::customers::Model) -> Self {
        Customer {
            id: model.id,
            name: model.name,
            email: model.email,
            phone: model.phone,
            is_member: model.is_member,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<entity::sales::Model> for Sale {
    fn from(model: entity::sales::Model) -> Self {
        Sale {
            id: model.id,
            account_id: model.account_id,
            customer_id: model.customer_id,
            total_amount: model.total_amount,
            discount_amount: model.discount_amount,
            final_amount: model.final_amount,
            sold_at: model.sold_at.with_timezone(&Utc),
        }
    }
}

impl From<entity::sale_lines::Model> for SaleLine {
    fn from(model: entity::sale_lines::Model) -> Self {
        SaleLine {
            id: model.id,
            sale_id: model.sale_id,
            product_id: model.product_id,
            position: model.position,
            quantity: model.quantity,
            unit_price: model.unit_price,
        }
    }
}
