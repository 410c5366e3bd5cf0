use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Account, Role};

#[derive(Deserialize, Debug, ToSchema)]
pub struct CreateAccountRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AccountList {
    pub items: Vec<Account>,
}
