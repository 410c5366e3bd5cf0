use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use password_hash::rand_core::OsRng;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use crate::{
    audit,
    dto::auth::{LoginRequest, LoginResponse},
    entity::accounts::{Column as AccountCol, Entity as Accounts},
    error::{AppError, AppResult},
    models::Account,
    response::ApiResponse,
    services::record_gate::require_text,
    state::AppState,
};

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn invalid_credentials() -> AppError {
    AppError::Unauthenticated("Invalid credentials".into())
}

pub async fn login(state: &AppState, payload: LoginRequest) -> AppResult<ApiResponse<LoginResponse>> {
    let username = require_text("username", payload.username)?;
    let password = payload
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::invalid("password", "password is required"))?;

    let account = Accounts::find()
        .filter(AccountCol::Username.eq(username.as_str()))
        .one(&state.orm)
        .await?
        .ok_or_else(invalid_credentials)?;

    if !verify_password(&password, &account.password_hash)? {
        tracing::info!(username = %username, "login rejected");
        return Err(invalid_credentials());
    }

    let account = Account::try_from(account)?;
    let (token, expires_at) = state.credentials.sign(account.id, account.role)?;

    audit::record(
        &state.orm,
        account.id,
        "account_login",
        "accounts",
        serde_json::json!({ "account_id": account.id }),
    )
    .await;

    Ok(ApiResponse::single(
        "Logged in",
        LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_at,
            account,
        },
    ))
}
