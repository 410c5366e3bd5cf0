use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header},
};
use uuid::Uuid;

use crate::{
    credentials::{Claim, CredentialKeys},
    error::{AppError, AppResult},
    models::Role,
    state::AppState,
};

/// Closed set of roles an operation accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleSet(u8);

impl RoleSet {
    pub const ADMIN: RoleSet = RoleSet::of(&[Role::Admin]);
    pub const ADMIN_OR_STAFF: RoleSet = RoleSet::of(&[Role::Admin, Role::Staff]);

    const fn bit(role: Role) -> u8 {
        match role {
            Role::Admin => 0b01,
            Role::Staff => 0b10,
        }
    }

    pub const fn of(roles: &[Role]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < roles.len() {
            bits |= Self::bit(roles[i]);
            i += 1;
        }
        RoleSet(bits)
    }

    pub const fn contains(self, role: Role) -> bool {
        self.0 & Self::bit(role) != 0
    }
}

/// The verified caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub account_id: Uuid,
    pub role: Role,
}

impl From<Claim> for AuthUser {
    fn from(claim: Claim) -> Self {
        Self {
            account_id: claim.account_id,
            role: claim.role,
        }
    }
}

pub fn ensure_role(user: &AuthUser, allowed: RoleSet) -> Result<(), AppError> {
    if !allowed.contains(user.role) {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, RoleSet::ADMIN)
}

fn missing_token() -> AppError {
    AppError::Unauthenticated("Authorization token missing or malformed".into())
}

pub fn bearer_token(headers: &HeaderMap) -> AppResult<&str> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(missing_token)?;
    let auth_str = auth_header.to_str().map_err(|_| missing_token())?;

    auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(missing_token)
}

pub fn authenticate(headers: &HeaderMap, keys: &CredentialKeys) -> AppResult<AuthUser> {
    let token = bearer_token(headers)?;
    let claim = keys.verify(token).map_err(|err| {
        tracing::debug!(error = %err, "credential rejected");
        AppError::from(err)
    })?;
    Ok(claim.into())
}

/// Full gate: a verified credential whose role is in `allowed`.
pub fn authorize(
    headers: &HeaderMap,
    keys: &CredentialKeys,
    allowed: RoleSet,
) -> AppResult<AuthUser> {
    let user = authenticate(headers, keys)?;
    ensure_role(&user, allowed)?;
    Ok(user)
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let app = AppState::from_ref(state);
        authenticate(&parts.headers, &app.credentials)
    }
}

/// Caller verified as an admin. Extracted ahead of `Json`/`Query`, so other
/// roles get `Forbidden` before the request body is looked at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminUser(pub AuthUser);

impl<S> FromRequestParts<S> for AdminUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let app = AppState::from_ref(state);
        authorize(&parts.headers, &app.credentials, RoleSet::ADMIN).map(AdminUser)
    }
}
