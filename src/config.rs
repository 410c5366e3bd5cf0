use std::{env, str::FromStr};

use anyhow::Context;

/// What a sale commit does when the supplied customer id matches no customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownCustomerPolicy {
    /// Record the sale as a non-member walk-in sale with no customer attached.
    #[default]
    WalkIn,
    /// Reject the sale with `NotFound`.
    Reject,
}

impl FromStr for UnknownCustomerPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "walk_in" | "walkin" => Ok(Self::WalkIn),
            "reject" => Ok(Self::Reject),
            other => anyhow::bail!("unknown customer policy `{other}` (expected walk_in or reject)"),
        }
    }
}

pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;
/// One year.
pub const MAX_TOKEN_TTL_SECS: i64 = 86_400 * 365;

/// Credential lifetime from `TOKEN_TTL_SECS`; unset means one hour.
pub fn parse_token_ttl(raw: Option<&str>) -> anyhow::Result<i64> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(DEFAULT_TOKEN_TTL_SECS);
    };
    let secs: i64 = raw
        .parse()
        .with_context(|| format!("TOKEN_TTL_SECS `{raw}` is not a number"))?;
    if !(1..=MAX_TOKEN_TTL_SECS).contains(&secs) {
        anyhow::bail!("TOKEN_TTL_SECS must be between 1 and {MAX_TOKEN_TTL_SECS}, got {secs}");
    }
    Ok(secs)
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    pub unknown_customer: UnknownCustomerPolicy,
    pub sale_commit_retries: u32,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET is not set")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let token_ttl_secs = parse_token_ttl(env::var("TOKEN_TTL_SECS").ok().as_deref())?;
        let unknown_customer = match env::var("UNKNOWN_CUSTOMER_POLICY") {
            Ok(raw) => raw.parse()?,
            Err(_) => UnknownCustomerPolicy::default(),
        };
        let sale_commit_retries = env::var("SALE_COMMIT_RETRIES")
            .ok()
            .and_then(|r| r.parse::<u32>().ok())
            .unwrap_or(3);
        Ok(Self {
            port,
            database_url,
            host,
            jwt_secret,
            token_ttl_secs,
            unknown_customer,
            sale_commit_retries,
        })
    }
}
