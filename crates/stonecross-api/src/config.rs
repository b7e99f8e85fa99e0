//! Server configuration read from the environment.

use std::net::SocketAddr;

use axum::http::{HeaderName, HeaderValue, Method, header};
use chrono::Duration;
use stonecross_accounts::domain::account::DEFAULT_SESSION_TTL_SECS;
use stonecross_combat::domain::visibility::CombatVisibility;
use stonecross_core::actor::Operator;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::error::AppError;
use crate::state::DEFAULT_OPERATOR;

/// Longest accepted session lifetime: one year.
const MAX_SESSION_TTL_SECS: i64 = 365 * 24 * 60 * 60;

/// Everything the server reads at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Absent selects the in-memory store.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub operator: Operator,
    pub combat_visibility: CombatVisibility,
    pub session_ttl: Duration,
    /// Absent means any origin is allowed.
    pub cors_allowed_origins: Option<Vec<String>>,
    pub otlp_endpoint: Option<String>,
}

impl AppConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which returns the value of a
    /// variable if it is set.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };

        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".to_owned());
        let port = parse_or(var("PORT"), "PORT", 3000_u16)?;
        let database_max_connections =
            parse_or(var("DATABASE_MAX_CONNECTIONS"), "DATABASE_MAX_CONNECTIONS", 10_u32)?;
        let operator = Operator::new(&var("DM_USERNAME").unwrap_or_else(|| DEFAULT_OPERATOR.to_owned()));
        let combat_visibility = var("COMBAT_VISIBILITY")
            .map(|v| v.parse::<CombatVisibility>())
            .transpose()
            .map_err(|e| AppError::Config(format!("COMBAT_VISIBILITY: {e}")))?
            .unwrap_or_default();
        let ttl_secs = parse_or(var("SESSION_TTL_SECS"), "SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS)?;
        let session_ttl = Some(ttl_secs)
            .filter(|secs| (1..=MAX_SESSION_TTL_SECS).contains(secs))
            .and_then(Duration::try_seconds)
            .ok_or_else(|| {
                AppError::Config(format!(
                    "SESSION_TTL_SECS must be between 1 and {MAX_SESSION_TTL_SECS}"
                ))
            })?;
        let cors_allowed_origins = var("CORS_ALLOWED_ORIGINS").map(|list| {
            list.split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_owned)
                .collect()
        });

        Ok(Self {
            host,
            port,
            database_url: var("DATABASE_URL"),
            database_max_connections,
            operator,
            combat_visibility,
            session_ttl,
            cors_allowed_origins,
            otlp_endpoint: var("OTEL_EXPORTER_OTLP_ENDPOINT"),
        })
    }

    /// The address to listen on.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HOST:PORT` is not a socket address.
    pub fn listen_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }

    /// CORS policy: the configured origins, or permissive when none are set.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if an origin is not a valid header value.
    pub fn cors_layer(&self) -> Result<CorsLayer, AppError> {
        let Some(origins) = &self.cors_allowed_origins else {
            return Ok(CorsLayer::permissive());
        };
        let origins = origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin)
                    .map_err(|e| AppError::Config(format!("CORS_ALLOWED_ORIGINS: {origin}: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let headers: [HeaderName; 3] = [header::AUTHORIZATION, header::CONTENT_TYPE, header::IF_MATCH];
        Ok(CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::PUT])
            .allow_headers(headers)
            .expose_headers([header::ETAG]))
    }
}

fn parse_or<T>(raw: Option<String>, name: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|e| AppError::Config(format!("{name} must be a valid number: {e}"))),
    }
}
