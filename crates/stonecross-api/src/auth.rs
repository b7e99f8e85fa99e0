//! Bearer-token extractors.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use stonecross_accounts::application::query_handlers::resolve_session;
use stonecross_core::actor::Actor;
use stonecross_core::error::DomainError;

use crate::error::ApiError;
use crate::state::AppState;

/// The raw token from an `Authorization: Bearer <token>` header.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl<S: Send + Sync> FromRequestParts<S> for BearerToken {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        let token = header
            .split_once(' ')
            .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
            .map(|(_, token)| token.trim())
            .unwrap_or_default();
        if token.is_empty() {
            return Err(ApiError(DomainError::Unauthenticated(
                "missing bearer token".into(),
            )));
        }
        Ok(Self(token.to_owned()))
    }
}

/// The caller behind a valid, unexpired session token.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Actor);

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;
        let actor = resolve_session(
            &token,
            &state.operator,
            state.clock.as_ref(),
            state.store.as_ref(),
        )
        .await?;
        Ok(Self(actor))
    }
}
