//! Shared application state.

use std::sync::Arc;

use chrono::Duration;
use stonecross_accounts::domain::account::DEFAULT_SESSION_TTL_SECS;
use stonecross_combat::domain::visibility::CombatVisibility;
use stonecross_core::actor::Operator;
use stonecross_core::clock::Clock;
use stonecross_core::store::KeyValueStore;
use stonecross_core::token::TokenSource;

/// Default operator username when none is configured.
pub const DEFAULT_OPERATOR: &str = "dm";

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Key-value store backing every document.
    pub store: Arc<dyn KeyValueStore>,
    /// Clock for deterministic time.
    pub clock: Arc<dyn Clock>,
    /// Source of session and reset tokens.
    pub tokens: Arc<dyn TokenSource>,
    /// The configured operator (DM).
    pub operator: Operator,
    /// Who may read the combat tracker.
    pub combat_visibility: CombatVisibility,
    /// Lifetime of issued sessions.
    pub session_ttl: Duration,
}

impl AppState {
    /// Create new application state with the default operator, private
    /// combat and the default session lifetime.
    #[must_use]
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        tokens: Arc<dyn TokenSource>,
    ) -> Self {
        Self {
            store,
            clock,
            tokens,
            operator: Operator::new(DEFAULT_OPERATOR),
            combat_visibility: CombatVisibility::default(),
            session_ttl: Duration::seconds(DEFAULT_SESSION_TTL_SECS),
        }
    }

    /// Sets the operator.
    #[must_use]
    pub fn with_operator(mut self, operator: Operator) -> Self {
        self.operator = operator;
        self
    }

    /// Sets who may read the combat tracker.
    #[must_use]
    pub fn with_combat_visibility(mut self, visibility: CombatVisibility) -> Self {
        self.combat_visibility = visibility;
        self
    }

    /// Sets the session lifetime.
    #[must_use]
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }
}
