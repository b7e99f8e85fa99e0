//! Commands for the accounts context.
//!
//! Fields arrive as the client sent them; the handlers normalize and
//! validate.

use stonecross_core::command::Command;
use uuid::Uuid;

/// Register a new account.
#[derive(Debug, Clone)]
pub struct SignUp {
    pub correlation_id: Uuid,
    pub username: String,
    /// SHA-256 hex digest of the password.
    pub password_hash: String,
}

/// Exchange credentials for a session token.
#[derive(Debug, Clone)]
pub struct LogIn {
    pub correlation_id: Uuid,
    pub username: String,
    pub password_hash: String,
}

/// End the session behind a bearer token.
#[derive(Debug, Clone)]
pub struct LogOut {
    pub correlation_id: Uuid,
    pub token: String,
}

/// Issue a password reset ticket for another user. Operator only.
#[derive(Debug, Clone)]
pub struct RequestPasswordReset {
    pub correlation_id: Uuid,
    pub username: String,
}

/// Redeem a reset ticket for a new password.
#[derive(Debug, Clone)]
pub struct ResetPassword {
    pub correlation_id: Uuid,
    pub token: String,
    pub password_hash: String,
}

macro_rules! impl_command {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl Command for $ty {
                fn command_type(&self) -> &'static str {
                    $name
                }

                fn correlation_id(&self) -> Uuid {
                    self.correlation_id
                }
            }
        )*
    };
}

impl_command! {
    SignUp => "accounts.sign_up",
    LogIn => "accounts.log_in",
    LogOut => "accounts.log_out",
    RequestPasswordReset => "accounts.request_password_reset",
    ResetPassword => "accounts.reset_password",
}
