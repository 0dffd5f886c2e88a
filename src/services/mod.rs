pub mod auth;
pub mod password_reset;
pub mod token_sweeper;

pub use password_reset::{PasswordResetService, Redemption, ResetLink};
