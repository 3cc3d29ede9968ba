//! IAM API-key token exchange.
//!
//! The identity service trades an API key for a short-lived access token at
//! `{auth_url}/identity/token`. [`IamAuthenticator`] performs the exchange up
//! front, then keeps the token fresh from a background task.

mod authenticator;
mod config;
mod source;

pub use authenticator::IamAuthenticator;
pub use config::{DEFAULT_IAM_URL, IamConfig};
