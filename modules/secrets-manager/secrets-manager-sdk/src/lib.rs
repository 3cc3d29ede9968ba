#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! Secrets Manager SDK
//!
//! Typed resources of the Secrets Manager API and the machinery to move them
//! over JSON:
//!
//! - [`models`]: secrets, versions, groups, configurations, actions, locks
//!   and notification registrations. Polymorphic resources are enums
//!   discriminated by `secret_type`, `config_type` or `action_type`.
//! - [`registry`]: which discriminator values each [`Family`] accepts.
//! - [`codec`]: discriminator-checked decoding, encoding and merge-patch
//!   derivation.
//! - [`pki`]: signing lifecycle of private certificate authorities.
//! - [`SecretsManagerError`]: the error type of every operation.
//!
//! ```ignore
//! use secrets_manager_sdk::{codec, models::Secret};
//!
//! let secret: Secret = codec::decode_slice(&body)?;
//! println!("{} {:?}", secret.secret_type(), secret.id());
//! ```

pub mod codec;
pub mod error;
pub mod family;
pub mod models;
pub mod pki;
pub mod registry;
pub mod state;

pub use error::{ErrorDetail, ErrorTarget, SecretsManagerError, ServiceProblem};
pub use family::{Family, Polymorphic};
pub use pki::SigningState;
pub use state::SecretState;
