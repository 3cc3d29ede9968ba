//! Typed resources of the Secrets Manager API.

/// Implements `secret_type()` and [`Polymorphic`](crate::family::Polymorphic)
/// for an enum with one variant per secret type.
macro_rules! secret_type_family {
    ($ty:ident, $family:ident) => {
        impl $ty {
            #[must_use]
            pub fn secret_type(&self) -> $crate::models::secrets::SecretType {
                use $crate::models::secrets::SecretType;
                match self {
                    Self::Arbitrary(_) => SecretType::Arbitrary,
                    Self::ImportedCert(_) => SecretType::ImportedCert,
                    Self::PublicCert(_) => SecretType::PublicCert,
                    Self::PrivateCert(_) => SecretType::PrivateCert,
                    Self::IamCredentials(_) => SecretType::IamCredentials,
                    Self::Kv(_) => SecretType::Kv,
                    Self::UsernamePassword(_) => SecretType::UsernamePassword,
                    Self::ServiceCredentials(_) => SecretType::ServiceCredentials,
                    Self::CustomCredentials(_) => SecretType::CustomCredentials,
                }
            }
        }

        impl $crate::family::Polymorphic for $ty {
            const FAMILY: $crate::family::Family = $crate::family::Family::$family;
            const DISCRIMINATORS: &'static [&'static str] = &$crate::models::secrets::SecretType::NAMES;

            fn discriminator(&self) -> &'static str {
                self.secret_type().as_str()
            }
        }
    };
}

pub mod actions;
pub mod common;
pub mod configurations;
pub mod groups;
pub mod locks;
pub mod notifications;
pub mod secrets;
pub mod versions;

pub use actions::*;
pub use common::*;
pub use configurations::*;
pub use groups::*;
pub use locks::*;
pub use notifications::*;
pub use secrets::*;
pub use versions::*;
