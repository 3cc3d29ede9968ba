//! Process-wide table of the discriminator values each family accepts.
//!
//! Built on first use from the `DISCRIMINATORS` of every [`Polymorphic`]
//! type and never mutated afterwards.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::error::SecretsManagerError;
use crate::family::{Family, Polymorphic};
use crate::models::actions::{
    ConfigurationAction, ConfigurationActionPrototype, SecretAction, SecretActionPrototype,
    SecretVersionAction, SecretVersionActionPrototype,
};
use crate::models::configurations::{
    Configuration, ConfigurationMetadata, ConfigurationPatch, ConfigurationPrototype,
};
use crate::models::secrets::{Secret, SecretMetadata, SecretMetadataPatch, SecretPrototype};
use crate::models::versions::{SecretVersion, SecretVersionMetadata, SecretVersionPrototype};

/// Shape metadata of one registered variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantInfo {
    pub family: Family,
    pub discriminator: &'static str,
    /// Declaration order within the family.
    pub ordinal: usize,
}

impl VariantInfo {
    #[must_use]
    pub fn discriminator_field(&self) -> &'static str {
        self.family.discriminator_field()
    }

    #[must_use]
    pub fn is_tagged_on_wire(&self) -> bool {
        self.family.is_tagged_on_wire()
    }
}

type Table = HashMap<Family, HashMap<&'static str, VariantInfo>>;

fn register<T: Polymorphic>(table: &mut Table) {
    let variants = table.entry(T::FAMILY).or_default();
    for (ordinal, &discriminator) in T::DISCRIMINATORS.iter().enumerate() {
        variants.insert(
            discriminator,
            VariantInfo {
                family: T::FAMILY,
                discriminator,
                ordinal,
            },
        );
    }
}

static REGISTRY: LazyLock<Table> = LazyLock::new(|| {
    let mut table = Table::new();
    register::<Secret>(&mut table);
    register::<SecretMetadata>(&mut table);
    register::<SecretVersion>(&mut table);
    register::<SecretVersionMetadata>(&mut table);
    register::<SecretPrototype>(&mut table);
    register::<SecretVersionPrototype>(&mut table);
    register::<SecretMetadataPatch>(&mut table);
    register::<Configuration>(&mut table);
    register::<ConfigurationMetadata>(&mut table);
    register::<ConfigurationPrototype>(&mut table);
    register::<ConfigurationPatch>(&mut table);
    register::<SecretAction>(&mut table);
    register::<SecretActionPrototype>(&mut table);
    register::<SecretVersionAction>(&mut table);
    register::<SecretVersionActionPrototype>(&mut table);
    register::<ConfigurationAction>(&mut table);
    register::<ConfigurationActionPrototype>(&mut table);
    tracing::trace!(
        families = table.len(),
        variants = table.values().map(HashMap::len).sum::<usize>(),
        "variant registry initialised"
    );
    table
});

#[must_use]
pub fn lookup(family: Family, discriminator: &str) -> Option<&'static VariantInfo> {
    REGISTRY.get(&family)?.get(discriminator)
}

#[must_use]
pub fn is_registered(family: Family, discriminator: &str) -> bool {
    lookup(family, discriminator).is_some()
}

/// Like [`lookup`], failing with `UnknownVariant`.
///
/// # Errors
/// `UnknownVariant` when `discriminator` is not registered for `family`.
pub fn resolve(
    family: Family,
    discriminator: &str,
) -> Result<&'static VariantInfo, SecretsManagerError> {
    lookup(family, discriminator).ok_or_else(|| SecretsManagerError::UnknownVariant {
        family: family.to_string(),
        discriminator: discriminator.to_owned(),
    })
}

/// Registered discriminators of `family` in declaration order.
#[must_use]
pub fn discriminators(family: Family) -> Vec<&'static str> {
    let mut variants: Vec<&VariantInfo> = REGISTRY
        .get(&family)
        .map(|table| table.values().collect())
        .unwrap_or_default();
    variants.sort_by_key(|v| v.ordinal);
    variants.into_iter().map(|v| v.discriminator).collect()
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn every_family_is_populated() {
        for family in Family::ALL {
            assert!(
                !discriminators(family).is_empty(),
                "{family} has no registered variants"
            );
        }
    }

    #[test]
    fn family_sizes() {
        assert_eq!(discriminators(Family::Secret).len(), 9);
        assert_eq!(discriminators(Family::SecretVersionPrototype).len(), 9);
        assert_eq!(discriminators(Family::ConfigurationPatch).len(), 7);
        assert_eq!(discriminators(Family::SecretAction).len(), 2);
        assert_eq!(discriminators(Family::SecretVersionActionPrototype).len(), 1);
        assert_eq!(discriminators(Family::ConfigurationAction).len(), 5);
    }

    #[test]
    fn lookup_is_family_scoped() {
        assert!(is_registered(Family::Secret, "arbitrary"));
        assert!(!is_registered(Family::Configuration, "arbitrary"));
        let info = resolve(Family::Configuration, "private_cert_configuration_root_ca").unwrap();
        assert_eq!(info.discriminator_field(), "config_type");
        assert!(info.is_tagged_on_wire());
        assert!(!resolve(Family::ConfigurationPatch, "private_cert_configuration_template")
            .unwrap()
            .is_tagged_on_wire());
    }

    #[test]
    fn unknown_discriminator() {
        let err = resolve(Family::SecretAction, "rotate_everything").unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown SecretAction variant 'rotate_everything'"
        );
    }

    #[test]
    fn lookup_accepts_a_borrowed_discriminator() {
        let wire = String::from("username_password");
        let info = lookup(Family::SecretMetadata, wire.as_str()).unwrap();
        assert_eq!(info.discriminator, "username_password");
        assert_eq!(info.family, Family::SecretMetadata);
        assert!(lookup(Family::SecretMetadata, &wire.to_uppercase()).is_none());
    }

    #[test]
    fn declaration_order_is_kept() {
        assert_eq!(
            discriminators(Family::SecretMetadata).first().copied(),
            Some("arbitrary")
        );
        assert_eq!(
            discriminators(Family::ConfigurationMetadata).last().copied(),
            Some("private_cert_configuration_template")
        );
    }
}
