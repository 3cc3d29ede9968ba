//! Polymorphic families and the trait their sum types implement.

use std::fmt;

/// A polymorphic resource family.
///
/// Each family is one logical resource whose concrete shape is chosen by a
/// discriminator value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Family {
    Secret,
    SecretMetadata,
    SecretVersion,
    SecretVersionMetadata,
    SecretPrototype,
    SecretVersionPrototype,
    SecretMetadataPatch,
    Configuration,
    ConfigurationMetadata,
    ConfigurationPrototype,
    ConfigurationPatch,
    SecretAction,
    SecretActionPrototype,
    SecretVersionAction,
    SecretVersionActionPrototype,
    ConfigurationAction,
    ConfigurationActionPrototype,
}

impl Family {
    pub const ALL: [Family; 17] = [
        Self::Secret,
        Self::SecretMetadata,
        Self::SecretVersion,
        Self::SecretVersionMetadata,
        Self::SecretPrototype,
        Self::SecretVersionPrototype,
        Self::SecretMetadataPatch,
        Self::Configuration,
        Self::ConfigurationMetadata,
        Self::ConfigurationPrototype,
        Self::ConfigurationPatch,
        Self::SecretAction,
        Self::SecretActionPrototype,
        Self::SecretVersionAction,
        Self::SecretVersionActionPrototype,
        Self::ConfigurationAction,
        Self::ConfigurationActionPrototype,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Secret => "Secret",
            Self::SecretMetadata => "SecretMetadata",
            Self::SecretVersion => "SecretVersion",
            Self::SecretVersionMetadata => "SecretVersionMetadata",
            Self::SecretPrototype => "SecretPrototype",
            Self::SecretVersionPrototype => "SecretVersionPrototype",
            Self::SecretMetadataPatch => "SecretMetadataPatch",
            Self::Configuration => "Configuration",
            Self::ConfigurationMetadata => "ConfigurationMetadata",
            Self::ConfigurationPrototype => "ConfigurationPrototype",
            Self::ConfigurationPatch => "ConfigurationPatch",
            Self::SecretAction => "SecretAction",
            Self::SecretActionPrototype => "SecretActionPrototype",
            Self::SecretVersionAction => "SecretVersionAction",
            Self::SecretVersionActionPrototype => "SecretVersionActionPrototype",
            Self::ConfigurationAction => "ConfigurationAction",
            Self::ConfigurationActionPrototype => "ConfigurationActionPrototype",
        }
    }

    /// Name of the JSON field holding the discriminator.
    #[must_use]
    pub fn discriminator_field(self) -> &'static str {
        match self {
            Self::Secret
            | Self::SecretMetadata
            | Self::SecretVersion
            | Self::SecretVersionMetadata
            | Self::SecretPrototype
            | Self::SecretVersionPrototype
            | Self::SecretMetadataPatch => "secret_type",
            Self::Configuration
            | Self::ConfigurationMetadata
            | Self::ConfigurationPrototype
            | Self::ConfigurationPatch => "config_type",
            Self::SecretAction
            | Self::SecretActionPrototype
            | Self::SecretVersionAction
            | Self::SecretVersionActionPrototype
            | Self::ConfigurationAction
            | Self::ConfigurationActionPrototype => "action_type",
        }
    }

    /// Whether the discriminator travels inside the JSON body.
    ///
    /// Patch documents and version prototypes are addressed by the URL (and,
    /// for configurations, the type hint header), so their bodies carry no
    /// discriminator.
    #[must_use]
    pub fn is_tagged_on_wire(self) -> bool {
        !matches!(
            self,
            Self::SecretMetadataPatch | Self::ConfigurationPatch | Self::SecretVersionPrototype
        )
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sum type covering every variant of one [`Family`].
pub trait Polymorphic {
    const FAMILY: Family;

    /// Every discriminator value the type can represent.
    const DISCRIMINATORS: &'static [&'static str];

    /// Discriminator of this value's variant.
    fn discriminator(&self) -> &'static str;
}
