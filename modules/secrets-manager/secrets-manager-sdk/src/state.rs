//! Secret lifecycle state.
//!
//! The service sends `state` as an integer code next to a human readable
//! `state_description`. Codes are not contiguous: `4` is unused.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecretState {
    PreActivation,
    Active,
    Suspended,
    Deactivated,
    Destroyed,
}

impl SecretState {
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::PreActivation => 0,
            Self::Active => 1,
            Self::Suspended => 2,
            Self::Deactivated => 3,
            Self::Destroyed => 5,
        }
    }

    #[must_use]
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            0 => Some(Self::PreActivation),
            1 => Some(Self::Active),
            2 => Some(Self::Suspended),
            3 => Some(Self::Deactivated),
            5 => Some(Self::Destroyed),
            _ => None,
        }
    }

    /// Matches the service's `state_description` values.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PreActivation => "pre_activation",
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Deactivated => "deactivated",
            Self::Destroyed => "destroyed",
        }
    }

    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "pre_activation" => Some(Self::PreActivation),
            "active" => Some(Self::Active),
            "suspended" => Some(Self::Suspended),
            "deactivated" => Some(Self::Deactivated),
            "destroyed" => Some(Self::Destroyed),
            _ => None,
        }
    }
}

impl fmt::Display for SecretState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SecretState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

struct StateVisitor;

impl Visitor<'_> for StateVisitor {
    type Value = SecretState;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a secret state code (0, 1, 2, 3 or 5) or state name")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<SecretState, E> {
        SecretState::from_code(v)
            .ok_or_else(|| E::invalid_value(de::Unexpected::Unsigned(v), &self))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<SecretState, E> {
        u64::try_from(v)
            .ok()
            .and_then(SecretState::from_code)
            .ok_or_else(|| E::invalid_value(de::Unexpected::Signed(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<SecretState, E> {
        SecretState::parse(v).ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}

impl<'de> Deserialize<'de> for SecretState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(StateVisitor)
    }
}
