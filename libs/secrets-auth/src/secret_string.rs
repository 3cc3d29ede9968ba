use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// String holding credential material: API keys and bearer tokens.
///
/// `Debug` and `Display` print `[REDACTED]`; read the value with
/// [`expose`](Self::expose) only where it goes on the wire. The buffer is
/// zeroed on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Plaintext view. Do not log or persist it.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl PartialEq for SecretString {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for SecretString {}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn formatting_never_shows_value() {
        let key = SecretString::new("0123-apikey-abcd");
        assert_eq!(format!("{key:?}"), "[REDACTED]");
        assert_eq!(format!("{key}"), "[REDACTED]");
        assert!(!format!("{:?}", Some(&key)).contains("apikey"));
    }

    #[test]
    fn expose_and_blank_detection() {
        assert_eq!(SecretString::new("tok").expose(), "tok");
        assert!(SecretString::new("  ").is_empty());
        assert!(!SecretString::new("x").is_empty());
    }

    #[test]
    fn zeroize_clears_buffer() {
        let mut s = SecretString::new("sensitive");
        s.zeroize();
        assert!(s.0.is_empty());
    }
}
