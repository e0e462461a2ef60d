//! Secure credential handling using the secrecy crate
//!
//! Credentials loaded from configuration are wrapped in `Secret<T>` so
//! they are zeroed on drop, redacted in Debug output and only readable
//! through an explicit `expose_secret()` call.

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer};
use zeroize::Zeroize;

/// Newtype wrapper for String that implements the traits Secret needs.
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl SecretValue {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl From<&str> for SecretValue {
    fn from(s: &str) -> Self {
        SecretValue(s.to_string())
    }
}

impl serde::Serialize for SecretValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// Secret string type used for all configured credentials.
pub type SecretString = Secret<SecretValue>;

/// Convenience constructor, mainly for tests and defaults.
pub fn secret(value: impl Into<String>) -> SecretString {
    Secret::new(SecretValue(value.into()))
}
