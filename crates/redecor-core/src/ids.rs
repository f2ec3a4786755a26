//! Identifier types for the credit ledger.
//!
//! User identifiers are issued by the external identity provider and are opaque to
//! the ledger; transaction identifiers are generated here as ULIDs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Maximum accepted length of a user identifier, in bytes.
pub const MAX_USER_ID_BYTES: usize = 255;

/// A user identifier.
///
/// The value is an opaque, stable string issued by the identity provider
/// (for example `user_2aXb...`). It is never parsed, only checked to be non-blank
/// and of bounded length.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Create a user identifier, validating it.
    ///
    /// # Errors
    ///
    /// Returns `IdError::EmptyUserId` for blank input and `IdError::UserIdTooLong`
    /// when the value exceeds [`MAX_USER_ID_BYTES`].
    pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(IdError::EmptyUserId);
        }
        if value.len() > MAX_USER_ID_BYTES {
            return Err(IdError::UserIdTooLong {
                len: value.len(),
                max: MAX_USER_ID_BYTES,
            });
        }
        Ok(Self(value))
    }

    /// Return the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the raw bytes of the identifier.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl FromStr for UserId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for UserId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A transaction identifier using ULID for time-ordering.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TransactionId(Ulid);

impl TransactionId {
    /// Generate a new `TransactionId` with the current timestamp.
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new())
    }

    /// Return the bytes of the ULID (16 bytes).
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 16] {
        self.0.to_bytes()
    }
}

impl FromStr for TransactionId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ulid = Ulid::from_string(s).map_err(|_| IdError::InvalidUlid)?;
        Ok(Self(ulid))
    }
}

impl fmt::Debug for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransactionId({})", self.0)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for TransactionId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TransactionId> for String {
    fn from(id: TransactionId) -> Self {
        id.0.to_string()
    }
}

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The user identifier is empty or whitespace.
    #[error("user id must not be empty")]
    EmptyUserId,

    /// The user identifier exceeds the maximum length.
    #[error("user id is {len} bytes, maximum is {max}")]
    UserIdTooLong {
        /// Actual length in bytes.
        len: usize,
        /// Maximum length in bytes.
        max: usize,
    },

    /// The input is not a valid ULID.
    #[error("invalid ULID format")]
    InvalidUlid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_accepts_provider_ids() {
        let id = UserId::new("user_2aXbQ9").unwrap();
        assert_eq!(id.as_str(), "user_2aXbQ9");
        assert_eq!(id.to_string(), "user_2aXbQ9");
    }

    #[test]
    fn user_id_rejects_blank() {
        assert_eq!(UserId::new(""), Err(IdError::EmptyUserId));
        assert_eq!(UserId::new("   "), Err(IdError::EmptyUserId));
    }

    #[test]
    fn user_id_rejects_oversized() {
        let long = "u".repeat(MAX_USER_ID_BYTES + 1);
        assert!(matches!(
            UserId::new(long),
            Err(IdError::UserIdTooLong { len: 256, max: 255 })
        ));
        assert!(UserId::new("u".repeat(MAX_USER_ID_BYTES)).is_ok());
    }

    #[test]
    fn user_id_deserialize_validates() {
        let parsed: UserId = serde_json::from_str("\"u1\"").unwrap();
        assert_eq!(parsed.as_str(), "u1");
        assert!(serde_json::from_str::<UserId>("\"\"").is_err());
    }

    #[test]
    fn transaction_id_parse() {
        let id = TransactionId::generate();
        let parsed = TransactionId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
        assert_eq!(
            TransactionId::from_str("not-a-ulid"),
            Err(IdError::InvalidUlid)
        );
    }

    #[test]
    fn transaction_id_bytes_are_the_ulid_bytes() {
        let id = TransactionId::generate();
        let bytes = id.to_bytes();
        assert_eq!(Ulid::from_bytes(bytes).to_string(), id.to_string());
    }
}
