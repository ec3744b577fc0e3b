//! Client key validation.
//!
//! A client key identifies the party whose registration attempts are being
//! counted — typically the remote IP address, but any stable identifier
//! (account id, API token hash) works. Keys are validated at construction so
//! the limiter itself never has to deal with malformed input.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// A validated, cheaply clonable client identifier.
///
/// Internally backed by `Arc<str>`, so cloning a key (which happens on every
/// limiter call) is a reference-count bump, not a string copy.
///
/// # Example
/// ```
/// use signup_throttle::ClientKey;
///
/// let key = ClientKey::new("203.0.113.7").unwrap();
/// assert_eq!(key.as_str(), "203.0.113.7");
///
/// // Empty keys are rejected at construction
/// assert!(ClientKey::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientKey(Arc<str>);

impl ClientKey {
    /// Create a key from a raw identifier.
    ///
    /// # Errors
    /// Returns `KeyError::Empty` if the identifier is empty.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, KeyError> {
        let raw = raw.as_ref();
        if raw.is_empty() {
            return Err(KeyError::Empty);
        }
        Ok(Self(Arc::from(raw)))
    }

    /// Get the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ClientKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ClientKey {
    type Error = KeyError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(&s)
    }
}

/// Error returned when client key validation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyError {
    /// The identifier was empty
    Empty,
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyError::Empty => write!(f, "client key must not be empty"),
        }
    }
}

impl std::error::Error for KeyError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_key() {
        let key = ClientKey::new("198.51.100.23").unwrap();
        assert_eq!(key.as_str(), "198.51.100.23");
        assert_eq!(key.to_string(), "198.51.100.23");
    }

    #[test]
    fn test_empty_key_rejected() {
        assert_eq!(ClientKey::new(""), Err(KeyError::Empty));
        assert_eq!("".parse::<ClientKey>(), Err(KeyError::Empty));
        assert_eq!(ClientKey::try_from(String::new()), Err(KeyError::Empty));
    }

    #[test]
    fn test_equality_and_hashing() {
        use std::collections::HashSet;

        let a1 = ClientKey::new("a").unwrap();
        let a2 = ClientKey::new("a").unwrap();
        let b = ClientKey::new("b").unwrap();

        assert_eq!(a1, a2);
        assert_ne!(a1, b);

        let mut set = HashSet::new();
        set.insert(a1);
        set.insert(a2);
        set.insert(b);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_clone_is_cheap_reference() {
        let key = ClientKey::new("10.0.0.1").unwrap();
        let clone = key.clone();
        // Both point at the same allocation
        assert!(std::ptr::eq(key.as_str(), clone.as_str()));
    }

    #[test]
    fn test_from_str_roundtrip() {
        let key: ClientKey = "2001:db8::1".parse().unwrap();
        assert_eq!(key.as_str(), "2001:db8::1");
    }
}
