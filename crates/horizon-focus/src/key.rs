//! Stable identifiers for scopes and targets.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A caller-supplied or generated identifier for a scope or target.
///
/// Keys only need to be unique among siblings of the same scope. Cloning is
/// cheap.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FocusKey(Arc<str>);

impl FocusKey {
    /// Create a key from any string.
    pub fn new(key: impl AsRef<str>) -> Self {
        Self(Arc::from(key.as_ref()))
    }

    /// Generate a random eight character hexadecimal key.
    pub fn random() -> Self {
        let value: u32 = rand::random();
        Self::new(format!("{value:08x}"))
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for FocusKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FocusKey({:?})", &*self.0)
    }
}

impl fmt::Display for FocusKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FocusKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for FocusKey {
    fn from(key: String) -> Self {
        Self(Arc::from(key))
    }
}

impl AsRef<str> for FocusKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_key_shape() {
        let key = FocusKey::random();
        assert_eq!(key.as_str().len(), 8);
        assert!(key.as_str().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_conversions_compare_equal() {
        assert_eq!(FocusKey::from("menu"), FocusKey::from("menu".to_string()));
        assert_eq!(FocusKey::new("menu").to_string(), "menu");
    }
}
