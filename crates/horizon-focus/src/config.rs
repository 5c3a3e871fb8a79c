//! Scope configuration.

use serde::{Deserialize, Serialize};

use crate::key::FocusKey;

/// Options recognized by a [`FocusScope`](crate::FocusScope).
///
/// Deserializes from partial documents; omitted fields take their defaults.
///
/// ```
/// use horizon_focus::FocusScopeConfig;
///
/// let config = FocusScopeConfig::default()
///     .with_preserve(true)
///     .with_scope_key("toolbar");
/// assert!(config.preserve);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusScopeConfig {
    /// Re-focus the active target when a pointer interaction would otherwise
    /// blur it.
    pub preserve: bool,
    /// Stable identifier for the scope. Generated when absent.
    pub scope_key: Option<FocusKey>,
}

impl FocusScopeConfig {
    /// Enable or disable the preserve policy.
    pub fn with_preserve(mut self, preserve: bool) -> Self {
        self.preserve = preserve;
        self
    }

    /// Set the scope key.
    pub fn with_scope_key(mut self, key: impl Into<FocusKey>) -> Self {
        self.scope_key = Some(key.into());
        self
    }

    /// The configured key, or a freshly generated one.
    pub(crate) fn resolve_key(&self) -> FocusKey {
        self.scope_key.clone().unwrap_or_else(FocusKey::random)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FocusScopeConfig::default();
        assert!(!config.preserve);
        assert!(config.scope_key.is_none());
    }

    #[test]
    fn test_generated_key_when_absent() {
        let config = FocusScopeConfig::default();
        assert_ne!(config.resolve_key(), config.resolve_key());
        let keyed = config.with_scope_key("palette");
        assert_eq!(keyed.resolve_key(), FocusKey::from("palette"));
    }

    #[test]
    fn test_deserialize_partial_document() {
        let config: FocusScopeConfig = serde_json::from_str(r#"{ "preserve": true }"#)
            .expect("valid config");
        assert!(config.preserve);
        assert!(config.scope_key.is_none());

        let config: FocusScopeConfig =
            serde_json::from_str(r#"{ "scope_key": "menu" }"#).expect("valid config");
        assert!(!config.preserve);
        assert_eq!(config.scope_key, Some(FocusKey::from("menu")));
    }
}
