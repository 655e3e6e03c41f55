#![forbid(unsafe_code)]

//! Policy-as-data for modal behavior.
//!
//! A [`ModalPolicy`] captures the settings an application usually wants to
//! tune per deployment rather than per call site: persistence, animation,
//! and outside-click handling. With the `policy-config` feature it loads
//! from TOML or JSON.
//!
//! ```toml
//! # modal-policy.toml
//! animated = true
//! animation_duration_ms = 200
//! outside_click = "overlay"
//! outside_click_gate = "config_open"
//! ```
//!
//! ```rust,ignore
//! let policy = ModalPolicy::from_toml_file("modal-policy.toml")?;
//! let config = ModalConfig::new().open(true).with_policy(&policy);
//! ```
//!
//! Missing keys take their defaults, which match `ModalConfig::default()`.

#[cfg(feature = "policy-config")]
use std::path::Path;
use std::time::Duration;

#[cfg(feature = "policy-config")]
use serde::{Deserialize, Serialize};

use super::config::{OutsideClickGate, OutsideClickMode};

/// Upper bound accepted for `animation_duration_ms`.
pub const MAX_ANIMATION_DURATION_MS: u64 = 60_000;

/// Tunable modal behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct ModalPolicy {
    pub persistent: bool,
    pub animated: bool,
    pub animation_duration_ms: u64,
    pub outside_click: OutsideClickMode,
    pub outside_click_gate: OutsideClickGate,
}

impl Default for ModalPolicy {
    fn default() -> Self {
        Self {
            persistent: false,
            animated: false,
            animation_duration_ms: 300,
            outside_click: OutsideClickMode::Global,
            outside_click_gate: OutsideClickGate::Opened,
        }
    }
}

impl ModalPolicy {
    /// Animation duration as a [`Duration`].
    #[must_use]
    pub fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation_duration_ms)
    }

    /// Load from a TOML string.
    #[cfg(feature = "policy-config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ModalPolicyError> {
        let policy: Self = toml::from_str(s).map_err(ModalPolicyError::Toml)?;
        policy.validated()
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "policy-config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ModalPolicyError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ModalPolicyError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "policy-config")]
    pub fn from_json_str(s: &str) -> Result<Self, ModalPolicyError> {
        let policy: Self = serde_json::from_str(s).map_err(ModalPolicyError::Json)?;
        policy.validated()
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "policy-config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ModalPolicyError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ModalPolicyError::Io)?;
        Self::from_json_str(&content)
    }

    /// Check every parameter is within range.
    ///
    /// Returns a list of validation errors. An empty list means the policy
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.animation_duration_ms > MAX_ANIMATION_DURATION_MS {
            errors.push(format!(
                "animation_duration_ms must be <= {MAX_ANIMATION_DURATION_MS}, got {}",
                self.animation_duration_ms
            ));
        }

        if self.persistent && self.outside_click == OutsideClickMode::Overlay {
            // Legal, but the overlay handler can never close anything.
            fmodal_core::debug!("persistent policy with overlay outside-click mode");
        }

        errors
    }

    /// `self` if valid, otherwise [`ModalPolicyError::Validation`].
    pub fn validated(self) -> Result<Self, ModalPolicyError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ModalPolicyError::Validation(errors))
        }
    }
}

/// Errors from loading a [`ModalPolicy`].
#[derive(Debug)]
pub enum ModalPolicyError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "policy-config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "policy-config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ModalPolicyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "policy-config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "policy-config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ModalPolicyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "policy-config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "policy-config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_valid() {
        let policy = ModalPolicy::default();
        assert!(policy.validate().is_empty());
        assert_eq!(policy.animation_duration(), Duration::from_millis(300));
    }

    #[test]
    fn validate_catches_long_duration() {
        let policy = ModalPolicy {
            animation_duration_ms: MAX_ANIMATION_DURATION_MS + 1,
            ..ModalPolicy::default()
        };
        let errors = policy.validate();
        assert!(errors.iter().any(|e| e.contains("animation_duration_ms")));

        let err = policy.validated().unwrap_err();
        assert!(err.to_string().starts_with("validation errors:"));
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn io_error_exposes_source() {
        let err = ModalPolicyError::Io(std::io::Error::other("gone"));
        assert_eq!(err.to_string(), "I/O error: gone");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[cfg(feature = "policy-config")]
    mod loading {
        use super::*;
        use std::io::Write;

        #[test]
        fn toml_partial_uses_defaults() {
            let policy = ModalPolicy::from_toml_str(
                "animated = true\nanimation_duration_ms = 200\noutside_click = \"overlay\"\n",
            )
            .unwrap();
            assert!(policy.animated);
            assert!(!policy.persistent);
            assert_eq!(policy.animation_duration_ms, 200);
            assert_eq!(policy.outside_click, OutsideClickMode::Overlay);
            assert_eq!(policy.outside_click_gate, OutsideClickGate::Opened);
        }

        #[test]
        fn json_round_trip() {
            let policy = ModalPolicy {
                persistent: true,
                outside_click_gate: OutsideClickGate::ConfigOpen,
                ..ModalPolicy::default()
            };
            let json = serde_json::to_string(&policy).unwrap();
            assert!(json.contains("\"config_open\""));
            assert_eq!(ModalPolicy::from_json_str(&json).unwrap(), policy);
        }

        #[test]
        fn loaders_reject_out_of_range_duration() {
            let err = ModalPolicy::from_json_str(r#"{"animation_duration_ms": 90000}"#).unwrap_err();
            assert!(matches!(err, ModalPolicyError::Validation(_)));
        }

        #[test]
        fn malformed_input_reports_parser() {
            let err = ModalPolicy::from_toml_str("animated = maybe").unwrap_err();
            assert!(matches!(err, ModalPolicyError::Toml(_)));
            assert!(err.to_string().starts_with("TOML parse error"));

            let err = ModalPolicy::from_json_str("{").unwrap_err();
            assert!(matches!(err, ModalPolicyError::Json(_)));
        }

        #[test]
        fn file_loaders() {
            let mut toml_file = tempfile::NamedTempFile::new().unwrap();
            writeln!(toml_file, "persistent = true").unwrap();
            let policy = ModalPolicy::from_toml_file(toml_file.path()).unwrap();
            assert!(policy.persistent);

            let mut json_file = tempfile::NamedTempFile::new().unwrap();
            write!(json_file, r#"{{"animated": true}}"#).unwrap();
            let policy = ModalPolicy::from_json_file(json_file.path()).unwrap();
            assert!(policy.animated);

            let err = ModalPolicy::from_toml_file("/nonexistent/modal-policy.toml").unwrap_err();
            assert!(matches!(err, ModalPolicyError::Io(_)));
        }
    }
}
