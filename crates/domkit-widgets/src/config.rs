#![forbid(unsafe_code)]

//! Policy-as-data configuration for dialogs and notifications.
//!
//! Every timing constant and capacity bound the widgets use lives in a
//! [`PolicyConfig`] that can be loaded from TOML or JSON at startup.
//!
//! # Loading
//!
//! ```toml
//! # domkit.toml
//! [modal]
//! focus_delay_ms = 0
//!
//! [toast]
//! max_visible = 5
//! error_duration_ms = 10000
//! ```
//!
//! ```rust,ignore
//! let policy = PolicyConfig::from_toml_file("domkit.toml")?;
//! let policy = PolicyConfig::from_json_str(json)?;
//! ```
//!
//! # Defaults
//!
//! `PolicyConfig::default()` reproduces the stock behavior: three visible
//! toasts, a 300 ms settle delay, 5/5/6/7 second durations for
//! info/success/warning/error, and a 50 ms dialog focus delay.
//!
//! Toast capacity is deliberately a policy value rather than a fixed
//! constant. Hosts that never load a policy get exactly three visible
//! toasts, and a loaded policy may only raise or lower that bound to a
//! value of at least one.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::toast::ToastVariant;

/// Upper bound accepted for the toast settle delay.
const MAX_SETTLE_DELAY_MS: u64 = 10_000;

// ---------------------------------------------------------------------------
// Top-level PolicyConfig
// ---------------------------------------------------------------------------

/// Tunable parameters for every stateful widget.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Dialog behavior.
    pub modal: ModalPolicy,
    /// Notification queue behavior.
    pub toast: ToastPolicy,
}

impl PolicyConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Serialize to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::TomlSer)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.toast.max_visible == 0 {
            errors.push("toast.max_visible must be >= 1".into());
        }

        if self.toast.settle_delay_ms > MAX_SETTLE_DELAY_MS {
            errors.push(format!(
                "toast.settle_delay_ms must be <= {MAX_SETTLE_DELAY_MS}, got {}",
                self.toast.settle_delay_ms
            ));
        }

        for (name, value) in [
            ("toast.info_duration_ms", self.toast.info_duration_ms),
            ("toast.success_duration_ms", self.toast.success_duration_ms),
            ("toast.warning_duration_ms", self.toast.warning_duration_ms),
            ("toast.error_duration_ms", self.toast.error_duration_ms),
        ] {
            if value == 0 {
                errors.push(format!("{name} must be > 0"));
            }
        }

        errors
    }

    /// Validate, turning any problems into [`ConfigError::Validation`].
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Dialog defaults applied by [`ModalConfig::from_policy`](crate::modal::ModalConfig::from_policy).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModalPolicy {
    /// Delay before the first focusable descendant receives focus on open.
    pub focus_delay_ms: u64,
    /// Whether Escape closes the dialog.
    pub close_on_escape: bool,
    /// Whether clicking the backdrop itself closes the dialog.
    pub close_on_backdrop_click: bool,
}

impl Default for ModalPolicy {
    fn default() -> Self {
        Self {
            focus_delay_ms: 50,
            close_on_escape: true,
            close_on_backdrop_click: true,
        }
    }
}

impl ModalPolicy {
    #[must_use]
    pub fn focus_delay(&self) -> Duration {
        Duration::from_millis(self.focus_delay_ms)
    }
}

/// Notification queue parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToastPolicy {
    /// Maximum number of live toasts; the oldest is evicted beyond this.
    pub max_visible: usize,
    /// Delay between hiding a toast and detaching its node.
    pub settle_delay_ms: u64,
    pub info_duration_ms: u64,
    pub success_duration_ms: u64,
    pub warning_duration_ms: u64,
    pub error_duration_ms: u64,
    /// Default for [`ToastOptions::show_progress`](crate::toast::ToastOptions::show_progress).
    pub show_progress: bool,
}

impl Default for ToastPolicy {
    fn default() -> Self {
        Self {
            max_visible: 3,
            settle_delay_ms: 300,
            info_duration_ms: 5000,
            success_duration_ms: 5000,
            warning_duration_ms: 6000,
            error_duration_ms: 7000,
            show_progress: true,
        }
    }
}

impl ToastPolicy {
    /// Default auto-hide duration for `variant`.
    #[must_use]
    pub fn duration_for(&self, variant: ToastVariant) -> Duration {
        let ms = match variant {
            ToastVariant::Info => self.info_duration_ms,
            ToastVariant::Success => self.success_duration_ms,
            ToastVariant::Warning => self.warning_duration_ms,
            ToastVariant::Error => self.error_duration_ms,
        };
        Duration::from_millis(ms)
    }

    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors from loading or validating a [`PolicyConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    Toml(toml::de::Error),
    /// TOML serialization error.
    TomlSer(toml::ser::Error),
    /// JSON parse error.
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            Self::TomlSer(e) => write!(f, "TOML serialize error: {e}"),
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Toml(e) => Some(e),
            Self::TomlSer(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_validates_clean() {
        let errors = PolicyConfig::default().validate();
        assert!(errors.is_empty(), "default should validate: {errors:?}");
    }

    #[test]
    fn default_durations_per_variant() {
        let toast = ToastPolicy::default();
        assert_eq!(toast.duration_for(ToastVariant::Info), Duration::from_millis(5000));
        assert_eq!(toast.duration_for(ToastVariant::Success), Duration::from_millis(5000));
        assert_eq!(toast.duration_for(ToastVariant::Warning), Duration::from_millis(6000));
        assert_eq!(toast.duration_for(ToastVariant::Error), Duration::from_millis(7000));
        assert_eq!(toast.max_visible, 3);
        assert_eq!(toast.settle_delay(), Duration::from_millis(300));
    }

    #[test]
    fn validate_catches_zero_capacity() {
        let mut policy = PolicyConfig::default();
        policy.toast.max_visible = 0;
        let errors = policy.validate();
        assert!(errors.iter().any(|e| e.contains("max_visible")));
    }

    #[test]
    fn validate_catches_zero_duration() {
        let mut policy = PolicyConfig::default();
        policy.toast.warning_duration_ms = 0;
        let errors = policy.validate();
        assert!(errors.iter().any(|e| e.contains("warning_duration_ms")));
    }

    #[test]
    fn validate_catches_long_settle() {
        let mut policy = PolicyConfig::default();
        policy.toast.settle_delay_ms = 60_000;
        assert!(matches!(policy.validated(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let policy = PolicyConfig::from_toml_str(
            r#"
            [toast]
            max_visible = 5
            "#,
        )
        .expect("valid toml");
        assert_eq!(policy.toast.max_visible, 5);
        assert_eq!(policy.toast.error_duration_ms, 7000);
        assert_eq!(policy.modal, ModalPolicy::default());
    }

    #[test]
    fn json_round_trip_through_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"modal": {{"focus_delay_ms": 0, "close_on_escape": false}}}}"#)
            .expect("write");
        let policy = PolicyConfig::from_json_file(file.path()).expect("valid json");
        assert_eq!(policy.modal.focus_delay(), Duration::ZERO);
        assert!(!policy.modal.close_on_escape);
        assert!(policy.modal.close_on_backdrop_click);
    }

    #[test]
    fn toml_file_round_trip() {
        let mut policy = PolicyConfig::default();
        policy.toast.show_progress = false;
        let text = policy.to_toml_string().expect("serialize");
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(text.as_bytes()).expect("write");
        let loaded = PolicyConfig::from_toml_file(file.path()).expect("load");
        assert_eq!(loaded, policy);
    }

    #[test]
    fn errors_carry_sources() {
        let err = PolicyConfig::from_toml_str("toast = 3").expect_err("wrong shape");
        assert!(err.to_string().starts_with("TOML parse error"));
        assert!(std::error::Error::source(&err).is_some());

        let err = PolicyConfig::from_json_file("/nonexistent/domkit.json").expect_err("missing");
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
