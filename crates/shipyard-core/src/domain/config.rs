//! Application configuration as handed to the core.
//!
//! Parsing of the user's source files happens elsewhere; the core receives
//! already-structured values. Component bodies stay as raw JSON so each
//! component can decode them with its own schema.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::errors::CoreError;
use super::role::Role;

/// Configuration of one application.
///
/// Every role is optional; an absent role is simply left unset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<ComponentConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<ComponentConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<ComponentConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<ComponentConfig>,
}

impl AppConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self, CoreError> {
        serde_json::from_str(s).map_err(|e| CoreError::InvalidAppConfig(e.to_string()))
    }

    pub fn with_component(mut self, role: Role, component: ComponentConfig) -> Self {
        *self.slot_mut(role) = Some(component);
        self
    }

    pub fn component(&self, role: Role) -> Option<&ComponentConfig> {
        match role {
            Role::Builder => self.build.as_ref(),
            Role::Registry => self.registry.as_ref(),
            Role::Platform => self.platform.as_ref(),
            Role::Releaser => self.release.as_ref(),
        }
    }

    fn slot_mut(&mut self, role: Role) -> &mut Option<ComponentConfig> {
        match role {
            Role::Builder => &mut self.build,
            Role::Registry => &mut self.registry,
            Role::Platform => &mut self.platform,
            Role::Releaser => &mut self.release,
        }
    }
}

/// Declared component: subtype name plus its configuration body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentConfig {
    /// Subtype name looked up in the role's factory registry (e.g. `"docker"`).
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub config: serde_json::Value,
}

impl ComponentConfig {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            config: serde_json::Value::Null,
        }
    }

    pub fn with_config(mut self, config: serde_json::Value) -> Self {
        self.config = config;
        self
    }
}

/// Project-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSettings {
    /// Root of the on-disk data directory.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Upper bound for a single teardown action.
    #[serde(default = "default_teardown_timeout_ms")]
    pub teardown_timeout_ms: u64,
}

impl ProjectSettings {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_teardown_timeout(mut self, timeout: Duration) -> Self {
        self.teardown_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn teardown_timeout(&self) -> Duration {
        Duration::from_millis(self.teardown_timeout_ms)
    }
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            teardown_timeout_ms: default_teardown_timeout_ms(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".shipyard")
}

fn default_teardown_timeout_ms() -> u64 {
    30_000
}
