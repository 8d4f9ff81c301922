//! Raw settings document model.
//!
//! These types mirror the loosely-typed document produced by a
//! [`SettingsBuilder`](crate::SettingsBuilder): every scalar is an optional
//! string (or optional primitive) exactly as it appeared in the settings file,
//! enums are still strings, and the server `configuration` element is an
//! arbitrary tree. They are consumed once by the
//! [`ProxyTranslator`](crate::ProxyTranslator) and then dropped.
//!
//! Field names follow the settings file element names, so a builder that goes
//! through an intermediate serde format can deserialize straight into them.

use serde::Deserialize;
use std::collections::BTreeMap;

/// The as-built settings document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawSettings {
    pub offline: bool,
    pub local_repository: Option<String>,
    pub model_encoding: Option<String>,
    pub servers: Vec<RawServer>,
    pub profiles: Vec<RawProfile>,
    pub mirrors: Vec<RawMirror>,
    pub proxies: Vec<RawProxy>,
    pub active_profiles: Vec<String>,
    pub plugin_groups: Vec<String>,
}

impl RawSettings {
    /// Returns `true` if the local repository is absent or only whitespace.
    pub fn has_blank_local_repository(&self) -> bool {
        self.local_repository
            .as_deref()
            .map_or(true, |path| path.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawServer {
    pub id: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub passphrase: Option<String>,
    pub private_key: Option<String>,
    pub file_permissions: Option<String>,
    pub directory_permissions: Option<String>,
    pub configuration: Option<ConfigNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawProfile {
    pub id: String,
    pub activation: Option<RawActivation>,
    pub properties: BTreeMap<String, String>,
    pub repositories: Vec<RawRepository>,
    pub plugin_repositories: Vec<RawRepository>,
}

/// Conditions under which a profile becomes active.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawActivation {
    pub active_by_default: bool,
    pub jdk: Option<String>,
    pub os: Option<RawActivationOs>,
    pub property: Option<RawActivationProperty>,
    pub file: Option<RawActivationFile>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawActivationOs {
    pub name: Option<String>,
    pub family: Option<String>,
    pub arch: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawActivationProperty {
    pub name: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawActivationFile {
    pub exists: Option<String>,
    pub missing: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawRepository {
    pub id: String,
    pub name: Option<String>,
    pub url: Option<String>,
    pub layout: Option<String>,
    pub releases: Option<RawRepositoryPolicy>,
    pub snapshots: Option<RawRepositoryPolicy>,
}

/// Release or snapshot channel policy of a repository.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawRepositoryPolicy {
    pub enabled: Option<bool>,
    pub update_policy: Option<String>,
    pub checksum_policy: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawMirror {
    pub id: String,
    pub name: Option<String>,
    pub url: Option<String>,
    pub layout: Option<String>,
    pub mirror_of: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawProxy {
    pub id: String,
    pub active: Option<bool>,
    pub protocol: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub non_proxy_hosts: Option<String>,
}

/// Free-form element tree, used for a server's `<configuration>` block.
///
/// # Examples
///
/// ```
/// use settings_supplier::ConfigNode;
///
/// let node = ConfigNode::new("configuration")
///     .with_child(ConfigNode::new("timeout").with_value("30"));
///
/// assert_eq!(node.child("timeout").and_then(|c| c.value()), Some("30"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConfigNode {
    pub name: String,
    pub value: Option<String>,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<ConfigNode>,
}

impl ConfigNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: ConfigNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Returns the first direct child named `name`.
    pub fn child(&self, name: &str) -> Option<&ConfigNode> {
        self.children.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
#[path = "raw_tests.rs"]
mod tests;
