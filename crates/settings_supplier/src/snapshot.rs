//! Immutable settings snapshot.
//!
//! The strongly-typed view of a resolved settings document. Snapshots are
//! created only by the [`ProxyTranslator`](crate::ProxyTranslator), expose
//! read-only accessors, and have no mutators, so a snapshot handed out behind
//! an `Arc` can be read from any number of threads.
//!
//! Every value that may be missing from the settings file is an `Option`.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// Repository layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Default,
    Legacy,
}

impl Layout {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Legacy => "legacy",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do when an artifact checksum does not match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumPolicy {
    #[default]
    Warn,
    Fail,
    Ignore,
}

impl ChecksumPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warn => "warn",
            Self::Fail => "fail",
            Self::Ignore => "ignore",
        }
    }
}

impl fmt::Display for ChecksumPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How often remote metadata is refreshed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdatePolicy {
    Never,
    #[default]
    Daily,
    Always,
    /// Every [`RepositoryPolicySnapshot::interval_minutes`] minutes.
    Interval,
}

impl UpdatePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Never => "never",
            Self::Daily => "daily",
            Self::Always => "always",
            Self::Interval => "interval",
        }
    }
}

impl fmt::Display for UpdatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Credentials and transport options for one server id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerSnapshot {
    pub(crate) id: String,
    pub(crate) username: Option<String>,
    #[serde(skip_serializing)]
    pub(crate) password: Option<String>,
    #[serde(skip_serializing)]
    pub(crate) passphrase: Option<String>,
    pub(crate) private_key: Option<PathBuf>,
    pub(crate) file_permissions: Option<String>,
    pub(crate) directory_permissions: Option<String>,
    pub(crate) configuration: Option<String>,
}

impl ServerSnapshot {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn passphrase(&self) -> Option<&str> {
        self.passphrase.as_deref()
    }

    pub fn private_key(&self) -> Option<&Path> {
        self.private_key.as_deref()
    }

    pub fn file_permissions(&self) -> Option<&str> {
        self.file_permissions.as_deref()
    }

    pub fn directory_permissions(&self) -> Option<&str> {
        self.directory_permissions.as_deref()
    }

    /// The server's extra `<configuration>` element, serialized as markup.
    pub fn configuration(&self) -> Option<&str> {
        self.configuration.as_deref()
    }
}

/// Release or snapshot channel policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RepositoryPolicySnapshot {
    pub(crate) enabled: bool,
    pub(crate) checksum_policy: ChecksumPolicy,
    pub(crate) update_policy: UpdatePolicy,
    pub(crate) interval_minutes: u32,
}

impl Default for RepositoryPolicySnapshot {
    fn default() -> Self {
        Self {
            enabled: true,
            checksum_policy: ChecksumPolicy::Warn,
            update_policy: UpdatePolicy::Daily,
            interval_minutes: 0,
        }
    }
}

impl RepositoryPolicySnapshot {
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn checksum_policy(&self) -> ChecksumPolicy {
        self.checksum_policy
    }

    pub fn update_policy(&self) -> UpdatePolicy {
        self.update_policy
    }

    /// Refresh interval; nonzero only for [`UpdatePolicy::Interval`].
    pub fn interval_minutes(&self) -> u32 {
        self.interval_minutes
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepositorySnapshot {
    pub(crate) id: String,
    pub(crate) layout: Layout,
    pub(crate) name: Option<String>,
    pub(crate) url: Url,
    pub(crate) releases: RepositoryPolicySnapshot,
    pub(crate) snapshots: RepositoryPolicySnapshot,
}

impl RepositorySnapshot {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn releases(&self) -> &RepositoryPolicySnapshot {
        &self.releases
    }

    pub fn snapshots(&self) -> &RepositoryPolicySnapshot {
        &self.snapshots
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActivationOsSnapshot {
    pub(crate) family: Option<String>,
    pub(crate) name: Option<String>,
    pub(crate) arch: Option<String>,
    pub(crate) version: Option<String>,
}

impl ActivationOsSnapshot {
    pub fn family(&self) -> Option<&str> {
        self.family.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn arch(&self) -> Option<&str> {
        self.arch.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

/// Profile activation criteria.
///
/// Carried as data only; nothing in this crate evaluates them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActivationSnapshot {
    pub(crate) active_by_default: bool,
    pub(crate) file_exists: Option<String>,
    pub(crate) file_missing: Option<String>,
    pub(crate) os: Option<ActivationOsSnapshot>,
    pub(crate) jdk: Option<String>,
    pub(crate) property_name: Option<String>,
    pub(crate) property_value: Option<String>,
}

impl ActivationSnapshot {
    pub fn active_by_default(&self) -> bool {
        self.active_by_default
    }

    pub fn file_exists(&self) -> Option<&str> {
        self.file_exists.as_deref()
    }

    pub fn file_missing(&self) -> Option<&str> {
        self.file_missing.as_deref()
    }

    pub fn os(&self) -> Option<&ActivationOsSnapshot> {
        self.os.as_ref()
    }

    pub fn jdk(&self) -> Option<&str> {
        self.jdk.as_deref()
    }

    pub fn property_name(&self) -> Option<&str> {
        self.property_name.as_deref()
    }

    pub fn property_value(&self) -> Option<&str> {
        self.property_value.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileSnapshot {
    pub(crate) id: String,
    pub(crate) active: bool,
    pub(crate) activation: Option<ActivationSnapshot>,
    pub(crate) plugin_repositories: Vec<RepositorySnapshot>,
    pub(crate) properties: BTreeMap<String, String>,
    pub(crate) repositories: Vec<RepositorySnapshot>,
}

impl ProfileSnapshot {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether the profile id is listed in the settings' active profiles.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn activation(&self) -> Option<&ActivationSnapshot> {
        self.activation.as_ref()
    }

    pub fn plugin_repositories(&self) -> &[RepositorySnapshot] {
        &self.plugin_repositories
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn repositories(&self) -> &[RepositorySnapshot] {
        &self.repositories
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MirrorSnapshot {
    pub(crate) id: String,
    pub(crate) layout: Layout,
    pub(crate) mirror_of: Vec<String>,
    pub(crate) mirror_of_layouts: Vec<Layout>,
    pub(crate) name: Option<String>,
    pub(crate) url: Url,
}

impl MirrorSnapshot {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Ids of the repositories this mirror stands in for, in file order.
    pub fn mirror_of(&self) -> &[String] {
        &self.mirror_of
    }

    pub fn mirror_of_layouts(&self) -> &[Layout] {
        &self.mirror_of_layouts
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProxySnapshot {
    pub(crate) id: String,
    pub(crate) host: Option<String>,
    pub(crate) non_proxy_hosts: Vec<String>,
    #[serde(skip_serializing)]
    pub(crate) password: Option<String>,
    pub(crate) port: u16,
    pub(crate) protocol: String,
    pub(crate) username: Option<String>,
    pub(crate) active: bool,
}

impl ProxySnapshot {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn non_proxy_hosts(&self) -> &[String] {
        &self.non_proxy_hosts
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// The resolved settings.
///
/// # Examples
///
/// ```
/// use settings_supplier::{ProxyTranslator, RawSettings};
///
/// let raw = RawSettings {
///     offline: true,
///     local_repository: Some("/data/m2".to_string()),
///     ..Default::default()
/// };
/// let snapshot = ProxyTranslator::new("/home/dev/.m2/repository").translate(raw)?;
///
/// assert!(snapshot.offline());
/// assert_eq!(snapshot.local_repository().to_str(), Some("/data/m2"));
/// assert_eq!(snapshot.encoding(), "UTF-8");
/// # Ok::<(), settings_supplier::SettingsError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettingsSnapshot {
    pub(crate) offline: bool,
    pub(crate) local_repository: PathBuf,
    pub(crate) encoding: String,
    pub(crate) servers: Vec<ServerSnapshot>,
    pub(crate) profiles: Vec<ProfileSnapshot>,
    pub(crate) mirrors: Vec<MirrorSnapshot>,
    pub(crate) plugin_groups: Vec<String>,
    pub(crate) proxies: Vec<ProxySnapshot>,
}

impl SettingsSnapshot {
    pub fn offline(&self) -> bool {
        self.offline
    }

    pub fn local_repository(&self) -> &Path {
        &self.local_repository
    }

    /// Character encoding of the settings model, `UTF-8` unless declared.
    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    pub fn servers(&self) -> &[ServerSnapshot] {
        &self.servers
    }

    pub fn profiles(&self) -> &[ProfileSnapshot] {
        &self.profiles
    }

    pub fn mirrors(&self) -> &[MirrorSnapshot] {
        &self.mirrors
    }

    pub fn plugin_groups(&self) -> &[String] {
        &self.plugin_groups
    }

    pub fn proxies(&self) -> &[ProxySnapshot] {
        &self.proxies
    }

    pub fn server(&self, id: &str) -> Option<&ServerSnapshot> {
        self.servers.iter().find(|s| s.id == id)
    }

    pub fn profile(&self, id: &str) -> Option<&ProfileSnapshot> {
        self.profiles.iter().find(|p| p.id == id)
    }

    pub fn active_profiles(&self) -> impl Iterator<Item = &ProfileSnapshot> {
        self.profiles.iter().filter(|p| p.active)
    }

    pub fn mirror(&self, id: &str) -> Option<&MirrorSnapshot> {
        self.mirrors.iter().find(|m| m.id == id)
    }

    /// The first active proxy, which is the one a build uses.
    pub fn active_proxy(&self) -> Option<&ProxySnapshot> {
        self.proxies.iter().find(|p| p.active)
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
