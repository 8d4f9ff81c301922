//! Raw document to snapshot translation.
//!
//! Converts a [`RawSettings`] document into an immutable [`SettingsSnapshot`].
//! The translation is pure: no I/O, no activation evaluation. String-typed
//! enums are normalized with the rules below and every blank optional value
//! becomes `None`.
//!
//! | Raw value           | Rule                                                        |
//! |---------------------|-------------------------------------------------------------|
//! | layout              | uppercased; unknown or absent is `Default`                  |
//! | checksum policy     | uppercased; absent is `Warn`                                |
//! | update policy       | contains `INTERVAL:` forces `Interval`; absent is `Daily`   |
//! | interval minutes    | second `:`-separated token, only for `Interval`, else 0     |
//! | mirror `mirrorOf`   | split on `,`                                                |
//! | proxy non-proxy     | split on `\|`                                               |
//! | repository/mirror URL | parsed eagerly, failure is fatal                          |

use crate::raw::{
    ConfigNode, RawActivation, RawMirror, RawProfile, RawProxy, RawRepository,
    RawRepositoryPolicy, RawServer, RawSettings,
};
use crate::snapshot::{
    ActivationOsSnapshot, ActivationSnapshot, ChecksumPolicy, Layout, MirrorSnapshot,
    ProfileSnapshot, ProxySnapshot, RepositoryPolicySnapshot, RepositorySnapshot, ServerSnapshot,
    SettingsSnapshot, UpdatePolicy,
};
use crate::{SettingsError, SettingsResult};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, warn};
use url::Url;

/// Encoding reported when the document does not declare one.
pub const DEFAULT_ENCODING: &str = "UTF-8";

/// Default proxy port.
pub const DEFAULT_PROXY_PORT: u16 = 8080;

/// Default proxy protocol.
pub const DEFAULT_PROXY_PROTOCOL: &str = "http";

const INTERVAL_PREFIX: &str = "INTERVAL:";

/// Translates raw settings documents into snapshots.
#[derive(Debug, Clone)]
pub struct ProxyTranslator {
    default_local_repository: PathBuf,
}

impl ProxyTranslator {
    /// Creates a translator substituting `default_local_repository` for a
    /// blank local repository.
    pub fn new(default_local_repository: impl Into<PathBuf>) -> Self {
        Self {
            default_local_repository: default_local_repository.into(),
        }
    }

    /// Translates `raw` into an immutable snapshot.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::InvalidUrl` if a repository or mirror URL is
    /// missing or cannot be parsed, and `SettingsError::BuildFailure` if a
    /// server configuration block cannot be serialized.
    pub fn translate(&self, raw: RawSettings) -> SettingsResult<SettingsSnapshot> {
        let local_repository = match non_blank(raw.local_repository) {
            Some(path) => PathBuf::from(path),
            None => self.default_local_repository.clone(),
        };
        let encoding =
            non_blank(raw.model_encoding).unwrap_or_else(|| DEFAULT_ENCODING.to_string());

        let active_ids: HashSet<&str> = raw.active_profiles.iter().map(String::as_str).collect();

        let servers = raw
            .servers
            .into_iter()
            .map(translate_server)
            .collect::<SettingsResult<Vec<_>>>()?;
        let profiles = raw
            .profiles
            .into_iter()
            .map(|p| {
                let active = active_ids.contains(p.id.as_str());
                translate_profile(p, active)
            })
            .collect::<SettingsResult<Vec<_>>>()?;
        let mirrors = raw
            .mirrors
            .into_iter()
            .map(translate_mirror)
            .collect::<SettingsResult<Vec<_>>>()?;
        let proxies: Vec<ProxySnapshot> = raw.proxies.into_iter().map(translate_proxy).collect();

        debug!(
            "Translated settings: {} servers, {} profiles, {} mirrors, {} proxies",
            servers.len(),
            profiles.len(),
            mirrors.len(),
            proxies.len()
        );

        Ok(SettingsSnapshot {
            offline: raw.offline,
            local_repository,
            encoding,
            servers,
            profiles,
            mirrors,
            plugin_groups: raw.plugin_groups,
            proxies,
        })
    }
}

/// Parses a layout name; anything other than `legacy` is the default layout.
pub fn parse_layout(raw: Option<&str>) -> Layout {
    match raw.map(|s| s.trim().to_uppercase()).as_deref() {
        Some("LEGACY") => Layout::Legacy,
        _ => Layout::Default,
    }
}

/// Parses a checksum policy, `Warn` when absent.
pub fn parse_checksum_policy(raw: Option<&str>) -> ChecksumPolicy {
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return ChecksumPolicy::Warn;
    };
    match raw.trim().to_uppercase().as_str() {
        "WARN" => ChecksumPolicy::Warn,
        "FAIL" => ChecksumPolicy::Fail,
        "IGNORE" => ChecksumPolicy::Ignore,
        _ => {
            warn!("Unknown checksum policy '{}', using warn", raw);
            ChecksumPolicy::Warn
        }
    }
}

/// Parses an update policy and its interval in minutes.
///
/// # Examples
///
/// ```
/// use settings_supplier::{parse_update_policy, UpdatePolicy};
///
/// assert_eq!(parse_update_policy(Some("interval:45")), (UpdatePolicy::Interval, 45));
/// assert_eq!(parse_update_policy(Some("daily")), (UpdatePolicy::Daily, 0));
/// assert_eq!(parse_update_policy(None), (UpdatePolicy::Daily, 0));
/// ```
pub fn parse_update_policy(raw: Option<&str>) -> (UpdatePolicy, u32) {
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return (UpdatePolicy::Daily, 0);
    };

    let upper = raw.trim().to_uppercase();
    let policy = if upper.contains(INTERVAL_PREFIX) {
        UpdatePolicy::Interval
    } else {
        match upper.as_str() {
            "NEVER" => UpdatePolicy::Never,
            "DAILY" => UpdatePolicy::Daily,
            "ALWAYS" => UpdatePolicy::Always,
            "INTERVAL" => UpdatePolicy::Interval,
            _ => {
                warn!("Unknown update policy '{}', using daily", raw);
                UpdatePolicy::Daily
            }
        }
    };

    let interval: u32 = match (policy, raw.split(':').nth(1)) {
        (UpdatePolicy::Interval, Some(minutes)) => minutes.trim().parse().unwrap_or_else(|_| {
            warn!("Invalid update interval in '{}', using 0", raw);
            0
        }),
        _ => 0,
    };

    (policy, interval)
}

/// Splits a comma-separated `mirrorOf` value.
pub fn split_mirror_of(raw: Option<&str>) -> Vec<String> {
    split_segments(raw.unwrap_or_default(), ',')
}

/// Splits a pipe-separated non-proxy host list.
pub fn split_non_proxy_hosts(raw: Option<&str>) -> Vec<String> {
    split_segments(raw.unwrap_or_default(), '|')
}

/// Serializes a configuration tree back to markup.
///
/// # Errors
///
/// Returns `SettingsError::BuildFailure` if the writer fails.
pub fn serialize_configuration(node: &ConfigNode) -> SettingsResult<String> {
    let mut writer = Writer::new(Vec::new());
    write_node(&mut writer, node)?;
    String::from_utf8(writer.into_inner()).map_err(xml_error)
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &ConfigNode) -> SettingsResult<()> {
    let mut start = BytesStart::new(node.name.as_str());
    for (key, value) in &node.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    let value = node.value.as_deref().filter(|v| !v.is_empty());
    if value.is_none() && node.children.is_empty() {
        return writer.write_event(Event::Empty(start)).map_err(xml_error);
    }

    writer.write_event(Event::Start(start)).map_err(xml_error)?;
    if let Some(value) = value {
        writer
            .write_event(Event::Text(BytesText::new(value)))
            .map_err(xml_error)?;
    }
    for child in &node.children {
        write_node(writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(node.name.as_str())))
        .map_err(xml_error)
}

fn xml_error(error: impl std::fmt::Display) -> SettingsError {
    SettingsError::BuildFailure {
        reason: format!("failed to serialize server configuration: {}", error),
    }
}

fn translate_server(raw: RawServer) -> SettingsResult<ServerSnapshot> {
    let configuration = raw
        .configuration
        .as_ref()
        .map(serialize_configuration)
        .transpose()?;

    Ok(ServerSnapshot {
        id: raw.id,
        username: non_blank(raw.username),
        password: non_blank(raw.password),
        passphrase: non_blank(raw.passphrase),
        private_key: non_blank(raw.private_key).map(PathBuf::from),
        file_permissions: non_blank(raw.file_permissions),
        directory_permissions: non_blank(raw.directory_permissions),
        configuration,
    })
}

fn translate_profile(raw: RawProfile, active: bool) -> SettingsResult<ProfileSnapshot> {
    let repositories = raw
        .repositories
        .into_iter()
        .map(translate_repository)
        .collect::<SettingsResult<Vec<_>>>()?;
    let plugin_repositories = raw
        .plugin_repositories
        .into_iter()
        .map(translate_repository)
        .collect::<SettingsResult<Vec<_>>>()?;

    Ok(ProfileSnapshot {
        id: raw.id,
        active,
        activation: raw.activation.map(translate_activation),
        plugin_repositories,
        properties: raw.properties,
        repositories,
    })
}

fn translate_activation(raw: RawActivation) -> ActivationSnapshot {
    let (file_exists, file_missing) = raw
        .file
        .map(|f| (non_blank(f.exists), non_blank(f.missing)))
        .unwrap_or_default();
    let (property_name, property_value) = raw
        .property
        .map(|p| (non_blank(p.name), non_blank(p.value)))
        .unwrap_or_default();

    ActivationSnapshot {
        active_by_default: raw.active_by_default,
        file_exists,
        file_missing,
        os: raw.os.map(|os| ActivationOsSnapshot {
            family: non_blank(os.family),
            name: non_blank(os.name),
            arch: non_blank(os.arch),
            version: non_blank(os.version),
        }),
        jdk: non_blank(raw.jdk),
        property_name,
        property_value,
    }
}

fn translate_repository(raw: RawRepository) -> SettingsResult<RepositorySnapshot> {
    let url = parse_url(raw.url.as_deref(), || format!("repository '{}'", raw.id))?;

    Ok(RepositorySnapshot {
        layout: parse_layout(raw.layout.as_deref()),
        name: non_blank(raw.name),
        url,
        releases: translate_policy(raw.releases.as_ref()),
        snapshots: translate_policy(raw.snapshots.as_ref()),
        id: raw.id,
    })
}

fn translate_policy(raw: Option<&RawRepositoryPolicy>) -> RepositoryPolicySnapshot {
    let Some(raw) = raw else {
        return RepositoryPolicySnapshot::default();
    };
    let (update_policy, interval_minutes) = parse_update_policy(raw.update_policy.as_deref());

    RepositoryPolicySnapshot {
        enabled: raw.enabled.unwrap_or(true),
        checksum_policy: parse_checksum_policy(raw.checksum_policy.as_deref()),
        update_policy,
        interval_minutes,
    }
}

fn translate_mirror(raw: RawMirror) -> SettingsResult<MirrorSnapshot> {
    let url = parse_url(raw.url.as_deref(), || format!("mirror '{}'", raw.id))?;
    let layout = parse_layout(raw.layout.as_deref());

    Ok(MirrorSnapshot {
        layout,
        mirror_of: split_mirror_of(raw.mirror_of.as_deref()),
        // Applicable layouts are the mirror's own layout only.
        mirror_of_layouts: vec![layout],
        name: non_blank(raw.name),
        url,
        id: raw.id,
    })
}

fn translate_proxy(raw: RawProxy) -> ProxySnapshot {
    ProxySnapshot {
        non_proxy_hosts: split_non_proxy_hosts(raw.non_proxy_hosts.as_deref()),
        host: non_blank(raw.host),
        password: non_blank(raw.password),
        port: raw.port.unwrap_or(DEFAULT_PROXY_PORT),
        protocol: non_blank(raw.protocol).unwrap_or_else(|| DEFAULT_PROXY_PROTOCOL.to_string()),
        username: non_blank(raw.username),
        active: raw.active.unwrap_or(true),
        id: raw.id,
    }
}

fn parse_url(raw: Option<&str>, field: impl FnOnce() -> String) -> SettingsResult<Url> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Err(SettingsError::InvalidUrl {
            field: field(),
            url: String::new(),
            reason: "url is missing".to_string(),
        });
    };

    Url::parse(raw).map_err(|e| SettingsError::InvalidUrl {
        field: field(),
        url: raw.to_string(),
        reason: e.to_string(),
    })
}

fn split_segments(raw: &str, separator: char) -> Vec<String> {
    let mut segments: Vec<String> = raw.split(separator).map(str::to_string).collect();
    // Interior empty segments are kept, trailing ones are not.
    while segments.last().is_some_and(|s| s.is_empty()) {
        segments.pop();
    }
    segments
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
#[path = "translator_tests.rs"]
mod tests;
