//! Environment and system-property views.
//!
//! Resolution never reads process-global state directly. Both the environment
//! variables and the system properties are captured once into owned, read-only
//! maps and threaded into the resolver, so tests can run in parallel with
//! hand-crafted values.

use crate::{SettingsError, SettingsResult};
use std::collections::BTreeMap;
use std::io::{self, Read};
use std::path::PathBuf;

/// Environment variable overriding the user settings file location.
pub const USER_SETTINGS_FILE: &str = "USER_SETTINGS_FILE";

/// Environment variable overriding the global settings file location.
pub const GLOBAL_SETTINGS_FILE: &str = "GLOBAL_SETTINGS_FILE";

/// Environment variable naming the build tool installation directory.
pub const MAVEN_HOME: &str = "MAVEN_HOME";

/// System property holding the user's home directory.
pub const USER_HOME_PROPERTY: &str = "user.home";

/// System property holding the working directory.
pub const USER_DIR_PROPERTY: &str = "user.dir";

/// System property holding the operating system name.
pub const OS_NAME_PROPERTY: &str = "os.name";

/// System property holding the CPU architecture.
pub const OS_ARCH_PROPERTY: &str = "os.arch";

/// Read-only snapshot of environment variables.
///
/// # Examples
///
/// ```
/// use settings_supplier::{EnvironmentView, USER_SETTINGS_FILE};
///
/// let env = EnvironmentView::new().with_var(USER_SETTINGS_FILE, "/tmp/settings.xml");
/// assert_eq!(env.get(USER_SETTINGS_FILE), Some("/tmp/settings.xml"));
/// assert_eq!(env.get("MAVEN_HOME"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentView {
    vars: BTreeMap<String, String>,
}

impl EnvironmentView {
    /// Creates an empty view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures the current process environment.
    ///
    /// Variables whose name or value is not valid Unicode are skipped.
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
        }
    }

    /// Loads variables from properties-formatted text.
    ///
    /// Follows the Java properties format: lines starting with `#` or `!` are
    /// comments, the key ends at the first unescaped `=`, `:` or whitespace,
    /// a trailing backslash continues the line, and backslash escapes
    /// (`\=`, `\:`, `\ `, `\t`, `\n`, `\uXXXX`, ...) are decoded. Leading
    /// whitespace of a value is dropped, trailing whitespace is kept.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the reader fails or the text is
    /// not valid UTF-8, and `InvalidData` for a malformed `\uXXXX` escape.
    pub fn from_properties_reader(reader: impl Read) -> io::Result<Self> {
        Ok(Self {
            vars: parse_properties(reader)?,
        })
    }

    /// Returns a copy of this view with `key` set to `value`.
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Returns a copy of this view with every pair from `vars` set.
    pub fn with_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.vars
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Looks up a variable.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Returns `true` if the variable is present.
    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// Returns an owned copy of all variables.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.vars.clone()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for EnvironmentView
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new().with_vars(iter)
    }
}

/// String-keyed system properties handed to the settings builder.
///
/// Also the source of the user home directory, which anchors every default
/// path (`<home>/.m2/settings.xml`, `<home>/.m2/repository`, the tool version
/// manager fallback).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemProperties {
    properties: BTreeMap<String, String>,
}

impl SystemProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures the properties the resolver and builder rely on from the
    /// running process: `user.home`, `user.dir`, `os.name` and `os.arch`.
    pub fn from_process() -> Self {
        let mut properties = BTreeMap::new();
        if let Some(home) = dirs::home_dir() {
            properties.insert(
                USER_HOME_PROPERTY.to_string(),
                home.to_string_lossy().into_owned(),
            );
        }
        if let Ok(dir) = std::env::current_dir() {
            properties.insert(
                USER_DIR_PROPERTY.to_string(),
                dir.to_string_lossy().into_owned(),
            );
        }
        properties.insert(
            OS_NAME_PROPERTY.to_string(),
            std::env::consts::OS.to_string(),
        );
        properties.insert(
            OS_ARCH_PROPERTY.to_string(),
            std::env::consts::ARCH.to_string(),
        );
        Self { properties }
    }

    /// Loads properties from properties-formatted text.
    ///
    /// See [`EnvironmentView::from_properties_reader`] for the accepted format.
    pub fn from_properties_reader(reader: impl Read) -> io::Result<Self> {
        Ok(Self {
            properties: parse_properties(reader)?,
        })
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Shorthand for setting `user.home`.
    pub fn with_user_home(self, home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        self.with_property(USER_HOME_PROPERTY, home.to_string_lossy().into_owned())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Returns the user home directory.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::HomeDirectoryUnavailable` if `user.home` is
    /// missing or blank.
    pub fn user_home(&self) -> SettingsResult<PathBuf> {
        match self.get(USER_HOME_PROPERTY) {
            Some(home) if !home.trim().is_empty() => Ok(PathBuf::from(home)),
            _ => Err(SettingsError::HomeDirectoryUnavailable {
                reason: format!("system property '{}' is not set", USER_HOME_PROPERTY),
            }),
        }
    }

    /// Returns an owned copy of all properties.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.properties.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for SystemProperties
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            properties: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

const PROPERTY_WHITESPACE: [char; 3] = [' ', '\t', '\x0c'];

/// Parses properties text: `#`/`!` comment lines, `=`, `:` or whitespace
/// separators, backslash line continuations, and backslash escapes
/// including `\uXXXX`.
fn parse_properties(mut reader: impl Read) -> io::Result<BTreeMap<String, String>> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;

    let mut entries = BTreeMap::new();
    for line in logical_lines(&text) {
        let (key, value) = split_entry(&line);
        entries.insert(unescape(key)?, unescape(value)?);
    }
    Ok(entries)
}

/// Joins continued lines and drops blank and comment lines.
fn logical_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current: Option<String> = None;

    for natural in text.lines() {
        let natural = natural.trim_start_matches(PROPERTY_WHITESPACE);
        if current.is_none()
            && (natural.is_empty() || natural.starts_with('#') || natural.starts_with('!'))
        {
            continue;
        }

        // An odd number of trailing backslashes continues the line.
        let trailing = natural.len() - natural.trim_end_matches('\\').len();
        let continues = trailing % 2 == 1;
        let body = if continues {
            &natural[..natural.len() - 1]
        } else {
            natural
        };

        let line = current.get_or_insert_with(String::new);
        line.push_str(body);
        if !continues {
            if let Some(line) = current.take() {
                lines.push(line);
            }
        }
    }

    if let Some(line) = current {
        lines.push(line);
    }
    lines
}

/// Splits a logical line at the first unescaped `=`, `:` or whitespace.
fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = None;
    for (idx, c) in line.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '=' || c == ':' || PROPERTY_WHITESPACE.contains(&c) {
            key_end = Some(idx);
            break;
        }
    }
    let Some(key_end) = key_end else {
        return (line, "");
    };

    let rest = line[key_end..].trim_start_matches(PROPERTY_WHITESPACE);
    let rest = match rest.strip_prefix(['=', ':']) {
        Some(value) => value.trim_start_matches(PROPERTY_WHITESPACE),
        None => rest,
    };
    (&line[..key_end], rest)
}

fn unescape(raw: &str) -> io::Result<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let decoded = Some(&hex)
                    .filter(|h| h.len() == 4 && h.chars().all(|c| c.is_ascii_hexdigit()))
                    .and_then(|h| u32::from_str_radix(h, 16).ok())
                    .and_then(char::from_u32)
                    .ok_or_else(|| {
                        io::Error::new(
                            io::ErrorKind::InvalidData,
                            format!("malformed \\uxxxx escape: \\u{}", hex),
                        )
                    })?;
                out.push(decoded);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "environment_tests.rs"]
mod tests;
