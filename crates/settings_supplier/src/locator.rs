//! Settings file location.
//!
//! Produces validated paths to the user-level and global-level settings files.
//!
//! # Precedence
//!
//! User file:
//! 1. `USER_SETTINGS_FILE` environment variable
//! 2. `<home>/.m2/settings.xml`
//!
//! Global file:
//! 1. `GLOBAL_SETTINGS_FILE` environment variable (used verbatim)
//! 2. `<MAVEN_HOME>/conf/settings.xml`
//! 3. `<tool home>/conf/settings.xml`, where the tool home comes from a
//!    [`ToolHomeResolver`] (by default the SDKMAN `current` symlink)
//!
//! Whichever candidate wins must exist, be a regular file and be readable.

use crate::environment::{EnvironmentView, GLOBAL_SETTINGS_FILE, MAVEN_HOME, USER_SETTINGS_FILE};
use crate::{SettingsError, SettingsResult};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// File name of both settings files.
pub const SETTINGS_XML: &str = "settings.xml";

/// Returns `<home>/.m2`.
pub fn user_configuration_home(home: &Path) -> PathBuf {
    home.join(".m2")
}

/// Returns `<home>/.m2/settings.xml`.
pub fn default_user_settings_file(home: &Path) -> PathBuf {
    user_configuration_home(home).join(SETTINGS_XML)
}

/// Returns `<home>/.m2/repository`.
pub fn default_local_repository(home: &Path) -> PathBuf {
    user_configuration_home(home).join("repository")
}

/// Resolves the build tool installation directory when `MAVEN_HOME` is unset.
///
/// Kept behind a trait so the platform-specific lookup (a symbolic link
/// maintained by a version manager) can be replaced in tests.
pub trait ToolHomeResolver: Send + Sync {
    /// Returns the absolute tool installation directory.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::ConfigNotFound` if no installation can be found.
    fn resolve_tool_home(&self, user_home: &Path) -> SettingsResult<PathBuf>;
}

/// Locates the tool home through the SDKMAN `current` candidate link.
///
/// `<home>/.sdkman/candidates/maven/current` must be a symbolic link.
#[derive(Debug, Clone, Copy, Default)]
pub struct SdkmanToolHome;

impl SdkmanToolHome {
    pub fn candidate(user_home: &Path) -> PathBuf {
        user_home
            .join(".sdkman")
            .join("candidates")
            .join("maven")
            .join("current")
    }
}

impl ToolHomeResolver for SdkmanToolHome {
    fn resolve_tool_home(&self, user_home: &Path) -> SettingsResult<PathBuf> {
        let current = Self::candidate(user_home);
        let is_symlink = fs::symlink_metadata(&current)
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false);
        if !is_symlink {
            return Err(SettingsError::ConfigNotFound {
                path: current.display().to_string(),
                reason: "home is not a symlink to current".to_string(),
            });
        }

        absolute(&current)
    }
}

/// Locates and validates the two settings files.
#[derive(Clone)]
pub struct FileLocator {
    user_home: PathBuf,
    tool_home: Arc<dyn ToolHomeResolver>,
}

impl std::fmt::Debug for FileLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileLocator")
            .field("user_home", &self.user_home)
            .finish_non_exhaustive()
    }
}

impl FileLocator {
    /// Creates a locator anchored at `user_home`.
    pub fn new(user_home: impl Into<PathBuf>, tool_home: Arc<dyn ToolHomeResolver>) -> Self {
        Self {
            user_home: user_home.into(),
            tool_home,
        }
    }

    pub fn user_home(&self) -> &Path {
        &self.user_home
    }

    /// Resolves the user settings file to an absolute path.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::ConfigNotFound` unless the selected path is an
    /// existing, readable, regular file.
    pub fn resolve_user_settings_file(&self, env: &EnvironmentView) -> SettingsResult<PathBuf> {
        let candidate = match env.get(USER_SETTINGS_FILE) {
            Some(path) => {
                debug!("Using user settings override from {}", USER_SETTINGS_FILE);
                PathBuf::from(path)
            }
            None => default_user_settings_file(&self.user_home),
        };
        let path = absolute(&candidate)?;

        debug!("Resolved user settings file: {}", path.display());
        ensure_readable_file(&path, "User")?;
        Ok(path)
    }

    /// Resolves the global settings file.
    ///
    /// An explicit `GLOBAL_SETTINGS_FILE` is used as given. Otherwise the file
    /// is derived from `MAVEN_HOME`, or from the tool home resolver when
    /// `MAVEN_HOME` is unset.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::ConfigNotFound` if the tool home cannot be
    /// resolved or the final candidate is not an existing, readable, regular
    /// file.
    pub fn resolve_global_settings_file(&self, env: &EnvironmentView) -> SettingsResult<PathBuf> {
        let path = match env.get(GLOBAL_SETTINGS_FILE) {
            Some(path) => {
                debug!("Using global settings override from {}", GLOBAL_SETTINGS_FILE);
                PathBuf::from(path)
            }
            None => {
                let tool_home = match env.get(MAVEN_HOME) {
                    Some(home) => PathBuf::from(home),
                    None => {
                        warn!("No {} set, resolving from the tool version manager", MAVEN_HOME);
                        self.tool_home.resolve_tool_home(&self.user_home)?
                    }
                };
                tool_home.join("conf").join(SETTINGS_XML)
            }
        };

        debug!("Resolved global settings file: {}", path.display());
        ensure_readable_file(&path, "Global")?;
        Ok(path)
    }
}

/// Fails with `ConfigNotFound` unless `path` exists, is a regular file and can
/// be opened for reading.
pub fn ensure_readable_file(path: &Path, label: &str) -> SettingsResult<()> {
    let not_found = |reason: String| SettingsError::ConfigNotFound {
        path: path.display().to_string(),
        reason: format!("{} settings file {}", label, reason),
    };

    let metadata = fs::metadata(path).map_err(|e| not_found(format!("does not exist ({})", e)))?;
    if !metadata.is_file() {
        return Err(not_found("is not a regular file".to_string()));
    }
    File::open(path).map_err(|e| not_found(format!("is not readable ({})", e)))?;
    Ok(())
}

fn absolute(path: &Path) -> SettingsResult<PathBuf> {
    std::path::absolute(path).map_err(|e| SettingsError::ConfigNotFound {
        path: path.display().to_string(),
        reason: format!("cannot be made absolute: {}", e),
    })
}

#[cfg(test)]
#[path = "locator_tests.rs"]
mod tests;
