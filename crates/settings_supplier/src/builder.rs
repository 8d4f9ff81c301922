//! Settings document building.
//!
//! The actual parsing of settings files is delegated to a [`SettingsBuilder`]
//! collaborator. The [`SettingsBuildingCoordinator`] drives it with the located
//! files, logs the problems it reports, and normalizes the local repository
//! path of the result.

use crate::environment::SystemProperties;
use crate::raw::RawSettings;
use crate::{SettingsError, SettingsResult};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Error raised by a [`SettingsBuilder`] when the document cannot be built.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct SettingsBuildingError {
    pub message: String,
    pub problems: Vec<SettingsProblem>,
}

impl SettingsBuildingError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            problems: Vec::new(),
        }
    }

    pub fn with_problems(mut self, problems: Vec<SettingsProblem>) -> Self {
        self.problems = problems;
        self
    }
}

impl From<SettingsBuildingError> for SettingsError {
    fn from(error: SettingsBuildingError) -> Self {
        let reason = if error.problems.is_empty() {
            error.message
        } else {
            let details: Vec<String> = error.problems.iter().map(ToString::to_string).collect();
            format!("{} ({})", error.message, details.join("; "))
        };
        SettingsError::BuildFailure { reason }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProblemSeverity {
    Fatal,
    Error,
    Warning,
}

/// A problem reported while building the settings document.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsProblem {
    pub severity: ProblemSeverity,
    pub message: String,
    /// Usually the path of the file the problem was found in.
    pub source: Option<String>,
    pub line: Option<u32>,
    pub column: Option<u32>,
}

impl SettingsProblem {
    pub fn new(severity: ProblemSeverity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            source: None,
            line: None,
            column: None,
        }
    }

    pub fn at(mut self, source: impl Into<String>, line: u32, column: u32) -> Self {
        self.source = Some(source.into());
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    /// Renders `source, line N, column M`, leaving out the missing parts.
    pub fn location(&self) -> String {
        let mut parts = Vec::new();
        if let Some(source) = &self.source {
            parts.push(source.clone());
        }
        if let Some(line) = self.line {
            parts.push(format!("line {}", line));
        }
        if let Some(column) = self.column {
            parts.push(format!("column {}", column));
        }
        parts.join(", ")
    }
}

impl fmt::Display for SettingsProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {} @ {}", self.severity, self.message, self.location())
    }
}

/// Input to a [`SettingsBuilder`].
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsBuildingRequest {
    pub global_settings_file: PathBuf,
    pub user_settings_file: PathBuf,
    pub system_properties: BTreeMap<String, String>,
    pub user_properties: BTreeMap<String, String>,
}

/// Output of a [`SettingsBuilder`].
///
/// `effective_settings` is `None` when the builder produced no usable
/// document, which the coordinator treats as a build failure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsBuildingResult {
    pub effective_settings: Option<RawSettings>,
    pub problems: Vec<SettingsProblem>,
}

impl SettingsBuildingResult {
    pub fn new(effective_settings: RawSettings) -> Self {
        Self {
            effective_settings: Some(effective_settings),
            problems: Vec::new(),
        }
    }

    pub fn with_problem(mut self, problem: SettingsProblem) -> Self {
        self.problems.push(problem);
        self
    }
}

/// Parses, merges and interpolates the global and user settings files.
///
/// Implementations must be thread-safe (`Send + Sync`).
pub trait SettingsBuilder: Send + Sync {
    /// Builds the effective settings document for `request`.
    ///
    /// # Errors
    ///
    /// Returns `SettingsBuildingError` if the files cannot be read or parsed.
    /// Recoverable issues are reported as problems on the result instead.
    fn build(
        &self,
        request: &SettingsBuildingRequest,
    ) -> Result<SettingsBuildingResult, SettingsBuildingError>;
}

/// Drives a [`SettingsBuilder`] and normalizes its result.
#[derive(Clone)]
pub struct SettingsBuildingCoordinator {
    builder: Arc<dyn SettingsBuilder>,
    default_local_repository: PathBuf,
}

impl fmt::Debug for SettingsBuildingCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsBuildingCoordinator")
            .field("default_local_repository", &self.default_local_repository)
            .finish_non_exhaustive()
    }
}

impl SettingsBuildingCoordinator {
    /// Creates a coordinator that substitutes `default_local_repository` when
    /// the built document leaves the local repository blank.
    pub fn new(builder: Arc<dyn SettingsBuilder>, default_local_repository: PathBuf) -> Self {
        Self {
            builder,
            default_local_repository,
        }
    }

    pub fn default_local_repository(&self) -> &Path {
        &self.default_local_repository
    }

    /// Builds the raw settings document from the two located files.
    ///
    /// No user properties are passed to the builder; overrides only arrive
    /// through the environment-driven file selection.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::BuildFailure` if the builder fails, returns no
    /// document, or the local repository directory cannot be created.
    pub fn build(
        &self,
        user_file: &Path,
        global_file: &Path,
        system_properties: &SystemProperties,
    ) -> SettingsResult<RawSettings> {
        let request = SettingsBuildingRequest {
            global_settings_file: global_file.to_path_buf(),
            user_settings_file: user_file.to_path_buf(),
            system_properties: system_properties.to_map(),
            user_properties: BTreeMap::new(),
        };
        debug!(
            "Building settings from global={} user={}",
            request.global_settings_file.display(),
            request.user_settings_file.display()
        );

        let result = self.builder.build(&request).map_err(|e| {
            warn!("Settings builder failed: {}", e);
            SettingsError::from(e)
        })?;

        self.effective_settings(result)
    }

    /// Logs the problems of `result` and returns its normalized document.
    ///
    /// Problems never change the returned document.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::BuildFailure` if the result carries no document,
    /// the default local repository is not valid UTF-8, or the local
    /// repository directory cannot be created.
    pub fn effective_settings(&self, result: SettingsBuildingResult) -> SettingsResult<RawSettings> {
        for problem in &result.problems {
            warn!("Problem: {} @ {}", problem.message, problem.location());
        }

        let mut settings = result
            .effective_settings
            .ok_or_else(|| SettingsError::BuildFailure {
                reason: "settings builder returned no effective settings".to_string(),
            })?;

        if settings.has_blank_local_repository() {
            let default_local = absolute_local_repository(&self.default_local_repository)?;
            debug!(
                "No local repository configured, using {}",
                default_local.display()
            );
            let default_local = default_local.into_os_string().into_string().map_err(|path| {
                SettingsError::BuildFailure {
                    reason: format!(
                        "default local repository {} is not valid UTF-8",
                        Path::new(&path).display()
                    ),
                }
            })?;
            settings.local_repository = Some(default_local);
        }

        if let Some(local) = settings.local_repository.as_deref() {
            ensure_directory(Path::new(local))?;
        }
        Ok(settings)
    }
}

/// Returns `path` made absolute against the working directory.
pub(crate) fn absolute_local_repository(path: &Path) -> SettingsResult<PathBuf> {
    std::path::absolute(path).map_err(|e| SettingsError::BuildFailure {
        reason: format!(
            "failed to make local repository {} absolute: {}",
            path.display(),
            e
        ),
    })
}

/// Creates `path` and its missing parents unless it already exists.
fn ensure_directory(path: &Path) -> SettingsResult<()> {
    if path.exists() {
        return Ok(());
    }

    fs::create_dir_all(path).map_err(|e| SettingsError::BuildFailure {
        reason: format!(
            "failed to create local repository {}: {}",
            path.display(),
            e
        ),
    })?;
    info!("Created local repository {}", path.display());
    Ok(())
}

#[cfg(test)]
#[path = "builder_tests.rs"]
mod tests;
