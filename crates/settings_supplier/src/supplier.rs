//! Settings supplier facade.
//!
//! The [`DefaultSettingsSupplier`] runs the whole resolution pipeline exactly
//! once, at construction, and caches the resulting snapshot:
//!
//! 1. Locate the user and global settings files
//! 2. Build the effective raw document through the injected builder
//! 3. Decrypt encrypted credentials
//! 4. Translate the document into an immutable [`SettingsSnapshot`]
//!
//! There is no retry and no lazy re-resolution. Every call to
//! [`SettingsSupplier::get`] returns the same shared snapshot.

use crate::builder::{absolute_local_repository, SettingsBuilder, SettingsBuildingCoordinator};
use crate::decrypt::{PassthroughDecryptor, SecretDecryptor, SettingsDecrypter};
use crate::environment::{EnvironmentView, SystemProperties};
use crate::locator::{default_local_repository, FileLocator, SdkmanToolHome, ToolHomeResolver};
use crate::raw::RawSettings;
use crate::snapshot::SettingsSnapshot;
use crate::translator::ProxyTranslator;
use crate::SettingsResult;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Source of the resolved settings snapshot.
///
/// Implementations must be thread-safe (`Send + Sync`). The returned snapshot
/// is immutable and may be shared freely between threads.
pub trait SettingsSupplier: Send + Sync {
    /// Returns the cached settings snapshot.
    fn get(&self) -> Arc<SettingsSnapshot>;
}

/// Supplier resolving settings from the environment and the filesystem.
///
/// # Examples
///
/// ```no_run
/// use settings_supplier::{
///     DefaultSettingsSupplier, EnvironmentView, SettingsBuilder, SettingsSupplier,
///     SystemProperties,
/// };
/// use std::sync::Arc;
///
/// # fn example(builder: Arc<dyn SettingsBuilder>) -> settings_supplier::SettingsResult<()> {
/// let supplier = DefaultSettingsSupplier::new(
///     &EnvironmentView::from_process(),
///     &SystemProperties::from_process(),
///     builder,
/// )?;
///
/// let settings = supplier.get();
/// println!("Local repository: {}", settings.local_repository().display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct DefaultSettingsSupplier {
    user_settings_file: PathBuf,
    global_settings_file: PathBuf,
    snapshot: Arc<SettingsSnapshot>,
}

impl DefaultSettingsSupplier {
    /// Resolves settings using the version-manager tool home lookup and no
    /// credential decryption.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::HomeDirectoryUnavailable` without a `user.home`
    /// property, `SettingsError::ConfigNotFound` if either settings file
    /// cannot be located, and a build-failure class error if building,
    /// decryption or translation fails.
    pub fn new(
        env: &EnvironmentView,
        system_properties: &SystemProperties,
        builder: Arc<dyn SettingsBuilder>,
    ) -> SettingsResult<Self> {
        Self::with_collaborators(
            env,
            system_properties,
            builder,
            Arc::new(SdkmanToolHome),
            Arc::new(PassthroughDecryptor),
        )
    }

    /// Resolves settings with every collaborator injected.
    ///
    /// # Errors
    ///
    /// See [`DefaultSettingsSupplier::new`].
    #[instrument(skip_all)]
    pub fn with_collaborators(
        env: &EnvironmentView,
        system_properties: &SystemProperties,
        builder: Arc<dyn SettingsBuilder>,
        tool_home: Arc<dyn ToolHomeResolver>,
        decryptor: Arc<dyn SecretDecryptor>,
    ) -> SettingsResult<Self> {
        info!("Starting settings resolution");

        let user_home = system_properties.user_home()?;
        let default_local = absolute_local_repository(&default_local_repository(&user_home))?;

        // Step 1: Locate files
        let locator = FileLocator::new(&user_home, tool_home);
        let user_settings_file = locator.resolve_user_settings_file(env).map_err(|e| {
            warn!("Failed to locate user settings: {}", e);
            e
        })?;
        let global_settings_file = locator.resolve_global_settings_file(env).map_err(|e| {
            warn!("Failed to locate global settings: {}", e);
            e
        })?;
        info!(
            "Located settings files: user={} global={}",
            user_settings_file.display(),
            global_settings_file.display()
        );

        // Step 2: Build the raw document
        let coordinator = SettingsBuildingCoordinator::new(builder, default_local.clone());
        let raw = coordinator.build(&user_settings_file, &global_settings_file, system_properties)?;

        // Step 3: Decrypt credentials
        let raw = SettingsDecrypter::new(decryptor.as_ref()).decrypt(raw)?;

        // Step 4: Translate
        let snapshot = ProxyTranslator::new(default_local).translate(raw)?;
        debug!(
            "Translated {} servers, {} profiles, {} mirrors, {} proxies",
            snapshot.servers().len(),
            snapshot.profiles().len(),
            snapshot.mirrors().len(),
            snapshot.proxies().len()
        );

        info!(
            "Settings resolved, local repository: {}",
            snapshot.local_repository().display()
        );
        Ok(Self {
            user_settings_file,
            global_settings_file,
            snapshot: Arc::new(snapshot),
        })
    }

    /// The user settings file resolved at construction.
    pub fn user_settings_file(&self) -> &Path {
        &self.user_settings_file
    }

    /// The global settings file resolved at construction.
    pub fn global_settings_file(&self) -> &Path {
        &self.global_settings_file
    }
}

impl SettingsSupplier for DefaultSettingsSupplier {
    fn get(&self) -> Arc<SettingsSnapshot> {
        Arc::clone(&self.snapshot)
    }
}

/// Supplier returning a snapshot provided up front.
///
/// Useful where settings are produced elsewhere, or in tests of code that
/// consumes a [`SettingsSupplier`].
#[derive(Debug, Clone)]
pub struct StaticSettingsSupplier {
    snapshot: Arc<SettingsSnapshot>,
}

impl StaticSettingsSupplier {
    pub fn new(snapshot: SettingsSnapshot) -> Self {
        Self {
            snapshot: Arc::new(snapshot),
        }
    }

    /// Translates `raw` directly, bypassing file location and building.
    ///
    /// # Errors
    ///
    /// Returns the translation error if `raw` cannot be translated.
    pub fn from_raw(
        raw: RawSettings,
        default_local_repository: impl Into<PathBuf>,
    ) -> SettingsResult<Self> {
        let snapshot = ProxyTranslator::new(default_local_repository).translate(raw)?;
        Ok(Self::new(snapshot))
    }
}

impl SettingsSupplier for StaticSettingsSupplier {
    fn get(&self) -> Arc<SettingsSnapshot> {
        Arc::clone(&self.snapshot)
    }
}

#[cfg(test)]
#[path = "supplier_tests.rs"]
mod tests;
