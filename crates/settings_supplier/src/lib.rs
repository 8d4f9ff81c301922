//! Build tool settings resolution.
//!
//! Locates the user and global settings files, has an injected
//! [`SettingsBuilder`] merge them into one raw document, and translates that
//! document into an immutable [`SettingsSnapshot`] shared through a
//! [`SettingsSupplier`].
//!
//! ```text
//! EnvironmentView -> FileLocator -> SettingsBuildingCoordinator
//!     -> SettingsDecrypter -> ProxyTranslator -> SettingsSnapshot
//! ```
//!
//! Parsing the settings markup, evaluating profile activation, and
//! interpolating properties are left to the builder and to consumers.

pub mod builder;
pub mod decrypt;
pub mod environment;
pub mod errors;
pub mod locator;
pub mod raw;
pub mod snapshot;
pub mod supplier;
pub mod translator;


pub use builder::{
    ProblemSeverity, SettingsBuilder, SettingsBuildingCoordinator, SettingsBuildingError,
    SettingsBuildingRequest, SettingsBuildingResult, SettingsProblem,
};
pub use decrypt::{
    is_encrypted, DecryptionError, PassthroughDecryptor, SecretDecryptor, SettingsDecrypter,
};
pub use environment::{
    EnvironmentView, SystemProperties, GLOBAL_SETTINGS_FILE, MAVEN_HOME, OS_ARCH_PROPERTY,
    OS_NAME_PROPERTY, USER_DIR_PROPERTY, USER_HOME_PROPERTY, USER_SETTINGS_FILE,
};
pub use errors::{SettingsError, SettingsResult};
pub use locator::{
    default_local_repository, default_user_settings_file, ensure_readable_file,
    user_configuration_home, FileLocator, SdkmanToolHome, ToolHomeResolver, SETTINGS_XML,
};
pub use raw::{
    ConfigNode, RawActivation, RawActivationFile, RawActivationOs, RawActivationProperty,
    RawMirror, RawProfile, RawProxy, RawRepository, RawRepositoryPolicy, RawServer, RawSettings,
};
pub use snapshot::{
    ActivationOsSnapshot, ActivationSnapshot, ChecksumPolicy, Layout, MirrorSnapshot,
    ProfileSnapshot, ProxySnapshot, RepositoryPolicySnapshot, RepositorySnapshot, ServerSnapshot,
    SettingsSnapshot, UpdatePolicy,
};
pub use supplier::{DefaultSettingsSupplier, SettingsSupplier, StaticSettingsSupplier};
pub use translator::{
    parse_checksum_policy, parse_layout, parse_update_policy, serialize_configuration,
    split_mirror_of, split_non_proxy_hosts, ProxyTranslator, DEFAULT_ENCODING,
    DEFAULT_PROXY_PORT, DEFAULT_PROXY_PROTOCOL,
};
