//! Tests for the supplier facade.

use super::*;
use crate::builder::{SettingsBuildingError, SettingsBuildingRequest, SettingsBuildingResult};
use crate::raw::RawServer;
use crate::SettingsError;

/// Builder that must never be reached.
struct UnreachableBuilder;

impl SettingsBuilder for UnreachableBuilder {
    fn build(
        &self,
        _request: &SettingsBuildingRequest,
    ) -> Result<SettingsBuildingResult, SettingsBuildingError> {
        panic!("builder must not be called");
    }
}

#[test]
fn test_missing_user_home_fails_before_building() {
    let err = DefaultSettingsSupplier::new(
        &EnvironmentView::new(),
        &SystemProperties::new(),
        Arc::new(UnreachableBuilder),
    )
    .unwrap_err();

    assert!(matches!(err, SettingsError::HomeDirectoryUnavailable { .. }));
}

#[test]
fn test_static_supplier_from_raw() {
    let raw = RawSettings {
        offline: true,
        servers: vec![RawServer {
            id: "nexus".to_string(),
            username: Some("deploy".to_string()),
            ..Default::default()
        }],
        ..Default::default()
    };

    let supplier = StaticSettingsSupplier::from_raw(raw, "/data/m2").unwrap();
    let settings = supplier.get();

    assert!(settings.offline());
    assert_eq!(settings.local_repository(), Path::new("/data/m2"));
    assert_eq!(
        settings.server("nexus").and_then(|s| s.username()),
        Some("deploy")
    );
}

#[test]
fn test_static_supplier_returns_same_snapshot() {
    let supplier = StaticSettingsSupplier::from_raw(RawSettings::default(), "/data/m2").unwrap();

    let first = supplier.get();
    let second = supplier.get();

    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_supplier_usable_as_trait_object() {
    let supplier: Arc<dyn SettingsSupplier> = Arc::new(
        StaticSettingsSupplier::from_raw(RawSettings::default(), "/data/m2").unwrap(),
    );

    let handle = {
        let supplier = Arc::clone(&supplier);
        std::thread::spawn(move || supplier.get().encoding().to_string())
    };

    assert_eq!(handle.join().unwrap(), "UTF-8");
}
