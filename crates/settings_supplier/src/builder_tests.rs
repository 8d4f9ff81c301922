//! Tests for the settings building coordinator.

use super::*;
use std::sync::Mutex;
use tempfile::TempDir;

/// Builder returning a canned response and recording every request.
struct MockSettingsBuilder {
    response: Result<SettingsBuildingResult, SettingsBuildingError>,
    requests: Mutex<Vec<SettingsBuildingRequest>>,
}

impl MockSettingsBuilder {
    fn returning(result: SettingsBuildingResult) -> Self {
        Self {
            response: Ok(result),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn failing(error: SettingsBuildingError) -> Self {
        Self {
            response: Err(error),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn last_request(&self) -> SettingsBuildingRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

impl SettingsBuilder for MockSettingsBuilder {
    fn build(
        &self,
        request: &SettingsBuildingRequest,
    ) -> Result<SettingsBuildingResult, SettingsBuildingError> {
        self.requests.lock().unwrap().push(request.clone());
        self.response.clone()
    }
}

fn settings_with_local(local: Option<&str>) -> RawSettings {
    RawSettings {
        offline: true,
        local_repository: local.map(str::to_string),
        plugin_groups: vec!["org.example".to_string()],
        ..Default::default()
    }
}

/// Relative path from the working directory to the absolute `target`.
#[cfg(unix)]
fn relative_from_cwd(target: &Path) -> PathBuf {
    let cwd = std::env::current_dir().unwrap();
    let mut relative = PathBuf::new();
    for _ in cwd.components().skip(1) {
        relative.push("..");
    }
    relative.join(target.strip_prefix("/").unwrap())
}

fn coordinator(builder: Arc<dyn SettingsBuilder>, default_local: &Path) -> SettingsBuildingCoordinator {
    SettingsBuildingCoordinator::new(builder, default_local.to_path_buf())
}

mod build_tests {
    use super::*;

    #[test]
    fn test_request_carries_files_and_properties() {
        let home = TempDir::new().unwrap();
        let local = home.path().join("repo");
        let builder = Arc::new(MockSettingsBuilder::returning(SettingsBuildingResult::new(
            settings_with_local(Some(&local.to_string_lossy())),
        )));
        let props = SystemProperties::new()
            .with_user_home(home.path())
            .with_property("java.version", "17");

        coordinator(builder.clone(), &home.path().join("default"))
            .build(
                Path::new("/cfg/user.xml"),
                Path::new("/cfg/global.xml"),
                &props,
            )
            .unwrap();

        let request = builder.last_request();
        assert_eq!(request.user_settings_file, PathBuf::from("/cfg/user.xml"));
        assert_eq!(request.global_settings_file, PathBuf::from("/cfg/global.xml"));
        assert_eq!(
            request.system_properties.get("java.version").map(String::as_str),
            Some("17")
        );
        assert!(request.user_properties.is_empty());
    }

    #[test]
    fn test_builder_error_is_build_failure() {
        let home = TempDir::new().unwrap();
        let error = SettingsBuildingError::new("1 problem was encountered").with_problems(vec![
            SettingsProblem::new(ProblemSeverity::Fatal, "Non-parseable settings").at(
                "/cfg/user.xml",
                3,
                7,
            ),
        ]);
        let builder = Arc::new(MockSettingsBuilder::failing(error));

        let err = coordinator(builder, home.path())
            .build(
                Path::new("/cfg/user.xml"),
                Path::new("/cfg/global.xml"),
                &SystemProperties::new(),
            )
            .unwrap_err();

        match err {
            SettingsError::BuildFailure { reason } => {
                assert!(reason.contains("1 problem was encountered"));
                assert!(reason.contains("Non-parseable settings"));
                assert!(reason.contains("line 3"));
            }
            other => panic!("Expected BuildFailure, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_document_is_build_failure() {
        let home = TempDir::new().unwrap();
        let builder = Arc::new(MockSettingsBuilder::returning(
            SettingsBuildingResult::default(),
        ));

        let result = coordinator(builder, home.path()).build(
            Path::new("/cfg/user.xml"),
            Path::new("/cfg/global.xml"),
            &SystemProperties::new(),
        );

        assert!(matches!(result, Err(SettingsError::BuildFailure { .. })));
    }
}

mod effective_settings_tests {
    use super::*;

    #[test]
    fn test_blank_local_repository_uses_default_and_creates_it() {
        let home = TempDir::new().unwrap();
        let default_local = home.path().join(".m2").join("repository");
        let builder = Arc::new(MockSettingsBuilder::returning(SettingsBuildingResult::new(
            settings_with_local(Some("  ")),
        )));
        let coordinator = coordinator(builder, &default_local);

        let settings = coordinator
            .effective_settings(SettingsBuildingResult::new(settings_with_local(Some(""))))
            .unwrap();

        assert_eq!(settings.local_repository.as_deref(), default_local.to_str());
        assert!(default_local.is_dir());

        // Running again against the existing directory is a no-op.
        let again = coordinator
            .effective_settings(SettingsBuildingResult::new(settings_with_local(None)))
            .unwrap();
        assert_eq!(again.local_repository, settings.local_repository);
    }

    #[test]
    fn test_custom_local_repository_is_kept() {
        let home = TempDir::new().unwrap();
        let custom = home.path().join("custom").join("repo");
        let custom_str = custom.to_string_lossy().into_owned();
        let builder = Arc::new(MockSettingsBuilder::returning(SettingsBuildingResult::default()));

        let settings = coordinator(builder, &home.path().join("default"))
            .effective_settings(SettingsBuildingResult::new(settings_with_local(Some(
                &custom_str,
            ))))
            .unwrap();

        assert_eq!(settings.local_repository.as_deref(), Some(custom_str.as_str()));
        assert!(custom.is_dir());
        assert!(!home.path().join("default").exists());
    }

    #[test]
    fn test_problems_do_not_change_document() {
        let home = TempDir::new().unwrap();
        let local = home.path().join("repo").to_string_lossy().into_owned();
        let document = settings_with_local(Some(&local));
        let builder = Arc::new(MockSettingsBuilder::returning(SettingsBuildingResult::default()));
        let coordinator = coordinator(builder, home.path());

        let clean = coordinator
            .effective_settings(SettingsBuildingResult::new(document.clone()))
            .unwrap();
        let with_problems = coordinator
            .effective_settings(
                SettingsBuildingResult::new(document.clone())
                    .with_problem(SettingsProblem::new(ProblemSeverity::Error, "A").at("C", 1, 2))
                    .with_problem(SettingsProblem::new(
                        ProblemSeverity::Warning,
                        "'servers.server.id' is deprecated",
                    )),
            )
            .unwrap();

        assert_eq!(clean, document);
        assert_eq!(with_problems, document);
    }

    #[test]
    fn test_directory_creation_failure_is_build_failure() {
        let home = TempDir::new().unwrap();
        let blocker = home.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let local = blocker.join("repo").to_string_lossy().into_owned();
        let builder = Arc::new(MockSettingsBuilder::returning(SettingsBuildingResult::default()));

        let result = coordinator(builder, home.path())
            .effective_settings(SettingsBuildingResult::new(settings_with_local(Some(&local))));

        match result {
            Err(SettingsError::BuildFailure { reason }) => {
                assert!(reason.contains("failed to create local repository"));
            }
            other => panic!("Expected BuildFailure, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_relative_default_is_made_absolute() {
        let home = TempDir::new().unwrap();
        let relative_home = relative_from_cwd(home.path());
        assert!(relative_home.is_relative());
        let builder = Arc::new(MockSettingsBuilder::returning(SettingsBuildingResult::default()));

        let settings = coordinator(builder, &relative_home.join(".m2").join("repository"))
            .effective_settings(SettingsBuildingResult::new(settings_with_local(None)))
            .unwrap();

        let local = settings.local_repository.unwrap();
        assert!(Path::new(&local).is_absolute(), "{local}");
        assert!(home.path().join(".m2").join("repository").is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_default_is_build_failure() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let home = TempDir::new().unwrap();
        let default_local = home.path().join(OsStr::from_bytes(b"repo-\xff"));
        let builder = Arc::new(MockSettingsBuilder::returning(SettingsBuildingResult::default()));

        let result = coordinator(builder, &default_local)
            .effective_settings(SettingsBuildingResult::new(settings_with_local(None)));

        match result {
            Err(SettingsError::BuildFailure { reason }) => {
                assert!(reason.contains("not valid UTF-8"), "{reason}");
            }
            other => panic!("Expected BuildFailure, got {other:?}"),
        }
        assert!(!default_local.exists());
    }
}

mod problem_tests {
    use super::*;

    #[test]
    fn test_location_formats_available_parts() {
        let full = SettingsProblem::new(ProblemSeverity::Error, "A").at("C", 1, 2);
        assert_eq!(full.location(), "C, line 1, column 2");

        let bare = SettingsProblem::new(ProblemSeverity::Warning, "A");
        assert_eq!(bare.location(), "");
    }

    #[test]
    fn test_display() {
        let problem =
            SettingsProblem::new(ProblemSeverity::Warning, "unknown element").at("s.xml", 4, 9);

        assert_eq!(
            problem.to_string(),
            "[Warning] unknown element @ s.xml, line 4, column 9"
        );
    }

    #[test]
    fn test_building_error_without_problems() {
        let error: SettingsError = SettingsBuildingError::new("boom").into();

        assert_eq!(
            error,
            SettingsError::BuildFailure {
                reason: "boom".to_string()
            }
        );
    }
}
