//! Tests for environment and system-property views.

use super::*;
use std::collections::HashMap;

#[test]
fn test_with_var_sets_value() {
    let env = EnvironmentView::new().with_var("a", "c");

    assert_eq!(env.get("a"), Some("c"));
    assert!(env.contains("a"));
    assert_eq!(env.len(), 1);
}

#[test]
fn test_with_var_overwrites_existing_value() {
    let env = EnvironmentView::new()
        .with_var(MAVEN_HOME, "/opt/maven-3.8")
        .with_var(MAVEN_HOME, "/opt/maven-3.9");

    assert_eq!(env.get(MAVEN_HOME), Some("/opt/maven-3.9"));
}

#[test]
fn test_with_vars_merges_map() {
    let mut vars = HashMap::new();
    vars.insert(USER_SETTINGS_FILE, "/tmp/user.xml");
    vars.insert(GLOBAL_SETTINGS_FILE, "/tmp/global.xml");

    let env = EnvironmentView::new().with_var("PATH", "/usr/bin").with_vars(vars);

    assert_eq!(env.len(), 3);
    assert_eq!(env.get(USER_SETTINGS_FILE), Some("/tmp/user.xml"));
    assert_eq!(env.get(GLOBAL_SETTINGS_FILE), Some("/tmp/global.xml"));
}

#[test]
fn test_to_map_is_a_copy() {
    let env: EnvironmentView = [("a", "b")].into_iter().collect();
    let mut copy = env.to_map();
    copy.insert("x".to_string(), "y".to_string());

    assert_eq!(env.get("x"), None);
    assert_eq!(env.len(), 1);
}

#[test]
fn test_missing_variable_is_none() {
    let env = EnvironmentView::new();

    assert!(env.is_empty());
    assert_eq!(env.get(USER_SETTINGS_FILE), None);
}

#[test]
fn test_load_from_properties() {
    let text = "# comment\n\na=b\n! also a comment\nd : e\n  spaced =  value with spaces  \nbare\n";
    let env = EnvironmentView::from_properties_reader(text.as_bytes()).unwrap();

    assert_eq!(env.len(), 4);
    assert_eq!(env.get("a"), Some("b"));
    assert_eq!(env.get("d"), Some("e"));
    assert_eq!(env.get("spaced"), Some("value with spaces  "));
    assert_eq!(env.get("bare"), Some(""));
}

#[test]
fn test_properties_value_keeps_later_separators() {
    let text = "GLOBAL_SETTINGS_FILE=C:/maven/conf/settings.xml\n";
    let env = EnvironmentView::from_properties_reader(text.as_bytes()).unwrap();

    assert_eq!(
        env.get(GLOBAL_SETTINGS_FILE),
        Some("C:/maven/conf/settings.xml")
    );
}

#[test]
fn test_properties_whitespace_separator() {
    let text = "MAVEN_HOME /opt/maven\nUSER_SETTINGS_FILE\t\t/tmp/user.xml\n";
    let env = EnvironmentView::from_properties_reader(text.as_bytes()).unwrap();

    assert_eq!(env.get(MAVEN_HOME), Some("/opt/maven"));
    assert_eq!(env.get(USER_SETTINGS_FILE), Some("/tmp/user.xml"));
    assert_eq!(env.len(), 2);
}

#[test]
fn test_properties_line_continuation() {
    let text = "USER_SETTINGS_FILE = /a/\\\n    b.xml\nescaped=ends\\\\\nnext=1\n";
    let env = EnvironmentView::from_properties_reader(text.as_bytes()).unwrap();

    assert_eq!(env.get(USER_SETTINGS_FILE), Some("/a/b.xml"));
    assert_eq!(env.get("escaped"), Some("ends\\"));
    assert_eq!(env.get("next"), Some("1"));
}

#[test]
fn test_properties_continued_comment_marker_is_not_a_comment() {
    let text = "list=a,\\\n  # b\n";
    let env = EnvironmentView::from_properties_reader(text.as_bytes()).unwrap();

    assert_eq!(env.get("list"), Some("a,# b"));
}

#[test]
fn test_properties_escaped_separators() {
    let text = "key\\=x=v\nwith\\ space:1\ncolon\\:key = a\\:b\n";
    let env = EnvironmentView::from_properties_reader(text.as_bytes()).unwrap();

    assert_eq!(env.get("key=x"), Some("v"));
    assert_eq!(env.get("with space"), Some("1"));
    assert_eq!(env.get("colon:key"), Some("a:b"));
}

#[test]
fn test_properties_character_escapes() {
    let text = "tab=a\\tb\nunicode=caf\\u00e9\n";
    let env = EnvironmentView::from_properties_reader(text.as_bytes()).unwrap();

    assert_eq!(env.get("tab"), Some("a\tb"));
    assert_eq!(env.get("unicode"), Some("caf\u{e9}"));
}

#[test]
fn test_properties_malformed_unicode_escape() {
    let text = "bad=\\u12\n";
    let err = SystemProperties::from_properties_reader(text.as_bytes()).unwrap_err();

    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
}

#[test]
fn test_user_home_from_property() {
    let props = SystemProperties::new().with_user_home("/home/dev");

    assert_eq!(props.user_home().unwrap(), PathBuf::from("/home/dev"));
}

#[test]
fn test_user_home_missing() {
    let result = SystemProperties::new().user_home();

    assert!(matches!(
        result,
        Err(SettingsError::HomeDirectoryUnavailable { .. })
    ));
}

#[test]
fn test_user_home_blank() {
    let props = SystemProperties::new().with_property(USER_HOME_PROPERTY, "  ");

    assert!(props.user_home().is_err());
}

#[test]
fn test_process_properties_include_os() {
    let props = SystemProperties::from_process();

    assert_eq!(props.get(OS_NAME_PROPERTY), Some(std::env::consts::OS));
    assert_eq!(props.get(OS_ARCH_PROPERTY), Some(std::env::consts::ARCH));
}

#[test]
fn test_system_properties_from_iter() {
    let props: SystemProperties = [("java.version", "17")].into_iter().collect();

    assert_eq!(props.get("java.version"), Some("17"));
    assert!(!props.is_empty());
}
