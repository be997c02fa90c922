use centralpub_core::properties::{interpolate, load_env_file};
use std::collections::BTreeMap;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn load_env_file_with_key_value_comments_blank_lines() {
    let mut tmp = NamedTempFile::new().unwrap();
    write!(
        tmp,
        "# comment line\n\
         KEY1=value1\n\
         \n\
         KEY2=\"quoted\"\n\
         KEY3  =  value3\n"
    )
    .unwrap();
    tmp.flush().unwrap();

    let env = load_env_file(tmp.path()).unwrap();
    assert_eq!(env.get("KEY1"), Some(&"value1".to_string()));
    assert_eq!(env.get("KEY2"), Some(&"quoted".to_string()));
    assert_eq!(env.get("KEY3"), Some(&"value3".to_string()));
    assert_eq!(env.len(), 3);
}

#[test]
fn load_env_file_nonexistent_path_returns_empty_map() {
    let path = std::path::Path::new("/nonexistent/path/to/file.env");
    let env = load_env_file(path).unwrap();
    assert!(env.is_empty());
}

#[test]
fn interpolate_replaces_env_refs() {
    let mut env_overrides = BTreeMap::new();
    env_overrides.insert("USER_TOKEN".to_string(), "abc".to_string());

    let result = interpolate("token=${env:USER_TOKEN}!", &env_overrides);
    assert_eq!(result, "token=abc!");
}

#[test]
fn interpolate_missing_env_key_replaces_with_empty() {
    let result = interpolate("x=${env:NONEXISTENT_VAR_99999}", &BTreeMap::new());
    assert_eq!(result, "x=");
}

#[test]
fn interpolate_does_not_expand_substituted_values() {
    let mut env_overrides = BTreeMap::new();
    env_overrides.insert("A".to_string(), "${env:A}".to_string());

    let result = interpolate("${env:A}", &env_overrides);
    assert_eq!(result, "${env:A}");
}

#[test]
fn interpolate_unterminated_reference_is_kept() {
    let result = interpolate("x=${env:OPEN", &BTreeMap::new());
    assert_eq!(result, "x=${env:OPEN");
}
