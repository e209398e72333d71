use super::*;

#[test]
fn test_default_config() {
    let config = ForensicsConfig::default();
    assert_eq!(config.max_logged_errors(), 5);
    assert_eq!(config.blame_revision(), "HEAD");
    assert_eq!(config.mining_revision(), "HEAD");
    assert_eq!(config.reference_branch(), "main");
    assert_eq!(config.reference_max_commits(), None);
    assert_eq!(config.scm, None);
}

#[test]
fn test_parse_toml() {
    let toml = r#"
scm = "git"
max_logged_errors = 20

[blame]
revision = "release"

[reference]
branch = "master"
max_commits = 250
"#;
    let config: ForensicsConfig = toml::from_str(toml).expect("valid toml");
    assert_eq!(config.scm.as_deref(), Some("git"));
    assert_eq!(config.max_logged_errors(), 20);
    assert_eq!(config.blame_revision(), "release");
    assert_eq!(config.mining_revision(), "HEAD");
    assert_eq!(config.reference_branch(), "master");
    assert_eq!(config.reference_max_commits(), Some(250));
}

#[test]
fn test_merge_prefers_other() {
    let mut base = ForensicsConfig {
        max_logged_errors: Some(3),
        reference: ReferenceConfig {
            branch: Some("develop".into()),
            max_commits: Some(10),
        },
        ..Default::default()
    };
    let other = ForensicsConfig {
        reference: ReferenceConfig {
            branch: None,
            max_commits: Some(99),
        },
        ..Default::default()
    };
    base.merge(other);

    assert_eq!(base.max_logged_errors(), 3);
    assert_eq!(base.reference_branch(), "develop");
    assert_eq!(base.reference_max_commits(), Some(99));
}

#[test]
fn test_load_project_config_from_toml() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        dir.path().join("git-forensics.toml"),
        "[mining]\nrevision = \"v1.0\"\n",
    )
    .expect("write config");

    let config = load_project_config(dir.path());
    assert_eq!(config.mining_revision(), "v1.0");
}

#[test]
fn test_load_project_config_from_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        dir.path().join(".git-forensics.json"),
        r#"{"reference": {"branch": "trunk"}}"#,
    )
    .expect("write config");

    let config = load_project_config(dir.path());
    assert_eq!(config.reference_branch(), "trunk");
}

#[test]
fn test_malformed_config_falls_back_to_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("git-forensics.toml"), "max_logged_errors = \"many\"")
        .expect("write config");

    let config = load_project_config(dir.path());
    assert_eq!(config, ForensicsConfig::default());
}

#[test]
fn test_load_config_file_reports_errors() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[reference\n").expect("write config");

    assert!(matches!(
        load_config_file(&path),
        Err(ForensicsError::Config(_))
    ));
    assert!(matches!(
        load_config_file(&dir.path().join("missing.toml")),
        Err(ForensicsError::Io(_))
    ));
}
