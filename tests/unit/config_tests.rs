//! Configuration Loading Tests
//!
//! Tests layered loading from YAML files, environment overrides and
//! validation rules.

use parking_lot::Mutex;
use pr_labeler::AppConfig;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Environment variables are process-wide; loads run one at a time
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn load(path: &Path) -> AppConfig {
    let _guard = ENV_LOCK.lock();
    AppConfig::load_from(Some(path)).unwrap()
}

/// Load `path` with `vars` set, removing them again afterwards
fn load_with_env(path: &Path, vars: &[(&str, &str)]) -> AppConfig {
    let _guard = ENV_LOCK.lock();
    for (key, value) in vars {
        std::env::set_var(key, value);
    }
    let result = AppConfig::load_from(Some(path));
    for (key, _) in vars {
        std::env::remove_var(key);
    }
    result.unwrap()
}

fn write_yaml(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".yaml")
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_full_yaml() {
    let file = write_yaml(
        r#"
server:
  host: 127.0.0.1
  port: 9000
github:
  api_url: https://github.example.com/api/v3
  token: ghp_example
  files_per_page: 50
security:
  webhook_secret: s3cret
  webhook_secret_previous: old-s3cret
labeler:
  repositories:
    - nodejs/node
    - nodejs/help
  js_subsystem_limit: 6
  version_labels: false
"#,
    );

    let config = load(file.path());
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.github.api_url, "https://github.example.com/api/v3");
    assert_eq!(config.github.token.as_deref(), Some("ghp_example"));
    assert_eq!(config.github.files_per_page, 50);
    assert_eq!(config.security.get_all_secrets(), vec!["s3cret", "old-s3cret"]);
    assert_eq!(config.labeler.repositories, vec!["nodejs/node", "nodejs/help"]);
    assert_eq!(config.labeler.js_subsystem_limit, 6);
    assert!(!config.labeler.version_labels);
    assert!(config.validate().is_ok());
}

#[test]
fn test_minimal_yaml_uses_defaults() {
    let file = write_yaml(
        r#"
security:
  webhook_secret: s3cret
"#,
    );

    let config = load(file.path());
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.github.api_url, "https://api.github.com");
    assert_eq!(config.github.max_file_pages, 30);
    assert!(config.labeler.repositories.is_empty());
    assert_eq!(config.labeler.js_subsystem_limit, 4);
    assert_eq!(config.labeler.delivery_cache_capacity, 1000);
    assert!(config.validate().is_ok());
}

#[test]
fn test_missing_secret_fails_validation() {
    let file = write_yaml("server:\n  port: 8081\n");

    let config = load(file.path());
    assert!(config.validate().is_err());
}

#[test]
fn test_malformed_repository_fails_validation() {
    let file = write_yaml(
        r#"
security:
  webhook_secret: s3cret
labeler:
  repositories:
    - nodejs
"#,
    );

    let config = load(file.path());
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("nodejs"));
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let result = {
        let _guard = ENV_LOCK.lock();
        AppConfig::load_from(Some(Path::new("/nonexistent/pr-labeler/config.yaml")))
    };
    assert!(result.is_err());
}

// =============================================================================
// ENVIRONMENT OVERRIDES
// =============================================================================

#[test]
fn test_environment_overrides_yaml() {
    let file = write_yaml(
        r#"
server:
  port: 9000
security:
  webhook_secret: from-file
labeler:
  repositories:
    - nodejs/help
"#,
    );

    let config = load_with_env(
        file.path(),
        &[
            ("LABELER_SECURITY__WEBHOOK_SECRET", "from-env"),
            ("LABELER_GITHUB__TOKEN", "ghp_from_env"),
            ("LABELER_LABELER__REPOSITORIES", "a/b,c/d"),
            ("LABELER_LABELER__JS_SUBSYSTEM_LIMIT", "7"),
        ],
    );

    assert_eq!(config.security.webhook_secret, "from-env");
    assert_eq!(config.github.token.as_deref(), Some("ghp_from_env"));
    assert_eq!(config.labeler.repositories, vec!["a/b", "c/d"]);
    assert_eq!(config.labeler.js_subsystem_limit, 7);
    // Untouched keys keep the file value
    assert_eq!(config.server.port, 9000);
    assert!(config.validate().is_ok());
}

#[test]
fn test_environment_supplies_missing_secret() {
    let file = write_yaml("server:\n  port: 8082\n");

    let config = load_with_env(file.path(), &[("LABELER_SECURITY__WEBHOOK_SECRET", "s3cret")]);
    assert_eq!(config.security.webhook_secret, "s3cret");
    assert!(config.validate().is_ok());
}

#[test]
fn test_double_underscore_prefix_is_not_read() {
    let file = write_yaml("server:\n  port: 8083\n");

    let config = load_with_env(
        file.path(),
        &[("LABELER__SECURITY__WEBHOOK_SECRET", "wrong-format")],
    );
    assert!(config.security.webhook_secret.is_empty());
}
