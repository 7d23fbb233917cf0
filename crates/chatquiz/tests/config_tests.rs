//! Integration tests for config file loading and settings resolution.

use std::fs;
use std::time::Duration;

use chatquiz::config::{CliOverrides, ConfigFile, Settings, CONFIG_FILE_NAME};
use chatquiz::texts::Lang;
use chatquiz_agent::BackendType;
use chatquiz_logging::LogFormat;
use tempfile::TempDir;

// =============================================================================
// Loading
// =============================================================================

#[test]
fn test_missing_project_file_is_none() {
    let dir = TempDir::new().unwrap();
    let config = ConfigFile::load_project(dir.path()).unwrap();
    assert!(config.is_none());
}

#[test]
fn test_project_file_parses() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        r#"
lang = "en"

[backend]
kind = "scripted"
delay_ms = 200

[search]
url = "http://localhost:3000"
debounce_ms = 250
"#,
    )
    .unwrap();

    let config = ConfigFile::load_project(dir.path()).unwrap().unwrap();
    assert_eq!(config.lang.as_deref(), Some("en"));
    assert_eq!(config.backend.delay_ms, Some(200));
    assert_eq!(config.search.debounce_ms, Some(250));
}

#[test]
fn test_unknown_key_is_hard_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(CONFIG_FILE_NAME), "colour = \"red\"\n").unwrap();

    let err = ConfigFile::load_project(dir.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse"));
}

#[test]
fn test_relative_paths_resolve_against_project_dir() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        r#"
[backend]
script = "quiz/script.toml"

[log]
dir = "/var/log/chatquiz"
"#,
    )
    .unwrap();

    let config = ConfigFile::load_project(dir.path()).unwrap().unwrap();
    assert_eq!(
        config.backend.script.unwrap(),
        dir.path().join("quiz/script.toml")
    );
    assert_eq!(
        config.log.dir.unwrap(),
        std::path::PathBuf::from("/var/log/chatquiz")
    );
}

// =============================================================================
// Resolution
// =============================================================================

#[test]
fn test_project_file_drives_settings() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        r#"
lang = "en"

[backend]
kind = "command"
command = "/usr/local/bin/quizbot"
args = ["--fast"]
timeout_secs = 30

[log]
format = "json"
"#,
    )
    .unwrap();
    let project = ConfigFile::load_project(dir.path()).unwrap();

    let settings = Settings::resolve(
        dir.path().to_path_buf(),
        &CliOverrides::default(),
        project.as_ref(),
        None,
    )
    .unwrap();

    assert_eq!(settings.lang, Lang::En);
    assert_eq!(settings.backend.kind, BackendType::Command);
    assert_eq!(settings.backend.args, vec!["--fast".to_string()]);
    assert_eq!(settings.backend.timeout, Some(Duration::from_secs(30)));
    assert_eq!(settings.log.format, LogFormat::Json);
    assert!(!settings.search.enabled);
}

#[test]
fn test_cli_beats_project_file() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        r#"
lang = "en"

[search]
url = "http://localhost:3000"
"#,
    )
    .unwrap();
    let project = ConfigFile::load_project(dir.path()).unwrap();

    let cli = CliOverrides {
        lang: Some(Lang::Zh),
        no_search: true,
        ..Default::default()
    };
    let settings =
        Settings::resolve(dir.path().to_path_buf(), &cli, project.as_ref(), None).unwrap();

    assert_eq!(settings.lang, Lang::Zh);
    assert!(!settings.search.enabled);
    assert_eq!(
        settings.search.url.as_deref(),
        Some("http://localhost:3000")
    );
}
