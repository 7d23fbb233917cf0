//! Configuration file support for chatquiz.
//!
//! Two optional files are read: `chatquiz.toml` in the working directory and
//! `config.toml` in the global config directory. Settings are resolved with
//! the precedence CLI flags > project file > global file > defaults.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chatquiz_agent::BackendType;
use chatquiz_logging::LogFormat;

use crate::texts::Lang;

/// The project config file name
pub const CONFIG_FILE_NAME: &str = "chatquiz.toml";

/// Directory under the user config dir holding the global config
pub const GLOBAL_CONFIG_DIR: &str = "chatquiz";

/// The global config file name
pub const GLOBAL_CONFIG_FILE: &str = "config.toml";

pub const DEFAULT_DEBOUNCE_MS: u64 = 500;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Contents of a config file (project or global)
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Display language (`zh` or `en`)
    pub lang: Option<String>,
    #[serde(default)]
    pub backend: BackendSection,
    #[serde(default)]
    pub search: SearchSection,
    #[serde(default)]
    pub log: LogSection,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct BackendSection {
    /// `scripted` or `command`
    pub kind: Option<String>,
    /// Questionnaire script for the scripted backend
    pub script: Option<PathBuf>,
    /// Program for the command backend
    pub command: Option<PathBuf>,
    pub args: Option<Vec<String>>,
    /// Extra environment variables for the command backend
    pub env: Option<BTreeMap<String, String>>,
    pub timeout_secs: Option<u64>,
    /// Artificial delay before scripted replies
    pub delay_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct SearchSection {
    /// Base URL of the music search service
    pub url: Option<String>,
    pub debounce_ms: Option<u64>,
    pub enabled: Option<bool>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct LogSection {
    pub level: Option<String>,
    pub format: Option<String>,
    pub dir: Option<PathBuf>,
}

impl ConfigFile {
    /// Load `chatquiz.toml` from the working directory.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load_project(working_dir: &Path) -> Result<Option<Self>> {
        let config = Self::load_from(&working_dir.join(CONFIG_FILE_NAME))?;
        Ok(config.map(|c| c.relative_to(working_dir)))
    }

    /// Load the global config from `<config_dir>/chatquiz/config.toml`
    pub fn load_global() -> Result<Option<Self>> {
        match Self::global_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn global_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(GLOBAL_CONFIG_DIR).join(GLOBAL_CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config: ConfigFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(Some(config))
    }

    /// Resolve relative paths against `base`
    fn relative_to(mut self, base: &Path) -> Self {
        let join = |p: PathBuf| if p.is_relative() { base.join(p) } else { p };
        self.backend.script = self.backend.script.map(join);
        self.log.dir = self.log.dir.map(join);
        self
    }
}

/// Values given on the command line; `None` means "not given"
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub lang: Option<Lang>,
    pub backend: Option<BackendType>,
    pub script: Option<PathBuf>,
    pub command: Option<PathBuf>,
    pub args: Vec<String>,
    pub search_url: Option<String>,
    pub no_search: bool,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

/// Fully resolved settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub working_dir: PathBuf,
    pub lang: Lang,
    pub backend: BackendSettings,
    pub search: SearchSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub kind: BackendType,
    /// `None` means the built-in script
    pub script: Option<PathBuf>,
    pub command: Option<PathBuf>,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub timeout: Option<Duration>,
    pub delay: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub url: Option<String>,
    pub debounce: Duration,
    pub enabled: bool,
}

#[derive(Debug, Clone)]
pub struct LogSettings {
    pub level: String,
    pub format: LogFormat,
    /// `None` means the default data directory
    pub dir: Option<PathBuf>,
}

impl Settings {
    /// Merge CLI flags, project config and global config over the defaults
    pub fn resolve(
        working_dir: PathBuf,
        cli: &CliOverrides,
        project: Option<&ConfigFile>,
        global: Option<&ConfigFile>,
    ) -> Result<Self> {
        let files: Vec<&ConfigFile> = project.into_iter().chain(global).collect();

        // First value found in the files, highest precedence first
        fn pick<'a, T>(
            files: &[&'a ConfigFile],
            get: impl Fn(&'a ConfigFile) -> Option<T>,
        ) -> Option<T> {
            files.iter().find_map(|f| get(*f))
        }

        let lang = match cli.lang {
            Some(lang) => lang,
            None => match pick(&files, |f| f.lang.as_deref()) {
                Some(value) => value.parse::<Lang>().map_err(anyhow::Error::msg)?,
                None => Lang::default(),
            },
        };

        let kind = match cli.backend {
            Some(kind) => kind,
            None => match pick(&files, |f| f.backend.kind.as_deref()) {
                Some(value) => value.parse::<BackendType>().map_err(anyhow::Error::msg)?,
                None => BackendType::Scripted,
            },
        };

        let command = cli
            .command
            .clone()
            .or_else(|| pick(&files, |f| f.backend.command.clone()));
        if kind == BackendType::Command && command.is_none() {
            anyhow::bail!("The command backend needs a program (--command or [backend].command)");
        }

        let args = if cli.args.is_empty() {
            pick(&files, |f| f.backend.args.clone()).unwrap_or_default()
        } else {
            cli.args.clone()
        };

        let backend = BackendSettings {
            kind,
            script: cli
                .script
                .clone()
                .or_else(|| pick(&files, |f| f.backend.script.clone())),
            command,
            args,
            env: pick(&files, |f| f.backend.env.clone()).unwrap_or_default(),
            timeout: pick(&files, |f| f.backend.timeout_secs).map(Duration::from_secs),
            delay: pick(&files, |f| f.backend.delay_ms).map(Duration::from_millis),
        };

        let url = cli
            .search_url
            .clone()
            .or_else(|| pick(&files, |f| f.search.url.clone()));
        let enabled = if cli.no_search {
            false
        } else {
            pick(&files, |f| f.search.enabled).unwrap_or(true) && url.is_some()
        };
        let search = SearchSettings {
            url,
            debounce: Duration::from_millis(
                pick(&files, |f| f.search.debounce_ms).unwrap_or(DEFAULT_DEBOUNCE_MS),
            ),
            enabled,
        };

        let format = match cli.log_format {
            Some(format) => format,
            None => match pick(&files, |f| f.log.format.as_deref()) {
                Some(value) => value.parse::<LogFormat>().map_err(anyhow::Error::msg)?,
                None => LogFormat::default(),
            },
        };
        let log = LogSettings {
            level: cli
                .log_level
                .clone()
                .or_else(|| pick(&files, |f| f.log.level.clone()))
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            format,
            dir: pick(&files, |f| f.log.dir.clone()),
        };

        Ok(Self {
            working_dir,
            lang,
            backend,
            search,
            log,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(content: &str) -> ConfigFile {
        toml::from_str(content).unwrap()
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(ConfigFile::load_project(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_load_invalid_file_is_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "lang = [").unwrap();
        assert!(ConfigFile::load_project(dir.path()).is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[backend]\nkind = \"scripted\"\nmodel = \"x\"\n",
        )
        .unwrap();
        let err = ConfigFile::load_project(dir.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("unknown field"));
    }

    #[test]
    fn test_project_script_path_is_relative_to_working_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[backend]\nscript = \"quiz.toml\"\n",
        )
        .unwrap();
        let config = ConfigFile::load_project(dir.path()).unwrap().unwrap();
        assert_eq!(config.backend.script, Some(dir.path().join("quiz.toml")));
    }

    #[test]
    fn test_defaults() {
        let settings =
            Settings::resolve(PathBuf::from("."), &CliOverrides::default(), None, None).unwrap();
        assert_eq!(settings.lang, Lang::Zh);
        assert_eq!(settings.backend.kind, BackendType::Scripted);
        assert!(settings.backend.script.is_none());
        assert!(!settings.search.enabled);
        assert_eq!(settings.search.debounce, Duration::from_millis(500));
        assert_eq!(settings.log.level, "info");
        assert_eq!(settings.log.format, LogFormat::Pretty);
    }

    #[test]
    fn test_precedence() {
        let project = parse(
            r#"
lang = "en"
[search]
url = "http://project"
"#,
        );
        let global = parse(
            r#"
lang = "zh"
[search]
url = "http://global"
debounce_ms = 250
[log]
level = "debug"
"#,
        );
        let cli = CliOverrides {
            log_level: Some("trace".to_string()),
            ..Default::default()
        };

        let settings =
            Settings::resolve(PathBuf::from("."), &cli, Some(&project), Some(&global)).unwrap();
        assert_eq!(settings.lang, Lang::En);
        assert_eq!(settings.search.url.as_deref(), Some("http://project"));
        assert!(settings.search.enabled);
        assert_eq!(settings.search.debounce, Duration::from_millis(250));
        assert_eq!(settings.log.level, "trace");
    }

    #[test]
    fn test_no_search_flag_wins() {
        let project = parse("[search]\nurl = \"http://songs\"\nenabled = true\n");
        let cli = CliOverrides {
            no_search: true,
            ..Default::default()
        };
        let settings = Settings::resolve(PathBuf::from("."), &cli, Some(&project), None).unwrap();
        assert!(!settings.search.enabled);
    }

    #[test]
    fn test_command_backend_needs_program() {
        let cli = CliOverrides {
            backend: Some(BackendType::Command),
            ..Default::default()
        };
        assert!(Settings::resolve(PathBuf::from("."), &cli, None, None).is_err());

        let project = parse("[backend]\nkind = \"command\"\ncommand = \"./bot\"\nargs = [\"--json\"]\ntimeout_secs = 30\n");
        let settings =
            Settings::resolve(PathBuf::from("."), &CliOverrides::default(), Some(&project), None)
                .unwrap();
        assert_eq!(settings.backend.kind, BackendType::Command);
        assert_eq!(settings.backend.args, vec!["--json".to_string()]);
        assert_eq!(settings.backend.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_backend_env_table() {
        let project = parse(
            r#"
[backend]
kind = "command"
command = "./bot"

[backend.env]
QUIZ_MODEL = "small"
QUIZ_TEMPERATURE = "0.2"
"#,
        );
        let global = parse(r#"[backend.env]
QUIZ_MODEL = "large"
"#);

        let settings = Settings::resolve(
            PathBuf::from("."),
            &CliOverrides::default(),
            Some(&project),
            Some(&global),
        )
        .unwrap();
        assert_eq!(settings.backend.env.len(), 2);
        assert_eq!(settings.backend.env["QUIZ_MODEL"], "small");

        let settings =
            Settings::resolve(PathBuf::from("."), &CliOverrides::default(), None, None).unwrap();
        assert!(settings.backend.env.is_empty());
    }

    #[test]
    fn test_bad_lang_is_error() {
        let project = parse("lang = \"fr\"\n");
        assert!(
            Settings::resolve(PathBuf::from("."), &CliOverrides::default(), Some(&project), None)
                .is_err()
        );
    }
}
