use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;

use chatquiz::config::{CliOverrides, ConfigFile, Settings};
use chatquiz::search::{MusicSearchClient, SearchDebouncer};
use chatquiz::texts::Lang;
use chatquiz::tui::{App, ChatState, SearchPane};
use chatquiz_agent::{
    Backend, BackendConfig, BackendType, CommandBackend, Script, ScriptedBackend,
};
use chatquiz_logging::{LogFormat, Logger, QuizEvent, TranscriptWriter};

#[derive(Parser, Debug)]
#[command(
    name = "chatquiz",
    about = "Conversational questionnaire in the terminal",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Working directory (default: current directory)
    #[arg(short = 'd', long)]
    working_dir: Option<PathBuf>,

    /// Display language
    #[arg(short, long, value_enum)]
    lang: Option<LangChoice>,

    /// Where assistant replies come from
    #[arg(short, long, value_enum)]
    backend: Option<BackendChoice>,

    /// Questionnaire script for the scripted backend
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Program for the command backend
    #[arg(long = "command")]
    program: Option<PathBuf>,

    /// Extra arguments for the command backend (after `--`)
    #[arg(last = true)]
    args: Vec<String>,

    /// Base URL of the music search service
    #[arg(long)]
    search_url: Option<String>,

    /// Disable song search even if configured
    #[arg(long)]
    no_search: bool,

    /// Log level filter (RUST_LOG overrides)
    #[arg(long)]
    log_level: Option<String>,

    /// Log file format
    #[arg(long, value_enum)]
    log_format: Option<LogFormatChoice>,

    /// Dry run: show the resolved settings without starting the UI
    #[arg(long)]
    dry_run: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a questionnaire script and print its outline
    CheckScript {
        /// Path to the script
        path: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LangChoice {
    Zh,
    En,
}

impl From<LangChoice> for Lang {
    fn from(choice: LangChoice) -> Self {
        match choice {
            LangChoice::Zh => Lang::Zh,
            LangChoice::En => Lang::En,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BackendChoice {
    Scripted,
    Command,
}

impl From<BackendChoice> for BackendType {
    fn from(choice: BackendChoice) -> Self {
        match choice {
            BackendChoice::Scripted => BackendType::Scripted,
            BackendChoice::Command => BackendType::Command,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            lang: self.lang.map(Into::into),
            backend: self.backend.map(Into::into),
            script: self.script.clone(),
            command: self.program.clone(),
            args: self.args.clone(),
            search_url: self.search_url.clone(),
            no_search: self.no_search,
            log_level: self.log_level.clone(),
            log_format: self.log_format.map(Into::into),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::CheckScript { path }) = &cli.command {
        return check_script(path);
    }

    let working_dir = match cli.working_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    let project = ConfigFile::load_project(&working_dir)?;
    let global = ConfigFile::load_global()?;
    let settings = Settings::resolve(
        working_dir.clone(),
        &cli.overrides(),
        project.as_ref(),
        global.as_ref(),
    )?;

    let backend = build_backend(&settings)?;

    if cli.dry_run {
        print_settings(&settings, backend.as_ref(), project.is_some(), global.is_some());
        return Ok(());
    }

    if !backend.is_available().await {
        anyhow::bail!(
            "Backend '{}' is not available. Make sure the program exists and is in PATH.",
            backend.name()
        );
    }

    let log_dir = settings
        .log
        .dir
        .clone()
        .or_else(chatquiz_logging::default_log_dir)
        .unwrap_or_else(|| working_dir.join(".chatquiz").join("logs"));
    let _guard = chatquiz_logging::init_tracing(&settings.log.level, settings.log.format, &log_dir)
        .with_context(|| format!("Failed to initialize logging in {}", log_dir.display()))?;

    let session_id = uuid::Uuid::new_v4().to_string();
    let logger = Logger::with_file(&log_dir.join("events.jsonl")).unwrap_or_else(|e| {
        tracing::warn!("Events file unavailable: {}", e);
        Logger::new()
    });
    logger.log(&QuizEvent::SessionStarted {
        session_id: session_id.clone(),
        backend: settings.backend.kind.to_string(),
        lang: settings.lang.to_string(),
    });

    let (state, replies) = ChatState::new(backend);
    let state = match TranscriptWriter::new(&session_id) {
        Ok(transcript) => {
            transcript.write_start(
                &session_id,
                &settings.backend.kind.to_string(),
                &settings.lang.to_string(),
                &working_dir,
            );
            state.with_transcript(transcript)
        }
        Err(e) => {
            tracing::warn!("Transcript disabled: {}", e);
            state
        }
    };
    let transcript_path = state.transcript().map(|t| t.path().to_path_buf());

    let search = match (&settings.search.url, settings.search.enabled) {
        (Some(url), true) => {
            let client = Arc::new(MusicSearchClient::new(url.clone()));
            let (debouncer, updates) = SearchDebouncer::new(client, settings.search.debounce);
            Some(SearchPane::new(debouncer, updates))
        }
        _ => None,
    };

    let mut app = App::new(state, replies, search, settings.lang.texts(), logger)?;
    let result = app.run().await;

    let messages = *result.as_ref().unwrap_or(&0);
    let outcome = if app.is_complete() {
        "completed"
    } else {
        "abandoned"
    };
    let duration = app.elapsed();
    if let Some(transcript) = app.state().transcript() {
        transcript.write_end(outcome, messages, duration.as_secs_f64());
    }
    drop(app);

    if let Some(ref path) = transcript_path {
        eprintln!();
        eprintln!(
            "{} Questionnaire {} ({} messages, {:.0}s)",
            if outcome == "completed" {
                "✓".bright_green()
            } else {
                "•".dimmed()
            },
            outcome,
            messages,
            duration.as_secs_f64()
        );
        eprintln!("  {} {}", "Transcript:".dimmed(), path.display());
    }

    result.map(|_| ())
}

fn build_backend(settings: &Settings) -> Result<Arc<dyn Backend>> {
    let backend: Arc<dyn Backend> = match settings.backend.kind {
        BackendType::Scripted => {
            let script = match settings.backend.script {
                Some(ref path) => Script::load(path)
                    .with_context(|| format!("Failed to load script {}", path.display()))?,
                None => Script::builtin().context("Built-in script is invalid")?,
            };
            let mut backend = ScriptedBackend::new(script);
            if let Some(delay) = settings.backend.delay {
                backend = backend.with_delay(delay);
            }
            Arc::new(backend)
        }
        BackendType::Command => {
            let program = settings
                .backend
                .command
                .clone()
                .context("No program configured for the command backend")?;
            let mut config = BackendConfig::new(settings.working_dir.clone());
            if let Some(timeout) = settings.backend.timeout {
                config = config.with_timeout(timeout);
            }
            for (key, value) in &settings.backend.env {
                config = config.with_env(key.clone(), value.clone());
            }
            Arc::new(CommandBackend::new(program, config).with_args(settings.backend.args.clone()))
        }
    };
    Ok(backend)
}

fn check_script(path: &Path) -> Result<()> {
    let script =
        Script::load(path).with_context(|| format!("Failed to load script {}", path.display()))?;

    eprintln!("{} {}", "✓".bright_green(), path.display().to_string().bold());
    eprintln!();
    eprintln!("{}", "Intake".bright_cyan().bold());
    for (i, prompt) in script.intake.iter().enumerate() {
        eprintln!("  {}. {}", i + 1, prompt);
    }
    eprintln!();
    eprintln!(
        "{} ({})",
        "Questions".bright_cyan().bold(),
        script.questions.len()
    );
    for (i, question) in script.questions.iter().enumerate() {
        // Question n is asked at log length 10 + 2(n-1)
        let log_len = 10 + 2 * i;
        let mode = if chatquiz_core::stage::is_multi_select(log_len) {
            "multi"
        } else {
            "single"
        };
        eprintln!("  {}. [{}] {}", i + 1, mode.dimmed(), question.prompt);
        if question.options.is_empty() {
            eprintln!("     {}", "(no options)".yellow());
        }
    }
    eprintln!();
    eprintln!("{} {}", "Closing".bright_cyan().bold(), script.closing);
    Ok(())
}

fn print_settings(settings: &Settings, backend: &dyn Backend, project: bool, global: bool) {
    println!("=== Dry Run ===");
    println!("Working dir: {}", settings.working_dir.display());
    println!(
        "Config files: project={} global={}",
        if project { "yes" } else { "no" },
        if global { "yes" } else { "no" }
    );
    println!("Language: {}", settings.lang);
    println!("Backend: {} ({})", settings.backend.kind, backend.name());
    match settings.backend.kind {
        BackendType::Scripted => match settings.backend.script {
            Some(ref path) => println!("Script: {}", path.display()),
            None => println!("Script: built-in"),
        },
        BackendType::Command => {
            if let Some(ref program) = settings.backend.command {
                println!(
                    "Command: {} {}",
                    program.display(),
                    settings.backend.args.join(" ")
                );
            }
            match settings.backend.timeout {
                Some(timeout) => println!("Timeout: {}s", timeout.as_secs()),
                None => println!("Timeout: none"),
            }
            if !settings.backend.env.is_empty() {
                let keys: Vec<&str> = settings.backend.env.keys().map(String::as_str).collect();
                println!("Env: {}", keys.join(", "));
            }
        }
    }
    match (&settings.search.url, settings.search.enabled) {
        (Some(url), true) => println!(
            "Song search: {} (debounce {}ms)",
            url,
            settings.search.debounce.as_millis()
        ),
        _ => println!("Song search: off"),
    }
    println!(
        "Log: level={} format={}",
        settings.log.level, settings.log.format
    );
}
