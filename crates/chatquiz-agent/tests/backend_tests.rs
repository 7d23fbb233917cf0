use std::path::PathBuf;
use std::time::Duration;

use chatquiz_agent::{
    Backend, BackendConfig, BackendError, CommandBackend, Reply, Script, ScriptedBackend,
};
use chatquiz_core::Message;

/// A conversation where the user has sent `answers` messages
fn history(answers: usize) -> Vec<Message> {
    let mut log = Vec::new();
    for i in 0..answers {
        if i > 0 {
            log.push(Message::assistant(format!("prompt {}", i)));
        }
        log.push(Message::user(format!("answer {}", i)));
    }
    log
}

const SHORT_SCRIPT: &str = r#"
closing = "All done."
intake = ["Name?", "Posts?", "Image?", "Blob?"]

[[questions]]
prompt = "Pet?"
options = ["cat", "dog"]
"#;

// ============================================================
// Scripted backend
// ============================================================

#[tokio::test]
async fn test_scripted_walks_intake_then_questions() {
    let backend = ScriptedBackend::new(Script::parse(SHORT_SCRIPT).unwrap());

    let first = backend.respond(&history(1)).await.unwrap();
    assert_eq!(first, Reply::text("Name?"));

    let fourth = backend.respond(&history(4)).await.unwrap();
    assert_eq!(fourth, Reply::text("Blob?"));

    let question = backend.respond(&history(5)).await.unwrap();
    assert_eq!(question, Reply::text("Pet?\n(A) cat\n(B) dog"));

    let closing = backend.respond(&history(6)).await.unwrap();
    assert_eq!(closing, Reply::last("All done."));
}

#[tokio::test]
async fn test_scripted_regenerate_repeats_reply() {
    let backend = ScriptedBackend::new(Script::parse(SHORT_SCRIPT).unwrap());
    let log = history(3);
    let once = backend.respond(&log).await.unwrap();
    let again = backend.respond(&log).await.unwrap();
    assert_eq!(once, again);
}

#[tokio::test(start_paused = true)]
async fn test_scripted_delay() {
    let backend = ScriptedBackend::new(Script::parse(SHORT_SCRIPT).unwrap())
        .with_delay(Duration::from_millis(800));
    let start = tokio::time::Instant::now();
    backend.respond(&history(1)).await.unwrap();
    assert!(start.elapsed() >= Duration::from_millis(800));
}

#[test]
fn test_load_script_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quiz.toml");
    std::fs::write(&path, SHORT_SCRIPT).unwrap();

    let script = Script::load(&path).unwrap();
    assert_eq!(script.questions.len(), 1);

    std::fs::write(&path, "closing = \"x\"\nintake = []\nbogus = 1").unwrap();
    assert!(matches!(Script::load(&path), Err(BackendError::Script(_))));
}

// ============================================================
// Command backend
// ============================================================

fn shell(script: &str) -> CommandBackend {
    let config = BackendConfig::new(std::env::temp_dir()).with_timeout(Duration::from_secs(5));
    CommandBackend::new(PathBuf::from("sh"), config)
        .with_args(vec!["-c".to_string(), script.to_string()])
}

#[tokio::test]
async fn test_command_receives_history_as_json() {
    // Echo stdin back so the request itself becomes the plain-text reply
    let backend = shell("cat");
    let reply = backend.respond(&history(1)).await.unwrap();
    assert_eq!(reply.content, r#"[{"role":"user","content":"answer 0"}]"#);
    assert!(!reply.is_final);
}

#[tokio::test]
async fn test_command_json_reply() {
    let backend = shell(r#"cat >/dev/null; echo '{"content":"bye","is_final":true}'"#);
    let reply = backend.respond(&history(2)).await.unwrap();
    assert_eq!(reply, Reply::last("bye"));
}

#[tokio::test]
async fn test_command_failure_reports_stderr() {
    let backend = shell("echo 'model offline' >&2; exit 3");
    let err = backend.respond(&history(1)).await.unwrap_err();
    match err {
        BackendError::ExecutionFailed(detail) => assert_eq!(detail, "model offline"),
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_command_empty_output_is_error() {
    let backend = shell("cat >/dev/null");
    assert!(matches!(
        backend.respond(&history(1)).await,
        Err(BackendError::ExecutionFailed(_))
    ));
}

#[tokio::test]
async fn test_command_timeout() {
    let config = BackendConfig::default().with_timeout(Duration::from_millis(200));
    let backend = CommandBackend::new(PathBuf::from("sh"), config)
        .with_args(vec!["-c".to_string(), "sleep 5".to_string()]);
    let err = backend.respond(&history(1)).await.unwrap_err();
    assert!(matches!(err, BackendError::Timeout(_)));
}

#[tokio::test]
async fn test_command_env_vars() {
    let config = BackendConfig::new(std::env::temp_dir())
        .with_env("QUIZ_GREETING".to_string(), "hello".to_string());
    let backend = CommandBackend::new(PathBuf::from("sh"), config).with_args(vec![
        "-c".to_string(),
        "cat >/dev/null; echo \"$QUIZ_GREETING\"".to_string(),
    ]);
    let reply = backend.respond(&history(1)).await.unwrap();
    assert_eq!(reply.content, "hello");
}

#[tokio::test]
async fn test_missing_program_is_spawn_error() {
    let backend = CommandBackend::new(
        PathBuf::from("/nonexistent/chatquiz-backend"),
        BackendConfig::default(),
    );
    assert!(!backend.is_available().await);
    assert!(matches!(
        backend.respond(&history(1)).await,
        Err(BackendError::SpawnFailed(_))
    ));
}
