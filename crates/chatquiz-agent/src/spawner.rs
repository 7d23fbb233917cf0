use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tracing::{debug, trace};

use crate::{BackendConfig, BackendError};

/// Output captured from a backend process
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub duration: Duration,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Utility for spawning backend processes
pub struct ProcessSpawner;

impl ProcessSpawner {
    /// Spawn a process, write `input` to its stdin and capture its output.
    ///
    /// The child is killed if the returned future is dropped or the
    /// configured timeout elapses.
    pub async fn spawn(
        program: &Path,
        args: &[String],
        input: &str,
        config: &BackendConfig,
    ) -> Result<ProcessOutput, BackendError> {
        match config.timeout {
            Some(limit) => tokio::time::timeout(limit, Self::run(program, args, input, config))
                .await
                .map_err(|_| BackendError::Timeout(limit))?,
            None => Self::run(program, args, input, config).await,
        }
    }

    async fn run(
        program: &Path,
        args: &[String],
        input: &str,
        config: &BackendConfig,
    ) -> Result<ProcessOutput, BackendError> {
        let start = Instant::now();

        debug!(
            program = %program.display(),
            args = ?args,
            working_dir = %config.working_dir.display(),
            input_len = input.len(),
            "Spawning backend process"
        );

        let mut cmd = Command::new(program);
        cmd.args(args)
            .current_dir(&config.working_dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(Stdio::piped())
            .kill_on_drop(true);

        for (key, value) in &config.env_vars {
            cmd.env(key, value);
        }

        let mut child = cmd.spawn()?;

        let (Some(mut stdin), Some(stdout_handle), Some(stderr_handle)) =
            (child.stdin.take(), child.stdout.take(), child.stderr.take())
        else {
            return Err(BackendError::ExecutionFailed(
                "process pipes were not captured".to_string(),
            ));
        };

        // Write the whole request then close stdin so the child sees EOF
        let request = input.to_string();
        let writer = tokio::spawn(async move {
            let result = stdin.write_all(request.as_bytes()).await;
            drop(stdin);
            result
        });

        let mut stdout_reader = BufReader::new(stdout_handle).lines();
        let mut stderr_reader = BufReader::new(stderr_handle).lines();

        let mut stdout = String::new();
        let mut stderr = String::new();
        let mut stderr_open = true;

        loop {
            tokio::select! {
                biased;

                result = stdout_reader.next_line() => {
                    match result {
                        Ok(Some(line)) => {
                            trace!(line = %line, "stdout");
                            push_line(&mut stdout, &line);
                        }
                        Ok(None) => {
                            while let Ok(Some(line)) = stderr_reader.next_line().await {
                                trace!(line = %line, "stderr");
                                push_line(&mut stderr, &line);
                            }
                            break;
                        }
                        Err(e) => {
                            return Err(BackendError::ExecutionFailed(format!(
                                "Failed to read stdout: {}",
                                e
                            )));
                        }
                    }
                }
                result = stderr_reader.next_line(), if stderr_open => {
                    match result {
                        Ok(Some(line)) => {
                            trace!(line = %line, "stderr");
                            push_line(&mut stderr, &line);
                        }
                        Ok(None) => stderr_open = false,
                        Err(e) => {
                            return Err(BackendError::ExecutionFailed(format!(
                                "Failed to read stderr: {}",
                                e
                            )));
                        }
                    }
                }
            }
        }

        // A child that exits without reading stdin gives a broken pipe; not fatal
        if let Ok(Err(e)) = writer.await {
            debug!(error = %e, "Backend did not read its whole input");
        }

        let status = child.wait().await?;
        let duration = start.elapsed();
        let exit_code = status.code().unwrap_or(-1);

        debug!(
            exit_code,
            duration_ms = duration.as_millis(),
            "Backend process completed"
        );

        Ok(ProcessOutput {
            stdout,
            stderr,
            exit_code,
            duration,
        })
    }
}

fn push_line(buffer: &mut String, line: &str) {
    if !buffer.is_empty() {
        buffer.push('\n');
    }
    buffer.push_str(line);
}
