use crate::core::{ConfigProvider, Converter};
use crate::domain::model::{ConverterOutcome, TempArtifactPair};
use crate::utils::error::{ConvertError, Result};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::time::Instant;

/// Upper bound on captured stdout/stderr per stream. The rest is discarded.
const MAX_CAPTURE_BYTES: u64 = 64 * 1024;

/// How long to keep draining pipes after the converter exited. A converter that
/// leaves a background process holding its stdout must not hang the request.
/// Both pipes share this one window.
const PIPE_DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Runs `<program> [args..] <input> <output>` as a child process.
#[derive(Debug, Clone)]
pub struct ProcessConverter {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl ProcessConverter {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        Self::new(
            config.converter_program(),
            config.converter_args().to_vec(),
            config.converter_timeout(),
        )
    }

    fn command(&self, artifacts: &TempArtifactPair) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(&artifacts.input_path)
            .arg(&artifacts.output_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl Converter for ProcessConverter {
    async fn convert(&self, artifacts: &TempArtifactPair) -> Result<ConverterOutcome> {
        let started = Instant::now();

        let mut child = self
            .command(artifacts)
            .spawn()
            .map_err(|source| ConvertError::SpawnError {
                program: self.program.clone(),
                source,
            })?;

        tracing::debug!(
            program = %self.program,
            pid = child.id(),
            input = %artifacts.input_path.display(),
            "Converter started"
        );

        let stdout_task = tokio::spawn(drain_pipe(child.stdout.take()));
        let stderr_task = tokio::spawn(drain_pipe(child.stderr.take()));

        let status = match tokio::time::timeout(self.timeout, child.wait()).await {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => {
                stdout_task.abort();
                stderr_task.abort();
                return Err(ConvertError::WaitError {
                    program: self.program.clone(),
                    source: e,
                });
            }
            Err(_) => {
                if let Err(e) = child.kill().await {
                    tracing::warn!("Failed to kill timed out converter: {}", e);
                }
                stdout_task.abort();
                stderr_task.abort();
                tracing::warn!(
                    program = %self.program,
                    timeout = ?self.timeout,
                    "⏱️ Converter exceeded its deadline and was killed"
                );
                return Err(ConvertError::TimeoutError {
                    after: self.timeout,
                });
            }
        };

        let (stdout, stderr) =
            tokio::join!(collect_pipe(stdout_task), collect_pipe(stderr_task));
        let elapsed = started.elapsed();

        if !status.success() {
            tracing::warn!(
                program = %self.program,
                exit_code = ?status.code(),
                stderr = %stderr.trim(),
                elapsed = ?elapsed,
                "Converter reported failure"
            );
            return Err(ConvertError::ConversionError {
                exit_code: status.code(),
                stderr,
            });
        }

        if !stderr.trim().is_empty() {
            tracing::debug!(stderr = %stderr.trim(), "Converter wrote to stderr");
        }

        Ok(ConverterOutcome {
            exit_code: status.code().unwrap_or(0),
            stdout,
            stderr,
            elapsed,
        })
    }
}

async fn drain_pipe<R>(pipe: Option<R>) -> String
where
    R: AsyncRead + Unpin,
{
    let Some(mut pipe) = pipe else {
        return String::new();
    };

    let mut captured = Vec::new();
    if let Err(e) = (&mut pipe)
        .take(MAX_CAPTURE_BYTES)
        .read_to_end(&mut captured)
        .await
    {
        tracing::debug!("Failed to read converter pipe: {}", e);
    }
    // keep the child from blocking on a full pipe
    let _ = tokio::io::copy(&mut pipe, &mut tokio::io::sink()).await;

    String::from_utf8_lossy(&captured).into_owned()
}

async fn collect_pipe(task: tokio::task::JoinHandle<String>) -> String {
    let abort = task.abort_handle();
    match tokio::time::timeout(PIPE_DRAIN_GRACE, task).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            tracing::debug!("Converter pipe reader failed: {}", e);
            String::new()
        }
        Err(_) => {
            abort.abort();
            String::new()
        }
    }
}
