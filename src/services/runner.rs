use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::process::Command;

/// Errors from running the external scorer
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Failed to start scorer process: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Scorer process I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scorer process exceeded {0:?}")]
    TimedOut(Duration),
}

/// Resource bounds for one scorer run
#[derive(Debug, Clone, Copy)]
pub struct RunLimits {
    pub timeout: Duration,
    /// 0 disables the ceiling
    pub memory_limit_mb: u64,
}

impl Default for RunLimits {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(180),
            memory_limit_mb: 2048,
        }
    }
}

/// Captured result of a finished run
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// stdout followed by stderr
    pub output: String,
    pub duration: Duration,
    pub exit_code: Option<i32>,
}

/// Runs `<interpreter> <script> --file <input_file>`
#[async_trait]
pub trait ScorerRunner: Send + Sync {
    async fn run(
        &self,
        interpreter: &Path,
        script: &Path,
        input_file: &Path,
        limits: &RunLimits,
    ) -> Result<RunOutput, RunnerError>;
}

/// Runs the scorer as a real child process.
///
/// Arguments are passed as an argv vector, never through a shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl ScorerRunner for ProcessRunner {
    async fn run(
        &self,
        interpreter: &Path,
        script: &Path,
        input_file: &Path,
        limits: &RunLimits,
    ) -> Result<RunOutput, RunnerError> {
        let started = Instant::now();

        let mut command = Command::new(interpreter);
        command
            .arg(script)
            .arg("--file")
            .arg(input_file)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        apply_memory_limit(&mut command, limits.memory_limit_mb);

        tracing::debug!(
            "Running scorer: {:?} {:?} --file {:?} (timeout {:?}, memory {} MB)",
            interpreter,
            script,
            input_file,
            limits.timeout,
            limits.memory_limit_mb
        );

        let child = command.spawn().map_err(RunnerError::Spawn)?;

        // Dropping the wait future on timeout drops the child, which kills it
        let output = match tokio::time::timeout(limits.timeout, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!("Scorer process killed after {:?}", limits.timeout);
                return Err(RunnerError::TimedOut(limits.timeout));
            }
        };

        let duration = started.elapsed();
        let output_text = combine_output(&output.stdout, &output.stderr);

        tracing::debug!(
            "Scorer exited with {:?} after {:?} ({} bytes of output)",
            output.status.code(),
            duration,
            output_text.len()
        );

        Ok(RunOutput {
            output: output_text,
            duration,
            exit_code: output.status.code(),
        })
    }
}

fn combine_output(stdout: &[u8], stderr: &[u8]) -> String {
    let mut combined = String::from_utf8_lossy(stdout).into_owned();
    let stderr = String::from_utf8_lossy(stderr);
    if !stderr.trim().is_empty() {
        if !combined.is_empty() && !combined.ends_with('\n') {
            combined.push('\n');
        }
        combined.push_str(&stderr);
    }
    combined
}

/// RLIMIT_AS caps virtual address space, not resident memory. Threaded BLAS
/// under pandas/sklearn can reserve more than the ceiling on many-core hosts;
/// the scorer then dies with a MemoryError and the request is served by the
/// fallback (logged by the recommender).
#[cfg(unix)]
fn apply_memory_limit(command: &mut Command, limit_mb: u64) {
    if limit_mb == 0 {
        return;
    }
    let bytes = limit_mb.saturating_mul(1024 * 1024) as libc::rlim_t;

    // SAFETY: the closure runs between fork and exec and only calls setrlimit,
    // which is async-signal-safe.
    unsafe {
        command.pre_exec(move || {
            let limit = libc::rlimit {
                rlim_cur: bytes,
                rlim_max: bytes,
            };
            if libc::setrlimit(libc::RLIMIT_AS, &limit) != 0 {
                return Err(std::io::Error::last_os_error());
            }
            Ok(())
        });
    }
}

#[cfg(not(unix))]
fn apply_memory_limit(_command: &mut Command, limit_mb: u64) {
    if limit_mb > 0 {
        tracing::trace!("Memory ceiling of {} MB not enforced on this platform", limit_mb);
    }
}
