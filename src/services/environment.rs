use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

/// Environment variable naming an explicit interpreter
pub const INTERPRETER_OVERRIDE_VAR: &str = "PYTHON_PATH";

/// Modules the scoring script imports
pub const REQUIRED_MODULES: [&str; 3] = ["pandas", "numpy", "sklearn"];

pub const SCRIPT_FILE: &str = "recommendation.py";
pub const DATASET_FILE: &str = "df_upsampled.csv";

/// Datasets at or below this size are treated as placeholders
pub const MIN_DATASET_BYTES: u64 = 1000;

/// Errors raised while locating the scoring tool chain
#[derive(Debug, Error)]
pub enum EnvironmentError {
    #[error("No usable Python interpreter found")]
    InterpreterNotFound,

    #[error("Recommendation script not found")]
    ScriptNotFound,

    #[error("Recommendation dataset not found")]
    DatasetNotFound,
}

/// Host-specific interpreter search lists, chosen once at startup
#[derive(Debug, Clone)]
pub struct PlatformCandidates {
    pub commands: Vec<String>,
    pub paths: Vec<PathBuf>,
}

/// Interpreter commands tried on every host, in order
pub const INTERPRETER_COMMANDS: [&str; 6] = ["python3", "python", "py", "python3.11", "python3.10", "python3.9"];

impl PlatformCandidates {
    pub fn for_host() -> Self {
        if cfg!(windows) {
            Self::windows()
        } else {
            Self::unix()
        }
    }

    pub fn unix() -> Self {
        let mut paths: Vec<PathBuf> = [
            "/usr/bin/python3",
            "/usr/local/bin/python3",
            "/opt/homebrew/bin/python3",
            "/usr/bin/python3.11",
            "/usr/bin/python3.10",
            "/usr/bin/python3.9",
            "/usr/local/bin/python3.11",
            "/usr/local/bin/python3.10",
            "/usr/local/opt/python@3.11/bin/python3",
            "/usr/local/opt/python@3.10/bin/python3",
            "/opt/python3/bin/python3",
            "/snap/bin/python3",
        ]
        .iter()
        .map(PathBuf::from)
        .collect();

        if let Some(home) = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
            paths.push(Path::new(&home).join(".pyenv").join("shims").join("python3"));
        }

        Self {
            commands: default_commands(),
            paths,
        }
    }

    pub fn windows() -> Self {
        let mut paths: Vec<PathBuf> = [
            r"C:\Python311\python.exe",
            r"C:\Python310\python.exe",
            r"C:\Python39\python.exe",
            r"C:\Python312\python.exe",
            r"C:\Program Files\Python311\python.exe",
            r"C:\Program Files\Python310\python.exe",
            r"C:\Program Files\Python39\python.exe",
            r"C:\Program Files\Python312\python.exe",
            r"C:\Program Files (x86)\Python311\python.exe",
            r"C:\Program Files (x86)\Python310\python.exe",
        ]
        .iter()
        .map(PathBuf::from)
        .collect();

        if let Ok(user) = std::env::var("USERNAME") {
            paths.extend(["Python311", "Python310"].iter().map(|version| {
                PathBuf::from(format!(
                    r"C:\Users\{}\AppData\Local\Programs\Python\{}\python.exe",
                    user, version
                ))
            }));
        }

        Self {
            commands: default_commands(),
            paths,
        }
    }

    /// Command names first, then absolute paths
    pub fn interpreters(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.commands
            .iter()
            .map(PathBuf::from)
            .chain(self.paths.iter().cloned())
    }
}

fn default_commands() -> Vec<String> {
    INTERPRETER_COMMANDS.iter().map(|c| c.to_string()).collect()
}

/// Checks whether an interpreter candidate can run the scorer
#[async_trait]
pub trait InterpreterProbe: Send + Sync {
    /// Text printed by `<candidate> --version`, `None` if it could not run
    async fn version(&self, candidate: &Path) -> Option<String>;

    /// Whether `<candidate>` can import every module in `modules`
    async fn has_modules(&self, candidate: &Path, modules: &[&str]) -> bool;
}

/// Probe that runs the candidate as a child process
pub struct ProcessProbe {
    timeout: Duration,
}

impl ProcessProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn run(&self, candidate: &Path, args: &[&str]) -> Option<std::process::Output> {
        let child = Command::new(candidate)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .ok()?;

        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => Some(output),
            Ok(Err(e)) => {
                tracing::debug!("Probe of {} failed: {}", candidate.display(), e);
                None
            }
            Err(_) => {
                tracing::debug!("Probe of {} timed out after {:?}", candidate.display(), self.timeout);
                None
            }
        }
    }
}

#[async_trait]
impl InterpreterProbe for ProcessProbe {
    async fn version(&self, candidate: &Path) -> Option<String> {
        let output = self.run(candidate, &["--version"]).await?;
        if !output.status.success() {
            return None;
        }
        // Older interpreters print the version on stderr
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Some(text)
    }

    async fn has_modules(&self, candidate: &Path, modules: &[&str]) -> bool {
        let statement = format!("import {}", modules.join(", "));
        self.run(candidate, &["-c", &statement])
            .await
            .map(|output| output.status.success())
            .unwrap_or(false)
    }
}

/// Extract `(major, minor)` from text like `Python 3.10.12`
pub fn parse_python_version(text: &str) -> Option<(u32, u32)> {
    let mut tokens = text.split_whitespace();
    let version = tokens
        .by_ref()
        .skip_while(|t| !t.eq_ignore_ascii_case("python"))
        .nth(1)?;

    let mut parts = version.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts
        .next()?
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect::<String>()
        .parse()
        .ok()?;
    Some((major, minor))
}

/// Python 3.8 or newer
pub fn is_supported_version(version: (u32, u32)) -> bool {
    version.0 == 3 && version.1 >= 8
}

/// Locates the interpreter, script and dataset the external scorer needs
pub struct EnvironmentResolver {
    probe: Arc<dyn InterpreterProbe>,
    candidates: PlatformCandidates,
    interpreter_override: Option<PathBuf>,
    app_root: PathBuf,
}

impl EnvironmentResolver {
    pub fn new(
        probe: Arc<dyn InterpreterProbe>,
        candidates: PlatformCandidates,
        app_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            probe,
            candidates,
            interpreter_override: None,
            app_root: app_root.into(),
        }
    }

    /// Interpreter tried before the search lists
    pub fn with_override(mut self, interpreter: Option<PathBuf>) -> Self {
        self.interpreter_override = interpreter.filter(|p| !p.as_os_str().is_empty());
        self
    }

    pub fn app_root(&self) -> &Path {
        &self.app_root
    }

    /// Find the first interpreter that is Python >= 3.8 with the required modules
    pub async fn resolve_interpreter(&self) -> Result<PathBuf, EnvironmentError> {
        if let Some(explicit) = &self.interpreter_override {
            if self.is_usable(explicit).await {
                tracing::debug!("Using interpreter from {}: {}", INTERPRETER_OVERRIDE_VAR, explicit.display());
                return Ok(explicit.clone());
            }
            tracing::warn!(
                "{} is set to {} but it is not usable, searching defaults",
                INTERPRETER_OVERRIDE_VAR,
                explicit.display()
            );
        }

        let mut tried = Vec::new();
        for candidate in self.candidates.interpreters() {
            if self.is_usable(&candidate).await {
                tracing::debug!("Resolved interpreter: {}", candidate.display());
                return Ok(candidate);
            }
            tried.push(candidate);
        }

        tracing::warn!(
            "No usable Python interpreter found (override: {:?}), tried: {:?}",
            self.interpreter_override,
            tried
        );
        Err(EnvironmentError::InterpreterNotFound)
    }

    async fn is_usable(&self, candidate: &Path) -> bool {
        let Some(text) = self.probe.version(candidate).await else {
            return false;
        };

        match parse_python_version(&text) {
            Some(version) if is_supported_version(version) => {
                self.probe.has_modules(candidate, &REQUIRED_MODULES).await
            }
            other => {
                tracing::debug!("Rejecting {}: version {:?}", candidate.display(), other);
                false
            }
        }
    }

    /// Script locations, searched in this order
    pub fn script_candidates(&self) -> Vec<PathBuf> {
        let root = &self.app_root;
        let storage = root.join("storage");
        vec![
            root.join("public").join("python").join(SCRIPT_FILE),
            root.join(SCRIPT_FILE),
            root.join("python").join(SCRIPT_FILE),
            root.join("public").join(SCRIPT_FILE),
            storage.join("app").join("python").join(SCRIPT_FILE),
            storage.join("app").join(SCRIPT_FILE),
            storage.join(SCRIPT_FILE),
            storage.join("python").join(SCRIPT_FILE),
            root.join("ml").join(SCRIPT_FILE),
            root.join("scripts").join(SCRIPT_FILE),
        ]
    }

    /// First existing, readable script
    pub async fn resolve_script(&self) -> Result<PathBuf, EnvironmentError> {
        let candidates = self.script_candidates();
        for candidate in &candidates {
            if readable_file_size(candidate).await.is_some() {
                tracing::debug!("Resolved scorer script: {}", candidate.display());
                return Ok(candidate.clone());
            }
        }

        tracing::warn!("Recommendation script not found, tried: {:?}", candidates);
        Err(EnvironmentError::ScriptNotFound)
    }

    /// Dataset locations, searched in this order. The first sits next to the script.
    pub fn dataset_candidates(&self, script: &Path) -> Vec<PathBuf> {
        let root = &self.app_root;
        let script_dir = script.parent().unwrap_or(root);
        let candidates = [
            script_dir.join(DATASET_FILE),
            root.join(DATASET_FILE),
            root.join("public").join("python").join(DATASET_FILE),
            root.join("public").join(DATASET_FILE),
            root.join("storage").join("app").join(DATASET_FILE),
            root.join("storage").join(DATASET_FILE),
            root.join("data").join(DATASET_FILE),
            root.join("datasets").join(DATASET_FILE),
        ];

        // The script directory is often one of the fixed locations
        let mut unique = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if !unique.contains(&candidate) {
                unique.push(candidate);
            }
        }
        unique
    }

    /// First readable dataset larger than [`MIN_DATASET_BYTES`]
    pub async fn resolve_dataset(&self, script: &Path) -> Result<PathBuf, EnvironmentError> {
        let candidates = self.dataset_candidates(script);
        for candidate in &candidates {
            match readable_file_size(candidate).await {
                Some(size) if size > MIN_DATASET_BYTES => {
                    tracing::debug!("Resolved dataset: {} ({} bytes)", candidate.display(), size);
                    return Ok(candidate.clone());
                }
                Some(size) => {
                    tracing::debug!("Skipping placeholder dataset {} ({} bytes)", candidate.display(), size);
                }
                None => {}
            }
        }

        tracing::warn!("Recommendation dataset not found, tried: {:?}", candidates);
        Err(EnvironmentError::DatasetNotFound)
    }
}

/// Size of `path` if it is a regular file that can be opened for reading
async fn readable_file_size(path: &Path) -> Option<u64> {
    let metadata = tokio::fs::metadata(path).await.ok()?;
    if !metadata.is_file() {
        return None;
    }
    tokio::fs::File::open(path).await.ok()?;
    Some(metadata.len())
}
