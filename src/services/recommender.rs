use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tempfile::NamedTempFile;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::core::{parse_scorer_output, FallbackScorer, ScorerOutput};
use crate::models::{Provenance, RecommendationRequest, RecommendationResult, ScorerPayload};
use crate::services::environment::{EnvironmentError, EnvironmentResolver};
use crate::services::runner::{RunLimits, RunOutput, RunnerError, ScorerRunner};

/// Recommendation entries must be longer than this after trimming
pub const MIN_RECOMMENDATION_CHARS: usize = 2;

/// Errors surfaced by [`Recommender::recommend`]
#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("Invalid recommendation request: {0}")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    EnvironmentUnavailable(#[from] EnvironmentError),

    #[error("Failed to prepare scorer input: {0}")]
    Input(#[source] std::io::Error),

    #[error("External scorer produced no output")]
    EmptyOutput,

    #[error("External scorer failed: {0}")]
    Runner(RunnerError),

    #[error("External model error: {0}")]
    ExternalModel(String),
}

/// One subprocess call. The input file is removed when this is dropped.
pub struct ExternalScorerInvocation {
    pub interpreter: PathBuf,
    pub script: PathBuf,
    pub dataset: PathBuf,
    pub limits: RunLimits,
    input: NamedTempFile,
}

impl ExternalScorerInvocation {
    /// Write `payload` to a fresh, uniquely named temp file
    pub fn prepare(
        interpreter: PathBuf,
        script: PathBuf,
        dataset: PathBuf,
        payload: &ScorerPayload,
        limits: RunLimits,
    ) -> std::io::Result<Self> {
        let mut input = tempfile::Builder::new()
            .prefix("recommend_")
            .suffix(".json")
            .tempfile()?;
        serde_json::to_writer(&mut input, payload)?;
        input.flush()?;

        Ok(Self {
            interpreter,
            script,
            dataset,
            limits,
            input,
        })
    }

    pub fn input_path(&self) -> &Path {
        self.input.path()
    }

    pub async fn run(&self, runner: &dyn ScorerRunner) -> Result<RunOutput, RunnerError> {
        runner
            .run(&self.interpreter, &self.script, self.input_path(), &self.limits)
            .await
    }
}

/// Orchestrates the external scorer with the keyword fallback.
pub struct Recommender {
    resolver: EnvironmentResolver,
    runner: Arc<dyn ScorerRunner>,
    fallback: FallbackScorer,
    limits: RunLimits,
    max_results: usize,
}

impl Recommender {
    pub fn new(
        resolver: EnvironmentResolver,
        runner: Arc<dyn ScorerRunner>,
        fallback: FallbackScorer,
        limits: RunLimits,
        max_results: usize,
    ) -> Self {
        Self {
            resolver,
            runner,
            fallback,
            limits,
            max_results,
        }
    }

    pub fn fallback(&self) -> &FallbackScorer {
        &self.fallback
    }

    /// Produce recommendations for `request`.
    ///
    /// A missing tool chain is an error. Output that can't be parsed, or
    /// that yields nothing after filtering, is served by the fallback scorer.
    pub async fn recommend(
        &self,
        mut request: RecommendationRequest,
    ) -> Result<RecommendationResult, RecommendError> {
        let started = Instant::now();

        request.normalize();
        request.validate()?;

        let interpreter = self.resolver.resolve_interpreter().await?;
        let script = self.resolver.resolve_script().await?;
        // Not passed to the scorer; its presence means the environment is provisioned
        let dataset = self.resolver.resolve_dataset(&script).await?;

        let invocation = ExternalScorerInvocation::prepare(
            interpreter,
            script,
            dataset,
            &request.to_payload(),
            self.limits,
        )
        .map_err(RecommendError::Input)?;

        let run = invocation.run(self.runner.as_ref()).await;
        drop(invocation);

        let run = match run {
            Ok(run) => run,
            Err(RunnerError::TimedOut(limit)) => {
                tracing::error!("External scorer timed out after {:?}", limit);
                return Err(RecommendError::EmptyOutput);
            }
            Err(e) => {
                tracing::error!("External scorer could not run: {}", e);
                return Err(RecommendError::Runner(e));
            }
        };

        if run.output.trim().is_empty() {
            tracing::error!("External scorer exited with {:?} and no output", run.exit_code);
            return Err(RecommendError::EmptyOutput);
        }

        match parse_scorer_output(&run.output) {
            ScorerOutput::ExternalError(message) => {
                tracing::error!("External model reported an error: {}", message);
                Err(RecommendError::ExternalModel(message))
            }
            ScorerOutput::Unparseable => {
                log_unparseable_run(&run, self.limits.memory_limit_mb);
                tracing::warn!("No structured result in scorer output, using fallback");
                Ok(self.fallback_result(&request, started))
            }
            ScorerOutput::Recommendations(items) => {
                let recommendations = clean_recommendations(items, self.max_results);
                if recommendations.is_empty() {
                    tracing::warn!("Scorer returned no usable recommendations, using fallback");
                    return Ok(self.fallback_result(&request, started));
                }

                tracing::info!(
                    "Served {} recommendations from external model in {:?}",
                    recommendations.len(),
                    run.duration
                );
                Ok(RecommendationResult {
                    recommendations,
                    provenance: Provenance::ExternalModel,
                    duration: run.duration,
                })
            }
        }
    }

    fn fallback_result(&self, request: &RecommendationRequest, started: Instant) -> RecommendationResult {
        let recommendations = self.fallback.recommend(&request.skills);
        let duration = started.elapsed();

        tracing::info!(
            "Served {} recommendations from fallback heuristic in {:?}",
            recommendations.len(),
            duration
        );

        RecommendationResult {
            recommendations,
            provenance: Provenance::FallbackHeuristic,
            duration,
        }
    }
}

/// Whether the scorer died allocating memory, usually the address-space ceiling
pub fn hit_memory_ceiling(output: &str) -> bool {
    output.contains("MemoryError") || output.contains("Cannot allocate memory")
}

fn log_unparseable_run(run: &RunOutput, memory_limit_mb: u64) {
    if run.exit_code == Some(0) {
        return;
    }

    if hit_memory_ceiling(&run.output) {
        tracing::warn!(
            "Scorer exited with {:?} after running out of memory (ceiling {} MB); raise scorer.memory_limit_mb",
            run.exit_code,
            memory_limit_mb
        );
    } else {
        let tail: Vec<&str> = run.output.lines().rev().take(5).collect();
        tracing::debug!(
            "Scorer exited with {:?} and unparseable output, last lines: {:?}",
            run.exit_code,
            tail
        );
    }
}

/// Trim entries, drop those of two characters or fewer, keep the first `max`
pub fn clean_recommendations(items: Vec<String>, max: usize) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| item.chars().count() > MIN_RECOMMENDATION_CHARS)
        .take(max)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_recommendations_filters_and_caps() {
        let items = vec![
            "  Data Scientist ".to_string(),
            "QA".to_string(),
            "   ".to_string(),
            "Web Developer".to_string(),
            "DBA".to_string(),
            "Cloud Engineer".to_string(),
            "DevOps Engineer".to_string(),
            "Game Developer".to_string(),
        ];

        let cleaned = clean_recommendations(items, 5);

        assert_eq!(
            cleaned,
            vec!["Data Scientist", "Web Developer", "DBA", "Cloud Engineer", "DevOps Engineer"]
        );
    }

    #[test]
    fn test_memory_errors_are_recognized() {
        let traceback = "Traceback (most recent call last):\n  File \"recommendation.py\", line 40\nnumpy.core._exceptions._ArrayMemoryError: Unable to allocate 3.1 GiB\nMemoryError";
        assert!(hit_memory_ceiling(traceback));
        assert!(hit_memory_ceiling("OpenBLAS: pthread_create failed: Cannot allocate memory"));
        assert!(!hit_memory_ceiling("KeyError: 'skills'"));
    }

    #[test]
    fn test_clean_recommendations_all_short() {
        let cleaned = clean_recommendations(vec!["a".to_string(), " ab ".to_string()], 5);
        assert!(cleaned.is_empty());
    }

    #[test]
    fn test_invocation_input_file_is_removed_on_drop() {
        let payload = RecommendationRequest {
            skills: vec!["python".to_string()],
            interests: vec!["AI".to_string()],
            ..Default::default()
        }
        .to_payload();

        let invocation = ExternalScorerInvocation::prepare(
            PathBuf::from("python3"),
            PathBuf::from("recommendation.py"),
            PathBuf::from("df_upsampled.csv"),
            &payload,
            RunLimits::default(),
        )
        .unwrap();

        let path = invocation.input_path().to_path_buf();
        let written: ScorerPayload =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, payload);
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("recommend_"));

        drop(invocation);
        assert!(!path.exists());
    }
}
