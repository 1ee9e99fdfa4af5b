//! The analysis pipeline: tree, filter, content, provider.
//!
//! A [`Pipeline`] walks `Idle -> FetchingTree -> FetchingContent ->
//! AnalyzingWithProvider -> Complete`, or jumps to `Error` on the first
//! unrecovered failure. It is consumed by [`Pipeline::run`]; retrying means
//! building a new one.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::context::ServiceContext;
use crate::error::AnalysisError;
use crate::model::{AnalysisResult, ProviderConfig, RepositoryRef};
use crate::provider::{self, Provider};
use crate::repo::{fetch_all, fetch_tree, select};

/// Pipeline state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Not started.
    Idle,
    /// Probing branches for a tree listing.
    FetchingTree,
    /// Downloading the selected files.
    FetchingContent,
    /// Waiting on the provider.
    AnalyzingWithProvider,
    /// Finished with a result.
    Complete,
    /// Finished with a failure.
    Error,
}

impl Stage {
    /// `Complete` and `Error` are terminal.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Error)
    }

    fn rank(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::FetchingTree => 1,
            Self::FetchingContent => 2,
            Self::AnalyzingWithProvider => 3,
            Self::Complete | Self::Error => 4,
        }
    }

    /// Whether `next` is a legal transition from `self`.
    #[must_use]
    pub fn can_advance_to(self, next: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        match next {
            Self::Error => true,
            Self::Complete => self == Self::AnalyzingWithProvider,
            _ => next.rank() == self.rank() + 1,
        }
    }
}

/// Progress published while a pipeline runs.
#[derive(Debug, Clone, PartialEq)]
pub enum StageEvent {
    /// Tree listing started.
    TreeFetchStarted,
    /// Content download started for this many selected files.
    ContentFetchStarted {
        /// Number of files selected by the importance filter.
        file_count: usize,
    },
    /// The provider request is about to be sent.
    ProviderCallStarted {
        /// Model the request goes to.
        model: String,
    },
    /// Terminal success.
    Complete(Box<Analysis>),
    /// Terminal failure.
    Error {
        /// Human-readable description of the failure.
        message: String,
    },
}

impl StageEvent {
    /// The stage this event enters.
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            Self::TreeFetchStarted => Stage::FetchingTree,
            Self::ContentFetchStarted { .. } => Stage::FetchingContent,
            Self::ProviderCallStarted { .. } => Stage::AnalyzingWithProvider,
            Self::Complete(_) => Stage::Complete,
            Self::Error { .. } => Stage::Error,
        }
    }
}

/// Everything a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    /// Identifier of the run, also attached to its log span.
    pub run_id: Uuid,
    /// The repository, with the confirmed branch.
    pub repository: RepositoryRef,
    /// Paths of the files sent to the provider, in selection order.
    pub files: Vec<String>,
    /// The provider's artifact.
    pub result: AnalysisResult,
}

/// One analysis run.
pub struct Pipeline {
    stage: Stage,
    events: Option<UnboundedSender<StageEvent>>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    /// A pipeline that publishes nothing.
    #[must_use]
    pub fn new() -> Self {
        Self { stage: Stage::Idle, events: None }
    }

    /// A pipeline that publishes each transition on `events`.
    #[must_use]
    pub fn with_events(events: UnboundedSender<StageEvent>) -> Self {
        Self { stage: Stage::Idle, events: Some(events) }
    }

    fn advance(&mut self, event: StageEvent) {
        let next = event.stage();
        debug_assert!(
            self.stage.can_advance_to(next),
            "illegal stage transition {:?} -> {next:?}",
            self.stage
        );
        debug!(from = ?self.stage, to = ?next, "stage transition");
        self.stage = next;
        if let Some(events) = &self.events {
            // A dropped receiver only means nobody is watching.
            let _ = events.send(event);
        }
    }

    fn fail(&mut self, err: AnalysisError) -> AnalysisError {
        warn!(error = %err, "analysis failed");
        self.advance(StageEvent::Error { message: err.to_string() });
        err
    }

    /// Runs the pipeline for `repo`, making exactly one provider call.
    ///
    /// # Errors
    ///
    /// Returns the first failure of any stage; no partial result is produced.
    pub async fn run(
        mut self,
        ctx: &ServiceContext,
        mut repo: RepositoryRef,
        provider: &dyn Provider,
    ) -> Result<Analysis, AnalysisError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("analysis", %run_id, repo = %repo.slug());

        async move {
            self.advance(StageEvent::TreeFetchStarted);
            info!("Scanning file structure...");
            let tree = match fetch_tree(ctx.host.as_ref(), &ctx.network.github_raw_base, &mut repo)
                .await
            {
                Ok(tree) => tree,
                Err(e) => return Err(self.fail(e)),
            };

            let selected = select(&tree);
            info!(entries = tree.len(), selected = selected.len(), "Reading configuration files...");
            self.advance(StageEvent::ContentFetchStarted { file_count: selected.len() });
            let files = fetch_all(ctx.host.as_ref(), selected).await;

            info!(model = provider.model(), "Consulting {}...", provider.model());
            self.advance(StageEvent::ProviderCallStarted { model: provider.model().to_string() });
            let result = match provider.generate_artifact(&repo.name, &files).await {
                Ok(result) => result,
                Err(e) => return Err(self.fail(e)),
            };

            let analysis = Analysis {
                run_id,
                repository: repo,
                files: files.into_iter().map(|f| f.entry.path).collect(),
                result,
            };
            info!("analysis complete");
            self.advance(StageEvent::Complete(Box::new(analysis.clone())));
            Ok(analysis)
        }
        .instrument(span)
        .await
    }
}

/// Runs a full analysis and returns its outcome directly.
///
/// # Errors
///
/// `InvalidConfig` when no provider can be built, otherwise the first
/// failing stage's error.
pub async fn analyze(
    ctx: &ServiceContext,
    repo: RepositoryRef,
    config: &ProviderConfig,
) -> Result<Analysis, AnalysisError> {
    let provider = provider::build(config, ctx.llm.clone(), ctx.network.transport_retries)?;
    Pipeline::new().run(ctx, repo, provider.as_ref()).await
}

/// Starts an analysis on the current runtime and returns its event stream.
///
/// The stream ends after exactly one terminal event (`Complete` or `Error`).
#[must_use]
pub fn run_analysis(
    ctx: &ServiceContext,
    repo: RepositoryRef,
    config: &ProviderConfig,
) -> UnboundedReceiver<StageEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    let ctx = ctx.clone();
    let config = config.clone();

    tokio::spawn(async move {
        let provider =
            match provider::build(&config, ctx.llm.clone(), ctx.network.transport_retries) {
                Ok(provider) => provider,
                Err(e) => {
                    let _ = tx.send(StageEvent::Error { message: e.to_string() });
                    return;
                }
            };
        // The outcome is also delivered as the terminal event.
        let _ = Pipeline::with_events(tx).run(&ctx, repo, provider.as_ref()).await;
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::replaying::{
        replayer_from, ReplayingClock, ReplayingLlmTransport, ReplayingRepoHost,
    };
    use crate::cassette::format::Interaction;
    use crate::model::{Credential, ProviderKind};
    use crate::settings::NetworkSettings;
    use serde_json::json;
    use std::sync::Arc;

    const RESULT_JSON: &str = r#"{"dockerfile":"FROM python:3.11-slim","dockerCompose":"","readmeSummary":"x","instructions":"y","detectedDependencies":["flask"],"healthCheckSuggestion":"z"}"#;

    fn host_call(seq: u64, method: &str, output: serde_json::Value) -> Interaction {
        Interaction { seq, port: "host".into(), method: method.into(), input: json!({}), output }
    }

    fn gemini_reply(text: &str) -> serde_json::Value {
        let body = json!({"candidates": [{"content": {"parts": [{"text": text}]}}]}).to_string();
        json!({"ok": {"status": 200, "body": body}})
    }

    fn context(host: Vec<Interaction>, llm: Vec<serde_json::Value>) -> ServiceContext {
        let llm = llm
            .into_iter()
            .enumerate()
            .map(|(seq, output)| Interaction {
                seq: seq as u64,
                port: "llm".into(),
                method: "send".into(),
                input: json!({}),
                output,
            })
            .collect();
        ServiceContext {
            clock: Arc::new(ReplayingClock::new(replayer_from(vec![]))),
            host: Arc::new(ReplayingRepoHost::new(replayer_from(host))),
            llm: Arc::new(ReplayingLlmTransport::new(replayer_from(llm))),
            network: NetworkSettings::default(),
        }
    }

    fn repo() -> RepositoryRef {
        RepositoryRef {
            owner: "acme".into(),
            name: "widgets".into(),
            branch: None,
            source_url: "https://github.com/acme/widgets".into(),
        }
    }

    fn config() -> ProviderConfig {
        ProviderConfig {
            provider: ProviderKind::Gemini,
            credential: Credential::new("test-key"),
            model: "gemini-2.5-flash".into(),
            endpoint_base: None,
        }
    }

    fn tree_with(paths: &[&str]) -> serde_json::Value {
        let tree: Vec<_> = paths.iter().map(|p| json!({"path": p, "type": "blob"})).collect();
        json!({"ok": {"tree": tree, "truncated": false}})
    }

    async fn collect(mut rx: UnboundedReceiver<StageEvent>) -> Vec<StageEvent> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    #[test]
    fn stages_only_move_forward() {
        assert!(Stage::Idle.can_advance_to(Stage::FetchingTree));
        assert!(Stage::FetchingTree.can_advance_to(Stage::FetchingContent));
        assert!(Stage::AnalyzingWithProvider.can_advance_to(Stage::Complete));
        assert!(Stage::FetchingContent.can_advance_to(Stage::Error));

        assert!(!Stage::Idle.can_advance_to(Stage::Complete));
        assert!(!Stage::FetchingContent.can_advance_to(Stage::FetchingTree));
        assert!(!Stage::Complete.can_advance_to(Stage::Error));
        assert!(!Stage::Error.can_advance_to(Stage::FetchingTree));
    }

    #[tokio::test]
    async fn end_to_end_run_publishes_every_stage() {
        let ctx = context(
            vec![
                host_call(0, "list_tree", tree_with(&["Dockerfile", "src/main.py", "requirements.txt"])),
                host_call(1, "raw_file", json!({"ok": "FROM python:3.11"})),
                host_call(2, "raw_file", json!({"ok": "flask"})),
            ],
            vec![gemini_reply(RESULT_JSON)],
        );

        let events = collect(run_analysis(&ctx, repo(), &config())).await;
        assert_eq!(events.len(), 4);
        assert_eq!(events[0], StageEvent::TreeFetchStarted);
        assert_eq!(events[1], StageEvent::ContentFetchStarted { file_count: 2 });
        assert_eq!(
            events[2],
            StageEvent::ProviderCallStarted { model: "gemini-2.5-flash".into() }
        );
        let stages: Vec<Stage> = events.iter().map(StageEvent::stage).collect();
        assert!(stages.windows(2).all(|w| w[0].can_advance_to(w[1])));
        assert!(stages[3].is_terminal());
        let StageEvent::Complete(analysis) = &events[3] else {
            panic!("expected Complete, got {:?}", events[3]);
        };
        assert_eq!(analysis.files, vec!["Dockerfile".to_string(), "requirements.txt".to_string()]);
        assert_eq!(analysis.repository.branch.as_deref(), Some("main"));
        assert_eq!(analysis.result.detected_dependencies, vec!["flask".to_string()]);
    }

    #[tokio::test]
    async fn tree_failure_ends_in_single_error_event() {
        let ctx = context(
            vec![
                host_call(0, "list_tree", json!({"err": "404 Not Found"})),
                host_call(1, "list_tree", json!({"err": "404 Not Found"})),
            ],
            vec![],
        );

        let events = collect(run_analysis(&ctx, repo(), &config())).await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], StageEvent::TreeFetchStarted);
        let StageEvent::Error { message } = &events[1] else {
            panic!("expected Error, got {:?}", events[1]);
        };
        assert!(message.contains("Could not fetch repository structure"));
    }

    #[tokio::test]
    async fn provider_failure_yields_no_partial_result() {
        let ctx = context(
            vec![
                host_call(0, "list_tree", tree_with(&["requirements.txt"])),
                host_call(1, "raw_file", json!({"ok": "flask"})),
            ],
            vec![json!({"ok": {"status": 500, "body": "internal"}})],
        );

        let err = analyze(&ctx, repo(), &config()).await.unwrap_err();
        assert_eq!(err.to_string(), "Provider Error (500): internal");
    }

    #[tokio::test]
    async fn unbuildable_provider_reports_error_event() {
        let ctx = context(vec![], vec![]);
        let config = ProviderConfig {
            provider: ProviderKind::Custom,
            credential: Credential::new("k"),
            model: "llama3".into(),
            endpoint_base: None,
        };

        let events = collect(run_analysis(&ctx, repo(), &config)).await;
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], StageEvent::Error { message } if message.contains("base URL")));
    }

    #[tokio::test]
    async fn failed_content_fetch_still_reaches_provider() {
        let ctx = context(
            vec![
                host_call(0, "list_tree", tree_with(&["Dockerfile", "requirements.txt"])),
                host_call(1, "raw_file", json!({"err": "connection reset"})),
                host_call(2, "raw_file", json!({"ok": "flask"})),
            ],
            vec![gemini_reply(RESULT_JSON)],
        );

        let analysis = analyze(&ctx, repo(), &config()).await.unwrap();
        assert_eq!(analysis.files.len(), 2);
    }
}
