//! Service context bundling all port trait objects.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::adapters::live::{GitHubHost, HttpLlmTransport, LiveClock};
use crate::adapters::recording::{RecordingClock, RecordingLlmTransport, RecordingRepoHost};
use crate::adapters::replaying::{ReplayingClock, ReplayingLlmTransport, ReplayingRepoHost};
use crate::cassette::config::CassetteConfig;
use crate::cassette::format::Cassette;
use crate::cassette::replayer::CassetteReplayer;
use crate::cassette::session::RecordingSession;
use crate::ports::{Clock, LlmRequest, LlmResponse, LlmTransport, PortFuture, RepoHost, TreeListing};
use crate::settings::NetworkSettings;

/// Bundles the port trait objects and network settings.
///
/// Ports are reference counted so a context can be cloned into a spawned
/// pipeline task.
#[derive(Clone)]
pub struct ServiceContext {
    /// Clock for chat turn timestamps.
    pub clock: Arc<dyn Clock>,
    /// Repository host for tree listings and raw file content.
    pub host: Arc<dyn RepoHost>,
    /// Transport for provider requests.
    pub llm: Arc<dyn LlmTransport>,
    /// Endpoints, timeouts and retry budget.
    pub network: NetworkSettings,
}

struct LiveAdapters {
    host: GitHubHost,
    llm: HttpLlmTransport,
}

fn live_adapters(network: &NetworkSettings) -> Result<LiveAdapters, String> {
    let host = GitHubHost::new(
        &network.github_api_base,
        Duration::from_secs(network.host_timeout_secs),
    )
    .map_err(|e| format!("Failed to build repository host client: {e}"))?;
    let llm = HttpLlmTransport::new(Duration::from_secs(network.provider_timeout_secs))
        .map_err(|e| format!("Failed to build provider client: {e}"))?;
    Ok(LiveAdapters { host, llm })
}

impl ServiceContext {
    /// Creates a live context talking to the real repository host and provider.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built.
    pub fn live(network: &NetworkSettings) -> Result<Self, String> {
        let live = live_adapters(network)?;
        Ok(Self {
            clock: Arc::new(LiveClock),
            host: Arc::new(live.host),
            llm: Arc::new(live.llm),
            network: network.clone(),
        })
    }

    /// Creates a live context whose interactions are captured into a new
    /// recording session under `root`.
    ///
    /// This is the developer-only mechanism behind `DOCKERIZE_RECORD`.
    ///
    /// # Errors
    ///
    /// Returns an error if the session directory or an HTTP client cannot be created.
    pub fn recording_at(
        network: &NetworkSettings,
        root: &Path,
    ) -> Result<(Self, RecordingSession), String> {
        let session = RecordingSession::new(root)?;
        let live = live_adapters(network)?;

        let ctx = Self {
            clock: Arc::new(RecordingClock::new(Box::new(LiveClock), Arc::clone(&session.clock))),
            host: Arc::new(RecordingRepoHost::new(Box::new(live.host), Arc::clone(&session.host))),
            llm: Arc::new(RecordingLlmTransport::new(Box::new(live.llm), Arc::clone(&session.llm))),
            network: network.clone(),
        };
        Ok((ctx, session))
    }

    /// Creates a replaying context from a single cassette holding every port.
    ///
    /// Each port gets its own replayer so per-port cursors are independent.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be read or parsed.
    pub fn replaying(path: &Path, network: &NetworkSettings) -> Result<Self, String> {
        let cassette = Cassette::load(path)?;
        Ok(Self {
            clock: Arc::new(ReplayingClock::new(CassetteReplayer::new(&cassette))),
            host: Arc::new(ReplayingRepoHost::new(CassetteReplayer::new(&cassette))),
            llm: Arc::new(ReplayingLlmTransport::new(CassetteReplayer::new(&cassette))),
            network: network.clone(),
        })
    }

    /// Creates a replaying context from per-port cassette files.
    ///
    /// Ports without a configured cassette use an adapter that panics with a
    /// clear message when called.
    ///
    /// # Errors
    ///
    /// Returns an error if any configured cassette file cannot be read or parsed.
    pub fn replaying_from(config: &CassetteConfig, network: &NetworkSettings) -> Result<Self, String> {
        let replayers = config.load_all()?;

        Ok(Self {
            clock: match replayers.clock {
                Some(r) => Arc::new(ReplayingClock::new(r)),
                None => Arc::new(PanickingClock),
            },
            host: match replayers.host {
                Some(r) => Arc::new(ReplayingRepoHost::new(r)),
                None => Arc::new(PanickingRepoHost),
            },
            llm: match replayers.llm {
                Some(r) => Arc::new(ReplayingLlmTransport::new(r)),
                None => Arc::new(PanickingLlmTransport),
            },
            network: network.clone(),
        })
    }
}

// --- Panicking adapters for unspecified ports ---

struct PanickingClock;
impl Clock for PanickingClock {
    fn now(&self) -> DateTime<Utc> {
        panic!("Clock port not configured in CassetteConfig; no cassette loaded for clock");
    }
}

struct PanickingRepoHost;
impl RepoHost for PanickingRepoHost {
    fn list_tree<'a>(&'a self, _: &'a str, _: &'a str, _: &'a str) -> PortFuture<'a, TreeListing> {
        panic!("RepoHost port not configured in CassetteConfig; no cassette loaded for host");
    }

    fn raw_file<'a>(&'a self, _url: &'a str) -> PortFuture<'a, String> {
        panic!("RepoHost port not configured in CassetteConfig; no cassette loaded for host");
    }
}

struct PanickingLlmTransport;
impl LlmTransport for PanickingLlmTransport {
    fn send(&self, _request: &LlmRequest) -> PortFuture<'_, LlmResponse> {
        panic!("LlmTransport port not configured in CassetteConfig; no cassette loaded for llm");
    }
}
