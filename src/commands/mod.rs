//! Command dispatch and handlers.

pub mod analyze;
pub mod chat;
pub mod config;
pub mod models;
pub mod scan;
pub mod verify;

use std::env;
use std::path::{Path, PathBuf};

use crate::cassette::config::CassetteConfig;
use crate::cassette::session::RecordingSession;
use crate::cli::{Cli, Command};
use crate::context::ServiceContext;
use crate::settings::{NetworkSettings, Settings};

/// Dispatch a parsed command line to its handler.
///
/// When `DOCKERIZE_RECORD` is set to a directory path, all port interactions
/// are recorded to per-port cassette files under that directory. When
/// `DOCKERIZE_REPLAY` is set, interactions are served from a cassette file
/// (or a recorded session directory) instead of the network.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch(cli: &Cli) -> Result<(), String> {
    let config_path = cli.config.clone().unwrap_or_else(Settings::default_path);

    // Commands that never touch the network.
    match &cli.command {
        Command::Config { action } => return config::run(action, &config_path),
        Command::Models { provider } => {
            models::run(*provider);
            return Ok(());
        }
        _ => {}
    }

    let settings = Settings::load(&config_path)?;
    let (ctx, session) = context_from_env(&settings.network)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start async runtime: {e}"))?;
    let result = runtime.block_on(dispatch_with_context(&cli.command, &ctx, &settings));
    // Spawned tasks hold context clones until the runtime is gone.
    drop(runtime);

    // Finish recording after command completes (even on error)
    if let Some(session) = session {
        // Drop context first to release Arc references
        drop(ctx);
        finish_recording(session)?;
    }

    result
}

fn context_from_env(
    network: &NetworkSettings,
) -> Result<(ServiceContext, Option<RecordingSession>), String> {
    if let Some(path) = env::var_os("DOCKERIZE_REPLAY") {
        return Ok((replaying_context(Path::new(&path), network)?, None));
    }
    if let Some(path) = env::var_os("DOCKERIZE_RECORD") {
        let (ctx, session) = ServiceContext::recording_at(network, &PathBuf::from(path))?;
        eprintln!("Recording to: {}", session.output_dir().display());
        return Ok((ctx, Some(session)));
    }
    Ok((ServiceContext::live(network)?, None))
}

/// A single cassette file, or a session directory with per-port cassettes.
fn replaying_context(path: &Path, network: &NetworkSettings) -> Result<ServiceContext, String> {
    if path.is_dir() {
        ServiceContext::replaying_from(&CassetteConfig::from_session_dir(path), network)
    } else {
        ServiceContext::replaying(path, network)
    }
}

/// Dispatch a command with the given service context.
async fn dispatch_with_context(
    command: &Command,
    ctx: &ServiceContext,
    settings: &Settings,
) -> Result<(), String> {
    match command {
        Command::Analyze(args) => analyze::run(ctx, settings, args).await,
        Command::Chat { context, provider } => {
            chat::run(ctx, settings, context, &provider.overrides()).await
        }
        Command::Scan { url } => scan::run(ctx, url).await,
        Command::Verify { provider } => verify::run(ctx, settings, &provider.overrides()).await,
        Command::Config { .. } | Command::Models { .. } => Ok(()),
    }
}

/// Finish a recording session and print the output directory.
fn finish_recording(session: RecordingSession) -> Result<(), String> {
    let output_dir = session.finish()?;
    eprintln!("Recording saved to: {}", output_dir.display());
    Ok(())
}
