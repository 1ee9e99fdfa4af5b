//! `dockerize chat` command and the interactive loop shared with `analyze --chat`.

use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::chat::ChatSession;
use crate::context::ServiceContext;
use crate::model::AnalysisResult;
use crate::pipeline::Analysis;
use crate::provider::{self, Provider};
use crate::settings::{ProviderOverrides, Settings};

/// Execute the `chat` command against a saved analysis.
///
/// # Errors
///
/// Returns an error string if the context file cannot be read, the provider
/// cannot be configured, or the terminal cannot be read or written.
pub async fn run(
    ctx: &ServiceContext,
    settings: &Settings,
    context_path: &Path,
    overrides: &ProviderOverrides,
) -> Result<(), String> {
    let context = load_context(context_path)?;
    let config = settings.resolve(overrides).map_err(|e| e.to_string())?;
    let provider = provider::build(&config, ctx.llm.clone(), ctx.network.transport_retries)
        .map_err(|e| e.to_string())?;

    let stdin = io::stdin();
    converse(ctx, provider.as_ref(), context, stdin.lock(), io::stdout()).await
}

/// Reads an `analysis.json` written by `analyze --out`, or a bare result object.
///
/// # Errors
///
/// Returns an error string if the file cannot be read or has neither shape.
pub fn load_context(path: &Path) -> Result<AnalysisResult, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    if let Ok(analysis) = serde_json::from_str::<Analysis>(&content) {
        return Ok(analysis.result);
    }
    serde_json::from_str::<AnalysisResult>(&content)
        .map_err(|e| format!("{} is not a saved analysis: {e}", path.display()))
}

/// Runs a chat until end of input or `exit`/`quit`.
///
/// # Errors
///
/// Returns an error string if reading input or writing output fails.
pub async fn converse<R, W>(
    ctx: &ServiceContext,
    provider: &dyn Provider,
    context: AnalysisResult,
    input: R,
    mut output: W,
) -> Result<(), String>
where
    R: BufRead,
    W: Write,
{
    let write_err = |e: io::Error| format!("Failed to write output: {e}");
    let mut session = ChatSession::new(context);

    writeln!(output, "Ask about the generated setup (type `exit` to leave).").map_err(write_err)?;
    let mut lines = input.lines();
    loop {
        write!(output, "> ").map_err(write_err)?;
        output.flush().map_err(write_err)?;

        let Some(line) = lines.next() else { break };
        let line = line.map_err(|e| format!("Failed to read input: {e}"))?;
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if matches!(message, "exit" | "quit") {
            break;
        }

        let reply = session.ask(provider, ctx.clock.as_ref(), message).await;
        writeln!(output, "\n{}\n", reply.text).map_err(write_err)?;
    }
    writeln!(output).map_err(write_err)
}
