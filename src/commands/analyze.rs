//! `dockerize analyze` command.

use std::io;
use std::path::Path;

use crate::cli::AnalyzeArgs;
use crate::context::ServiceContext;
use crate::pipeline::{Analysis, StageEvent};
use crate::provider;
use crate::service::{locate_repository, run_analysis};
use crate::settings::Settings;

/// Execute the `analyze` command.
///
/// Progress goes to stderr; the generated artifacts go to stdout.
///
/// # Errors
///
/// Returns an error string for an invalid URL, an unusable configuration,
/// a failed pipeline stage, or output files that cannot be written.
pub async fn run(ctx: &ServiceContext, settings: &Settings, args: &AnalyzeArgs) -> Result<(), String> {
    let repo = locate_repository(&args.url).map_err(|e| e.to_string())?;
    let config = settings.resolve(&args.provider.overrides()).map_err(|e| e.to_string())?;

    let mut events = run_analysis(ctx, repo, &config);
    let mut analysis = None;
    while let Some(event) = events.recv().await {
        match event {
            StageEvent::TreeFetchStarted => eprintln!("Scanning file structure..."),
            StageEvent::ContentFetchStarted { file_count } => {
                eprintln!("Reading configuration files... ({file_count} selected)");
            }
            StageEvent::ProviderCallStarted { model } => eprintln!("Consulting {model}..."),
            StageEvent::Complete(done) => analysis = Some(*done),
            StageEvent::Error { message } => return Err(message),
        }
    }
    let analysis = analysis.ok_or("Analysis ended without a result")?;

    print_analysis(&analysis);

    if let Some(dir) = &args.out {
        write_outputs(dir, &analysis)?;
        eprintln!("Wrote Dockerfile, docker-compose.yml, INSTRUCTIONS.md and analysis.json to {}", dir.display());
    }

    if args.chat {
        let provider = provider::build(&config, ctx.llm.clone(), ctx.network.transport_retries)
            .map_err(|e| e.to_string())?;
        let stdin = io::stdin();
        super::chat::converse(ctx, provider.as_ref(), analysis.result, stdin.lock(), io::stdout())
            .await?;
    }
    Ok(())
}

fn print_analysis(analysis: &Analysis) {
    let result = &analysis.result;
    let branch = analysis.repository.branch.as_deref().unwrap_or("?");
    println!("Repository: {} ({branch})", analysis.repository.slug());
    println!("Files analyzed: {}", analysis.files.join(", "));

    println!("\n== Summary ==\n{}", result.summary);
    println!("\n== Dockerfile ==\n{}", result.dockerfile);
    if !result.compose_file.trim().is_empty() {
        println!("\n== docker-compose.yml ==\n{}", result.compose_file);
    }
    println!("\n== Instructions ==\n{}", result.instructions);
    if !result.detected_dependencies.is_empty() {
        println!("\n== Detected dependencies ==");
        for dep in &result.detected_dependencies {
            println!("  - {dep}");
        }
    }
    println!("\n== Health check ==\n{}", result.health_check_suggestion);
}

/// Writes the artifacts and the full analysis into `dir`.
///
/// # Errors
///
/// Returns an error string if the directory or a file cannot be written.
pub fn write_outputs(dir: &Path, analysis: &Analysis) -> Result<(), String> {
    std::fs::create_dir_all(dir).map_err(|e| format!("Failed to create {}: {e}", dir.display()))?;

    let write = |name: &str, content: &str| {
        let path = dir.join(name);
        std::fs::write(&path, content).map_err(|e| format!("Failed to write {}: {e}", path.display()))
    };

    let result = &analysis.result;
    write("Dockerfile", &result.dockerfile)?;
    write("docker-compose.yml", &result.compose_file)?;
    write(
        "INSTRUCTIONS.md",
        &format!(
            "# {}\n\n{}\n\n## Build and run\n\n{}\n\n## Health check\n\n{}\n",
            analysis.repository.slug(),
            result.summary,
            result.instructions,
            result.health_check_suggestion
        ),
    )?;
    let json = serde_json::to_string_pretty(analysis)
        .map_err(|e| format!("Failed to serialize analysis: {e}"))?;
    write("analysis.json", &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnalysisResult, RepositoryRef};
    use uuid::Uuid;

    #[test]
    fn write_outputs_creates_all_files() {
        let dir = std::env::temp_dir().join("dockerize_analyze_out_test");
        let _ = std::fs::remove_dir_all(&dir);

        let analysis = Analysis {
            run_id: Uuid::new_v4(),
            repository: RepositoryRef {
                owner: "acme".into(),
                name: "widgets".into(),
                branch: Some("main".into()),
                source_url: "https://github.com/acme/widgets".into(),
            },
            files: vec!["requirements.txt".into()],
            result: AnalysisResult {
                dockerfile: "FROM python:3.11-slim".into(),
                compose_file: "services: {}".into(),
                summary: "A Flask app".into(),
                instructions: "docker build -t widgets .".into(),
                detected_dependencies: vec!["flask".into()],
                health_check_suggestion: "curl -f localhost:8000".into(),
            },
        };
        write_outputs(&dir, &analysis).unwrap();

        assert_eq!(std::fs::read_to_string(dir.join("Dockerfile")).unwrap(), "FROM python:3.11-slim");
        let instructions = std::fs::read_to_string(dir.join("INSTRUCTIONS.md")).unwrap();
        assert!(instructions.contains("docker build -t widgets ."));
        let saved: Analysis =
            serde_json::from_str(&std::fs::read_to_string(dir.join("analysis.json")).unwrap()).unwrap();
        assert_eq!(saved, analysis);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
