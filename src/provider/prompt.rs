//! Prompt text shared by every provider variant.

use std::fmt::Write as _;

use crate::model::{AnalysisResult, SelectedFile};

/// System instruction for artifact generation: the JSON contract plus the
/// containerization rules the model must follow.
pub const SYSTEM_PROMPT: &str = r#"You are a senior DevOps engineer who specialises in containerising machine-learning and deep-learning projects.
From the repository files you are given, produce a production-ready Dockerfile and docker-compose.yml.

Rules:
1. Detect deep-learning frameworks (PyTorch, TensorFlow, JAX) and pin a CUDA/cuDNN runtime base image that matches the framework version.
2. Install system packages the project needs (apt-get), not only language-level dependencies.
3. Use multi-stage builds where they reduce the final image size.
4. Pin base image tags (for example python:3.11-slim or pytorch/pytorch:2.1.0-cuda12.1-cudnn8-runtime) and suggest .dockerignore entries.
5. Run as a non-root user where practical.
6. If the documentation mentions downloading pre-trained weights, add a step or instruction that places them under /app/weights.
7. Provide a robust entrypoint and include a HEALTHCHECK instruction.
8. The compose service must reserve a GPU (deploy.resources.reservations.devices with driver: nvidia) when the project uses one.

Output format: return one JSON object and nothing else:
{
  "dockerfile": "...",
  "dockerCompose": "...",
  "readmeSummary": "Brief explanation of the repository.",
  "instructions": "docker build / docker run commands with explanation.",
  "detectedDependencies": ["torch", "numpy"],
  "healthCheckSuggestion": "A concrete health check."
}"#;

/// Appended to the system instruction for backends without schema enforcement.
pub const JSON_ONLY_SUFFIX: &str = "\n\nIMPORTANT: You must return valid JSON only.";

/// System instruction for follow-up chat.
pub const CHAT_SYSTEM_PROMPT: &str = "You are a helpful Docker and DevOps assistant.";

/// Prompt used by connection tests.
pub const CONNECTION_TEST_PROMPT: &str = "Test connection";

/// Reply substituted when the model answers a chat turn with no text.
pub const EMPTY_CHAT_REPLY: &str = "I couldn't generate a response.";

/// Builds the analysis prompt with one delimited block per file.
#[must_use]
pub fn analysis_prompt(repo_name: &str, files: &[SelectedFile]) -> String {
    let mut context = format!("Repository: {repo_name}\n\n");
    for file in files {
        let _ = write!(context, "--- FILE: {} ---\n{}\n\n", file.entry.path, file.content);
    }

    format!(
        "Analyze the following files from a GitHub repository.\n\
         If a Dockerfile or docker-compose.yml already exists in the files provided, \
         extract them and suggest improvements if needed.\n\
         If not, generate them based on the dependencies found \
         (requirements.txt, setup.py, environment.yml, etc.).\n\n\
         Look closely for CUDA/GPU requirements.\n\n\
         Files provided:\n{context}"
    )
}

/// Builds a chat prompt that restates the generated artifacts verbatim.
#[must_use]
pub fn chat_prompt(message: &str, context: &AnalysisResult) -> String {
    format!(
        "Context:\n\
         You have previously generated the following Docker configuration:\n\
         Dockerfile: {}\n\
         Compose: {}\n\n\
         User Query: {message}\n\n\
         Respond as a helpful DevOps assistant. Provide updated code snippets if necessary.",
        context.dockerfile, context.compose_file
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntryKind, TreeEntry};

    fn selected(path: &str, content: &str) -> SelectedFile {
        SelectedFile {
            entry: TreeEntry {
                name: path.into(),
                path: path.into(),
                kind: EntryKind::File,
                content_url: None,
            },
            content: content.into(),
        }
    }

    #[test]
    fn analysis_prompt_delimits_each_file() {
        let prompt = analysis_prompt(
            "widgets",
            &[selected("requirements.txt", "flask"), selected("setup.py", "")],
        );
        assert!(prompt.contains("Repository: widgets"));
        assert!(prompt.contains("--- FILE: requirements.txt ---\nflask\n\n"));
        assert!(prompt.contains("--- FILE: setup.py ---\n\n\n"));
    }

    #[test]
    fn chat_prompt_restates_artifacts_verbatim() {
        let context = AnalysisResult {
            dockerfile: "FROM python:3.11-slim\nRUN pip install flask".into(),
            compose_file: "services:\n  app:\n    build: .".into(),
            summary: String::new(),
            instructions: String::new(),
            detected_dependencies: vec![],
            health_check_suggestion: String::new(),
        };
        let prompt = chat_prompt("add redis", &context);
        assert!(prompt.contains(&context.dockerfile));
        assert!(prompt.contains(&context.compose_file));
        assert!(prompt.contains("User Query: add redis"));
    }

    #[test]
    fn system_prompt_names_every_contract_field() {
        for field in [
            "dockerfile",
            "dockerCompose",
            "readmeSummary",
            "instructions",
            "detectedDependencies",
            "healthCheckSuggestion",
        ] {
            assert!(SYSTEM_PROMPT.contains(field), "missing {field}");
        }
    }
}
