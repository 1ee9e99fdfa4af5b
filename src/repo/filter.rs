//! Importance filter: picks the files worth showing to the model.
//!
//! Pure and deterministic. Rules are tried in order and the first match
//! wins; results keep the order of the source listing and are capped at
//! [`MAX_SELECTED`].

use crate::model::TreeEntry;

/// Upper bound on the number of selected files.
pub const MAX_SELECTED: usize = 15;

/// Manifests, build descriptors, container files, CI workflows, top-level
/// docs and generic config files, matched against the file name or the full
/// path.
const ALLOW_LIST: &[&str] = &[
    "requirements.txt",
    "setup.py",
    "setup.cfg",
    "pyproject.toml",
    "environment.yml",
    "environment.yaml",
    "package.json",
    "Pipfile",
    "go.mod",
    "Cargo.toml",
    "Gemfile",
    "pom.xml",
    "build.gradle",
    "Dockerfile",
    "docker-compose.yml",
    "docker-compose.yaml",
    "compose.yml",
    "compose.yaml",
    "Makefile",
    "README.md",
    "INSTALL.md",
    "getting_started.md",
    ".github/workflows/main.yml",
    ".github/workflows/build.yml",
    ".github/workflows/test.yml",
    "config.json",
    "config.yaml",
];

const CI_WORKFLOW_DIR: &str = ".github/workflows/";
const CONFIG_DIRS: &[&str] = &["configs/", "config/"];
const CONFIG_EXTENSIONS: &[&str] = &[".yaml", ".yml", ".py"];
const SCRIPT_EXTENSION: &str = ".sh";
const DOCS_DIR: &str = "docs/";

/// Why an entry was selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionRule {
    /// Exact name or path on the allow-list.
    AllowList,
    /// Anything under the CI workflow directory.
    CiWorkflow,
    /// Config or script file under a configuration directory.
    ConfigDir,
    /// Shell script anywhere in the tree.
    ShellScript,
    /// Installation document under the docs directory.
    InstallDoc,
}

impl SelectionRule {
    /// Short label for listings.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::AllowList => "manifest",
            Self::CiWorkflow => "ci",
            Self::ConfigDir => "config",
            Self::ShellScript => "script",
            Self::InstallDoc => "install-doc",
        }
    }
}

/// Returns the first rule `entry` satisfies, or `None`. Directories never match.
#[must_use]
pub fn selection_rule(entry: &TreeEntry) -> Option<SelectionRule> {
    if !entry.is_file() {
        return None;
    }
    let (name, path) = (entry.name.as_str(), entry.path.as_str());

    if ALLOW_LIST.contains(&name) || ALLOW_LIST.contains(&path) {
        Some(SelectionRule::AllowList)
    } else if path.starts_with(CI_WORKFLOW_DIR) {
        Some(SelectionRule::CiWorkflow)
    } else if CONFIG_DIRS.iter().any(|dir| path.starts_with(dir))
        && CONFIG_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
    {
        Some(SelectionRule::ConfigDir)
    } else if name.ends_with(SCRIPT_EXTENSION) {
        Some(SelectionRule::ShellScript)
    } else if path.starts_with(DOCS_DIR) && name.to_lowercase().contains("install") {
        Some(SelectionRule::InstallDoc)
    } else {
        None
    }
}

/// Selects at most [`MAX_SELECTED`] important files, in listing order.
#[must_use]
pub fn select(entries: &[TreeEntry]) -> Vec<TreeEntry> {
    entries
        .iter()
        .filter(|entry| selection_rule(entry).is_some())
        .take(MAX_SELECTED)
        .cloned()
        .collect()
}
