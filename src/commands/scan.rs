//! `dockerize scan` command.

use crate::context::ServiceContext;
use crate::model::TreeEntry;
use crate::repo::{fetch_tree, select, selection_rule};
use crate::service::locate_repository;

/// Execute the `scan` command: list what an analysis would send.
///
/// # Errors
///
/// Returns an error string for an invalid URL or an unavailable tree.
pub async fn run(ctx: &ServiceContext, url: &str) -> Result<(), String> {
    let mut repo = locate_repository(url).map_err(|e| e.to_string())?;
    let tree = fetch_tree(ctx.host.as_ref(), &ctx.network.github_raw_base, &mut repo)
        .await
        .map_err(|e| e.to_string())?;
    let selected = select(&tree);

    let branch = repo.branch.as_deref().unwrap_or("?");
    println!("Repository: {} ({branch})", repo.slug());
    println!("Entries: {}", tree.len());
    print!("{}", render_selection(&selected));
    Ok(())
}

fn render_selection(selected: &[TreeEntry]) -> String {
    if selected.is_empty() {
        return "No configuration files found.\n".to_string();
    }
    let width = selected.iter().map(|e| e.path.len()).max().unwrap_or(0);
    let mut out = format!("Selected files ({}):\n", selected.len());
    for entry in selected {
        let rule = selection_rule(entry).map_or("", |r| r.label());
        out.push_str(&format!("  {:<width$}  {rule}\n", entry.path));
    }
    out
}
