//! `dockerize config` command.

use std::path::Path;

use crate::cli::ConfigAction;
use crate::model::Credential;
use crate::settings::Settings;

/// Execute a `config` action against the record at `path`.
///
/// # Errors
///
/// Returns an error string if the record cannot be read, written or removed.
pub fn run(action: &ConfigAction, path: &Path) -> Result<(), String> {
    match action {
        ConfigAction::Show => {
            let settings = Settings::load(path)?;
            print!("{}", render(path, &settings));
        }
        ConfigAction::Set(args) => {
            let mut settings = Settings::load(path)?;
            settings.apply(&args.overrides());
            settings.save(path)?;
            println!("Saved configuration to {}", path.display());
        }
        ConfigAction::Reset => {
            if Settings::reset(path)? {
                println!("Removed {}", path.display());
            } else {
                println!("No configuration at {}", path.display());
            }
        }
    }
    Ok(())
}

fn render(path: &Path, settings: &Settings) -> String {
    let provider = settings.provider.unwrap_or_default();
    let model = settings.model.clone().unwrap_or_else(|| match provider.default_model() {
        Some(default) => format!("{default} (default)"),
        None => "(not set)".to_string(),
    });
    let key = Credential::new(settings.api_key.clone().unwrap_or_default()).masked();
    let net = &settings.network;

    format!(
        "config: {}\nprovider: {provider} ({})\nmodel: {model}\napi key: {key}\nbase url: {}\n\
         github api: {}\ngithub raw: {}\ntimeouts: host {}s, provider {}s\ntransport retries: {}\n",
        path.display(),
        provider.label(),
        settings.base_url.as_deref().unwrap_or("(default)"),
        net.github_api_base,
        net.github_raw_base,
        net.host_timeout_secs,
        net.provider_timeout_secs,
        net.transport_retries,
    )
}
