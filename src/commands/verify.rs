//! `dockerize verify` command.

use crate::context::ServiceContext;
use crate::service::verify_provider_connection;
use crate::settings::{ProviderOverrides, Settings};

/// Execute the `verify` command.
///
/// # Errors
///
/// Returns an error string when the configuration cannot be resolved or the
/// connection test fails.
pub async fn run(
    ctx: &ServiceContext,
    settings: &Settings,
    overrides: &ProviderOverrides,
) -> Result<(), String> {
    let config = settings.resolve(overrides).map_err(|e| e.to_string())?;
    println!("Testing {} ({})...", config.provider.label(), config.model);

    if verify_provider_connection(ctx, &config).await {
        println!("connection ok");
        Ok(())
    } else {
        Err("connection failed".to_string())
    }
}
