//! The local configuration record and `ProviderConfig` resolution.
//!
//! The record is a single YAML file (`.dockerize/config.yaml` by default).
//! Every field is optional; resolution layers command-line overrides, the
//! saved record, environment variables and built-in defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::adapters::live::{GITHUB_API_BASE, GITHUB_RAW_BASE};
use crate::error::AnalysisError;
use crate::model::{Credential, ProviderConfig, ProviderKind};

/// Default location of the configuration record, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = ".dockerize/config.yaml";

/// The saved configuration record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    /// Selected provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderKind>,
    /// Saved credential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Saved model identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Saved endpoint base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Network endpoints, timeouts and retry budget.
    #[serde(default)]
    pub network: NetworkSettings,
}

/// Endpoints and limits for the live adapters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NetworkSettings {
    /// Repository host API base.
    pub github_api_base: String,
    /// Base for raw file downloads.
    pub github_raw_base: String,
    /// Timeout for each repository host request, in seconds.
    pub host_timeout_secs: u64,
    /// Timeout for each provider request, in seconds.
    pub provider_timeout_secs: u64,
    /// Extra attempts for a provider request that got no HTTP response.
    pub transport_retries: u32,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            github_api_base: GITHUB_API_BASE.into(),
            github_raw_base: GITHUB_RAW_BASE.into(),
            host_timeout_secs: 30,
            provider_timeout_secs: 180,
            transport_retries: 1,
        }
    }
}

/// Per-invocation overrides, typically from command-line flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderOverrides {
    /// Provider override.
    pub provider: Option<ProviderKind>,
    /// Credential override.
    pub api_key: Option<String>,
    /// Model override.
    pub model: Option<String>,
    /// Endpoint base override.
    pub base_url: Option<String>,
}

impl Settings {
    /// Location of the record: `DOCKERIZE_CONFIG` if set, else the default path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        std::env::var_os("DOCKERIZE_CONFIG")
            .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
    }

    /// Loads the record, returning defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content)
            .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
    }

    /// Writes the record, creating the parent directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
        let yaml =
            serde_yaml::to_string(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, yaml).map_err(|e| format!("Failed to write {}: {e}", path.display()))
    }

    /// Deletes the record. Returns whether a file was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn reset(path: &Path) -> Result<bool, String> {
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(path)
            .map_err(|e| format!("Failed to remove {}: {e}", path.display()))?;
        Ok(true)
    }

    /// Merges overrides into the record (used by `config set`).
    pub fn apply(&mut self, overrides: &ProviderOverrides) {
        if let Some(provider) = overrides.provider {
            if self.provider != Some(provider) {
                // Models and endpoints rarely carry over between providers.
                self.model = None;
                self.base_url = None;
            }
            self.provider = Some(provider);
        }
        if let Some(key) = &overrides.api_key {
            self.api_key = Some(key.clone()).filter(|k| !k.trim().is_empty());
        }
        if let Some(model) = &overrides.model {
            self.model = Some(model.clone());
        }
        if let Some(base) = &overrides.base_url {
            self.base_url = Some(base.clone()).filter(|b| !b.trim().is_empty());
        }
    }

    /// Resolves a `ProviderConfig` using the process environment.
    ///
    /// # Errors
    ///
    /// See [`Settings::resolve_with`].
    pub fn resolve(&self, overrides: &ProviderOverrides) -> Result<ProviderConfig, AnalysisError> {
        self.resolve_with(overrides, |key| std::env::var(key).ok())
    }

    /// Resolves a `ProviderConfig` with an explicit environment lookup.
    ///
    /// Precedence per field is override, then saved record, then the
    /// `DOCKERIZE_*` environment variable, then the built-in default. Saved
    /// values are ignored when the override selects a different provider.
    /// The environment credential fallback is not applied here; the provider
    /// factory resolves it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for an unknown `DOCKERIZE_PROVIDER` value or
    /// when no model can be determined.
    pub fn resolve_with<F>(
        &self,
        overrides: &ProviderOverrides,
        env: F,
    ) -> Result<ProviderConfig, AnalysisError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_provider = env("DOCKERIZE_PROVIDER")
            .filter(|v| !v.trim().is_empty())
            .map(|v| v.parse::<ProviderKind>())
            .transpose()
            .map_err(AnalysisError::InvalidConfig)?;

        // A record without a provider belongs to whichever provider it resolves to.
        let saved_provider = self.provider.or(env_provider).unwrap_or_default();
        let provider = overrides.provider.unwrap_or(saved_provider);

        let saved_applies = provider == saved_provider;
        let saved = |value: &Option<String>| {
            if saved_applies {
                value.clone().filter(|v| !v.trim().is_empty())
            } else {
                None
            }
        };

        let model = overrides
            .model
            .clone()
            .or_else(|| saved(&self.model))
            .or_else(|| env("DOCKERIZE_MODEL").filter(|v| !v.trim().is_empty()))
            .or_else(|| provider.default_model().map(str::to_string))
            .ok_or_else(|| {
                AnalysisError::InvalidConfig(format!(
                    "no model configured for the {provider} provider (use --model)"
                ))
            })?;

        let endpoint_base = overrides
            .base_url
            .clone()
            .or_else(|| saved(&self.base_url))
            .or_else(|| env("DOCKERIZE_BASE_URL"))
            .filter(|v| !v.trim().is_empty());

        let credential = overrides
            .api_key
            .clone()
            .or_else(|| saved(&self.api_key))
            .map(Credential::new)
            .unwrap_or_default();

        Ok(ProviderConfig { provider, credential, model, endpoint_base })
    }
}
