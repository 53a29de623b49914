//! Configuration (layered: secrets file > environment > defaults).
//!
//! Both API keys are required. A missing key is a fatal startup error, never a
//! runtime one.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;

use crate::agent::reasoning::DEFAULT_MAX_STEPS;
use crate::error::AssistantError;
use crate::models::GoogleModel;
use crate::search::SearchOptions;

/// Secrets file looked up relative to the working directory.
pub const LOCAL_SECRETS_PATH: &str = ".assistant/secrets.toml";

pub const GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
pub const TAVILY_API_KEY: &str = "TAVILY_API_KEY";

/// Resolved runtime configuration.
#[derive(Clone)]
pub struct AssistantConfig {
    pub google_api_key: String,
    pub tavily_api_key: String,
    pub model: GoogleModel,
    pub temperature: f64,
    /// Extra attempts the model client makes on retryable failures.
    pub max_retries: u32,
    /// Model calls allowed per submission.
    pub max_steps: usize,
    pub search: SearchOptions,
    pub google_base_url: Option<String>,
    pub tavily_base_url: Option<String>,
}

impl std::fmt::Debug for AssistantConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistantConfig")
            .field("google_api_key", &"..")
            .field("tavily_api_key", &"..")
            .field("model", &self.model.as_str())
            .field("temperature", &self.temperature)
            .field("max_retries", &self.max_retries)
            .field("max_steps", &self.max_steps)
            .field("search", &self.search)
            .finish()
    }
}

/// On-disk secrets file. Keys sit at the top level; tuning goes under `[assistant]`.
#[derive(Debug, Default, Deserialize)]
pub struct SecretsFile {
    #[serde(rename = "GOOGLE_API_KEY")]
    pub google_api_key: Option<String>,
    #[serde(rename = "TAVILY_API_KEY")]
    pub tavily_api_key: Option<String>,
    #[serde(default)]
    pub assistant: Settings,
}

/// Optional tuning knobs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub model: String,
    pub temperature: f64,
    pub max_retries: u32,
    pub max_steps: usize,
    pub search: SearchOptions,
    pub google_base_url: Option<String>,
    pub tavily_base_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: GoogleModel::default().as_str().to_string(),
            temperature: 0.1,
            max_retries: 2,
            max_steps: DEFAULT_MAX_STEPS,
            search: SearchOptions::default(),
            google_base_url: None,
            tavily_base_url: None,
        }
    }
}

impl SecretsFile {
    /// Read a secrets file; a missing file yields the empty default.
    pub fn read(path: &Path) -> Result<Self, AssistantError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| {
            AssistantError::Configuration(format!("Invalid secrets file {}: {e}", path.display()))
        })
    }
}

/// First existing secrets file: `./.assistant/secrets.toml`, then the user config dir.
pub fn default_secrets_path() -> PathBuf {
    let local = PathBuf::from(LOCAL_SECRETS_PATH);
    if local.exists() {
        return local;
    }
    ProjectDirs::from("", "", "admissions-assistant")
        .map(|dirs| dirs.config_dir().join("secrets.toml"))
        .filter(|p| p.exists())
        .unwrap_or(local)
}

impl AssistantConfig {
    /// Load from a secrets file (default location when `None`) and the environment.
    pub fn load(secrets_path: Option<&Path>) -> Result<Self, AssistantError> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let path = secrets_path
            .map(Path::to_path_buf)
            .unwrap_or_else(default_secrets_path);
        let file = SecretsFile::read(&path)?;
        Self::resolve(file, &path, |name| std::env::var(name).ok())
    }

    /// Merge a parsed secrets file with an environment lookup.
    ///
    /// File values win over the environment; blank values count as missing.
    pub fn resolve(
        file: SecretsFile,
        path: &Path,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AssistantError> {
        let pick = |from_file: Option<String>, name: &str| {
            from_file
                .filter(|v| !v.trim().is_empty())
                .or_else(|| env(name).filter(|v| !v.trim().is_empty()))
        };

        let google = pick(file.google_api_key, GOOGLE_API_KEY);
        let tavily = pick(file.tavily_api_key, TAVILY_API_KEY);
        let (Some(google_api_key), Some(tavily_api_key)) = (google, tavily) else {
            return Err(AssistantError::Configuration(format!(
                "API keys not found! Please set them in {}",
                path.display()
            )));
        };

        let settings = file.assistant;
        let model = GoogleModel::parse(&settings.model)
            .map_err(|e| AssistantError::Configuration(e.to_string()))?;
        if settings.search.max_results == 0 {
            return Err(AssistantError::Configuration(
                "assistant.search.max_results must be at least 1".into(),
            ));
        }

        Ok(Self {
            google_api_key,
            tavily_api_key,
            model,
            temperature: settings.temperature,
            max_retries: settings.max_retries,
            max_steps: settings.max_steps.max(1),
            search: settings.search,
            google_base_url: settings.google_base_url,
            tavily_base_url: settings.tavily_base_url,
        })
    }
}
