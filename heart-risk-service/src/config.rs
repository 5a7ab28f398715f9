use std::path::PathBuf;

use anyhow::{Context as _, Result, bail};
use axum::http::HeaderValue;

use crate::generation::{DEFAULT_API_URL, DEFAULT_MODEL, GenerationSettings};

pub const DEFAULT_PORT: u16 = 8000;

pub const DEFAULT_ALLOWED_ORIGINS: &[&str] =
    &["http://localhost:8080", "https://earlymed.vercel.app"];

/// Process configuration, read once at startup from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub port: u16,
    pub model_path: PathBuf,
    pub api_url: String,
    pub generation: GenerationSettings,
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup; `from_env` passes `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("MISTRAL_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .context("MISTRAL_API_KEY environment variable is required")?;

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORT must be a valid port number, got {:?}", raw))?,
            None => DEFAULT_PORT,
        };

        let model_path = lookup("MODEL_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(default_model_path);

        let api_url = lookup("MISTRAL_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let generation = GenerationSettings {
            model: lookup("MISTRAL_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            ..GenerationSettings::default()
        };

        let allowed_origins = match lookup("CORS_ALLOWED_ORIGINS") {
            Some(raw) => parse_origins(&raw)?,
            None => DEFAULT_ALLOWED_ORIGINS
                .iter()
                .map(|origin| origin.to_string())
                .collect(),
        };

        Ok(Self {
            api_key,
            port,
            model_path,
            api_url,
            generation,
            allowed_origins,
        })
    }
}

/// The classifier artifact next to the crate sources, resolved at build time.
/// Binaries deployed away from the build tree need `MODEL_PATH`.
pub fn default_model_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("models")
        .join("heart_risk.onnx")
}

fn parse_origins(raw: &str) -> Result<Vec<String>> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect();

    if origins.is_empty() {
        bail!("CORS_ALLOWED_ORIGINS must list at least one origin");
    }
    for origin in &origins {
        HeaderValue::from_str(origin)
            .with_context(|| format!("invalid origin in CORS_ALLOWED_ORIGINS: {:?}", origin))?;
    }

    Ok(origins)
}
