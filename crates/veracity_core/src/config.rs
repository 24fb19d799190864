//! Engine configuration.
//!
//! Config file: ~/.config/veracity/config.toml or /etc/veracity/config.toml.
//! Every section has defaults so a missing file or partial file works.
//! API credentials may also arrive via environment variables, which win
//! over the file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Cache behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Entry lifetime in seconds.
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 3600 }
    }
}

/// Batch pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Pause inserted after each cache-miss claim, in milliseconds.
    pub pacing_ms: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { pacing_ms: 500 }
    }
}

/// Google Fact Check Tools adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FactCheckConfig {
    /// API key; the stage is skipped entirely when absent.
    pub api_key: Option<String>,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for FactCheckConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: "https://factchecktools.googleapis.com/v1alpha1/claims:search".to_string(),
            timeout_secs: 10,
        }
    }
}

/// PubMed E-utilities adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PubMedConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
    /// Article summaries fetched per query.
    pub max_articles: usize,
}

impl Default for PubMedConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://eutils.ncbi.nlm.nih.gov/entrez/eutils".to_string(),
            timeout_secs: 15,
            max_articles: 10,
        }
    }
}

/// Wikipedia search adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WikipediaConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
    /// Candidate pages scored per query.
    pub max_pages: usize,
}

impl Default for WikipediaConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://en.wikipedia.org/w/api.php".to_string(),
            timeout_secs: 10,
            max_pages: 3,
        }
    }
}

/// Last-resort LLM adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: "http://localhost:11434".to_string(),
            model: "llama3.2:3b".to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

impl LlmConfig {
    /// Ollama endpoints need no API key; anything else does.
    pub fn is_local_endpoint(&self) -> bool {
        self.endpoint.contains("11434") || self.endpoint.contains("ollama")
    }

    /// Whether the fallback stage has a usable credential.
    pub fn credential_configured(&self) -> bool {
        self.enabled && (self.api_key.is_some() || self.is_local_endpoint())
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifierConfig {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub factcheck: FactCheckConfig,
    #[serde(default)]
    pub pubmed: PubMedConfig,
    #[serde(default)]
    pub wikipedia: WikipediaConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

impl VerifierConfig {
    /// Default user config path: ~/.config/veracity/config.toml
    pub fn user_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(config_dir.join("veracity").join("config.toml"))
    }

    /// System config path: /etc/veracity/config.toml
    pub fn system_config_path() -> PathBuf {
        PathBuf::from("/etc/veracity/config.toml")
    }

    /// Load configuration with priority:
    /// 1. User config (~/.config/veracity/config.toml)
    /// 2. System config (/etc/veracity/config.toml)
    /// 3. Defaults
    ///
    /// Environment variables `VERACITY_GOOGLE_API_KEY` and
    /// `VERACITY_LLM_API_KEY` override the file in every case.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from an explicit TOML file.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
    }

    fn load_file() -> Result<Self> {
        if let Ok(user_path) = Self::user_config_path() {
            if user_path.exists() {
                return Self::load_from_path(&user_path);
            }
        }

        let system_path = Self::system_config_path();
        if system_path.exists() {
            return Self::load_from_path(&system_path);
        }

        Ok(Self::default())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("VERACITY_GOOGLE_API_KEY") {
            if !key.is_empty() {
                self.factcheck.api_key = Some(key);
            }
        }
        if let Ok(key) = std::env::var("VERACITY_LLM_API_KEY") {
            if !key.is_empty() {
                self.llm.api_key = Some(key);
            }
        }
    }
}
