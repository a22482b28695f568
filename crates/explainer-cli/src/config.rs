//! Configuration management for the CLI.
//!
//! The file at `~/.explainer/config.toml` holds named backend profiles and
//! global settings. `BBE_*` environment variables are layered on top when a
//! command resolves its effective settings; they are never written back.

use crate::error::{CliError, Result};
use explainer_llm::{BackendKind, DEFAULT_TIMEOUT_SECS};
use explainer_pipeline::PipelineConfig;
use explainer_verifier::VerifierConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name
    #[serde(default = "default_profile")]
    pub active_profile: String,

    /// Available profiles
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,

    /// Global settings
    #[serde(default)]
    pub settings: Settings,
}

/// Backend profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Backend kind ("ollama" or "lmstudio")
    pub backend: String,

    /// Base URL of the backend API
    pub base_url: String,

    /// Model name
    pub model: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Token budget per model call
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Run the critique pass by default
    #[serde(default)]
    pub critique_pass: bool,

    /// Allow approximate quote matching during verification
    #[serde(default = "default_true")]
    pub fuzzy_matching: bool,

    /// Chat history size
    #[serde(default = "default_history_size")]
    pub history_size: usize,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (answer only) format
    Quiet,
}

/// Settings a command runs with after profile, flags and environment are combined.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    /// Backend kind
    pub backend: BackendKind,
    /// Base URL of the backend API
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Pipeline settings
    pub pipeline: PipelineConfig,
    /// Verifier settings
    pub verifier: VerifierConfig,
}

impl Profile {
    /// Profile with the defaults of the given backend
    pub fn for_backend(kind: BackendKind) -> Self {
        Self {
            backend: kind.as_str().to_string(),
            base_url: kind.default_base_url().to_string(),
            model: kind.default_model().to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Get the default configuration file path.
    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("config.toml"))
    }

    /// Directory holding the config and chat history.
    pub fn data_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".explainer"))
    }

    /// Load configuration from `path`, or the defaults if the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Get the active profile.
    pub fn get_active_profile(&self) -> Result<&Profile> {
        self.profiles
            .get(&self.active_profile)
            .ok_or_else(|| CliError::Config(format!("Profile '{}' not found", self.active_profile)))
    }

    /// Add or update a profile.
    pub fn set_profile(&mut self, name: String, profile: Profile) {
        self.profiles.insert(name, profile);
    }

    /// Switch to a different profile.
    pub fn switch_profile(&mut self, name: String) -> Result<()> {
        if !self.profiles.contains_key(&name) {
            return Err(CliError::Config(format!("Profile '{}' does not exist", name)));
        }
        self.active_profile = name;
        Ok(())
    }

    /// Combine the active profile and settings with `BBE_*` overrides.
    ///
    /// `lookup` reads one environment variable; pass `|k| std::env::var(k).ok()`
    /// in production. Setting `BBE_BACKEND` to a different backend than the
    /// profile's resets base URL and model to that backend's defaults before
    /// `BBE_BASE_URL` and `BBE_MODEL` apply.
    pub fn resolve<F>(&self, lookup: F) -> Result<Resolved>
    where
        F: Fn(&str) -> Option<String>,
    {
        let profile = self.get_active_profile()?;
        let mut backend = BackendKind::parse(&profile.backend)?;
        let mut base_url = profile.base_url.clone();
        let mut model = profile.model.clone();
        let mut timeout_secs = profile.timeout_secs;

        if let Some(name) = lookup("BBE_BACKEND") {
            let kind = BackendKind::parse(&name)?;
            if kind != backend {
                backend = kind;
                base_url = kind.default_base_url().to_string();
                model = kind.default_model().to_string();
            }
        }
        if let Some(url) = lookup("BBE_BASE_URL") {
            base_url = url;
        }
        if let Some(m) = lookup("BBE_MODEL") {
            model = m;
        }
        if let Some(t) = parse_override(&lookup, "BBE_TIMEOUT_SECONDS") {
            timeout_secs = t;
        }

        let mut pipeline = PipelineConfig {
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
            critique_pass: self.settings.critique_pass,
            ..PipelineConfig::default()
        };
        if let Some(t) = parse_override(&lookup, "BBE_TEMPERATURE") {
            pipeline.temperature = t;
        }
        if let Some(n) = parse_override(&lookup, "BBE_MAX_TOKENS") {
            pipeline.max_tokens = n;
        }
        if let Some(flag) = lookup("BBE_CRITIQUE_PASS") {
            pipeline.critique_pass = flag.trim().eq_ignore_ascii_case("true");
        }

        let verifier = if self.settings.fuzzy_matching {
            VerifierConfig::default()
        } else {
            VerifierConfig::strict()
        };

        Ok(Resolved { backend, base_url, model, timeout_secs, pipeline, verifier })
    }
}

/// Read and parse a numeric override, ignoring values that do not parse
fn parse_override<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a valid number", key, raw);
            None
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert("default".to_string(), Profile::for_backend(BackendKind::Ollama));
        profiles.insert("lmstudio".to_string(), Profile::for_backend(BackendKind::LmStudio));

        Self {
            active_profile: "default".to_string(),
            profiles,
            settings: Settings::default(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            critique_pass: false,
            fuzzy_matching: true,
            history_size: default_history_size(),
        }
    }
}

fn default_profile() -> String {
    "default".to_string()
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_temperature() -> f32 {
    PipelineConfig::default().temperature
}

fn default_max_tokens() -> u32 {
    PipelineConfig::default().max_tokens
}

fn default_history_size() -> usize {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.active_profile, "default");
        assert!(config.profiles.contains_key("default"));
        assert!(config.settings.color);
        assert_eq!(config.settings.max_tokens, 700);

        let profile = config.get_active_profile().unwrap();
        assert_eq!(profile.backend, "ollama");
        assert_eq!(profile.base_url, "http://localhost:11434");
        assert_eq!(profile.timeout_secs, 120);
    }

    #[test]
    fn test_profile_management() {
        let mut config = Config::default();
        config.set_profile("test".to_string(), Profile::for_backend(BackendKind::LmStudio));
        assert!(config.profiles.contains_key("test"));

        config.switch_profile("test".to_string()).unwrap();
        assert_eq!(config.active_profile, "test");
    }

    #[test]
    fn test_switch_to_nonexistent_profile() {
        let mut config = Config::default();
        let result = config.switch_profile("nonexistent".to_string());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.active_profile, "default");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.settings.critique_pass = true;
        config.set_profile(
            "remote".to_string(),
            Profile {
                backend: "lmstudio".to_string(),
                base_url: "http://gpu-box:1234/v1".to_string(),
                model: "qwen2.5-14b-instruct".to_string(),
                timeout_secs: 300,
            },
        );
        config.switch_profile("remote".to_string()).unwrap();
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.active_profile, "remote");
        assert!(loaded.settings.critique_pass);
        assert_eq!(loaded.profiles["remote"], config.profiles["remote"]);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
active_profile = "local"

[profiles.local]
backend = "ollama"
base_url = "http://localhost:11434"
model = "mistral"
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.profiles["local"].timeout_secs, 120);
        assert_eq!(config.settings.format, OutputFormat::Table);
        assert!(config.settings.fuzzy_matching);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "active_profile = [").unwrap();
        assert!(matches!(Config::load(&path), Err(CliError::Toml(_))));
    }

    #[test]
    fn test_resolve_without_overrides() {
        let resolved = Config::default().resolve(env(&[])).unwrap();
        assert_eq!(resolved.backend, BackendKind::Ollama);
        assert_eq!(resolved.model, "llama3.1:8b");
        assert_eq!(resolved.timeout_secs, 120);
        assert_eq!(resolved.pipeline.temperature, 0.2);
        assert!(!resolved.pipeline.critique_pass);
        assert!(resolved.verifier.fuzzy_enabled);
    }

    #[test]
    fn test_resolve_env_overrides() {
        let resolved = Config::default()
            .resolve(env(&[
                ("BBE_MODEL", "mistral"),
                ("BBE_TEMPERATURE", "0.7"),
                ("BBE_MAX_TOKENS", "256"),
                ("BBE_TIMEOUT_SECONDS", "30"),
                ("BBE_CRITIQUE_PASS", "TRUE"),
            ]))
            .unwrap();
        assert_eq!(resolved.model, "mistral");
        assert_eq!(resolved.pipeline.temperature, 0.7);
        assert_eq!(resolved.pipeline.max_tokens, 256);
        assert_eq!(resolved.timeout_secs, 30);
        assert!(resolved.pipeline.critique_pass);
    }

    #[test]
    fn test_backend_override_resets_endpoint() {
        let resolved = Config::default()
            .resolve(env(&[("BBE_BACKEND", "lmstudio")]))
            .unwrap();
        assert_eq!(resolved.backend, BackendKind::LmStudio);
        assert_eq!(resolved.base_url, "http://localhost:1234/v1");
        assert_eq!(resolved.model, "qwen2.5-7b-instruct");

        let resolved = Config::default()
            .resolve(env(&[("BBE_BACKEND", "lmstudio"), ("BBE_BASE_URL", "http://h:9/v1")]))
            .unwrap();
        assert_eq!(resolved.base_url, "http://h:9/v1");
    }

    #[test]
    fn test_unparsable_numbers_are_ignored() {
        let resolved = Config::default()
            .resolve(env(&[("BBE_MAX_TOKENS", "lots"), ("BBE_TEMPERATURE", "warm")]))
            .unwrap();
        assert_eq!(resolved.pipeline.max_tokens, 700);
        assert_eq!(resolved.pipeline.temperature, 0.2);
    }

    #[test]
    fn test_unknown_backend_is_an_error() {
        let result = Config::default().resolve(env(&[("BBE_BACKEND", "openai")]));
        assert!(matches!(result, Err(CliError::Llm(_))));
    }

    #[test]
    fn test_fuzzy_setting_selects_strict_verifier() {
        let mut config = Config::default();
        config.settings.fuzzy_matching = false;
        let resolved = config.resolve(env(&[])).unwrap();
        assert!(!resolved.verifier.fuzzy_enabled);
    }
}
