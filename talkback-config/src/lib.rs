//! Loader for Talkback configuration with YAML + environment overlays.
//!
//! Sources, lowest precedence first:
//!
//! 1. built-in defaults (every section is optional)
//! 2. a YAML file such as `talkback.yaml`
//! 3. `TALKBACK__`-prefixed environment variables, `__` separating levels
//!    (`TALKBACK__EXTRACTION__VARIANT=scrape`)
//!
//! String values may reference other variables as `${VAR}`; they are expanded
//! after merging. The resulting [`TalkbackConfig`] is built once at startup and
//! handed to the pipeline, which never reads the environment itself.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

/// Conventional variable consulted when no key is configured explicitly.
pub const OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TalkbackConfig {
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub forwarder: ForwarderConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub batching: BatchingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TalkbackConfig {
    /// True when a usable completion-service credential is present.
    ///
    /// The pipeline refuses to run and the CLI refuses to offer its action
    /// while this is false.
    ///
    /// ```
    /// use talkback_config::TalkbackConfig;
    ///
    /// let mut cfg = TalkbackConfig::default();
    /// assert!(!cfg.is_configured());
    /// cfg.openai.api_key = Some("sk-test".into());
    /// assert!(cfg.is_configured());
    /// ```
    pub fn is_configured(&self) -> bool {
        self.openai.api_key().is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_openai_model")]
    pub model: String,
    #[serde(default = "default_openai_endpoint")]
    pub endpoint: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_openai_model(),
            endpoint: default_openai_endpoint(),
        }
    }
}

impl OpenAiConfig {
    /// The key, unless it is blank or an unresolved `${VAR}` placeholder.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty() && !k.contains("${"))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForwarderConfig {
    /// Base URL of the cross-origin relay that returns target bytes verbatim.
    #[serde(default = "default_forwarder_url")]
    pub base_url: String,
}

impl Default for ForwarderConfig {
    fn default() -> Self {
        Self {
            base_url: default_forwarder_url(),
        }
    }
}

/// Which site layout family to scrape comments from.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionVariant {
    /// Comments AJAX endpoint, UTF-8 fragment.
    #[default]
    Api,
    /// Full legacy article page, windows-1250.
    Scrape,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ExtractionConfig {
    #[serde(default)]
    pub variant: ExtractionVariant,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SamplingConfig {
    #[serde(default = "default_sample_cap")]
    pub cap: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            cap: default_sample_cap(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchingConfig {
    #[serde(default = "default_batch_size")]
    pub size: usize,
}

impl Default for BatchingConfig {
    fn default() -> Self {
        Self {
            size: default_batch_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `text` or `json`.
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default)]
    pub stderr: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
            dir: None,
            stderr: false,
        }
    }
}

fn default_openai_model() -> String {
    "gpt-3.5-turbo".into()
}
fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".into()
}
fn default_forwarder_url() -> String {
    "http://localhost:8080".into()
}
fn default_sample_cap() -> usize {
    50
}
fn default_batch_size() -> usize {
    20
}
fn default_log_format() -> String {
    "text".into()
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct TalkbackConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    env_key_fallback: bool,
}

impl Default for TalkbackConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl TalkbackConfigLoader {
    /// Start from defaults; `TALKBACK__` env overrides are applied last in [`Self::load`].
    ///
    /// ```
    /// use talkback_config::{ExtractionVariant, TalkbackConfigLoader};
    ///
    /// let config = TalkbackConfigLoader::new()
    ///     .without_env_key_fallback()
    ///     .with_yaml_str("extraction:\n  variant: scrape\nsampling:\n  cap: 10")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.extraction.variant, ExtractionVariant::Scrape);
    /// assert_eq!(config.sampling.cap, 10);
    /// assert_eq!(config.batching.size, 20);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
            env_key_fallback: true,
        }
    }

    /// Attach a YAML/TOML/JSON file that must exist; format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is skipped when missing, for env-only deployments.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Do not consult `OPENAI_API_KEY` when no key is configured.
    pub fn without_env_key_fallback(mut self) -> Self {
        self.env_key_fallback = false;
        self
    }

    /// Consume the builder and deserialize the merged sources.
    ///
    /// ```
    /// use talkback_config::TalkbackConfigLoader;
    ///
    /// std::env::set_var("DOC_OPENAI_TOKEN", "sk-from-env");
    ///
    /// let config = TalkbackConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// openai:
    ///   api_key: "${DOC_OPENAI_TOKEN}"
    ///   model: "gpt-4o-mini"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.openai.api_key(), Some("sk-from-env"));
    /// assert_eq!(config.openai.endpoint, "https://api.openai.com/v1");
    /// assert!(config.is_configured());
    ///
    /// std::env::remove_var("DOC_OPENAI_TOKEN");
    /// ```
    pub fn load(self) -> Result<TalkbackConfig, ConfigError> {
        // Env is added after every file source so it always wins.
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("TALKBACK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let mut typed: TalkbackConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;

        if self.env_key_fallback && typed.openai.api_key().is_none() {
            if let Ok(key) = std::env::var(OPENAI_KEY_ENV) {
                tracing::debug!(env = OPENAI_KEY_ENV, "config.openai.key_from_env");
                typed.openai.api_key = Some(key);
            }
        }

        validate(&typed)?;
        Ok(typed)
    }
}

fn validate(cfg: &TalkbackConfig) -> Result<(), ConfigError> {
    if cfg.sampling.cap == 0 {
        return Err(ConfigError::Message("sampling.cap must be at least 1".into()));
    }
    if cfg.batching.size == 0 {
        return Err(ConfigError::Message("batching.size must be at least 1".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("FOO", Some("bar"), || {
            let mut v = json!("prefix-${FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_nested_sections() {
        temp_env::with_vars([("KEY", Some("sk-1")), ("HOST", Some("relay"))], || {
            let mut v = json!({
                "openai": { "api_key": "${KEY}" },
                "forwarder": { "base_url": "http://${HOST}:8080" },
                "sampling": { "cap": 50 }
            });
            expand_env_in_value(&mut v);
            assert_eq!(
                v,
                json!({
                    "openai": { "api_key": "sk-1" },
                    "forwarder": { "base_url": "http://relay:8080" },
                    "sampling": { "cap": 50 }
                })
            );
        });
    }

    #[test]
    fn stops_on_cycles() {
        temp_env::with_vars([("A", Some("${B}")), ("B", Some("${A}"))], || {
            let mut v = json!("x=${A}-y");
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("x=") && s.ends_with("-y"));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unresolved_key_placeholder_is_not_configured() {
        let mut cfg = TalkbackConfig::default();
        cfg.openai.api_key = Some("${DOES_NOT_EXIST}".into());
        assert!(!cfg.is_configured());
        cfg.openai.api_key = Some("   ".into());
        assert!(!cfg.is_configured());
    }

    #[test]
    fn defaults_match_pipeline_constants() {
        let cfg = TalkbackConfig::default();
        assert_eq!(cfg.sampling.cap, 50);
        assert_eq!(cfg.batching.size, 20);
        assert_eq!(cfg.openai.model, "gpt-3.5-turbo");
        assert_eq!(cfg.forwarder.base_url, "http://localhost:8080");
        assert_eq!(cfg.extraction.variant, ExtractionVariant::Api);
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let err = TalkbackConfigLoader::new()
            .without_env_key_fallback()
            .with_yaml_str("batching:\n  size: 0")
            .load()
            .unwrap_err();
        assert!(err.to_string().contains("batching.size"));
    }
}
