//! Run configuration shared by the fetch and render stages.
//!
//! Configuration is a JSON file validated against the embedded
//! `schema/config.schema.json` before deserialization, so typos in keys are
//! rejected with the schema error rather than silently defaulted. Every field
//! is optional.

use crate::logging::LoggingConfig;
use anyhow::{Context, Result, anyhow, bail};
use jsonschema::JSONSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file picked up from the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "catalogmd.json";
pub const DEFAULT_SAVE_PATH: &str = "data";

const CONFIG_SCHEMA: &str = include_str!("../schema/config.schema.json");
const CATALOG_SUFFIXES: &[&str] = &["_catelog", "_catalog"];
const TEXT_SUFFIX: &str = "_text";

/// Upper bound on any configured wait or timeout.
pub const MAX_WAIT_SECS: f64 = 86_400.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the fetched `.json` files and rendered `.md` files.
    pub save_path: PathBuf,
    /// Logical name to source URL.
    pub sources: BTreeMap<String, String>,
    /// Explicit catalog/text pairs; derived from `sources` when absent.
    pub content_sets: Option<Vec<ContentSet>>,
    pub warn_on_missing_text: bool,
    pub fetch: FetchConfig,
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            save_path: PathBuf::from(DEFAULT_SAVE_PATH),
            sources: BTreeMap::new(),
            content_sets: None,
            warn_on_missing_text: false,
            fetch: FetchConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// A catalog document and the text document its `real_id`s point into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSet {
    pub catalog: String,
    pub text: String,
}

impl ContentSet {
    /// Pair a catalog name with its text name by suffix (`x_catelog` -> `x_text`).
    pub fn derive(catalog: &str) -> Option<Self> {
        CATALOG_SUFFIXES.iter().find_map(|suffix| {
            let prefix = catalog.strip_suffix(suffix)?;
            Some(Self {
                catalog: catalog.to_string(),
                text: format!("{prefix}{TEXT_SUFFIX}"),
            })
        })
    }
}

/// HTTP retrieval policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Retries after the first attempt.
    pub retries: u32,
    /// Backoff before retry `n` (1-based) is `backoff_factor_secs * 2^(n-1)`.
    pub backoff_factor_secs: f64,
    pub retry_statuses: Vec<u16>,
    pub timeout_secs: f64,
    /// Pause between consecutive downloads.
    pub delay_secs: f64,
    /// Extra request headers, layered over the built-in defaults.
    pub headers: BTreeMap<String, String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            backoff_factor_secs: 0.5,
            retry_statuses: vec![500, 502, 503, 504],
            timeout_secs: 10.0,
            delay_secs: 1.0,
            headers: BTreeMap::new(),
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        wait_duration(self.timeout_secs)
    }

    pub fn delay(&self) -> Duration {
        wait_duration(self.delay_secs)
    }

    /// Sleep before retry number `retry` (1-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }
        let factor = 2f64.powi(retry.saturating_sub(1).min(16) as i32);
        wait_duration(self.backoff_factor_secs * factor)
    }

    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retry_statuses.contains(&status)
    }
}

/// Seconds to a `Duration`, capped at [`MAX_WAIT_SECS`]. Negative and NaN
/// inputs become zero.
fn wait_duration(secs: f64) -> Duration {
    if secs.is_nan() {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs.clamp(0.0, MAX_WAIT_SECS)).unwrap_or(Duration::ZERO)
}

impl Config {
    /// Load, validate, and normalize a config file.
    ///
    /// A relative `save_path` is resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let value: Value = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config {}", path.display()))?;
        validate_config_value(&value).with_context(|| format!("validating {}", path.display()))?;
        let mut config: Config = serde_json::from_value(value)
            .with_context(|| format!("decoding config {}", path.display()))?;

        if config.save_path.is_relative() {
            if let Some(base) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                config.save_path = base.join(&config.save_path);
            }
        }
        Ok(config)
    }

    /// Use `explicit` if given, else `catalogmd.json` in the working
    /// directory when present, else defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.is_file() {
                bail!("config file not found: {}", path.display());
            }
            return Self::load(path);
        }
        let fallback = Path::new(DEFAULT_CONFIG_FILE);
        if fallback.is_file() {
            return Self::load(fallback);
        }
        Ok(Self::default())
    }

    /// Catalog/text pairs to render, in deterministic order.
    pub fn content_sets(&self) -> Vec<ContentSet> {
        match &self.content_sets {
            Some(sets) => sets.clone(),
            None => self
                .sources
                .keys()
                .filter_map(|name| ContentSet::derive(name))
                .collect(),
        }
    }

    /// Every logical name the render stage needs on disk.
    pub fn required_names(&self) -> Vec<String> {
        let mut names: BTreeSet<String> = self.sources.keys().cloned().collect();
        for set in self.content_sets() {
            names.insert(set.catalog);
            names.insert(set.text);
        }
        names.into_iter().collect()
    }
}

/// Check a raw config value against the embedded schema.
pub fn validate_config_value(value: &Value) -> Result<()> {
    let schema: Value = serde_json::from_str(CONFIG_SCHEMA).context("parsing config schema")?;
    let compiled =
        JSONSchema::compile(&schema).map_err(|err| anyhow!("compiling config schema: {err}"))?;
    if let Err(errors) = compiled.validate(value) {
        let details = errors
            .map(|err| {
                let pointer = err.instance_path.to_string();
                if pointer.is_empty() {
                    err.to_string()
                } else {
                    format!("{pointer}: {err}")
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        bail!("config failed schema validation:\n{details}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn defaults_cover_retry_policy() {
        let cfg = Config::default();
        assert_eq!(cfg.save_path, PathBuf::from("data"));
        assert_eq!(cfg.fetch.retries, 3);
        assert_eq!(cfg.fetch.retry_statuses, vec![500, 502, 503, 504]);
        assert_eq!(cfg.fetch.delay(), Duration::from_secs(1));
        assert!(!cfg.warn_on_missing_text);
    }

    #[test]
    fn backoff_doubles() {
        let fetch = FetchConfig::default();
        assert_eq!(fetch.backoff(0), Duration::ZERO);
        assert_eq!(fetch.backoff(1), Duration::from_millis(500));
        assert_eq!(fetch.backoff(2), Duration::from_secs(1));
        assert_eq!(fetch.backoff(3), Duration::from_secs(2));
        assert!(fetch.is_retryable_status(503));
        assert!(!fetch.is_retryable_status(404));
    }

    #[test]
    fn out_of_range_waits_are_capped() {
        let cap = Duration::from_secs_f64(MAX_WAIT_SECS);
        let fetch = FetchConfig {
            timeout_secs: 1e20,
            delay_secs: f64::INFINITY,
            backoff_factor_secs: f64::MAX,
            ..FetchConfig::default()
        };
        assert_eq!(fetch.timeout(), cap);
        assert_eq!(fetch.delay(), cap);
        assert_eq!(fetch.backoff(10), cap);

        let fetch = FetchConfig {
            timeout_secs: f64::NAN,
            delay_secs: -3.0,
            ..FetchConfig::default()
        };
        assert_eq!(fetch.timeout(), Duration::ZERO);
        assert_eq!(fetch.delay(), Duration::ZERO);
    }

    #[test]
    fn schema_bounds_wait_settings() {
        assert!(validate_config_value(&json!({"fetch": {"timeout_secs": 1e20}})).is_err());
        assert!(validate_config_value(&json!({"fetch": {"delay_secs": 1e6}})).is_err());
        assert!(validate_config_value(&json!({"fetch": {"backoff_factor_secs": 1e9}})).is_err());
        assert!(
            validate_config_value(&json!({"fetch": {"timeout_secs": 30, "delay_secs": 2.5}}))
                .is_ok()
        );
    }

    #[test]
    fn derives_content_sets_from_source_names() {
        let mut cfg = Config::default();
        for name in [
            "ugc_tutoria_catelog",
            "ugc_tutoria_text",
            "course_catelog",
            "course_text",
            "misc",
        ] {
            cfg.sources
                .insert(name.to_string(), format!("https://example.invalid/{name}"));
        }
        let sets = cfg.content_sets();
        assert_eq!(
            sets,
            vec![
                ContentSet {
                    catalog: "course_catelog".into(),
                    text: "course_text".into()
                },
                ContentSet {
                    catalog: "ugc_tutoria_catelog".into(),
                    text: "ugc_tutoria_text".into()
                },
            ]
        );
        assert_eq!(cfg.required_names().len(), 5);
        assert_eq!(
            ContentSet::derive("guide_catalog").unwrap().text,
            "guide_text"
        );
        assert!(ContentSet::derive("guide").is_none());
    }

    #[test]
    fn explicit_content_sets_are_required_names() {
        let cfg = Config {
            content_sets: Some(vec![ContentSet {
                catalog: "toc".into(),
                text: "bodies".into(),
            }]),
            ..Config::default()
        };
        assert_eq!(cfg.required_names(), vec!["bodies".to_string(), "toc".to_string()]);
    }

    #[test]
    fn load_resolves_save_path_next_to_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalogmd.json");
        fs::write(
            &path,
            json!({
                "save_path": "out",
                "sources": {"course_catelog": "https://example.invalid/c.json"},
                "warn_on_missing_text": true,
                "fetch": {"retries": 1, "headers": {"referer": "https://example.invalid/"}},
                "logging": {"level": "debug"}
            })
            .to_string(),
        )
        .unwrap();

        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.save_path, dir.path().join("out"));
        assert!(cfg.warn_on_missing_text);
        assert_eq!(cfg.fetch.retries, 1);
        assert_eq!(cfg.fetch.timeout_secs, 10.0);
        assert_eq!(
            cfg.fetch.headers.get("referer").map(String::as_str),
            Some("https://example.invalid/")
        );
        assert_eq!(cfg.logging.level, crate::logging::LogLevel::Debug);
    }

    #[test]
    fn schema_rejects_unknown_keys_and_bad_urls() {
        assert!(validate_config_value(&json!({"save_pth": "x"})).is_err());
        assert!(validate_config_value(&json!({"sources": {"a": "ftp://nope"}})).is_err());
        assert!(validate_config_value(&json!({"fetch": {"retries": -1}})).is_err());
        assert!(validate_config_value(&json!({"content_sets": [{"catalog": "a"}]})).is_err());
        assert!(validate_config_value(&json!({})).is_ok());
    }

    #[test]
    fn discover_errors_on_missing_explicit_file() {
        let dir = TempDir::new().unwrap();
        let err = Config::discover(Some(dir.path().join("nope.json").as_path())).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }
}
