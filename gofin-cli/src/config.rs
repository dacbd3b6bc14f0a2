use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use gofin_core::time::parse_timezone;
use gofin_finance::{FallbackPolicy, PipelineSettings};
use gofin_ingest::client::{self, ClientSettings};
use gofin_store::{DemoAccount, DEMO_EMAIL, DEMO_NAME};

use crate::state::ensure_gofin_home;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub llm: LlmSection,
    pub storage: StorageSection,
    pub profile: ProfileSection,
    pub classification: ClassificationSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmSection {
    /// OpenAI-compatible endpoint root; `/chat/completions` is appended
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageSection {
    /// Defaults to ~/.gofin/gofin.db
    pub db_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProfileSection {
    /// IANA timezone used for "today"
    pub timezone: String,
    pub demo_email: String,
    pub demo_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClassificationSection {
    pub fallback: FallbackPolicy,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            base_url: client::DEFAULT_BASE_URL.to_string(),
            model: client::DEFAULT_MODEL.to_string(),
            temperature: client::DEFAULT_TEMPERATURE,
            max_tokens: client::DEFAULT_MAX_TOKENS,
            timeout_secs: client::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Default for ProfileSection {
    fn default() -> Self {
        Self {
            timezone: "America/Sao_Paulo".to_string(),
            demo_email: DEMO_EMAIL.to_string(),
            demo_name: DEMO_NAME.to_string(),
        }
    }
}

impl Config {
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.llm.base_url.clone(),
            model: self.llm.model.clone(),
            temperature: self.llm.temperature,
            max_tokens: self.llm.max_tokens,
            timeout: Duration::from_secs(self.llm.timeout_secs),
        }
    }

    pub fn demo_account(&self) -> DemoAccount {
        DemoAccount {
            email: self.profile.demo_email.clone(),
            name: self.profile.demo_name.clone(),
        }
    }

    pub fn pipeline_settings(&self) -> Result<PipelineSettings> {
        Ok(PipelineSettings {
            timezone: parse_timezone(&self.profile.timezone)?,
            fallback: self.classification.fallback,
            demo: self.demo_account(),
        })
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.storage.db_path {
            Some(p) => Ok(p.clone()),
            None => Ok(ensure_gofin_home()?.join("gofin.db")),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_gofin_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s)
}

pub fn parse_config(s: &str) -> Result<Config> {
    toml::from_str(s).context("parse config.toml")
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(parse_config("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let cfg = parse_config(
            r#"
[llm]
model = "deepseek-reasoner"

[classification]
fallback = "any-unrecognized"
"#,
        )
        .unwrap();
        assert_eq!(cfg.llm.model, "deepseek-reasoner");
        assert_eq!(cfg.llm.base_url, "https://api.deepseek.com");
        assert_eq!(cfg.classification.fallback, FallbackPolicy::AnyUnrecognized);
        assert_eq!(cfg.profile.timezone, "America/Sao_Paulo");
    }

    #[test]
    fn test_round_trip_through_toml() {
        let cfg = Config::default();
        let s = toml::to_string_pretty(&cfg).unwrap();
        assert_eq!(parse_config(&s).unwrap(), cfg);
    }

    #[test]
    fn test_bad_timezone_fails_pipeline_settings() {
        let mut cfg = Config::default();
        cfg.profile.timezone = "Nowhere/Land".to_string();
        assert!(cfg.pipeline_settings().is_err());
    }

    #[test]
    fn test_client_settings_from_config() {
        let mut cfg = Config::default();
        cfg.llm.timeout_secs = 5;
        let s = cfg.client_settings();
        assert_eq!(s.timeout, Duration::from_secs(5));
        assert_eq!(s.model, "deepseek-chat");
    }

    #[test]
    fn test_explicit_db_path() {
        let mut cfg = Config::default();
        cfg.storage.db_path = Some(PathBuf::from("/tmp/x.db"));
        assert_eq!(cfg.db_path().unwrap(), PathBuf::from("/tmp/x.db"));
    }
}
