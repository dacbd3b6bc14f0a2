use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};

use crate::state::ensure_gofin_home;

/// Environment variable that overrides the stored key
pub const API_KEY_ENV: &str = "DEEPSEEK_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthState {
    pub api_key: Option<String>,
}

fn auth_path() -> Result<std::path::PathBuf> {
    Ok(ensure_gofin_home()?.join("auth.json"))
}

pub fn load_auth() -> Result<AuthState> {
    let p = auth_path()?;
    if !p.exists() {
        return Ok(AuthState::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    Ok(serde_json::from_str(&s)?)
}

pub fn save_auth(auth: &AuthState) -> Result<()> {
    let p = auth_path()?;
    let s = serde_json::to_string_pretty(auth)?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

fn prompt_secret(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush().ok();
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s.trim().to_string())
}

pub fn paste_api_key() -> Result<()> {
    let mut auth = load_auth()?;
    let key = prompt_secret("Paste model API key (starts with sk-)")?;
    if !key.starts_with("sk-") {
        bail!("key didn't look like an API key (expected prefix sk-)");
    }
    auth.api_key = Some(key);
    save_auth(&auth)?;
    println!("Saved API key to ~/.gofin/auth.json");
    Ok(())
}

/// Non-empty env value wins over the stored key
pub fn pick_api_key(env: Option<String>, stored: Option<String>) -> Option<String> {
    env.filter(|k| !k.trim().is_empty())
        .or(stored.filter(|k| !k.trim().is_empty()))
}

/// The credential handed to the pipeline, if any is configured
pub fn resolve_api_key() -> Result<Option<String>> {
    let env = std::env::var(API_KEY_ENV).ok();
    Ok(pick_api_key(env, load_auth()?.api_key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_overrides_stored() {
        assert_eq!(
            pick_api_key(Some("sk-env".into()), Some("sk-file".into())).as_deref(),
            Some("sk-env")
        );
    }

    #[test]
    fn test_blank_env_falls_back_to_stored() {
        assert_eq!(
            pick_api_key(Some(" ".into()), Some("sk-file".into())).as_deref(),
            Some("sk-file")
        );
    }

    #[test]
    fn test_nothing_configured() {
        assert_eq!(pick_api_key(None, None), None);
        assert_eq!(pick_api_key(None, Some(String::new())), None);
    }
}
