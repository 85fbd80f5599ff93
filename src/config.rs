use std::env;
use std::path::PathBuf;

use anyhow::{Result, bail};

pub const TOKEN_PLACEHOLDER: &str = "PASTE_YOUR_TOKEN_HERE";

/// Loads the optional `.env` file and verifies the bot token is usable.
/// A missing or placeholder token is the only fatal startup condition.
pub fn load_environment() -> Result<()> {
    if let Ok(path) = dotenv::dotenv() {
        log::info!("Loaded environment from {:?}", path);
    }

    let token = env::var("TELOXIDE_TOKEN").unwrap_or_default();
    if token.is_empty() || token == TOKEN_PLACEHOLDER {
        bail!("TELOXIDE_TOKEN is not set (or is still the placeholder)");
    }

    Ok(())
}

/// Admin identity and data-directory settings, read once at startup.
///
/// `admin_id` takes precedence over `admin_username` when both are set.
/// When neither is set every admin action is denied.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub admin_id: Option<u64>,
    pub admin_username: Option<String>,
    pub data_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        let admin_id = env::var("ADMIN_ID")
            .ok()
            .as_deref()
            .and_then(parse_admin_id);
        let admin_username = env::var("ADMIN_USERNAME")
            .ok()
            .as_deref()
            .and_then(normalize_username);
        let data_dir = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        Self {
            admin_id,
            admin_username,
            data_dir,
        }
    }
}

// ADMIN_ID=0 means "not configured", matching the username fallback rule.
fn parse_admin_id(raw: &str) -> Option<u64> {
    raw.trim().parse().ok().filter(|&id| id != 0)
}

fn normalize_username(raw: &str) -> Option<String> {
    let name = raw.trim().trim_start_matches('@');
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
