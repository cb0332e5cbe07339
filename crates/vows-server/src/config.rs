use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Sqlite {
        path: PathBuf,
    },
    Google {
        guestbook_sheet_id: String,
        guestbook_sheet_index: usize,
        rsvp_sheet_id: String,
        rsvp_sheet_index: usize,
        client_email: String,
        private_key: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub content_path: PathBuf,
    pub photos_dir: PathBuf,
    pub store: StoreConfig,
    pub utc_offset_hours: i32,
    pub secure_cookies: bool,
    pub live_source_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let store = match var("VOWS_STORE").as_deref().unwrap_or("sqlite") {
            "sqlite" => StoreConfig::Sqlite {
                path: PathBuf::from(var_or("VOWS_DB_PATH", "vows.db")),
            },
            "google" => {
                let guestbook_sheet_id = required("GUESTBOOK_SHEET_ID")?;
                StoreConfig::Google {
                    rsvp_sheet_id: var("RSVP_SHEET_ID").unwrap_or_else(|| guestbook_sheet_id.clone()),
                    guestbook_sheet_id,
                    guestbook_sheet_index: parse_or("GUESTBOOK_SHEET_INDEX", 0)?,
                    rsvp_sheet_index: parse_or("RSVP_SHEET_INDEX", 1)?,
                    client_email: required("GOOGLE_SERVICE_ACCOUNT_EMAIL")?,
                    // Keys pasted into env files usually carry literal "\n".
                    private_key: required("GOOGLE_PRIVATE_KEY")?.replace("\\n", "\n"),
                }
            }
            other => return Err(anyhow!("VOWS_STORE must be 'sqlite' or 'google', got '{}'", other)),
        };

        let utc_offset_hours = parse_or("VOWS_UTC_OFFSET_HOURS", 9)?;
        if !(-23..=23).contains(&utc_offset_hours) {
            return Err(anyhow!("VOWS_UTC_OFFSET_HOURS out of range: {}", utc_offset_hours));
        }

        Ok(Self {
            host: var_or("VOWS_HOST", "0.0.0.0"),
            port: parse_or("VOWS_PORT", 3000)?,
            content_path: PathBuf::from(var_or("VOWS_CONTENT_PATH", "content.json")),
            photos_dir: PathBuf::from(var_or("VOWS_PHOTOS_DIR", "photos")),
            store,
            utc_offset_hours,
            secure_cookies: parse_or("VOWS_SECURE_COOKIES", false)?,
            live_source_url: var("VOWS_LIVE_SOURCE_URL"),
        })
    }
}

/// Unset and empty are treated alike.
fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn var_or(key: &str, default: &str) -> String {
    var(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}

fn required(key: &str) -> Result<String> {
    var(key).ok_or_else(|| anyhow!("{} must be set", key))
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match var(key) {
        Some(raw) => raw
            .parse()
            .map_err(|e| anyhow!("{}", e))
            .with_context(|| format!("Invalid {key} value '{raw}'")),
        None => Ok(default),
    }
}
