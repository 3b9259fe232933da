use anyhow::{Context, Result};
use std::env;
use std::fmt;
use std::path::PathBuf;

const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_PORT: u16 = 5000;

/// Process-wide settings, read once at startup.
pub struct Config {
    pub bot_token: String,
    pub google_api_key: String,
    pub gemini_model: String,
    pub port: u16,
    pub temp_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key/value source. Missing secrets are an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .with_context(|| format!("{} must be set in environment or .env file", key))
        };

        let bot_token = required("BOT_TOKEN")?;
        let google_api_key = required("GOOGLE_API_KEY")?;

        let gemini_model = lookup("GEMINI_MODEL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORT must be a valid port number, got '{}'", raw))?,
            None => DEFAULT_PORT,
        };

        let temp_dir = lookup("TEMP_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(env::temp_dir);

        Ok(Self {
            bot_token,
            google_api_key,
            gemini_model,
            port,
            temp_dir,
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("gemini_model", &self.gemini_model)
            .field("port", &self.port)
            .field("temp_dir", &self.temp_dir)
            .finish_non_exhaustive()
    }
}
