use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,

    // Registry: directory of <module>/<lang>.json files; built-in modules
    // are used when unset
    pub locales_dir: Option<String>,

    // Cache policy for full-locale responses, in seconds
    pub cache_max_age: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            port: std::env::var("PORT")
                .ok()
                .map(|v| v.parse().context("PORT must be a valid port number"))
                .transpose()?
                .unwrap_or(8080),

            locales_dir: std::env::var("LOCALES_DIR").ok(),

            cache_max_age: std::env::var("LOCALE_CACHE_MAX_AGE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600),
        })
    }
}
