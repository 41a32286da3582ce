use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::{Result, WrapErr, eyre};
use log::debug;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::cache::DEFAULT_TTL;
use crate::summarize::DEFAULT_MODEL;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub bind: String,
    pub caption_lang: String,
    pub cache: CacheConfig,
    pub redis: RedisConfig,
    pub summarizer: SummarizerConfig,
    pub auth: AuthConfig,
    pub email: EmailConfig,
    pub pdf: PdfConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            caption_lang: "en".to_string(),
            cache: CacheConfig::default(),
            redis: RedisConfig::default(),
            summarizer: SummarizerConfig::default(),
            auth: AuthConfig::default(),
            email: EmailConfig::default(),
            pdf: PdfConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Redis,
    Memory,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    pub ttl_secs: u64,
    /// Upper bound on cached videos for the memory backend
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            ttl_secs: DEFAULT_TTL.as_secs(),
            max_entries: 10_000,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
            password: None,
        }
    }
}

impl RedisConfig {
    /// `redis://` URL with the password percent-encoded
    pub fn connection_url(&self) -> Result<Url> {
        let mut url = Url::parse(&format!("redis://{}:{}/", self.host, self.port))
            .wrap_err_with(|| format!("invalid redis host {:?}", self.host))?;
        if let Some(password) = self.password.as_deref().filter(|p| !p.is_empty()) {
            url.set_password(Some(password))
                .map_err(|_| eyre!("cannot set password on redis url"))?;
        }
        Ok(url)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SummarizerConfig {
    pub model: String,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
    pub issuer: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EmailConfig {
    pub api_url: String,
    pub from: String,
    pub to: String,
    pub subject: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.postmarkapp.com/email".to_string(),
            from: "info@danielcooper.io".to_string(),
            to: "info@danielcooper.io".to_string(),
            subject: "Your video summary".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PdfConfig {
    pub endpoint: String,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:3000".to_string(),
        }
    }
}

impl Config {
    /// Load config from `path`, or ~/.config/ytsum/config.toml, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(config_path);
        let mut config = if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)?;
            toml::from_str(&content).wrap_err_with(|| format!("invalid config file {}", path.display()))?
        } else {
            debug!("No config file found at {}", path.display());
            Config::default()
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Override connection settings and secrets from the environment
    pub fn apply_env<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = var("REDIS_HOST") {
            self.redis.host = host;
        }
        if let Some(port) = var("REDIS_PORT") {
            self.redis.port = port.parse().wrap_err_with(|| format!("REDIS_PORT is not a port: {port:?}"))?;
        }
        if let Some(password) = var("REDIS_PASSWORD") {
            self.redis.password = Some(password);
        }
        if let Some(secret) = var("AUTH_JWT_SECRET") {
            self.auth.jwt_secret = Some(secret);
        }
        Ok(())
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("ytsum")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
bind = "127.0.0.1:9000"
caption_lang = "es"

[cache]
backend = "memory"
ttl_secs = 60

[redis]
host = "cache.internal"
port = 6380

[summarizer]
model = "claude-sonnet-4-6"

[email]
to = "me@example.com"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.bind, "127.0.0.1:9000");
        assert_eq!(config.caption_lang, "es");
        assert_eq!(config.cache.backend, CacheBackend::Memory);
        assert_eq!(config.cache.ttl(), Duration::from_secs(60));
        assert_eq!(config.redis.host, "cache.internal");
        assert_eq!(config.redis.port, 6380);
        assert_eq!(config.summarizer.model, "claude-sonnet-4-6");
        assert_eq!(config.email.to, "me@example.com");
        assert_eq!(config.email.subject, "Your video summary");
    }

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.cache.backend, CacheBackend::Redis);
        assert_eq!(config.cache.ttl_secs, 432_000);
        assert_eq!(config.cache.max_entries, 10_000);
        assert_eq!(config.summarizer.model, "gpt-4o-mini");
        assert!(config.auth.jwt_secret.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env(|key| match key {
                "REDIS_HOST" => Some("redis.example".to_string()),
                "REDIS_PORT" => Some("7000".to_string()),
                "REDIS_PASSWORD" => Some("p@ss word".to_string()),
                "AUTH_JWT_SECRET" => Some("secret".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.redis.host, "redis.example");
        assert_eq!(config.redis.port, 7000);
        assert_eq!(config.auth.jwt_secret.as_deref(), Some("secret"));
    }

    #[test]
    fn test_env_bad_port() {
        let mut config = Config::default();
        let result = config.apply_env(|key| (key == "REDIS_PORT").then(|| "not-a-port".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_redis_url_encodes_password() {
        let redis = RedisConfig {
            host: "redis.example".to_string(),
            port: 7000,
            password: Some("p@ss word".to_string()),
        };
        assert_eq!(redis.connection_url().unwrap().as_str(), "redis://:p%40ss%20word@redis.example:7000/");
    }

    #[test]
    fn test_redis_url_without_password() {
        assert_eq!(RedisConfig::default().connection_url().unwrap().as_str(), "redis://127.0.0.1:6379/");
    }
}
