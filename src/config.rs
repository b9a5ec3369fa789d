//! Process-wide configuration, resolved once at startup.
//!
//! Values come from the environment (prefix `FOUNTAIN_`, `__` as the nesting
//! separator) merged over development defaults. The struct is passed to
//! constructors explicitly; nothing re-reads the environment mid-process.

use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub bind_addr: String,
    pub database_url: String,
    /// HMAC secret for bearer tokens. The default exists for development
    /// only; any real deployment must override it via `FOUNTAIN_SECRET_KEY`.
    pub secret_key: String,
    pub token_ttl_secs: i64,
    pub admin_email: String,
    pub admin_password: String,
    /// Comma-separated list of allowed CORS origins.
    pub frontend_urls: String,
    pub loglevel: String,
    pub cloud: CloudConfig,
    pub mail: MailConfig,
    pub chat: ChatConfig,
}

/// External image host (Cloudinary-style REST API).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudConfig {
    pub cloud_name: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub api_base: String,
    /// Uploads land under `<folder_prefix>/<category>` on the host.
    pub folder_prefix: String,
}

/// Outbound transactional mail API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    pub api_url: Option<Url>,
    pub api_key: Option<String>,
    pub from: String,
}

/// Text-completion upstream backing the public chat widget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    pub api_url: Option<Url>,
    pub api_key: Option<String>,
    pub model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5000".to_string(),
            database_url: "sqlite:database.sqlite".to_string(),
            secret_key: "supersecretkey123".to_string(),
            token_ttl_secs: 3600,
            admin_email: "admin@fountainofpeace.com".to_string(),
            admin_password: "admin123".to_string(),
            frontend_urls: "http://localhost:3000".to_string(),
            loglevel: "info".to_string(),
            cloud: CloudConfig {
                cloud_name: None,
                api_key: None,
                api_secret: None,
                api_base: "https://api.cloudinary.com/v1_1".to_string(),
                folder_prefix: "fountainofpeace".to_string(),
            },
            mail: MailConfig {
                api_url: None,
                api_key: None,
                from: "no-reply@fountainofpeace.com".to_string(),
            },
            chat: ChatConfig {
                api_url: None,
                api_key: None,
                model: "gpt-4o-mini".to_string(),
            },
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::prefixed("FOUNTAIN_").split("__"))
            .extract()
    }

    pub fn allowed_origins(&self) -> Vec<String> {
        self.frontend_urls
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_development_safe() {
        let cfg = Config::default();
        assert_eq!(cfg.token_ttl_secs, 3600);
        assert!(cfg.cloud.cloud_name.is_none());
        assert_eq!(cfg.allowed_origins(), vec!["http://localhost:3000"]);
    }

    #[test]
    fn origins_split_and_trim() {
        let cfg = Config {
            frontend_urls: "https://a.example, https://b.example,".to_string(),
            ..Config::default()
        };
        assert_eq!(
            cfg.allowed_origins(),
            vec!["https://a.example", "https://b.example"]
        );
    }
}
