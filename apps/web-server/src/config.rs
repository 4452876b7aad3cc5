//! Application configuration loaded from environment variables.

use std::env;

use quill_infra::database::DatabaseConfig;

#[cfg(feature = "smtp")]
use quill_infra::SmtpConfig;

/// Site metadata used in page headers, the feed, and absolute URLs.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SiteConfig {
    /// Absolute base URL without a trailing slash, e.g. `https://blog.example.com`.
    pub base_url: String,
    pub title: String,
    pub description: String,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    #[cfg(feature = "smtp")]
    pub smtp: Option<SmtpConfig>,
    pub site: SiteConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(100),
            min_connections: env::var("DB_MIN_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        });

        #[cfg(feature = "smtp")]
        let smtp = env::var("SMTP_HOST").ok().map(|host| SmtpConfig {
            host,
            username: env::var("SMTP_USERNAME").ok(),
            password: env::var("SMTP_PASSWORD").ok(),
            from: env::var("SMTP_FROM").unwrap_or_else(|_| "blog@localhost".to_string()),
        });

        let base_url = env::var("SITE_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string());

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            database,
            #[cfg(feature = "smtp")]
            smtp,
            site: SiteConfig {
                base_url: base_url.trim_end_matches('/').to_string(),
                title: env::var("SITE_TITLE").unwrap_or_else(|_| "My Blog".to_string()),
                description: env::var("SITE_DESCRIPTION")
                    .unwrap_or_else(|_| "New posts of my blog.".to_string()),
            },
        }
    }
}
