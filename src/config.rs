//! Server configuration from CLI flags and environment variables.

use std::path::PathBuf;

use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8001;

/// Settings for `hstk serve`.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// SQLite file. `None` uses the platform data directory.
    pub db_path: Option<PathBuf>,
    /// Allowed CORS origins (from HABIT_STACKS_CORS_ORIGINS, comma-separated).
    /// `None` allows any origin.
    pub cors_origins: Option<Vec<String>>,
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let host = std::env::var("HABIT_STACKS_HOST").unwrap_or_else(|_| DEFAULT_HOST.into());

        let port = std::env::var("HABIT_STACKS_PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let db_path = std::env::var("HABIT_STACKS_DB").ok().map(PathBuf::from);

        Self {
            host,
            port,
            db_path,
            cors_origins: cors_origins_from_env(),
        }
    }

    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn cors_layer(&self) -> CorsLayer {
        let Some(origins) = &self.cors_origins else {
            return CorsLayer::permissive();
        };

        let origins: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                    None
                }
            })
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            db_path: None,
            cors_origins: None,
        }
    }
}

pub fn cors_origins_from_env() -> Option<Vec<String>> {
    std::env::var("HABIT_STACKS_CORS_ORIGINS")
        .ok()
        .map(|s| parse_origins(&s))
}

fn parse_origins(s: &str) -> Vec<String> {
    s.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_binds_localhost() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr(), "127.0.0.1:8001");
        assert!(config.cors_origins.is_none());
    }

    #[test]
    fn origins_are_trimmed_and_blank_entries_dropped() {
        let origins = parse_origins(" http://localhost:3000 ,, https://habits.example ");
        assert_eq!(
            origins,
            vec!["http://localhost:3000", "https://habits.example"]
        );
    }

    #[test]
    fn config_with_cors_origins_keeps_them() {
        let config =
            ServerConfig::default().with_cors_origins(vec!["http://localhost:3000".to_string()]);
        assert_eq!(
            config.cors_origins,
            Some(vec!["http://localhost:3000".to_string()])
        );
    }
}
