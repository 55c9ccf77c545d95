use std::env;
use tracing::{debug, warn};

/// HTTP server settings
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins; `None` allows any origin
    pub cors_allowed_origins: Option<Vec<String>>,
    /// Upper bound for a request body, multipart uploads included
    pub max_upload_bytes: usize,
    pub max_property_images: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5000);

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .ok()
            .map(|raw| parse_origins(&raw))
            .filter(|origins| !origins.is_empty());
        match &cors_allowed_origins {
            Some(origins) => debug!("CORS restricted to {:?}", origins),
            None => warn!("CORS_ALLOWED_ORIGINS not set, allowing any origin"),
        }

        let max_upload_bytes = env::var("MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(25 * 1024 * 1024);
        let max_property_images = env::var("MAX_PROPERTY_IMAGES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        AppConfig {
            host,
            port,
            cors_allowed_origins,
            max_upload_bytes,
            max_property_images,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "127.0.0.1".to_string(),
            port: 5000,
            cors_allowed_origins: None,
            max_upload_bytes: 25 * 1024 * 1024,
            max_property_images: 5,
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/').to_string())
        .filter(|origin| !origin.is_empty())
        .collect()
}
