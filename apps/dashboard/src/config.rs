use std::fs;

use serde::Deserialize;
use shared::protocol::DEFAULT_IMAGE_LIMIT;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_url: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub gallery_limit: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8080".into(),
            user: None,
            password: None,
            gallery_limit: DEFAULT_IMAGE_LIMIT,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    server_url: Option<String>,
    user: Option<String>,
    password: Option<String>,
    gallery_limit: Option<u32>,
}

/// Layered configuration: built-in defaults, then `dashboard.toml` in the
/// working directory, then `APP__*` environment variables.
pub fn load_config() -> Config {
    let mut config = Config::default();

    if let Ok(raw) = fs::read_to_string("dashboard.toml") {
        if let Ok(file_cfg) = toml::from_str::<FileConfig>(&raw) {
            if let Some(v) = file_cfg.server_url {
                config.server_url = v;
            }
            if file_cfg.user.is_some() {
                config.user = file_cfg.user;
            }
            if file_cfg.password.is_some() {
                config.password = file_cfg.password;
            }
            if let Some(v) = file_cfg.gallery_limit {
                config.gallery_limit = v;
            }
        }
    }

    if let Ok(v) = std::env::var("APP__SERVER_URL") {
        config.server_url = v;
    }
    if let Ok(v) = std::env::var("APP__USER") {
        config.user = Some(v);
    }
    if let Ok(v) = std::env::var("APP__PASSWORD") {
        config.password = Some(v);
    }
    if let Ok(v) = std::env::var("APP__GALLERY_LIMIT") {
        if let Ok(parsed) = v.parse::<u32>() {
            config.gallery_limit = parsed;
        }
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_the_local_server() {
        let config = Config::default();
        assert_eq!(config.server_url, "http://127.0.0.1:8080");
        assert_eq!(config.gallery_limit, DEFAULT_IMAGE_LIMIT);
        assert!(config.user.is_none());
    }

    #[test]
    fn file_config_tolerates_partial_documents() {
        let file_cfg: FileConfig = toml::from_str("server_url = \"http://10.0.0.2:9000\"")
            .expect("parse");
        assert_eq!(file_cfg.server_url.as_deref(), Some("http://10.0.0.2:9000"));
        assert!(file_cfg.gallery_limit.is_none());
    }
}
