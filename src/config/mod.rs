// Configuration module

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::meme::MemeStyle;

pub mod cloudinary;
pub mod logging;
pub mod messenger;
pub mod server;
pub mod session;

pub use cloudinary::CloudinaryConfig;
pub use logging::LoggingConfig;
pub use messenger::MessengerConfig;
pub use server::ServerConfig;
pub use session::{SessionBackend, SessionConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub messenger: MessengerConfig,
    pub cloudinary: CloudinaryConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub meme: MemeStyle,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse YAML after substituting `${VAR}` and `${VAR:-default}` references.
    ///
    /// A `${VAR}` reference without a default fails when `VAR` is unset.
    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, String> {
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}").map_err(|e| e.to_string())?;

        // First, check that every reference without a default is set
        for caps in re.captures_iter(yaml) {
            let var_name = &caps[1];
            if caps.get(2).is_none() && std::env::var(var_name).is_err() {
                return Err(format!(
                    "Environment variable '{}' is referenced but not set",
                    var_name
                ));
            }
        }

        let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
            let fallback = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
            std::env::var(&caps[1]).unwrap_or_else(|_| fallback.to_string())
        });

        serde_yaml::from_str(&substituted).map_err(|e| e.to_string())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::from_yaml_with_env(&yaml)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be greater than 0".to_string());
        }
        if self.server.max_body_size == 0 {
            return Err("server.max_body_size must be greater than 0".to_string());
        }

        // The webhook cannot work without all three platform values
        let messenger = &self.messenger;
        for (name, value) in [
            ("messenger.app_secret", &messenger.app_secret),
            ("messenger.validation_token", &messenger.validation_token),
            ("messenger.page_access_token", &messenger.page_access_token),
        ] {
            if value.trim().is_empty() {
                return Err(format!("Missing config value: {}", name));
            }
        }
        if !messenger.graph_api_url.starts_with("http://")
            && !messenger.graph_api_url.starts_with("https://")
        {
            return Err(format!(
                "messenger.graph_api_url '{}' must start with http:// or https://",
                messenger.graph_api_url
            ));
        }

        let cloudinary = &self.cloudinary;
        for (name, value) in [
            ("cloudinary.cloud_name", &cloudinary.cloud_name),
            ("cloudinary.api_key", &cloudinary.api_key),
            ("cloudinary.api_secret", &cloudinary.api_secret),
        ] {
            if value.trim().is_empty() {
                return Err(format!("Missing config value: {}", name));
            }
        }
        if cloudinary.cloud_name.contains('/') {
            return Err(format!(
                "cloudinary.cloud_name '{}' cannot contain '/'",
                cloudinary.cloud_name
            ));
        }
        if cloudinary.upload_tag.trim().is_empty() {
            return Err("cloudinary.upload_tag cannot be empty".to_string());
        }

        if self.session.backend == SessionBackend::Redis {
            match &self.session.redis_url {
                None => {
                    return Err("session.redis_url is required when backend is 'redis'".to_string())
                }
                Some(url) if !url.starts_with("redis://") && !url.starts_with("rediss://") => {
                    return Err(format!(
                        "session.redis_url '{}' must start with redis:// or rediss://",
                        url
                    ));
                }
                Some(_) => {}
            }
        }
        if self.session.ttl_seconds == Some(0) {
            return Err("session.ttl_seconds must be greater than 0 when set".to_string());
        }

        self.meme.validate()?;

        Ok(())
    }
}
