//! Server configuration using Figment for layered config merging.
//!
//! Merge order (later overrides earlier):
//! 1. Compiled defaults
//! 2. `./legacore.toml`, or the file named by `LEGACORE_CONFIG`
//! 3. `LEGACORE_*` environment variables

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use legacore_auth::CredentialConfig;
use legacore_core::ai::AiConfig;
use legacore_db::DbConfig;
use serde::{Deserialize, Serialize};

pub const CONFIG_PATH_VAR: &str = "LEGACORE_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "legacore.toml";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Test,
    Production,
}

impl Environment {
    /// Internal error detail is only echoed to clients outside production.
    pub fn exposes_details(&self) -> bool {
        !matches!(self, Self::Production)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Tenant served by the unprefixed `/api/...` tenant routes.
    pub tenant_slug: String,
    pub environment: Environment,
    pub database: DbConfig,
    pub credentials: CredentialConfig,
    pub ai: AiConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3000,
            tenant_slug: "hbu-asset-recovery".into(),
            environment: Environment::Development,
            database: DbConfig::default(),
            credentials: CredentialConfig::default(),
            ai: AiConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Load configuration from the default file (or `LEGACORE_CONFIG`) with
/// environment overrides.
pub fn load_config() -> Result<ServerConfig, figment::Error> {
    let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.into());
    load_config_from_path(Path::new(&path))
}

/// Load configuration from a specific file path with env var overrides.
/// A missing file contributes nothing.
pub fn load_config_from_path(path: &Path) -> Result<ServerConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ServerConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Load configuration from TOML text only (no file, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<ServerConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ServerConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

const SECTIONS: &[&str] = &["database", "credentials", "ai"];

/// Section prefixes are mapped explicitly so that underscores inside key
/// names survive: `LEGACORE_DATABASE_URL` -> `database.url`,
/// `LEGACORE_TENANT_SLUG` -> `tenant_slug`.
fn env_provider() -> Env {
    Env::prefixed("LEGACORE_")
        .ignore(&["config"])
        .map(|key| {
            let key = key.as_str();
            SECTIONS
                .iter()
                .find_map(|section| {
                    key.strip_prefix(section)
                        .and_then(|rest| rest.strip_prefix('_'))
                        .map(|rest| format!("{section}.{rest}"))
                })
                .unwrap_or_else(|| key.to_string())
                .into()
        })
}

#[cfg(test)]
mod tests {
    use legacore_core::ai::AiProvider;

    use super::*;

    #[test]
    fn defaults_are_usable_without_a_file() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.database.url, "mem://");
        assert_eq!(config.ai.provider, AiProvider::Mock);
        assert!(config.environment.exposes_details());
    }

    #[test]
    fn toml_sections_override_defaults() {
        let config = load_config_from_str(
            r#"
            port = 8080
            tenant_slug = "lumora-creations"
            environment = "production"

            [database]
            url = "ws://db:8000"
            namespace = "prod"

            [credentials]
            pepper = "s3cret"
            "#,
        )
        .unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.tenant_slug, "lumora-creations");
        assert_eq!(config.database.url, "ws://db:8000");
        assert_eq!(config.database.database, "main");
        assert_eq!(config.credentials.pepper(), Some("s3cret"));
        assert!(!config.environment.exposes_details());
    }
}
