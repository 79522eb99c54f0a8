//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the generator.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Root configuration for the generator.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Locations of inputs and outputs, relative to the tree root.
    pub paths: PathsConfig,

    /// Reverse-proxy rendering settings.
    pub proxy: ProxyConfig,

    /// Edge router fallbacks.
    pub edge: EdgeConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Input and output locations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory scanned for projects.
    pub projects_dir: String,

    /// Declaration file location inside each project directory.
    pub declaration_file: String,

    /// Key/value environment file.
    pub env_file: String,

    /// Directory receiving the generated nginx files.
    pub nginx_conf_dir: String,

    /// Generated traefik dynamic configuration.
    pub traefik_dynamic_file: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            projects_dir: "projects".to_string(),
            declaration_file: ".devkit/devkit.yml".to_string(),
            env_file: ".env".to_string(),
            nginx_conf_dir: "docker/nginx/conf.d".to_string(),
            traefik_dynamic_file: "docker/traefik/dynamic.yml".to_string(),
        }
    }
}

/// How the proxy configuration is split into files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OutputLayout {
    /// Shared upstream file plus one file per domain.
    #[default]
    PerDomain,
    /// Everything in a single file.
    Single,
}

impl FromStr for OutputLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "per-domain" => Ok(Self::PerDomain),
            "single" => Ok(Self::Single),
            other => Err(format!("unknown layout '{}' (expected per-domain or single)", other)),
        }
    }
}

/// Reverse-proxy rendering settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Mount point of the projects tree inside the web server container.
    pub projects_base: String,

    /// PHP version used when `DEFAULT_PHP` is not set.
    pub default_php: String,

    /// FPM upstream address per PHP version (digits only, e.g. "82").
    pub upstreams: BTreeMap<String, String>,

    /// Host used for dev proxies that do not name one.
    pub dev_host: String,

    /// File layout of the rendered configuration.
    pub layout: OutputLayout,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        let upstreams = ["74", "82", "84", "85"]
            .iter()
            .map(|v| (v.to_string(), format!("php{}:9000", v)))
            .collect();

        Self {
            projects_base: "/var/www/projects".to_string(),
            default_php: "82".to_string(),
            upstreams,
            dev_host: "node".to_string(),
            layout: OutputLayout::PerDomain,
        }
    }
}

/// Edge router fallbacks, used when the environment file has no override.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EdgeConfig {
    pub cert_file: String,
    pub key_file: String,
    pub dashboard_domain: String,
    pub adminer_domain: String,
    pub mailpit_domain: String,
    pub base_domain: String,
    pub adminer_url: String,
    pub mailpit_url: String,
    pub nginx_url: String,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            cert_file: "/certs/devkit.crt".to_string(),
            key_file: "/certs/devkit.key".to_string(),
            dashboard_domain: "traefik.local.test".to_string(),
            adminer_domain: "adminer.local.test".to_string(),
            mailpit_domain: "mailpit.local.test".to_string(),
            base_domain: "local.test".to_string(),
            adminer_url: "http://adminer:8080".to_string(),
            mailpit_url: "http://mailpit:8025".to_string(),
            nginx_url: "http://nginx:80".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
