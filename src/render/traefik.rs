//! Edge router (traefik) dynamic configuration rendering.
//!
//! The document has a fixed shape and does not depend on discovered routes:
//! auxiliary service routers, a catch-all router sending every project
//! subdomain to nginx, and the services behind them.

use crate::config::env::{self, Environment};
use crate::config::EdgeConfig;

/// Edge router values, each overridable from the environment file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeSettings {
    pub cert_file: String,
    pub key_file: String,
    pub dashboard_enabled: bool,
    pub dashboard_domain: String,
    pub adminer_domain: String,
    pub mailpit_domain: String,
    pub base_domain: String,
    pub adminer_url: String,
    pub mailpit_url: String,
    pub nginx_url: String,
}

impl EdgeSettings {
    pub fn from_env(config: &EdgeConfig, env: &Environment) -> Self {
        Self {
            cert_file: config.cert_file.clone(),
            key_file: config.key_file.clone(),
            dashboard_enabled: env.get(env::TRAEFIK_ENABLE_DASHBOARD) == Some("true"),
            dashboard_domain: env
                .get_or(env::TRAEFIK_DASHBOARD_DOMAIN, &config.dashboard_domain)
                .to_string(),
            adminer_domain: env
                .get_or(env::ADMINER_DOMAIN, &config.adminer_domain)
                .to_string(),
            mailpit_domain: env
                .get_or(env::MAILPIT_DOMAIN, &config.mailpit_domain)
                .to_string(),
            base_domain: env.get_or(env::BASE_DOMAIN, &config.base_domain).to_string(),
            adminer_url: config.adminer_url.clone(),
            mailpit_url: config.mailpit_url.clone(),
            nginx_url: config.nginx_url.clone(),
        }
    }

    /// Dashboard rule; a disabled dashboard stays routed to a host that
    /// never resolves instead of being omitted.
    pub fn dashboard_rule(&self) -> String {
        if self.dashboard_enabled {
            format!(
                "Host(`{}`) || Host(`traefik.localhost`)",
                self.dashboard_domain
            )
        } else {
            "Host(`disabled.traefik.localhost`)".to_string()
        }
    }

    /// Catch-all rule for every project subdomain of the base domain.
    ///
    /// Dots are escaped for the regex and the backslashes doubled again for
    /// the double-quoted YAML scalar.
    pub fn projects_rule(&self) -> String {
        let escaped = self.base_domain.replace('.', "\\\\.");
        format!(
            "HostRegexp(`^.+\\\\.{}$`) || Host(`{}`) || Host(`localhost`)",
            escaped, self.base_domain
        )
    }
}

/// Render the dynamic configuration document.
pub fn render(settings: &EdgeSettings) -> String {
    let mut out = String::new();

    out.push_str("tls:\n");
    out.push_str("  stores:\n");
    out.push_str("    default:\n");
    out.push_str("      defaultCertificate:\n");
    out.push_str(&format!("        certFile: {}\n", settings.cert_file));
    out.push_str(&format!("        keyFile: {}\n", settings.key_file));
    out.push('\n');

    out.push_str("http:\n");
    out.push_str("  routers:\n");
    out.push_str("    # Traefik Dashboard\n");
    out.push_str("    traefik:\n");
    out.push_str("      entryPoints: [\"web\"]\n");
    out.push_str(&format!("      rule: \"{}\"\n", settings.dashboard_rule()));
    out.push_str("      priority: 10\n");
    out.push_str("      service: \"api@internal\"\n");
    out.push_str("      middlewares: [\"dashboard-enabled\"]\n");
    out.push('\n');

    push_service_router(&mut out, "Adminer", "adminer", &settings.adminer_domain);
    push_service_router(&mut out, "Mailpit", "mailpit", &settings.mailpit_domain);

    out.push_str("    # Projects (Nginx)\n");
    out.push_str("    projects:\n");
    out.push_str("      entryPoints: [\"web\"]\n");
    out.push_str(&format!("      rule: \"{}\"\n", settings.projects_rule()));
    out.push_str("      priority: 1\n");
    out.push_str("      service: \"nginx\"\n");
    out.push('\n');

    out.push_str("  services:\n");
    push_service(&mut out, "adminer", &settings.adminer_url);
    push_service(&mut out, "mailpit", &settings.mailpit_url);
    push_service(&mut out, "nginx", &settings.nginx_url);
    out.push('\n');

    out.push_str("  middlewares:\n");
    out.push_str("    redirect-to-https:\n");
    out.push_str("      redirectScheme:\n");
    out.push_str("        scheme: https\n");
    out.push_str("        permanent: true\n");
    out.push_str("    dashboard-enabled:\n");
    out.push_str("      chain:\n");
    out.push_str("        middlewares: []\n");

    out
}

fn push_service_router(out: &mut String, title: &str, name: &str, domain: &str) {
    out.push_str(&format!("    # {}\n", title));
    out.push_str(&format!("    {}:\n", name));
    out.push_str("      entryPoints: [\"web\"]\n");
    out.push_str(&format!(
        "      rule: \"Host(`{}`) || Host(`{}.localhost`)\"\n",
        domain, name
    ));
    out.push_str("      priority: 10\n");
    out.push_str(&format!("      service: \"{}\"\n", name));
    out.push('\n');
}

fn push_service(out: &mut String, name: &str, url: &str) {
    out.push_str(&format!("    {}:\n", name));
    out.push_str("      loadBalancer:\n");
    out.push_str("        servers:\n");
    out.push_str(&format!("          - url: \"{}\"\n", url));
}
