//! Reverse-proxy (nginx) configuration rendering.
//!
//! # Responsibilities
//! - Shared FPM upstream declarations, one per known PHP version
//! - One server block per domain, one rule set per route
//! - PHP version resolution with silent fallback to the default
//!
//! # Design Decisions
//! - Pure text rendering: identical input gives identical bytes
//! - Upstreams are emitted in ascending version order
//! - Unknown PHP versions degrade to the default upstream, never fail

use crate::config::env::{self, Environment};
use crate::config::GeneratorConfig;
use crate::render::rules::{select_rule, ServingRule};
use crate::routing::{DomainGroups, Route};

/// Header of the shared upstream declarations.
pub const UPSTREAMS_HEADER: &str = "# AUTO-GENERATED - Shared Upstreams\n";

/// Emitted instead of server blocks when no route was discovered.
pub const NO_ROUTES_COMMENT: &str =
    "# No routes found: no project declares a complete route.\n";

const PHP_VALUE: &str =
    "    fastcgi_param PHP_VALUE \"display_errors=1 \\n error_reporting=E_ALL\";\n";

/// Settings the proxy renderer needs, resolved from config and environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySettings {
    /// Mount point of the projects tree inside the web server.
    pub projects_base: String,
    /// Leading project-path segment stripped before joining onto the base.
    pub projects_dir: String,
    /// Digits-only default PHP version.
    pub default_php: String,
    /// `(version, address)` in ascending version order.
    pub upstreams: Vec<(String, String)>,
    pub dev_host: String,
}

impl ProxySettings {
    pub fn from_config(config: &GeneratorConfig, env: &Environment) -> Self {
        let configured = digits_only(&config.proxy.default_php);
        let default_php = env
            .get(env::DEFAULT_PHP)
            .map(digits_only)
            .filter(|v| !v.is_empty())
            .unwrap_or(configured);

        let mut upstreams: Vec<(String, String)> = config
            .proxy
            .upstreams
            .iter()
            .map(|(v, a)| (v.clone(), a.clone()))
            .collect();
        upstreams.sort_by(|(a, _), (b, _)| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));

        let settings = Self {
            projects_base: config.proxy.projects_base.clone(),
            projects_dir: strip_leading(config.paths.projects_dir.trim_end_matches('/'))
                .trim_start_matches('/')
                .to_string(),
            default_php,
            upstreams,
            dev_host: config.proxy.dev_host.clone(),
        };

        if !settings.is_known(&settings.default_php) {
            tracing::warn!(
                default_php = %settings.default_php,
                "Default PHP version has no upstream"
            );
        }
        settings
    }

    fn is_known(&self, version: &str) -> bool {
        self.upstreams.iter().any(|(v, _)| v == version)
    }

    /// Digits of the declared version if it has an upstream, otherwise the
    /// default version.
    pub fn resolve_php_version(&self, declared: Option<&str>) -> String {
        let version = digits_only(declared.unwrap_or(&self.default_php));
        if self.is_known(&version) {
            version
        } else {
            tracing::debug!(
                declared = declared.unwrap_or_default(),
                fallback = %self.default_php,
                "Unknown PHP version, using default"
            );
            self.default_php.clone()
        }
    }

    /// Upstream name serving the declared PHP version.
    pub fn resolve_upstream(&self, declared: Option<&str>) -> String {
        upstream_name(&self.resolve_php_version(declared))
    }

    /// Filesystem root a route is served from inside the web server.
    pub fn fs_root(&self, route: &Route) -> String {
        let path = strip_leading(&route.path);
        let prefix = format!("{}/", self.projects_dir);
        let path = path.strip_prefix(prefix.as_str()).unwrap_or(path);
        let docroot = strip_leading(&route.docroot);

        join_posix(&[&self.projects_base, path, docroot])
    }
}

/// Renders the reverse-proxy configuration.
#[derive(Debug, Clone)]
pub struct ProxyConfigRenderer {
    settings: ProxySettings,
}

impl ProxyConfigRenderer {
    pub fn new(settings: ProxySettings) -> Self {
        Self { settings }
    }

    /// Whole configuration as a single document.
    pub fn render(&self, groups: &DomainGroups<'_>) -> String {
        let mut out = self.render_upstreams();
        out.push('\n');
        if groups.is_empty() {
            out.push_str(NO_ROUTES_COMMENT);
            return out;
        }
        for (domain, routes) in groups {
            out.push_str(&self.render_server(domain, routes));
        }
        out
    }

    /// Shared upstream file plus one document per domain.
    pub fn render_per_domain(
        &self,
        groups: &DomainGroups<'_>,
    ) -> (String, Vec<(String, String)>) {
        let mut upstreams = self.render_upstreams();
        if groups.is_empty() {
            upstreams.push('\n');
            upstreams.push_str(NO_ROUTES_COMMENT);
        }

        let servers = groups
            .iter()
            .map(|(domain, routes)| (domain.to_string(), self.render_server(domain, routes)))
            .collect();

        (upstreams, servers)
    }

    pub fn render_upstreams(&self) -> String {
        let mut out = String::from(UPSTREAMS_HEADER);
        for (version, address) in &self.settings.upstreams {
            out.push_str(&format!(
                "upstream {} {{ server {}; }}\n",
                upstream_name(version),
                address
            ));
        }
        out
    }

    /// One server block for `domain`.
    pub fn render_server(&self, domain: &str, routes: &[&Route]) -> String {
        let mut out = format!("# AUTO-GENERATED for {}\n\n", domain);
        out.push_str("server {\n");
        out.push_str("  listen 80;\n");
        out.push_str(&format!("  server_name {};\n\n", domain));

        for route in routes {
            out.push_str(&format!("  # Source: {}\n", route.source.display()));
            self.render_route(&mut out, route);
        }

        out.push_str("}\n\n");
        out
    }

    fn render_route(&self, out: &mut String, route: &Route) {
        let rule = select_rule(
            route.url_path.is_root(),
            route.dev.is_some(),
            route.kind.is_php(),
        );
        let fs_root = self.settings.fs_root(route);
        let prefix = route.url_path.as_str();

        match rule {
            ServingRule::RootProxy => self.render_proxy(out, route, "/"),
            ServingRule::RootPhp => {
                let upstream = self.settings.resolve_upstream(route.php.as_deref());
                out.push_str(&format!(
                    "  root {};\n  index index.php index.html;\n\n",
                    fs_root
                ));
                out.push_str("  location / { try_files $uri $uri/ /index.php?$query_string; }\n\n");
                out.push_str("  location ~ \\.php$ {\n");
                out.push_str("    include fastcgi_params;\n");
                out.push_str(
                    "    fastcgi_param SCRIPT_FILENAME $document_root$fastcgi_script_name;\n",
                );
                out.push_str(PHP_VALUE);
                out.push_str(&format!("    fastcgi_pass {};\n", upstream));
                out.push_str("  }\n\n");
            }
            ServingRule::RootStatic => {
                out.push_str(&format!("  root {};\n  index index.html;\n\n", fs_root));
                out.push_str("  location / { try_files $uri $uri/ /index.html; }\n\n");
            }
            ServingRule::AliasPhp { dev_proxy } => {
                let upstream = self.settings.resolve_upstream(route.php.as_deref());
                out.push_str(&format!("  location ^~ {}/ {{\n", prefix));
                out.push_str(&format!("    alias {}/;\n", fs_root));
                out.push_str("    index index.php index.html;\n");
                out.push_str(&format!(
                    "    try_files $uri $uri/ {}/index.php?$query_string;\n",
                    prefix
                ));
                out.push_str("  }\n\n");

                out.push_str(&format!("  location ~ ^{}/(.+\\.php)$ {{\n", prefix));
                out.push_str(&format!("    alias {}/$1;\n", fs_root));
                out.push_str("    include fastcgi_params;\n");
                out.push_str("    fastcgi_param SCRIPT_FILENAME $request_filename;\n");
                out.push_str(PHP_VALUE);
                out.push_str(&format!("    fastcgi_pass {};\n", upstream));
                out.push_str("  }\n\n");

                if dev_proxy {
                    self.render_proxy(out, route, &format!("{}/", prefix));
                }
            }
            ServingRule::AliasStatic { dev_proxy } => {
                out.push_str(&format!("  location ^~ {}/ {{\n", prefix));
                out.push_str(&format!("    alias {}/;\n", fs_root));
                out.push_str("    index index.html;\n");
                out.push_str(&format!("    try_files $uri $uri/ {}/index.html;\n", prefix));
                out.push_str("  }\n\n");

                if dev_proxy {
                    self.render_proxy(out, route, &format!("{}/", prefix));
                }
            }
        }
    }

    fn render_proxy(&self, out: &mut String, route: &Route, location: &str) {
        let Some(dev) = &route.dev else {
            return;
        };
        let host = dev.host.as_deref().unwrap_or(&self.settings.dev_host);

        out.push_str(&format!("  location {} {{\n", location));
        out.push_str(&format!("    proxy_pass http://{}:{};\n", host, dev.port));
        out.push_str("    proxy_http_version 1.1;\n");
        out.push_str("    proxy_set_header Upgrade $http_upgrade;\n");
        out.push_str("    proxy_set_header Connection \"upgrade\";\n");
        out.push_str("    proxy_set_header Host $host;\n");
        out.push_str("  }\n\n");
    }
}

pub fn upstream_name(version: &str) -> String {
    format!("backend_php{}", version)
}

pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Drop a leading `./` or `/`; a bare `.` becomes empty.
fn strip_leading(path: &str) -> &str {
    if path == "." {
        return "";
    }
    path.strip_prefix("./")
        .or_else(|| path.strip_prefix('/'))
        .unwrap_or(path)
}

/// Join absolute POSIX path parts, resolving `.` and `..` and collapsing
/// repeated or trailing slashes.
fn join_posix(parts: &[&str]) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for part in parts {
        for segment in part.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                other => segments.push(other),
            }
        }
    }
    format!("/{}", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{group_by_domain, DevProxy, RouteKind, UrlPath};
    use std::path::PathBuf;

    fn settings() -> ProxySettings {
        ProxySettings::from_config(&GeneratorConfig::default(), &Environment::default())
    }

    fn renderer() -> ProxyConfigRenderer {
        ProxyConfigRenderer::new(settings())
    }

    fn route(domain: &str, kind: RouteKind, url_path: &str) -> Route {
        let docroot = kind.default_docroot().to_string();
        Route {
            domain: domain.into(),
            url_path: UrlPath::normalize(url_path),
            kind,
            php: None,
            path: "projects/site".into(),
            docroot,
            dev: None,
            source: PathBuf::from("/srv/projects/site/.devkit/devkit.yml"),
        }
    }

    #[test]
    fn test_upstreams_in_version_order() {
        let mut config = GeneratorConfig::default();
        config.proxy.upstreams.insert("100".into(), "php100:9000".into());
        let renderer =
            ProxyConfigRenderer::new(ProxySettings::from_config(&config, &Environment::default()));

        assert_eq!(
            renderer.render_upstreams(),
            "# AUTO-GENERATED - Shared Upstreams\n\
             upstream backend_php74 { server php74:9000; }\n\
             upstream backend_php82 { server php82:9000; }\n\
             upstream backend_php84 { server php84:9000; }\n\
             upstream backend_php85 { server php85:9000; }\n\
             upstream backend_php100 { server php100:9000; }\n"
        );
    }

    #[test]
    fn test_default_php_from_env() {
        let env: Environment = [("DEFAULT_PHP", "php7.4")].into_iter().collect();
        let settings = ProxySettings::from_config(&GeneratorConfig::default(), &env);
        assert_eq!(settings.default_php, "74");

        let env: Environment = [("DEFAULT_PHP", "latest")].into_iter().collect();
        let settings = ProxySettings::from_config(&GeneratorConfig::default(), &env);
        assert_eq!(settings.default_php, "82");
    }

    #[test]
    fn test_php_version_resolution() {
        let settings = settings();
        assert_eq!(settings.resolve_php_version(Some("8.4")), "84");
        assert_eq!(settings.resolve_php_version(Some("99")), "82");
        assert_eq!(settings.resolve_php_version(Some("eight")), "82");
        assert_eq!(settings.resolve_php_version(None), "82");
        assert_eq!(settings.resolve_upstream(Some("7.4")), "backend_php74");
    }

    #[test]
    fn test_fs_root() {
        let settings = settings();
        let mut r = route("a.test", RouteKind::Static, "/");
        assert_eq!(settings.fs_root(&r), "/var/www/projects/site");

        r.path = "./projects/site/".into();
        r.docroot = "./dist".into();
        assert_eq!(settings.fs_root(&r), "/var/www/projects/site/dist");

        r.path = "/other".into();
        r.docroot = "public/../web".into();
        assert_eq!(settings.fs_root(&r), "/var/www/projects/other/web");
    }

    #[test]
    fn test_fs_root_with_dotted_projects_dir() {
        for projects_dir in ["./projects", "projects/", "/projects/", "./projects//"] {
            let mut config = GeneratorConfig::default();
            config.paths.projects_dir = projects_dir.into();
            let settings = ProxySettings::from_config(&config, &Environment::default());
            assert_eq!(settings.projects_dir, "projects");

            let r = route("a.test", RouteKind::Static, "/");
            assert_eq!(settings.fs_root(&r), "/var/www/projects/site", "{}", projects_dir);
        }
    }

    #[test]
    fn test_root_static_block() {
        let routes = vec![route("a.test", RouteKind::Static, "/")];
        let groups = group_by_domain(&routes);
        let (_, servers) = renderer().render_per_domain(&groups);

        assert_eq!(
            servers,
            vec![(
                "a.test".to_string(),
                "# AUTO-GENERATED for a.test\n\n\
                 server {\n  listen 80;\n  server_name a.test;\n\n\
                 \x20 # Source: /srv/projects/site/.devkit/devkit.yml\n\
                 \x20 root /var/www/projects/site;\n  index index.html;\n\n\
                 \x20 location / { try_files $uri $uri/ /index.html; }\n\n\
                 }\n\n"
                    .to_string()
            )]
        );
    }

    #[test]
    fn test_root_php_block() {
        let mut r = route("b.test", RouteKind::Php, "/");
        r.php = Some("8.4".into());
        let text = renderer().render_server("b.test", &[&r]);

        assert!(text.contains(
            "  root /var/www/projects/site/public;\n  index index.php index.html;\n"
        ));
        assert!(text.contains("  location / { try_files $uri $uri/ /index.php?$query_string; }\n"));
        assert!(text.contains("  location ~ \\.php$ {\n"));
        assert!(text.contains(
            "    fastcgi_param SCRIPT_FILENAME $document_root$fastcgi_script_name;\n"
        ));
        assert!(text.contains(
            "    fastcgi_param PHP_VALUE \"display_errors=1 \\n error_reporting=E_ALL\";\n"
        ));
        assert!(text.contains("    fastcgi_pass backend_php84;\n"));
    }

    #[test]
    fn test_root_dev_proxy_replaces_serving() {
        let mut r = route("c.test", RouteKind::Php, "/");
        r.dev = Some(DevProxy {
            port: 3000,
            host: None,
        });
        let text = renderer().render_server("c.test", &[&r]);

        assert_eq!(text.matches("location").count(), 1);
        assert!(text.contains(
            "  location / {\n\
             \x20   proxy_pass http://node:3000;\n\
             \x20   proxy_http_version 1.1;\n\
             \x20   proxy_set_header Upgrade $http_upgrade;\n\
             \x20   proxy_set_header Connection \"upgrade\";\n\
             \x20   proxy_set_header Host $host;\n\
             \x20 }\n\n"
        ));
        assert!(!text.contains("root "));
        assert!(!text.contains("index "));
        assert!(!text.contains("fastcgi"));
    }

    #[test]
    fn test_prefix_php_block() {
        let mut r = route("d.test", RouteKind::Php, "/api");
        r.php = Some("99".into());
        let text = renderer().render_server("d.test", &[&r]);

        assert!(text.contains(
            "  location ^~ /api/ {\n\
             \x20   alias /var/www/projects/site/public/;\n\
             \x20   index index.php index.html;\n\
             \x20   try_files $uri $uri/ /api/index.php?$query_string;\n\
             \x20 }\n\n"
        ));
        assert!(text.contains("  location ~ ^/api/(.+\\.php)$ {\n"));
        assert!(text.contains("    alias /var/www/projects/site/public/$1;\n"));
        assert!(text.contains("    fastcgi_param SCRIPT_FILENAME $request_filename;\n"));
        assert!(text.contains("    fastcgi_pass backend_php82;\n"));
        assert!(!text.contains("proxy_pass"));
    }

    #[test]
    fn test_prefix_static_with_dev_proxy_emits_both() {
        let mut r = route("e.test", RouteKind::Static, "/app");
        r.dev = Some(DevProxy {
            port: 5173,
            host: Some("vite".into()),
        });
        let text = renderer().render_server("e.test", &[&r]);

        let alias = text.find("  location ^~ /app/ {\n").unwrap();
        let proxy = text.find("  location /app/ {\n").unwrap();
        assert!(alias < proxy);
        assert!(text.contains("    try_files $uri $uri/ /app/index.html;\n"));
        assert!(text.contains("    proxy_pass http://vite:5173;\n"));
        assert!(!text.contains("fastcgi"));
    }

    #[test]
    fn test_empty_render_has_no_server_blocks() {
        let groups = group_by_domain(&[]);
        let text = renderer().render(&groups);

        assert!(text.starts_with(UPSTREAMS_HEADER));
        assert!(text.ends_with(NO_ROUTES_COMMENT));
        assert!(!text.contains("server {"));

        let (upstreams, servers) = renderer().render_per_domain(&groups);
        assert!(upstreams.ends_with(NO_ROUTES_COMMENT));
        assert!(servers.is_empty());
    }

    #[test]
    fn test_render_orders_routes_within_server() {
        let routes = vec![
            route("b.test", RouteKind::Php, "/"),
            route("b.test", RouteKind::Php, "/api"),
        ];
        let text = renderer().render(&group_by_domain(&routes));

        assert_eq!(text.matches("server {").count(), 1);
        let root = text.find("  root ").unwrap();
        let api = text.find("  location ^~ /api/").unwrap();
        assert!(root < api);
    }
}
