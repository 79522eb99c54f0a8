//! Route construction from parsed declarations.
//!
//! # Responsibilities
//! - Expand a record into one route per `apps` item, or one implicit app
//! - Apply defaults (URL path, docroot, project path)
//! - Drop incomplete routes without failing the run

use std::path::{Component, Path, PathBuf};

use crate::routing::declaration::{RawRecord, LIST_KEY};
use crate::routing::route::{DevProxy, Route, RouteKind, UrlPath};

/// Builds routes for declarations found under one tree root.
#[derive(Debug, Clone)]
pub struct RouteBuilder {
    tree_root: PathBuf,
    /// Number of path components between a project directory and its
    /// declaration file (2 for `.devkit/devkit.yml`).
    declaration_depth: usize,
}

impl RouteBuilder {
    pub fn new(tree_root: impl Into<PathBuf>, declaration_file: &Path) -> Self {
        let declaration_depth = declaration_file
            .components()
            .filter(|c| matches!(c, Component::Normal(_)))
            .count();

        Self {
            tree_root: tree_root.into(),
            declaration_depth,
        }
    }

    /// Build every complete route described by `record`.
    pub fn build(&self, record: &RawRecord, source: &Path) -> Vec<Route> {
        let apps = match record.get_list(LIST_KEY) {
            Some(items) if !items.is_empty() => items,
            _ => std::slice::from_ref(record),
        };

        apps.iter()
            .filter_map(|app| {
                let route = self.build_one(app, source);
                if route.is_none() {
                    tracing::debug!(source = %source.display(), "Dropping incomplete route");
                }
                route
            })
            .collect()
    }

    fn build_one(&self, app: &RawRecord, source: &Path) -> Option<Route> {
        let domain = app.get_non_empty("domain")?.to_string();
        let kind = RouteKind::parse(app.get_non_empty("type")?);

        let path = match app.get_non_empty("path") {
            Some(path) => path.to_string(),
            None => self.infer_project_path(source),
        };
        if path.is_empty() {
            return None;
        }

        let url_path = app
            .get_non_empty("url_path")
            .or_else(|| app.get_non_empty("urlPath"))
            .map(UrlPath::normalize)
            .unwrap_or_else(UrlPath::root);

        let docroot = app
            .get_non_empty("docroot")
            .unwrap_or_else(|| kind.default_docroot())
            .to_string();

        Some(Route {
            domain,
            url_path,
            php: app.get_non_empty("php").map(str::to_string),
            path,
            docroot,
            dev: app.get_map("dev").and_then(|dev| dev_proxy(dev, source)),
            kind,
            source: source.to_path_buf(),
        })
    }

    /// Project directory of a declaration file, relative to the tree root,
    /// with `/` separators.
    fn infer_project_path(&self, source: &Path) -> String {
        let Some(project_dir) = source.ancestors().nth(self.declaration_depth) else {
            return String::new();
        };
        let relative = project_dir
            .strip_prefix(&self.tree_root)
            .unwrap_or(project_dir);

        relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

fn dev_proxy(dev: &RawRecord, source: &Path) -> Option<DevProxy> {
    let raw_port = dev.get_non_empty("port")?;
    match raw_port.parse::<u16>() {
        Ok(port) => Some(DevProxy {
            port,
            host: dev.get_non_empty("host").map(str::to_string),
        }),
        Err(_) => {
            tracing::debug!(
                source = %source.display(),
                port = raw_port,
                "Ignoring dev proxy with invalid port"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::declaration::parse;

    fn builder() -> RouteBuilder {
        RouteBuilder::new("/srv/devkit", Path::new(".devkit/devkit.yml"))
    }

    fn source(project: &str) -> PathBuf {
        PathBuf::from(format!("/srv/devkit/projects/{}/.devkit/devkit.yml", project))
    }

    #[test]
    fn test_static_defaults() {
        let record = parse("domain: a.test\ntype: static\npath: projects/a\n");
        let routes = builder().build(&record, &source("a"));

        assert_eq!(routes.len(), 1);
        let route = &routes[0];
        assert_eq!(route.domain, "a.test");
        assert!(route.url_path.is_root());
        assert_eq!(route.docroot, ".");
        assert_eq!(route.kind, RouteKind::Static);
        assert_eq!(route.dev, None);
        assert_eq!(route.source, source("a"));
    }

    #[test]
    fn test_path_inferred_from_declaration_location() {
        let record = parse("domain: a.test\ntype: php\n");
        let routes = builder().build(&record, &source("group/a"));

        assert_eq!(routes[0].path, "projects/group/a");
        assert_eq!(routes[0].docroot, "public");
    }

    #[test]
    fn test_apps_list_builds_one_route_per_item() {
        let raw = "\
domain: ignored.test
apps:
  - domain: b.test
    type: php
    php: \"8.2\"
    url_path: /api/
  - domain: b.test
    type: php
    urlPath: docs
";
        let routes = builder().build(&parse(raw), &source("b"));

        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].url_path.as_str(), "/api");
        assert_eq!(routes[0].php.as_deref(), Some("8.2"));
        assert_eq!(routes[1].url_path.as_str(), "/docs");
        assert!(routes.iter().all(|r| r.domain == "b.test"));
    }

    #[test]
    fn test_empty_apps_falls_back_to_record() {
        let raw = "domain: c.test\ntype: static\napps:\n";
        let routes = builder().build(&parse(raw), &source("c"));
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].domain, "c.test");
    }

    #[test]
    fn test_incomplete_routes_are_dropped() {
        let raw = "\
apps:
  - domain: ok.test
    type: static
  - type: php
  - domain: missing-type.test
";
        let routes = builder().build(&parse(raw), &source("d"));
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].domain, "ok.test");

        assert!(builder().build(&parse("type: php\n"), &source("e")).is_empty());
        assert!(builder().build(&parse("domain: \"\"\ntype: php\n"), &source("e")).is_empty());
    }

    #[test]
    fn test_declaration_at_tree_root_has_no_project_path() {
        let record = parse("domain: root.test\ntype: static\n");
        let routes = builder().build(&record, Path::new("/srv/devkit/.devkit/devkit.yml"));
        assert!(routes.is_empty());
    }

    #[test]
    fn test_dev_proxy() {
        let raw = "domain: a.test\ntype: static\ndev:\n  port: 5173\n  host: vite\n";
        let routes = builder().build(&parse(raw), &source("a"));
        assert_eq!(
            routes[0].dev,
            Some(DevProxy {
                port: 5173,
                host: Some("vite".into())
            })
        );

        let raw = "domain: a.test\ntype: static\ndev:\n  host: vite\n";
        assert_eq!(builder().build(&parse(raw), &source("a"))[0].dev, None);

        let raw = "domain: a.test\ntype: static\ndev:\n  port: http\n";
        assert_eq!(builder().build(&parse(raw), &source("a"))[0].dev, None);
    }

    #[test]
    fn test_explicit_docroot_kept() {
        let raw = "domain: a.test\ntype: php\ndocroot: web\n";
        assert_eq!(builder().build(&parse(raw), &source("a"))[0].docroot, "web");
    }
}
