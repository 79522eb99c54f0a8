//! Generation run: discover → group → render → write.
//!
//! # Design Decisions
//! - Rendering is separated from writing: [`Pipeline::plan`] has no side
//!   effects, [`Plan::apply`] only writes what the plan contains
//! - Files are written in plan order; a failure leaves earlier files in place
//! - Any I/O error is fatal; nothing is retried

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::{Environment, GeneratorConfig, OutputLayout};
use crate::error::GenerateError;
use crate::render::nginx::{ProxyConfigRenderer, ProxySettings};
use crate::render::traefik::{self, EdgeSettings};
use crate::routing::{group_by_domain, RouteRepository};

/// Shared upstream file of the per-domain layout.
pub const UPSTREAMS_FILE: &str = "001-upstreams.conf";

/// Output file of the single-file layout.
pub const SINGLE_FILE: &str = "routes.generated.conf";

/// A rendered output, path relative to the tree root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub path: PathBuf,
    pub contents: String,
}

/// Everything a run would do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub files: Vec<OutputFile>,
    /// Stale outputs of the other layout, relative to the tree root.
    pub stale: Vec<PathBuf>,
    pub domains: usize,
    pub routes: usize,
}

/// Outcome of an applied plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Written files, relative to the tree root.
    pub written: Vec<PathBuf>,
    pub domains: usize,
    pub routes: usize,
}

/// One generation run over a tree root.
#[derive(Debug, Clone)]
pub struct Pipeline {
    root: PathBuf,
    config: GeneratorConfig,
    env: Environment,
}

impl Pipeline {
    /// Read the environment file named by the config and build a pipeline.
    pub fn new(root: impl Into<PathBuf>, config: GeneratorConfig) -> Result<Self, GenerateError> {
        let root = root.into();
        let env = Environment::load(&root.join(&config.paths.env_file))?;
        Ok(Self::with_env(root, config, env))
    }

    pub fn with_env(root: impl Into<PathBuf>, config: GeneratorConfig, env: Environment) -> Self {
        Self {
            root: root.into(),
            config,
            env,
        }
    }

    /// Discover routes and render every output without touching the disk.
    pub fn plan(&self) -> Result<Plan, GenerateError> {
        let paths = &self.config.paths;
        let repository = RouteRepository::new(
            &self.root,
            &paths.projects_dir,
            &paths.declaration_file,
        );
        let routes = repository.discover()?;
        let groups = group_by_domain(&routes);

        if routes.is_empty() {
            tracing::info!("No routes found");
        }

        let renderer =
            ProxyConfigRenderer::new(ProxySettings::from_config(&self.config, &self.env));
        let conf_dir = PathBuf::from(&paths.nginx_conf_dir);

        let mut files = Vec::new();
        let stale = match self.config.proxy.layout {
            OutputLayout::PerDomain => {
                let (upstreams, servers) = renderer.render_per_domain(&groups);
                files.push(OutputFile {
                    path: conf_dir.join(UPSTREAMS_FILE),
                    contents: upstreams,
                });
                for (domain, contents) in servers {
                    files.push(OutputFile {
                        path: conf_dir.join(domain_file_name(&domain)),
                        contents,
                    });
                }
                vec![conf_dir.join(SINGLE_FILE)]
            }
            OutputLayout::Single => {
                files.push(OutputFile {
                    path: conf_dir.join(SINGLE_FILE),
                    contents: renderer.render(&groups),
                });
                vec![conf_dir.join(UPSTREAMS_FILE)]
            }
        };

        let edge = EdgeSettings::from_env(&self.config.edge, &self.env);
        files.push(OutputFile {
            path: PathBuf::from(&paths.traefik_dynamic_file),
            contents: traefik::render(&edge),
        });

        Ok(Plan {
            files,
            stale,
            domains: groups.len(),
            routes: routes.len(),
        })
    }

    /// Plan and write all outputs.
    pub fn run(&self) -> Result<RunReport, GenerateError> {
        self.plan()?.apply(&self.root)
    }
}

impl Plan {
    /// Report for a dry run: the files this plan would write.
    pub fn report(&self) -> RunReport {
        RunReport {
            written: self.files.iter().map(|f| f.path.clone()).collect(),
            domains: self.domains,
            routes: self.routes,
        }
    }

    /// Remove stale outputs, then write every file under `root`.
    pub fn apply(&self, root: &Path) -> Result<RunReport, GenerateError> {
        for stale in &self.stale {
            remove_if_exists(&root.join(stale))?;
        }

        let mut written = Vec::with_capacity(self.files.len());
        for file in &self.files {
            write_output(&root.join(&file.path), &file.contents)?;
            tracing::info!(path = %file.path.display(), "Generated");
            written.push(file.path.clone());
        }

        Ok(RunReport {
            written,
            domains: self.domains,
            routes: self.routes,
        })
    }
}

impl RunReport {
    /// `[devkit]` lines printed after a run; `verb` prefixes each file.
    pub fn summary(&self, verb: &str) -> String {
        let mut out = String::new();
        for path in &self.written {
            out.push_str(&format!("[devkit] {}: {}\n", verb, path.display()));
        }
        if self.routes == 0 {
            out.push_str("[devkit] No routes found.\n");
        }
        out.push_str(&format!("[devkit] Domains: {}\n", self.domains));
        out.push_str(&format!("[devkit] Routes: {}\n", self.routes));
        out
    }
}

/// Write `contents` to `path`, creating parent directories.
pub fn write_output(path: &Path, contents: &str) -> Result<(), GenerateError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| GenerateError::io(parent, e))?;
    }
    fs::write(path, contents).map_err(|e| GenerateError::io(path, e))
}

fn remove_if_exists(path: &Path) -> Result<(), GenerateError> {
    match fs::remove_file(path) {
        Ok(()) => {
            tracing::info!(path = %path.display(), "Removed stale output");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(GenerateError::io(path, e)),
    }
}

/// Per-domain file name; path separators are not allowed through.
fn domain_file_name(domain: &str) -> String {
    format!("{}.conf", domain.replace(['/', '\\'], "_"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_lists_files_then_counts() {
        let report = RunReport {
            written: vec![PathBuf::from("docker/nginx/conf.d/a.test.conf")],
            domains: 1,
            routes: 2,
        };
        assert_eq!(
            report.summary("Generated"),
            "[devkit] Generated: docker/nginx/conf.d/a.test.conf\n\
             [devkit] Domains: 1\n\
             [devkit] Routes: 2\n"
        );
    }

    #[test]
    fn test_summary_without_routes() {
        let report = RunReport {
            written: Vec::new(),
            domains: 0,
            routes: 0,
        };
        assert_eq!(
            report.summary("Would generate"),
            "[devkit] No routes found.\n[devkit] Domains: 0\n[devkit] Routes: 0\n"
        );
    }

    #[test]
    fn test_domain_file_name() {
        assert_eq!(domain_file_name("a.test"), "a.test.conf");
        assert_eq!(domain_file_name("../evil"), ".._evil.conf");
    }

    #[test]
    fn test_remove_missing_file_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        assert!(remove_if_exists(&dir.path().join("nope.conf")).is_ok());
    }

    #[test]
    fn test_write_output_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/c.conf");
        write_output(&path, "x").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "x");
    }
}
