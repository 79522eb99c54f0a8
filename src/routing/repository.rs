//! Declaration discovery and the global route ordering.
//!
//! # Responsibilities
//! - Walk every directory under the projects tree looking for declarations
//! - Parse and build routes for each declaration file exactly once
//! - Sort the combined route set by `domain + url_path`
//!
//! # Design Decisions
//! - Declarations are keyed on their canonical path, so repeat discovery
//!   never double-counts a file. The walked path (first seen) is what routes
//!   carry, so project paths stay relative to the tree root even when
//!   `projects/` itself is a symlink
//! - Symlinked directories are not followed
//! - Directory entries are visited in file-name order; combined with the
//!   stable sort this makes ties between equal keys reproducible
//! - A missing projects tree is an empty result, not an error

use std::fs;
use std::path::PathBuf;

use indexmap::IndexMap;
use walkdir::WalkDir;

use crate::error::GenerateError;
use crate::routing::builder::RouteBuilder;
use crate::routing::declaration;
use crate::routing::route::Route;

/// Discovers routes declared under a tree root.
#[derive(Debug, Clone)]
pub struct RouteRepository {
    tree_root: PathBuf,
    projects_dir: PathBuf,
    declaration_file: PathBuf,
}

impl RouteRepository {
    /// `projects_dir` is relative to `tree_root`; `declaration_file` is
    /// relative to each project directory.
    pub fn new(
        tree_root: impl Into<PathBuf>,
        projects_dir: impl Into<PathBuf>,
        declaration_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            tree_root: tree_root.into(),
            projects_dir: projects_dir.into(),
            declaration_file: declaration_file.into(),
        }
    }

    /// Absolute, non-canonical tree root that walked paths start with.
    fn absolute_root(&self) -> Result<PathBuf, GenerateError> {
        std::path::absolute(&self.tree_root).map_err(|e| GenerateError::io(&self.tree_root, e))
    }

    /// Every declaration file under the projects tree, de-duplicated on its
    /// canonical path, in discovery order. Returned paths are the absolute
    /// walked paths under the tree root.
    pub fn declaration_files(&self) -> Result<Vec<PathBuf>, GenerateError> {
        let projects_dir = self.absolute_root()?.join(&self.projects_dir);
        if !projects_dir.is_dir() {
            tracing::info!(
                projects_dir = %projects_dir.display(),
                "Projects directory not found"
            );
            return Ok(Vec::new());
        }

        let mut found: IndexMap<PathBuf, PathBuf> = IndexMap::new();
        let walker = WalkDir::new(&projects_dir).min_depth(1).sort_by_file_name();

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_dir() {
                continue;
            }
            let candidate = entry.path().join(&self.declaration_file);
            if candidate.is_file() {
                let canonical = fs::canonicalize(&candidate)
                    .map_err(|e| GenerateError::io(&candidate, e))?;
                found.entry(canonical).or_insert(candidate);
            }
        }

        Ok(found.into_values().collect())
    }

    /// Discover, parse and build all routes, sorted by `domain + url_path`.
    pub fn discover(&self) -> Result<Vec<Route>, GenerateError> {
        let files = self.declaration_files()?;
        tracing::info!(declarations = files.len(), "Declaration files discovered");

        let builder = RouteBuilder::new(self.absolute_root()?, &self.declaration_file);

        let mut routes = Vec::new();
        for file in &files {
            let raw = fs::read_to_string(file).map_err(|e| GenerateError::io(file, e))?;
            let record = declaration::parse(&raw);
            routes.extend(builder.build(&record, file));
        }

        sort_routes(&mut routes);
        Ok(routes)
    }
}

/// Stable sort by the concatenated `domain + url_path` key.
pub fn sort_routes(routes: &mut [Route]) {
    routes.sort_by_cached_key(Route::sort_key);
}
