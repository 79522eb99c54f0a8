//! The normalized route model.

use std::fmt;
use std::path::PathBuf;

/// An absolute URL path prefix: non-empty, leading `/`, and no trailing `/`
/// unless it is the root itself.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UrlPath(String);

impl UrlPath {
    /// Normalize arbitrary input; absent or blank input is the root.
    pub fn normalize(raw: &str) -> Self {
        Self(normalize_url_path(raw))
    }

    pub fn root() -> Self {
        Self("/".to_string())
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UrlPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize a URL path prefix.
///
/// Surrounding whitespace and trailing slashes are removed and a leading
/// slash is added; the result is a fixed point of this function.
pub fn normalize_url_path(raw: &str) -> String {
    let trimmed = raw
        .trim_start()
        .trim_end_matches(|c: char| c == '/' || c.is_whitespace());
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// How a route's files are served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteKind {
    Php,
    Static,
    /// Any other declared type; served like static files.
    Other(String),
}

impl RouteKind {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "php" => Self::Php,
            "static" => Self::Static,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_php(&self) -> bool {
        matches!(self, Self::Php)
    }

    /// Docroot used when the declaration names none.
    pub fn default_docroot(&self) -> &'static str {
        match self {
            Self::Static => ".",
            _ => "public",
        }
    }
}

/// Dev server that receives proxied traffic instead of direct file serving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevProxy {
    pub port: u16,
    /// Falls back to the renderer's default dev host when absent.
    pub host: Option<String>,
}

/// A normalized route, built once from a declaration and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub domain: String,
    pub url_path: UrlPath,
    pub kind: RouteKind,
    /// Raw PHP version token as declared (e.g. "8.2").
    pub php: Option<String>,
    /// Project directory relative to the tree root.
    pub path: String,
    pub docroot: String,
    pub dev: Option<DevProxy>,
    /// Absolute path of the declaration file this route came from.
    pub source: PathBuf,
}

impl Route {
    /// Global ordering key: domain and URL path concatenated.
    pub fn sort_key(&self) -> String {
        format!("{}{}", self.domain, self.url_path)
    }
}
