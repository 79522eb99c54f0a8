//! Key/value environment file.
//!
//! The file is read into an in-memory map; the process environment is never
//! modified. Lines that do not parse are skipped with a warning.
//!
//! `$VAR` and `${VAR}` in values are substituted by `dotenvy`, from earlier
//! keys in the file or from the process environment. Single-quoted values
//! are taken literally.

use std::collections::BTreeMap;
use std::path::Path;

/// Recognised keys.
pub const DEFAULT_PHP: &str = "DEFAULT_PHP";
pub const BASE_DOMAIN: &str = "BASE_DOMAIN";
pub const TRAEFIK_DASHBOARD_DOMAIN: &str = "TRAEFIK_DASHBOARD_DOMAIN";
pub const TRAEFIK_ENABLE_DASHBOARD: &str = "TRAEFIK_ENABLE_DASHBOARD";
pub const ADMINER_DOMAIN: &str = "ADMINER_DOMAIN";
pub const MAILPIT_DOMAIN: &str = "MAILPIT_DOMAIN";

/// Snapshot of an environment file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    /// Read an environment file. A missing file yields an empty environment.
    pub fn load(path: &Path) -> Result<Self, dotenvy::Error> {
        let iter = match dotenvy::from_path_iter(path) {
            Ok(iter) => iter,
            Err(e) if e.not_found() => {
                tracing::debug!(path = %path.display(), "No environment file");
                return Ok(Self::default());
            }
            Err(e) => return Err(e),
        };

        let mut vars = BTreeMap::new();
        for item in iter {
            match item {
                Ok((key, value)) => {
                    vars.insert(key, value);
                }
                Err(dotenvy::Error::LineParse(line, index)) => {
                    tracing::warn!(
                        path = %path.display(),
                        line = %line,
                        index,
                        "Skipping malformed environment line"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        tracing::debug!(path = %path.display(), keys = vars.len(), "Environment file loaded");
        Ok(Self { vars })
    }

    /// Value for `key`, treating an empty value as unset.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Value for `key`, or `fallback` when unset.
    pub fn get_or<'a>(&'a self, key: &str, fallback: &'a str) -> &'a str {
        self.get(key).unwrap_or(fallback)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_env_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# comment\nDEFAULT_PHP=74\nBASE_DOMAIN=\"dev.test\"\nEMPTY=").unwrap();

        let env = Environment::load(file.path()).unwrap();
        assert_eq!(env.get(DEFAULT_PHP), Some("74"));
        assert_eq!(env.get(BASE_DOMAIN), Some("dev.test"));
        assert_eq!(env.get("EMPTY"), None);
        assert_eq!(env.get_or("EMPTY", "fallback"), "fallback");
    }

    #[test]
    fn test_malformed_line_is_skipped() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "DEFAULT_PHP=74\nJUSTAWORD\nBASE_DOMAIN=dev.test").unwrap();

        let env = Environment::load(file.path()).unwrap();
        assert_eq!(env.get(DEFAULT_PHP), Some("74"));
        assert_eq!(env.get(BASE_DOMAIN), Some("dev.test"));
        assert_eq!(env.get("JUSTAWORD"), None);
    }

    #[test]
    fn test_single_quoted_value_is_literal() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "BASE_DOMAIN='$HOST.test'").unwrap();

        let env = Environment::load(file.path()).unwrap();
        assert_eq!(env.get(BASE_DOMAIN), Some("$HOST.test"));
    }

    #[test]
    fn test_missing_env_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let env = Environment::load(&dir.path().join(".env")).unwrap();
        assert_eq!(env, Environment::default());
    }
}
