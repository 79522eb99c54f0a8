//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that PHP upstreams are addressable by version
//! - Check that paths the renderer joins onto are well-formed
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GeneratorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;

use crate::config::schema::GeneratorConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    NoUpstreams,
    NonNumericVersion(String),
    EmptyUpstreamAddress(String),
    RelativeProjectsBase(String),
    DefaultPhpWithoutDigits(String),
    EmptyPath(&'static str),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::NoUpstreams => write!(f, "proxy.upstreams must not be empty"),
            ValidationError::NonNumericVersion(v) => {
                write!(f, "upstream version '{}' must contain only digits", v)
            }
            ValidationError::EmptyUpstreamAddress(v) => {
                write!(f, "upstream for PHP {} has an empty address", v)
            }
            ValidationError::RelativeProjectsBase(p) => {
                write!(f, "proxy.projects_base '{}' must be an absolute path", p)
            }
            ValidationError::DefaultPhpWithoutDigits(v) => {
                write!(f, "proxy.default_php '{}' contains no version digits", v)
            }
            ValidationError::EmptyPath(field) => write!(f, "paths.{} must not be empty", field),
        }
    }
}

/// Validate a loaded configuration.
pub fn validate_config(config: &GeneratorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.proxy.upstreams.is_empty() {
        errors.push(ValidationError::NoUpstreams);
    }
    for (version, address) in &config.proxy.upstreams {
        if version.is_empty() || !version.chars().all(|c| c.is_ascii_digit()) {
            errors.push(ValidationError::NonNumericVersion(version.clone()));
        }
        if address.trim().is_empty() {
            errors.push(ValidationError::EmptyUpstreamAddress(version.clone()));
        }
    }

    if !config.proxy.projects_base.starts_with('/') {
        errors.push(ValidationError::RelativeProjectsBase(
            config.proxy.projects_base.clone(),
        ));
    }

    if !config.proxy.default_php.chars().any(|c| c.is_ascii_digit()) {
        errors.push(ValidationError::DefaultPhpWithoutDigits(
            config.proxy.default_php.clone(),
        ));
    }

    let paths = [
        ("projects_dir", &config.paths.projects_dir),
        ("declaration_file", &config.paths.declaration_file),
        ("nginx_conf_dir", &config.paths.nginx_conf_dir),
        ("traefik_dynamic_file", &config.paths.traefik_dynamic_file),
    ];
    for (field, value) in paths {
        if value.trim().is_empty() {
            errors.push(ValidationError::EmptyPath(field));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&GeneratorConfig::default()), Ok(()));
    }

    #[test]
    fn test_reports_every_error() {
        let mut config = GeneratorConfig::default();
        config.proxy.upstreams.insert("8.1".into(), "php81:9000".into());
        config.proxy.upstreams.insert("90".into(), " ".into());
        config.proxy.projects_base = "var/www".into();
        config.proxy.default_php = "latest".into();
        config.paths.projects_dir = String::new();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::NonNumericVersion("8.1".into()),
                ValidationError::EmptyUpstreamAddress("90".into()),
                ValidationError::RelativeProjectsBase("var/www".into()),
                ValidationError::DefaultPhpWithoutDigits("latest".into()),
                ValidationError::EmptyPath("projects_dir"),
            ]
        );
    }

    #[test]
    fn test_empty_upstreams_rejected() {
        let mut config = GeneratorConfig::default();
        config.proxy.upstreams.clear();
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::NoUpstreams])
        );
    }
}
