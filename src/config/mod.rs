//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GeneratorConfig (validated, immutable)
//!
//! .env file (optional)
//!     → env.rs (key/value snapshot)
//!     → overrides applied by the renderers' settings
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - The environment file is read, never exported into the process

pub mod env;
pub mod loader;
pub mod schema;
pub mod validation;

pub use env::Environment;
pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::GeneratorConfig;
pub use schema::OutputLayout;
pub use schema::{EdgeConfig, PathsConfig, ProxyConfig};
