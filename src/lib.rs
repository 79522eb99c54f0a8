//! Route discovery and web-server configuration generator.
//!
//! Per-project declaration files under `projects/` are merged into one
//! ordered route model and rendered into nginx server blocks and a traefik
//! dynamic configuration.

pub mod config;
pub mod error;
pub mod observability;
pub mod pipeline;
pub mod render;
pub mod routing;

pub use config::GeneratorConfig;
pub use error::GenerateError;
pub use pipeline::{Pipeline, Plan, RunReport};
pub use routing::{Route, RouteRepository};
