//! Configuration rendering subsystem.
//!
//! # Data Flow
//! ```text
//! DomainGroups + ProxySettings
//!     → rules.rs (pick a serving rule per route)
//!     → nginx.rs (upstreams, server blocks, location text)
//!
//! EdgeSettings (config + environment, no routes)
//!     → traefik.rs (dynamic routing document)
//! ```
//!
//! # Design Decisions
//! - Renderers are pure: no I/O, output depends only on their inputs
//! - Rule selection is separate from formatting

pub mod nginx;
pub mod rules;
pub mod traefik;

pub use nginx::{ProxyConfigRenderer, ProxySettings};
pub use rules::{select_rule, ServingRule};
pub use traefik::EdgeSettings;
