//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! projects/**/.devkit/devkit.yml
//!     → repository.rs (discover, de-duplicate)
//!     → declaration.rs (parse into RawRecord)
//!     → builder.rs (defaults, drop incomplete)
//!     → repository.rs (global sort by domain + url_path)
//!     → grouper.rs (domain → routes, first-seen order)
//! ```
//!
//! # Design Decisions
//! - Routes are immutable once built
//! - Deterministic: the same tree always yields the same ordered routes
//! - Bad input degrades (skipped lines, dropped routes), it never aborts

pub mod builder;
pub mod declaration;
pub mod grouper;
pub mod repository;
pub mod route;

pub use builder::RouteBuilder;
pub use declaration::{parse, RawRecord, RawValue};
pub use grouper::{group_by_domain, DomainGroups};
pub use repository::RouteRepository;
pub use route::{normalize_url_path, DevProxy, Route, RouteKind, UrlPath};
