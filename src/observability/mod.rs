//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events on stderr)
//!
//! The run report (files written, domain and route counts) is printed
//! on stdout by the binary, not logged.
//! ```

pub mod logging;

pub use logging::init_logging;
