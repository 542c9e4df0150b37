//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Init logging → Build route table → Start router loop
//!
//! Shutdown (shutdown.rs):
//!     trigger() → router loop exits → history adapter dropped
//! ```

pub mod shutdown;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{start, Startup};
