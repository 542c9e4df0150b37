//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RouterConfig (validated, immutable)
//!     → loader::build_table → RouteTable (frozen)
//! ```
//!
//! # Design Decisions
//! - Loaded once at startup; the route table never changes afterwards
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{build_table, load_config, parse_config, ConfigError};
pub use schema::RouterConfig;
pub use schema::HistoryConfig;
pub use schema::ResolutionConfig;
pub use schema::ObservabilityConfig;
pub use schema::RouteConfig;
