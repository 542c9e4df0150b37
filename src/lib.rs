//! Single-page application router.
//!
//! Registers an application's routes, follows navigation history, and
//! exposes the active route and its menu metadata to UI chrome.
//!
//! ```text
//! HistoryAdapter ──event──▶ RouterInstance ──resolve──▶ RouteTable
//!                                 │
//!                                 └──notice──▶ subscribers (content area, menu)
//! ```

pub mod config;
pub mod history;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::RouterConfig;
pub use history::HistoryAdapter;
pub use lifecycle::Shutdown;
pub use routing::{RouteTable, RouterInstance};
