//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Navigation event (path)
//!     → router.rs (RouterInstance: Idle → Resolving)
//!     → table.rs (exact lookup, follow redirects)
//!     → Return: ResolvedRoute, NotFound or RedirectLoop
//!     → router.rs (publish active route, notify subscribers)
//!
//! Table Construction (at startup):
//!     RouteConfig[]
//!     → Reject duplicates and dangling redirects
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Table built at startup, immutable at runtime
//! - Exact path matching only
//! - Deterministic: same input always resolves to the same route
//! - Menu items derived from table order and route metadata

pub mod menu;
pub mod router;
pub mod table;

pub use menu::MenuItem;
pub use router::{
    NavigationNotice, NavigationOutcome, NavigationPhase, PendingNavigation, RouterInstance, Subscription,
};
pub use table::{
    IconRef, Resolution, ResolveError, ResolvedRoute, RouteDefinition, RouteMeta, RouteTable, RouteTarget,
    TableError, ViewRef,
};
