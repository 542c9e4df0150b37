//! Navigation history subsystem.
//!
//! # Data Flow
//! ```text
//! Initial load / link activation / back / forward
//!     → adapter.rs (update history stack + cursor)
//!     → NavigationEvent { path, trigger, key }
//!     → mpsc channel → RouterInstance::run
//! ```
//!
//! # Design Decisions
//! - No resolution logic lives here
//! - Push truncates forward entries, replace overwrites in place
//! - Moving past either end of the stack is a no-op

pub mod adapter;

pub use adapter::{HistoryAdapter, HistoryEntry, NavigationEvent, NavigationMode, NavigationTrigger};
