//! Router instance: resolution, active-route state and notification.
//!
//! # Responsibilities
//! - Resolve each navigation event against the route table
//! - Hold the active route and publish it atomically
//! - Notify subscribers on every completed navigation
//!
//! # State Machine (per navigation)
//! ```text
//! Idle → Resolving → Active
//!                  → NotFound     → Idle
//!                  → RedirectLoop → Idle
//! ```
//!
//! # Design Decisions
//! - Last request wins: a pending navigation superseded by a newer one is
//!   dropped on commit and never notifies
//! - Failed navigations leave the active route untouched
//! - The supersession check and the active-route store happen under one
//!   commit lock, so concurrent commits cannot publish a stale route
//! - Listeners run outside the commit lock and the subscriber map's locks;
//!   only commits issued from one thread notify in navigation order

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use arc_swap::ArcSwapOption;
use dashmap::DashMap;
use tokio::sync::{broadcast, mpsc};

use crate::config::{build_table, ConfigError, RouterConfig};
use crate::history::{NavigationEvent, NavigationTrigger};
use crate::observability::metrics;
use crate::routing::menu::{menu_items, MenuItem};
use crate::routing::table::{Resolution, ResolveError, ResolvedRoute, RouteTable};

/// Navigation listener.
pub type Listener = Arc<dyn Fn(&NavigationNotice) + Send + Sync>;

/// Router state for the navigation in flight.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationPhase {
    Idle = 0,
    Resolving = 1,
    Active = 2,
    NotFound = 3,
    RedirectLoop = 4,
}

impl From<u8> for NavigationPhase {
    fn from(val: u8) -> Self {
        match val {
            1 => NavigationPhase::Resolving,
            2 => NavigationPhase::Active,
            3 => NavigationPhase::NotFound,
            4 => NavigationPhase::RedirectLoop,
            _ => NavigationPhase::Idle,
        }
    }
}

/// Delivered to subscribers when a navigation completes.
#[derive(Debug, Clone)]
pub struct NavigationNotice {
    /// Path the navigation asked for.
    pub requested: String,
    pub trigger: NavigationTrigger,
    /// Redirecting paths walked. On success, the hops before the route; on a
    /// redirect loop, the looping chain; empty when nothing matched.
    pub redirects: Vec<String>,
    pub result: Result<Arc<ResolvedRoute>, ResolveError>,
}

impl NavigationNotice {
    pub fn route(&self) -> Option<&ResolvedRoute> {
        self.result.as_deref().ok()
    }

    pub fn error(&self) -> Option<&ResolveError> {
        self.result.as_ref().err()
    }
}

/// Result of committing a navigation.
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationOutcome {
    /// The route is now active.
    Active(Arc<ResolvedRoute>),
    /// Resolution failed; the active route is unchanged.
    Failed(ResolveError),
    /// A newer navigation started first; nothing was applied.
    Superseded,
}

/// A navigation that has been resolved but not yet applied.
#[derive(Debug)]
#[must_use = "a pending navigation does nothing until committed"]
pub struct PendingNavigation {
    generation: u64,
    event: NavigationEvent,
    resolution: Result<Resolution, ResolveError>,
}

impl PendingNavigation {
    pub fn event(&self) -> &NavigationEvent {
        &self.event
    }

    /// Position of this navigation in begin order; higher is newer.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Handle returned by [`RouterInstance::subscribe`]. Dropping it unsubscribes.
#[must_use = "dropping a subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    subscribers: Weak<DashMap<u64, Listener>>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(subscribers) = self.subscribers.upgrade() {
            subscribers.remove(&self.id);
            metrics::record_subscribers(subscribers.len());
        }
    }
}

/// Orchestrates resolution and notifies interested parties.
pub struct RouterInstance {
    table: Arc<RouteTable>,
    active: ArcSwapOption<ResolvedRoute>,
    phase: AtomicU8,
    generation: AtomicU64,
    commit_lock: Mutex<()>,
    subscribers: Arc<DashMap<u64, Listener>>,
    next_subscriber: AtomicU64,
}

impl RouterInstance {
    /// Create a router over an already built table.
    pub fn new(table: Arc<RouteTable>) -> Self {
        Self {
            table,
            active: ArcSwapOption::empty(),
            phase: AtomicU8::new(NavigationPhase::Idle as u8),
            generation: AtomicU64::new(0),
            commit_lock: Mutex::new(()),
            subscribers: Arc::new(DashMap::new()),
            next_subscriber: AtomicU64::new(0),
        }
    }

    /// Build the table from a validated configuration.
    pub fn from_config(config: &RouterConfig) -> Result<Self, ConfigError> {
        let table = build_table(config)?;
        Ok(Self::new(Arc::new(table)))
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Currently active route, if any navigation has succeeded.
    pub fn active_route(&self) -> Option<Arc<ResolvedRoute>> {
        self.active.load_full()
    }

    pub fn phase(&self) -> NavigationPhase {
        NavigationPhase::from(self.phase.load(Ordering::Acquire))
    }

    /// Menu items for the table, with the active route marked.
    pub fn menu(&self) -> Vec<MenuItem> {
        let active = self.active_route();
        menu_items(&self.table, active.as_deref())
    }

    /// Register a listener invoked on every completed navigation.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&NavigationNotice) + Send + Sync + 'static,
    {
        let id = self.next_subscriber.fetch_add(1, Ordering::Relaxed);
        self.subscribers.insert(id, Arc::new(listener));
        metrics::record_subscribers(self.subscribers.len());

        Subscription {
            id,
            subscribers: Arc::downgrade(&self.subscribers),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Resolve and apply a navigation event.
    pub fn navigate(&self, event: &NavigationEvent) -> NavigationOutcome {
        let pending = self.begin(event.clone());
        self.commit(pending)
    }

    /// Start a navigation. Any navigation begun earlier is superseded.
    pub fn begin(&self, event: NavigationEvent) -> PendingNavigation {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.set_phase(NavigationPhase::Resolving);

        tracing::debug!(path = %event.path, trigger = ?event.trigger, generation, "Resolving navigation");

        let resolution = self.table.trace(&event.path);
        PendingNavigation {
            generation,
            event,
            resolution,
        }
    }

    /// Apply a pending navigation unless a newer one has begun since.
    pub fn commit(&self, pending: PendingNavigation) -> NavigationOutcome {
        let PendingNavigation { generation, event, resolution } = pending;

        let resolution = {
            let _guard = self.commit_lock.lock().unwrap_or_else(PoisonError::into_inner);

            if self.generation.load(Ordering::Acquire) != generation {
                tracing::debug!(path = %event.path, generation, "Navigation superseded, discarding");
                metrics::record_navigation("superseded");
                return NavigationOutcome::Superseded;
            }

            match resolution {
                Ok(Resolution { route, redirects }) => {
                    let route = Arc::new(route);
                    self.active.store(Some(route.clone()));
                    self.set_phase(NavigationPhase::Active);
                    Ok((route, redirects))
                }
                Err(error) => {
                    self.set_phase(failure_phase(&error));
                    Err(error)
                }
            }
        };

        match resolution {
            Ok((route, redirects)) => {
                tracing::info!(
                    requested = %event.path,
                    path = %route.path,
                    view = %route.view,
                    redirects = redirects.len(),
                    "Navigation complete"
                );
                metrics::record_navigation("active");
                metrics::record_redirect_hops(redirects.len());

                self.notify(&NavigationNotice {
                    requested: event.path,
                    trigger: event.trigger,
                    redirects,
                    result: Ok(route.clone()),
                });
                NavigationOutcome::Active(route)
            }
            Err(error) => {
                let redirects = match &error {
                    ResolveError::NotFound { path } => {
                        tracing::warn!(requested = %event.path, path = %path, "No route matched");
                        Vec::new()
                    }
                    ResolveError::RedirectLoop { chain, .. } => {
                        tracing::error!(
                            requested = %event.path,
                            chain = ?chain,
                            "Redirect loop in route table"
                        );
                        chain.clone()
                    }
                };
                metrics::record_navigation(error.kind());

                self.notify(&NavigationNotice {
                    requested: event.path,
                    trigger: event.trigger,
                    redirects,
                    result: Err(error.clone()),
                });

                // Leave the phase alone if a newer navigation moved it on.
                let _ = self.phase.compare_exchange(
                    failure_phase(&error) as u8,
                    NavigationPhase::Idle as u8,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                );
                NavigationOutcome::Failed(error)
            }
        }
    }

    /// Consume navigation events until the channel closes or shutdown fires.
    pub async fn run(
        &self,
        mut events: mpsc::UnboundedReceiver<NavigationEvent>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        tracing::info!(routes = self.table.len(), "Router started");

        loop {
            tokio::select! {
                event = events.recv() => {
                    match event {
                        Some(event) => {
                            self.navigate(&event);
                        }
                        None => {
                            tracing::debug!("History adapter dropped, stopping router");
                            break;
                        }
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Router received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    fn set_phase(&self, phase: NavigationPhase) {
        self.phase.store(phase as u8, Ordering::Release);
    }

    fn notify(&self, notice: &NavigationNotice) {
        let mut listeners: Vec<(u64, Listener)> = self
            .subscribers
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        listeners.sort_by_key(|(id, _)| *id);

        for (_, listener) in listeners {
            listener(notice);
        }
    }
}

fn failure_phase(error: &ResolveError) -> NavigationPhase {
    match error {
        ResolveError::NotFound { .. } => NavigationPhase::NotFound,
        ResolveError::RedirectLoop { .. } => NavigationPhase::RedirectLoop,
    }
}

impl std::fmt::Debug for RouterInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterInstance")
            .field("routes", &self.table.len())
            .field("phase", &self.phase())
            .field("active", &self.active_route().map(|r| r.path.clone()))
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
