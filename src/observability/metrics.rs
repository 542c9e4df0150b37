//! Metrics collection.
//!
//! # Metrics
//! - `router_navigations_total` (counter): completed navigations by outcome
//! - `router_redirect_hops` (histogram): redirect hops per successful navigation
//! - `router_subscribers` (gauge): registered navigation listeners

use ::metrics::{counter, gauge, histogram};

/// Record a completed or discarded navigation.
pub fn record_navigation(outcome: &'static str) {
    counter!("router_navigations_total", "outcome" => outcome).increment(1);
}

/// Record the redirect hops taken by a successful navigation.
pub fn record_redirect_hops(hops: usize) {
    histogram!("router_redirect_hops").record(hops as f64);
}

/// Record the current listener count.
pub fn record_subscribers(count: usize) {
    gauge!("router_subscribers").set(count as f64);
}
