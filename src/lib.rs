//! Order status service for a food-ordering backend.
//!
//! Two entry points move an order through its lifecycle
//! (`pending → preparing → ready → completed`, with `cancelled` reachable from
//! every non-terminal state):
//!
//! - the `updateOrderStatus` callable, on behalf of an authenticated merchant
//! - the `orderStatusRequests` trigger, for queued requests processed with
//!   elevated privilege
//!
//! Both share one transition table and one ownership rule.

pub mod actors;
pub mod api;
pub mod config;
pub mod domain;
pub mod metrics;
pub mod models;
pub mod platform;
pub mod store;
