// ============================================================================
// Callable API
// ============================================================================
//
// HTTP surface for the two client-facing operations:
// - POST /updateOrderStatus    callable protocol, authenticated merchant
// - POST /orderStatusRequests  creates a queued request (fires the trigger)
//
// ============================================================================

mod routes;

pub use routes::{configure, ApiState};
