// ============================================================================
// Actors Module
// ============================================================================
//
// Actor-based infrastructure for asynchronous processing.
//
// Note: Domain logic uses handlers, NOT actors.
//       Actors only connect store feeds to those handlers.
//
// ============================================================================

mod request_trigger;

pub use request_trigger::{ProcessRequest, RequestTriggerActor};
