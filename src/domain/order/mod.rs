// ============================================================================
// Order Domain - status lifecycle of an order
// ============================================================================
//
// This module contains ALL order status code:
// - Value objects (OrderStatus and its transition table)
// - Commands (UpdateOrderStatus, CallerIdentity, UpdateAck)
// - Errors (UpdateStatusError, RequestRejection)
// - Command Handler (OrderStatusCommandHandler, the callable path)
// - Request Handler (QueuedRequestHandler, the trigger path)
//
// ============================================================================

pub mod value_objects;
pub mod commands;
pub mod errors;
pub mod command_handler;
pub mod request_handler;

// Re-export for convenience
pub use value_objects::*;
pub use commands::*;
pub use errors::*;
pub use command_handler::*;
pub use request_handler::*;
