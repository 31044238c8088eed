// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Domain rules are independent of the HTTP surface and of the store
// implementation; they only see the `DocumentStore` trait.
//
// ============================================================================

pub mod order;
