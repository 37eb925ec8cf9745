//! Business logic services.
//!
//! Services contain core business logic separated from HTTP handlers.
//! They handle the aggregator round-trips, reconciliation, and database
//! writes behind the link and sync endpoints.

pub mod link_service;
pub mod sync_service;
