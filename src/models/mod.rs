//! Data models representing database entities.
//!
//! This module contains all data structures that map to database tables.

/// Bank account model
pub mod account;
/// Linked bank connection model
pub mod linked_item;
/// Synced transaction model
pub mod transaction;
/// User account model
pub mod user;
