//! Client for the Plaid financial data aggregator.
//!
//! All communication with the aggregator goes through this module:
//! - Link token creation (starts the client-side Link widget)
//! - Public token exchange (turns a temporary token into a durable credential)
//! - Item/institution metadata lookup
//! - The cursor-based `/transactions/sync` change feed
//!
//! The API is plain JSON over HTTPS; every request carries the client id and
//! secret in the body. Which host is used (sandbox vs production) comes from
//! [`crate::config::PlaidEnvironment`].

pub mod client;
pub mod types;

pub use client::{PlaidClient, PlaidError};
pub use types::{
    InstitutionsGetByIdResponse, ItemGetResponse, ItemPublicTokenExchangeResponse,
    LinkTokenCreateResponse, PlaidAccount, PlaidBalances, PlaidTransaction, RemovedTransaction,
    TransactionsSyncResponse,
};
