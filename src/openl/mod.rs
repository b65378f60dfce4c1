//! OpenL Studio remote API gateway.
//!
//! Narrow contract over the rules-management REST service: project
//! retrieval and status changes, table listing, test-run start and
//! test-summary fetches. Everything network-facing lives behind the
//! [`RulesGateway`] trait so the rest of the bridge can be exercised
//! against in-memory fakes.

pub mod client;
pub mod error;
pub mod models;

pub use client::{OpenlClient, RemoteAuth, RulesGateway};
pub use error::BridgeError;
pub use models::*;
