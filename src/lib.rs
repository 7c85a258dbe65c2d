//! # Token Broker Library
//!
//! Issues OAuth2 access tokens on behalf of callers that present a
//! username/password pair, caching each credential's token and refreshing
//! it before it runs out.
//!
//! Modules:
//! - `config`: service configuration, loading and validation
//! - `cache`: credential-keyed token cache
//! - `policy`: serve / refresh / acquire decision
//! - `sources`: authorization server client and response classification
//! - `broker`: request orchestration and the outbound result shape
//! - `server`: HTTP endpoint wiring

pub mod broker;
pub mod cache;
pub mod config;
pub mod helpers;
pub mod observability;
pub mod policy;
pub mod server;
pub mod sources;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::broker::orchestrator::TokenBroker;
pub use crate::broker::result::{Action, TokenResult};
pub use crate::config::settings::ServiceConfig;
