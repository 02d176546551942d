//! Relay between New Relic alert webhooks and IBM Watson Workspace spaces.
//!
//! Inbound: Workspace outbound webhooks (`/webhook`) and alert callbacks
//! (`/alert/{space_id}`). Outbound: annotated messages posted to a space after
//! a client-credentials token exchange.

pub mod auth;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod filter;
pub mod http_server;
pub mod sender;
pub mod types;
pub mod verification;
