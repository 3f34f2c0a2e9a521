//! Mempool Ticker Server - explorer polling, snapshot aggregation and HTTP API
//!
//! The [`service::Aggregator`] pulls raw data from a mempool.space-compatible
//! explorer through [`explorer::EndpointResolver`], which falls back across
//! mirrors, and publishes immutable snapshots that the [`api`] handlers serve.

pub mod api;
pub mod cli;
pub mod config;
pub mod explorer;
pub mod server;
pub mod service;
