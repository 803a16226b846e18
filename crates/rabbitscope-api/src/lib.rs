//! Async Rust client for the RabbitMQ management HTTP API.
//!
//! This crate owns the wire-facing layer of the rabbitscope workspace:
//!
//! - **[`ManagementClient`]** — thin HTTP client over `/api/*` endpoints.
//!   [`fetch_topology()`](ManagementClient::fetch_topology) retrieves the
//!   full broker topology (exchanges, queues, bindings, consumers) as one
//!   all-or-nothing snapshot.
//! - **[`Topology`]** and its element types — immutable snapshot models
//!   mirroring the management API JSON, plus vhost/exchange filtering.
//! - **[`TransportConfig`]** — shared `reqwest::Client` builder settings.
//!
//! `rabbitscope-core` consumes these and never talks HTTP directly.

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::ManagementClient;
pub use error::Error;
pub use models::{
    Binding, ChannelDetails, Consumer, DestinationType, Exchange, MessageStats, Queue, Topology,
    TopologyFilter,
};
pub use transport::TransportConfig;
