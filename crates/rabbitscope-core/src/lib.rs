//! Deterministic data transformation and refresh coordination for
//! rabbitscope.
//!
//! This crate sits between `rabbitscope-api` and the UI consumers
//! (CLI / TUI):
//!
//! - **[`ViewModel`]** — owns the current [`Topology`](rabbitscope_api::Topology)
//!   snapshot, runs the periodic refresh loop, and publishes coalesced
//!   change notifications through a single-slot
//!   [`watch`](tokio::sync::watch) channel.
//! - **[`tree`]** — pure snapshot → display-tree transformation plus the
//!   structural-equality gate that suppresses needless redraws.
//! - **[`diagram`]** — pure PlantUML rendering of a snapshot.
//! - **[`Options`]** — the immutable per-session configuration value.

pub mod diagram;
pub mod error;
pub mod options;
pub mod tree;
pub mod viewmodel;

pub use error::CoreError;
pub use options::{GroupBy, Options};
pub use tree::{NodeId, NodeKind, NodePayload, TreeNode, build_tree};
pub use viewmodel::ViewModel;
