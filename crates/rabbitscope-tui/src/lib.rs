//! Interactive terminal explorer for RabbitMQ topologies.
//!
//! Built on [ratatui](https://ratatui.rs) over the reactive snapshot in
//! [`rabbitscope_core::ViewModel`]. The explorer renders the topology as
//! a navigable tree (vhosts → exchanges/queues), opens detail modals for
//! leaf entities, and rebuilds the tree on every coalesced update
//! notification while preserving the user's selection and expansion
//! state.
//!
//! Logging must go to a file -- stdout belongs to the terminal UI.

pub mod app;
pub mod event;
pub mod explorer;
pub mod theme;
pub mod tui;

pub use app::App;
pub use tui::install_hooks;
