// Immutable session configuration.
//
// Constructed once at startup from CLI flags and passed by reference
// into the view model, diagram generator, and explorer. Nothing mutates
// it after construction.

use rabbitscope_api::TopologyFilter;

/// How diagram output is grouped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GroupBy {
    /// One package block per virtual host.
    #[default]
    Vhost,
    /// One package block per exchange type.
    Type,
}

/// Per-session options shared by the `generate` and `tui` commands.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Broker base URI, credentials already stripped (display only).
    pub broker: String,
    /// Vhost / exchange filter applied to every fetched snapshot.
    pub filter: TopologyFilter,
    pub group_by: GroupBy,
    /// Include message counters in queue labels.
    pub show_msg_stats: bool,
}
