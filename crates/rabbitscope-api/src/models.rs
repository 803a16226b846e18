// Types representing RabbitMQ objects retrieved via the management API,
// plus topology filtering helpers. Field names mirror the API JSON.

use serde::{Deserialize, Serialize};

/// A RabbitMQ exchange configuration.
///
/// An exchange routes messages through configured bindings to queues or
/// other exchanges. The `exchange_type` is the routing discipline:
/// `direct`, `fanout`, `topic`, or `headers`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    pub name: String,
    #[serde(rename = "type")]
    pub exchange_type: String,
    pub vhost: String,
    #[serde(default)]
    pub durable: bool,
    #[serde(default)]
    pub auto_delete: bool,
    #[serde(default)]
    pub arguments: serde_json::Map<String, serde_json::Value>,
}

/// Runtime message counters for a queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageStats {
    #[serde(default)]
    pub messages: u64,
    #[serde(default)]
    pub messages_ready: u64,
    #[serde(default, rename = "messages_unacknowledged")]
    pub messages_unacked: u64,
}

/// A RabbitMQ queue configuration with its runtime counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Queue {
    pub name: String,
    pub vhost: String,
    #[serde(default)]
    pub durable: bool,
    #[serde(default)]
    pub auto_delete: bool,
    #[serde(default)]
    pub arguments: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub message_stats: MessageStats,
}

/// What a binding points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DestinationType {
    Queue,
    Exchange,
}

/// A routing rule linking a source exchange to a destination queue or
/// exchange, optionally filtered by a routing key.
///
/// Relationships are denormalized: source and destination are referenced
/// by name + vhost, never by object pointer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub source: String,
    pub destination: String,
    #[serde(rename = "destination_type")]
    pub destination_type: DestinationType,
    pub vhost: String,
    #[serde(default)]
    pub routing_key: String,
}

/// The AMQP channel a consumer lives on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelDetails {
    #[serde(default)]
    pub pid: i64,
}

/// A consumer subscribed to a queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consumer {
    pub queue: String,
    pub consumer_tag: String,
    pub vhost: String,
    #[serde(default)]
    pub channel_details: ChannelDetails,
}

/// One fetched, immutable picture of broker state.
///
/// Aggregates all exchanges, queues, bindings, and consumers from the
/// management API, usually obtained via
/// [`ManagementClient::fetch_topology`](crate::ManagementClient::fetch_topology).
/// Within one snapshot, `(vhost, name)` uniquely identifies an exchange
/// and, separately, a queue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    pub exchanges: Vec<Exchange>,
    pub queues: Vec<Queue>,
    pub bindings: Vec<Binding>,
    pub consumers: Vec<Consumer>,
}

/// Vhost / exchange-name filter applied to a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopologyFilter {
    /// Only include objects from this vhost.
    pub vhost: Option<String>,
    /// Only include exchanges with this name.
    pub exchange: Option<String>,
}

impl TopologyFilter {
    /// Whether this filter passes everything through unchanged.
    pub fn is_empty(&self) -> bool {
        self.vhost.is_none() && self.exchange.is_none()
    }
}

impl Topology {
    /// Apply a filter, returning a new snapshot containing only matching
    /// resources. Relative order and all other fields are preserved.
    ///
    /// The exchange-name filter applies to exchanges only; queues,
    /// bindings, and consumers are restricted by vhost alone.
    pub fn filter(&self, filter: &TopologyFilter) -> Topology {
        let vhost_matches =
            |vhost: &str| filter.vhost.as_deref().is_none_or(|want| vhost == want);

        Topology {
            exchanges: self
                .exchanges
                .iter()
                .filter(|ex| {
                    vhost_matches(&ex.vhost)
                        && filter.exchange.as_deref().is_none_or(|want| ex.name == want)
                })
                .cloned()
                .collect(),
            queues: self
                .queues
                .iter()
                .filter(|q| vhost_matches(&q.vhost))
                .cloned()
                .collect(),
            bindings: self
                .bindings
                .iter()
                .filter(|b| vhost_matches(&b.vhost))
                .cloned()
                .collect(),
            consumers: self
                .consumers
                .iter()
                .filter(|c| vhost_matches(&c.vhost))
                .cloned()
                .collect(),
        }
    }
}
