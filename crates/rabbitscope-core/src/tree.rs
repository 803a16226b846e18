// ── Display tree construction and diffing ──
//
// Pure transformations from a topology snapshot to the hierarchical
// display tree (root → vhosts → exchanges/queues), plus the structural
// equality used to gate redraws. Trees are rebuilt from scratch on every
// snapshot; nothing here mutates a tree in place.

use std::collections::BTreeMap;

use rabbitscope_api::{Exchange, Queue, Topology};

/// Root label of every topology tree.
pub const ROOT_LABEL: &str = "RabbitMQ Topology";

/// What kind of entity a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Root,
    Vhost,
    Exchange,
    Queue,
}

/// Structural identity of a node: `(kind, vhost, name)`.
///
/// Used to key navigation state (selection, expansion) across rebuilds.
/// Unlike display-label text, this stays unambiguous when two entities
/// share a name across vhosts and survives label format changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub kind: NodeKind,
    pub vhost: String,
    pub name: String,
}

impl NodeId {
    pub fn root() -> Self {
        Self {
            kind: NodeKind::Root,
            vhost: String::new(),
            name: String::new(),
        }
    }

    pub fn vhost(name: &str) -> Self {
        Self {
            kind: NodeKind::Vhost,
            vhost: name.to_owned(),
            name: name.to_owned(),
        }
    }

    pub fn exchange(vhost: &str, name: &str) -> Self {
        Self {
            kind: NodeKind::Exchange,
            vhost: vhost.to_owned(),
            name: name.to_owned(),
        }
    }

    pub fn queue(vhost: &str, name: &str) -> Self {
        Self {
            kind: NodeKind::Queue,
            vhost: vhost.to_owned(),
            name: name.to_owned(),
        }
    }
}

/// Entity payload attached to leaf nodes for detail lookups.
///
/// Matched exhaustively when the explorer opens a detail view. Payloads
/// are deliberately excluded from structural tree equality.
#[derive(Debug, Clone, PartialEq)]
pub enum NodePayload {
    Exchange(Exchange),
    Queue(Queue),
}

/// A display-tree value: label plus ordered children.
///
/// Built fresh from a snapshot on every rebuild and never patched.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub id: NodeId,
    pub label: String,
    pub payload: Option<NodePayload>,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    fn new(id: NodeId, label: String) -> Self {
        Self {
            id,
            label,
            payload: None,
            children: Vec::new(),
        }
    }

    /// Structural equality: labels match and child sequences are equal
    /// element-wise in order and length. Payloads are ignored.
    pub fn same_structure(&self, other: &TreeNode) -> bool {
        self.label == other.label
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(&other.children)
                .all(|(a, b)| a.same_structure(b))
    }
}

/// Build the display tree for a snapshot.
///
/// Pure and total: an empty snapshot yields a bare root. Vhosts are
/// sorted by name; within a vhost, exchanges come before queues, each in
/// snapshot order. The ordering is stable for a fixed input so the
/// change gate can compare successive builds.
pub fn build_tree(topology: &Topology) -> TreeNode {
    let mut vhosts: BTreeMap<&str, TreeNode> = BTreeMap::new();

    for ex in &topology.exchanges {
        vhosts
            .entry(ex.vhost.as_str())
            .or_insert_with(|| vhost_node(&ex.vhost))
            .children
            .push(exchange_node(ex));
    }
    for queue in &topology.queues {
        vhosts
            .entry(queue.vhost.as_str())
            .or_insert_with(|| vhost_node(&queue.vhost))
            .children
            .push(queue_node(queue));
    }

    let mut root = TreeNode::new(NodeId::root(), ROOT_LABEL.to_owned());
    root.children = vhosts.into_values().collect();
    root
}

fn vhost_node(name: &str) -> TreeNode {
    TreeNode::new(NodeId::vhost(name), format!("VHost: {name}"))
}

fn exchange_node(ex: &Exchange) -> TreeNode {
    let mut node = TreeNode::new(
        NodeId::exchange(&ex.vhost, &ex.name),
        format!("Exchange: {}", ex.name),
    );
    node.payload = Some(NodePayload::Exchange(ex.clone()));
    node
}

fn queue_node(queue: &Queue) -> TreeNode {
    let mut node = TreeNode::new(
        NodeId::queue(&queue.vhost, &queue.name),
        format!("Queue: {}", queue.name),
    );
    node.payload = Some(NodePayload::Queue(queue.clone()));
    node
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rabbitscope_api::{Binding, Consumer, DestinationType, MessageStats};

    use super::*;

    fn minimal_topology() -> Topology {
        Topology {
            exchanges: vec![Exchange {
                name: "ex1".into(),
                exchange_type: "direct".into(),
                vhost: "vh1".into(),
                durable: false,
                auto_delete: false,
                arguments: serde_json::Map::new(),
            }],
            queues: vec![Queue {
                name: "q1".into(),
                vhost: "vh1".into(),
                durable: false,
                auto_delete: false,
                arguments: serde_json::Map::new(),
                message_stats: MessageStats::default(),
            }],
            bindings: vec![Binding {
                source: "ex1".into(),
                destination: "q1".into(),
                destination_type: DestinationType::Queue,
                vhost: "vh1".into(),
                routing_key: String::new(),
            }],
            consumers: vec![Consumer {
                queue: "q1".into(),
                consumer_tag: "c1".into(),
                vhost: "vh1".into(),
                channel_details: rabbitscope_api::ChannelDetails { pid: 1 },
            }],
        }
    }

    #[test]
    fn build_tree_is_deterministic() {
        let topology = minimal_topology();
        let a = build_tree(&topology);
        let b = build_tree(&topology);
        assert!(a.same_structure(&b));
    }

    #[test]
    fn empty_snapshot_yields_bare_root() {
        let tree = build_tree(&Topology::default());
        assert_eq!(tree.label, ROOT_LABEL);
        assert!(tree.children.is_empty());
    }

    #[test]
    fn minimal_topology_produces_one_vhost_with_two_leaves() {
        let tree = build_tree(&minimal_topology());

        assert_eq!(tree.children.len(), 1);
        let vhost = &tree.children[0];
        assert_eq!(vhost.label, "VHost: vh1");
        assert_eq!(vhost.id, NodeId::vhost("vh1"));

        let labels: Vec<&str> = vhost.children.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Exchange: ex1", "Queue: q1"]);
        assert!(matches!(
            vhost.children[0].payload,
            Some(NodePayload::Exchange(_))
        ));
        assert!(matches!(
            vhost.children[1].payload,
            Some(NodePayload::Queue(_))
        ));
    }

    #[test]
    fn vhosts_are_sorted_by_name() {
        let mut topology = minimal_topology();
        topology.queues.push(Queue {
            name: "other".into(),
            vhost: "/".into(),
            durable: false,
            auto_delete: false,
            arguments: serde_json::Map::new(),
            message_stats: MessageStats::default(),
        });

        let tree = build_tree(&topology);
        let labels: Vec<&str> = tree.children.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["VHost: /", "VHost: vh1"]);
    }

    #[test]
    fn same_structure_ignores_payload() {
        let mut a = build_tree(&minimal_topology());
        let b = build_tree(&minimal_topology());
        a.children[0].children[0].payload = None;
        assert!(a.same_structure(&b));
    }

    #[test]
    fn same_structure_detects_label_and_shape_changes() {
        let base = build_tree(&minimal_topology());

        let mut renamed = base.clone();
        renamed.children[0].children[1].label = "Queue: renamed".into();
        assert!(!base.same_structure(&renamed));

        let mut grown = base.clone();
        grown.children[0]
            .children
            .push(TreeNode::new(NodeId::queue("vh1", "q2"), "Queue: q2".into()));
        assert!(!base.same_structure(&grown));
    }
}
