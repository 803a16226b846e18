// ── PlantUML diagram generation ──
//
// Pure rendering of a topology snapshot into PlantUML source. Grouping
// follows the session options: one package block per vhost (default) or
// per exchange type. No I/O here; the CLI writes the output file.

use std::collections::{BTreeSet, HashSet};
use std::fmt::Write;

use rabbitscope_api::{Binding, Consumer, DestinationType, Exchange, Queue, Topology};

use crate::options::{GroupBy, Options};

/// Render the given snapshot as PlantUML source text.
pub fn generate(topology: &Topology, options: &Options) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "@startuml {}", options.broker);
    out.push_str("skinparam shadowing false\n\n");

    // Track already-defined exchange aliases so the default exchange is
    // only synthesized once per diagram.
    let mut defined_exchanges: HashSet<String> = HashSet::new();

    for group in group_keys(topology, options) {
        write_group(&mut out, topology, options, &group, &mut defined_exchanges);
    }

    out.push_str("@enduml\n");
    out
}

/// Emit one package block: exchanges, queues, bindings, consumers.
fn write_group(
    out: &mut String,
    topology: &Topology,
    options: &Options,
    group: &str,
    defined_exchanges: &mut HashSet<String>,
) {
    let _ = writeln!(out, "package \"{group}\" {{");
    write_exchanges(out, &topology.exchanges, options, group, defined_exchanges);
    write_queues(out, &topology.queues, options, group);
    write_bindings(out, &topology.bindings, options, group, defined_exchanges);
    write_consumers(out, &topology.consumers, options, group);
    out.push_str("}\n");
}

fn write_exchanges(
    out: &mut String,
    exchanges: &[Exchange],
    options: &Options,
    group: &str,
    defined_exchanges: &mut HashSet<String>,
) {
    for ex in exchanges {
        if !matches_group(options, &ex.vhost, &ex.exchange_type, group) {
            continue;
        }
        let alias = sanitize(&format!("ex_{}_{}", ex.vhost, ex.name));
        defined_exchanges.insert(alias.clone());
        let label = format!(
            "{} exchange: {}\\n(type={})",
            type_icon(&ex.exchange_type),
            ex.name,
            ex.exchange_type
        );
        let _ = writeln!(
            out,
            "rectangle \"{label}\" as {alias} #{}",
            type_color(&ex.exchange_type)
        );
    }
}

fn write_queues(out: &mut String, queues: &[Queue], options: &Options, group: &str) {
    for queue in queues {
        if !matches_group(options, &queue.vhost, "", group) {
            continue;
        }
        let alias = sanitize(&format!("qu_{}_{}", queue.vhost, queue.name));
        let mut label = format!("📦 queue: {}", queue.name);

        if options.show_msg_stats {
            let stats = &queue.message_stats;
            let _ = write!(
                label,
                "\\nmessages: {}\\nready: {}\\nunacked: {}",
                stats.messages, stats.messages_ready, stats.messages_unacked
            );
            if let Some(msgs) = queue.arguments.get("messages") {
                let _ = write!(label, "\\nmsgs: {msgs}");
            }
        }
        let _ = writeln!(out, "rectangle \"{label}\" as {alias} #white");
    }
}

fn write_bindings(
    out: &mut String,
    bindings: &[Binding],
    options: &Options,
    group: &str,
    defined_exchanges: &mut HashSet<String>,
) {
    for binding in bindings {
        if !matches_group(options, &binding.vhost, "", group) {
            continue;
        }

        // A binding from the nameless default exchange still needs a
        // visible source node.
        let source = if binding.source.is_empty() {
            "default"
        } else {
            &binding.source
        };
        let src = sanitize(&format!("ex_{}_{source}", binding.vhost));
        if !defined_exchanges.contains(&src) {
            defined_exchanges.insert(src.clone());
            let _ = writeln!(
                out,
                "rectangle \"➡️ exchange: default\\n(type=direct)\" as {src} {}",
                vhost_color(&binding.vhost)
            );
        }

        let dst = match binding.destination_type {
            DestinationType::Queue => {
                sanitize(&format!("qu_{}_{}", binding.vhost, binding.destination))
            }
            DestinationType::Exchange => {
                sanitize(&format!("ex_{}_{}", binding.vhost, binding.destination))
            }
        };

        if binding.routing_key.is_empty() {
            let _ = writeln!(out, "{src} --> {dst}");
        } else {
            let _ = writeln!(
                out,
                "{src} --> {dst} : \"{}\"",
                escape_label(&binding.routing_key)
            );
        }
    }
}

fn write_consumers(out: &mut String, consumers: &[Consumer], options: &Options, group: &str) {
    for consumer in consumers {
        if !matches_group(options, &consumer.vhost, "", group) {
            continue;
        }
        let queue_alias = sanitize(&format!("qu_{}_{}", consumer.vhost, consumer.queue));
        let consumer_alias = sanitize(&format!("cons_{}", consumer.consumer_tag));
        let _ = writeln!(
            out,
            "actor \"consumer: {}\" as {consumer_alias}",
            consumer.consumer_tag
        );
        let _ = writeln!(out, "{queue_alias} --> {consumer_alias} : delivers");
    }
}

/// Sorted group keys for the configured grouping mode.
fn group_keys(topology: &Topology, options: &Options) -> Vec<String> {
    let mut groups: BTreeSet<&str> = BTreeSet::new();
    match options.group_by {
        GroupBy::Type => {
            for ex in &topology.exchanges {
                groups.insert(&ex.exchange_type);
            }
        }
        GroupBy::Vhost => {
            for ex in &topology.exchanges {
                groups.insert(&ex.vhost);
            }
            for queue in &topology.queues {
                groups.insert(&queue.vhost);
            }
        }
    }
    groups.into_iter().map(ToOwned::to_owned).collect()
}

/// Whether an object with the given vhost/type belongs to this group.
fn matches_group(options: &Options, vhost: &str, exchange_type: &str, group: &str) -> bool {
    match options.group_by {
        GroupBy::Type => exchange_type == group,
        GroupBy::Vhost => vhost == group,
    }
}

/// Icon prefix for an exchange type.
fn type_icon(exchange_type: &str) -> &'static str {
    match exchange_type {
        "direct" => "➡️",
        "fanout" => "🔄",
        "topic" => "🧩",
        "headers" => "📋",
        _ => "❓",
    }
}

/// PlantUML fill color for an exchange type.
fn type_color(exchange_type: &str) -> &'static str {
    match exchange_type {
        "direct" => "2196F3",
        "fanout" => "FFEB3B",
        "topic" => "4CAF50",
        "headers" => "9C27B0",
        _ => "BBBBBB",
    }
}

/// Stable per-vhost color, picked by FNV-1a hash of the vhost name.
fn vhost_color(vhost: &str) -> &'static str {
    const COLORS: [&str; 12] = [
        "#F44336", "#E91E63", "#9C27B0", "#3F51B5", "#03A9F4", "#009688", "#4CAF50", "#CDDC39",
        "#FFC107", "#FF9800", "#795548", "#607D8B",
    ];

    let mut hash: u32 = 0x811c_9dc5;
    for byte in vhost.as_bytes() {
        hash ^= u32::from(*byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    COLORS[usize::try_from(hash).unwrap_or(usize::MAX) % COLORS.len()]
}

/// Replace characters PlantUML aliases cannot contain.
fn sanitize(alias: &str) -> String {
    alias
        .chars()
        .map(|c| match c {
            '/' | '-' | '.' => '_',
            other => other,
        })
        .collect()
}

/// Escape routing keys and other labels for PlantUML.
fn escape_label(label: &str) -> String {
    label.replace('"', "\\\"").replace('\n', "\\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rabbitscope_api::{ChannelDetails, MessageStats, TopologyFilter};

    use super::*;

    fn sample_topology() -> Topology {
        Topology {
            exchanges: vec![Exchange {
                name: "orders".into(),
                exchange_type: "topic".into(),
                vhost: "vh1".into(),
                durable: true,
                auto_delete: false,
                arguments: serde_json::Map::new(),
            }],
            queues: vec![Queue {
                name: "orders.created".into(),
                vhost: "vh1".into(),
                durable: true,
                auto_delete: false,
                arguments: serde_json::Map::new(),
                message_stats: MessageStats {
                    messages: 7,
                    messages_ready: 5,
                    messages_unacked: 2,
                },
            }],
            bindings: vec![Binding {
                source: "orders".into(),
                destination: "orders.created".into(),
                destination_type: DestinationType::Queue,
                vhost: "vh1".into(),
                routing_key: "orders.#".into(),
            }],
            consumers: vec![Consumer {
                queue: "orders.created".into(),
                consumer_tag: "ctag-1".into(),
                vhost: "vh1".into(),
                channel_details: ChannelDetails { pid: 42 },
            }],
        }
    }

    fn options() -> Options {
        Options {
            broker: "http://localhost:15672/".into(),
            filter: TopologyFilter::default(),
            group_by: GroupBy::Vhost,
            show_msg_stats: false,
        }
    }

    #[test]
    fn renders_a_complete_vhost_group() {
        let output = generate(&sample_topology(), &options());

        assert!(output.starts_with("@startuml http://localhost:15672/\n"));
        assert!(output.ends_with("@enduml\n"));
        assert!(output.contains("package \"vh1\" {"));
        assert!(output.contains(
            "rectangle \"🧩 exchange: orders\\n(type=topic)\" as ex_vh1_orders #4CAF50"
        ));
        assert!(output.contains("rectangle \"📦 queue: orders.created\" as qu_vh1_orders_created"));
        assert!(output.contains("ex_vh1_orders --> qu_vh1_orders_created : \"orders.#\""));
        assert!(output.contains("actor \"consumer: ctag-1\" as cons_ctag_1"));
        assert!(output.contains("qu_vh1_orders_created --> cons_ctag_1 : delivers"));
    }

    #[test]
    fn message_stats_appear_only_when_enabled() {
        let topology = sample_topology();

        let without = generate(&topology, &options());
        assert!(!without.contains("messages:"));

        let with = generate(
            &topology,
            &Options {
                show_msg_stats: true,
                ..options()
            },
        );
        assert!(with.contains("\\nmessages: 7\\nready: 5\\nunacked: 2"));
    }

    #[test]
    fn default_exchange_is_synthesized_for_nameless_sources() {
        let mut topology = sample_topology();
        topology.bindings.push(Binding {
            source: String::new(),
            destination: "orders.created".into(),
            destination_type: DestinationType::Queue,
            vhost: "vh1".into(),
            routing_key: String::new(),
        });

        let output = generate(&topology, &options());
        assert!(output.contains("exchange: default"));
        assert!(output.contains("ex_vh1_default --> qu_vh1_orders_created\n"));
    }

    #[test]
    fn group_by_type_uses_exchange_types_as_groups() {
        let output = generate(
            &sample_topology(),
            &Options {
                group_by: GroupBy::Type,
                ..options()
            },
        );
        assert!(output.contains("package \"topic\" {"));
        assert!(!output.contains("package \"vh1\" {"));
    }

    #[test]
    fn groups_are_sorted() {
        let mut topology = sample_topology();
        topology.queues.push(Queue {
            name: "other".into(),
            vhost: "alpha".into(),
            durable: false,
            auto_delete: false,
            arguments: serde_json::Map::new(),
            message_stats: MessageStats::default(),
        });

        let output = generate(&topology, &options());
        let alpha = output.find("package \"alpha\"").unwrap();
        let vh1 = output.find("package \"vh1\"").unwrap();
        assert!(alpha < vh1);
    }
}
