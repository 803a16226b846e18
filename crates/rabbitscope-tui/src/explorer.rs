//! Explorer — navigable topology tree with state-preserving rebuilds.
//!
//! The tree is rendered from a flat list of visible rows derived from the
//! current [`TreeNode`] plus the expansion set. On every accepted update
//! the whole row list is rebuilt from scratch; the user's expansion and
//! selection survive because they are keyed by structural [`NodeId`],
//! not by row position or label text.

use std::collections::HashSet;
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};

use rabbitscope_api::{DestinationType, Exchange, Queue, Topology};
use rabbitscope_core::{NodeId, NodeKind, NodePayload, TreeNode, ViewModel, tree::ROOT_LABEL};

use crate::theme;

/// What a key press did, as seen by the app loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// Nothing relevant; no redraw needed.
    Ignored,
    /// State changed; redraw on the next render tick.
    Handled,
    /// The user asked to quit.
    Quit,
}

/// One visible row of the flattened tree.
#[derive(Debug, Clone)]
struct Row {
    id: NodeId,
    label: String,
    depth: usize,
    has_children: bool,
    expanded: bool,
    payload: Option<NodePayload>,
}

/// Detail modal for a selected exchange or queue.
struct DetailView {
    title: String,
    lines: Vec<String>,
}

/// The interactive topology browser.
pub struct Explorer {
    vm: Arc<ViewModel>,
    tree: TreeNode,
    expanded: HashSet<NodeId>,
    selected: Option<NodeId>,
    rows: Vec<Row>,
    scroll_offset: usize,
    modal: Option<DetailView>,
}

impl Explorer {
    pub fn new(vm: Arc<ViewModel>) -> Self {
        let tree = TreeNode {
            id: NodeId::root(),
            label: ROOT_LABEL.to_owned(),
            payload: None,
            children: Vec::new(),
        };
        let mut expanded = HashSet::new();
        expanded.insert(NodeId::root());

        let rows = flatten(&tree, &expanded);
        let selected = rows.first().map(|row| row.id.clone());

        Self {
            vm,
            tree,
            expanded,
            selected,
            rows,
            scroll_offset: 0,
            modal: None,
        }
    }

    /// Swap in a freshly built tree, preserving navigation state.
    ///
    /// Captures the expansion set and selection from the displayed tree,
    /// rebuilds the row list from scratch, re-marks every surviving node,
    /// and restores the selection -- all in one call, so the renderer
    /// never observes a half-built tree. Ids that no longer exist simply
    /// fail to match: stale expansions are dropped and a stale selection
    /// falls back to the nearest remaining row.
    pub fn apply_tree(&mut self, tree: TreeNode) {
        let expanded = std::mem::take(&mut self.expanded);
        let selected = self.selected.take();
        let selected_index = selected
            .as_ref()
            .and_then(|id| self.rows.iter().position(|row| &row.id == id))
            .unwrap_or(0);

        let mut surviving = HashSet::new();
        collect_ids(&tree, &mut surviving);

        self.expanded = expanded
            .into_iter()
            .filter(|id| surviving.contains(id))
            .collect();
        self.tree = tree;
        self.rows = flatten(&self.tree, &self.expanded);
        self.selected = match selected {
            Some(id) if self.rows.iter().any(|row| row.id == id) => Some(id),
            _ => {
                let fallback = selected_index.min(self.rows.len().saturating_sub(1));
                self.rows.get(fallback).map(|row| row.id.clone())
            }
        };
    }

    /// Handle a key press. Modal input is captured before tree input.
    pub fn handle_key(&mut self, key: KeyEvent) -> InputOutcome {
        if self.modal.is_some() {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('q') => {
                    self.modal = None;
                    InputOutcome::Handled
                }
                _ => InputOutcome::Ignored,
            };
        }

        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.select_offset(1),
            KeyCode::Up | KeyCode::Char('k') => self.select_offset(-1),
            KeyCode::Home | KeyCode::Char('g') => self.select_index(0),
            KeyCode::End | KeyCode::Char('G') => {
                self.select_index(self.rows.len().saturating_sub(1))
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.activate_selected(),
            KeyCode::Esc | KeyCode::Char('q') => InputOutcome::Quit,
            _ => InputOutcome::Ignored,
        }
    }

    /// Whether the detail modal is currently open.
    pub fn modal_open(&self) -> bool {
        self.modal.is_some()
    }

    fn selected_index(&self) -> usize {
        self.selected
            .as_ref()
            .and_then(|id| self.rows.iter().position(|row| &row.id == id))
            .unwrap_or(0)
    }

    fn select_offset(&mut self, delta: isize) -> InputOutcome {
        if self.rows.is_empty() {
            return InputOutcome::Ignored;
        }
        let current = self.selected_index();
        let target = current
            .saturating_add_signed(delta)
            .min(self.rows.len() - 1);
        self.select_index(target)
    }

    fn select_index(&mut self, index: usize) -> InputOutcome {
        let Some(row) = self.rows.get(index) else {
            return InputOutcome::Ignored;
        };
        self.selected = Some(row.id.clone());
        InputOutcome::Handled
    }

    /// Enter on a branch toggles expansion; on a leaf opens its details.
    fn activate_selected(&mut self) -> InputOutcome {
        let index = self.selected_index();
        let Some(row) = self.rows.get(index) else {
            return InputOutcome::Ignored;
        };

        match &row.payload {
            None => {
                let id = row.id.clone();
                if !self.expanded.remove(&id) {
                    self.expanded.insert(id);
                }
                self.rows = flatten(&self.tree, &self.expanded);
                InputOutcome::Handled
            }
            Some(payload) => {
                let topology = self.vm.topology().unwrap_or_default();
                self.modal = Some(match payload {
                    NodePayload::Exchange(ex) => exchange_detail(ex, &topology),
                    NodePayload::Queue(queue) => queue_detail(queue, &topology),
                });
                InputOutcome::Handled
            }
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let layout = Layout::vertical([
            Constraint::Min(1),    // tree
            Constraint::Length(1), // help line
        ])
        .split(area);

        self.render_tree(frame, layout[0]);
        self.render_help(frame, layout[1]);

        if self.modal.is_some() {
            self.render_modal(frame, area);
        }
    }

    fn render_tree(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" rabbitscope ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());

        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.height == 0 {
            return;
        }

        let viewport = usize::from(inner.height);
        self.ensure_visible(viewport);

        let selected_index = self.selected_index();
        let lines: Vec<Line<'_>> = self
            .rows
            .iter()
            .enumerate()
            .skip(self.scroll_offset)
            .take(viewport)
            .map(|(index, row)| row_line(row, index == selected_index))
            .collect();

        frame.render_widget(Paragraph::new(lines), inner);
    }

    /// Adjust the scroll offset so the selected row stays in view.
    fn ensure_visible(&mut self, viewport: usize) {
        if viewport == 0 {
            return;
        }
        let selected = self.selected_index();
        if selected < self.scroll_offset {
            self.scroll_offset = selected;
        } else if selected >= self.scroll_offset + viewport {
            self.scroll_offset = selected + 1 - viewport;
        }
    }

    fn render_help(&self, frame: &mut Frame, area: Rect) {
        let help = Line::from(vec![
            Span::styled(" ↑/↓ ", theme::key_hint_key()),
            Span::styled("navigate  ", theme::key_hint()),
            Span::styled("Enter ", theme::key_hint_key()),
            Span::styled("select  ", theme::key_hint()),
            Span::styled("Esc ", theme::key_hint_key()),
            Span::styled("quit", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(help), area);
    }

    fn render_modal(&self, frame: &mut Frame, area: Rect) {
        let Some(ref modal) = self.modal else {
            return;
        };

        let width = 70u16.min(area.width.saturating_sub(4));
        let line_count = u16::try_from(modal.lines.len()).unwrap_or(u16::MAX);
        let height = line_count
            .saturating_add(3)
            .min(area.height.saturating_sub(2));
        let x = area.x + (area.width.saturating_sub(width)) / 2;
        let y = area.y + (area.height.saturating_sub(height)) / 2;
        let modal_area = Rect::new(x, y, width, height);

        frame.render_widget(Clear, modal_area);

        let block = Block::default()
            .title(modal.title.clone())
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_modal());

        let inner = block.inner(modal_area);
        frame.render_widget(block, modal_area);

        let mut lines: Vec<Line<'_>> = modal
            .lines
            .iter()
            .map(|text| Line::from(Span::styled(text.clone(), Style::default().fg(theme::DIM_WHITE))))
            .collect();
        lines.push(Line::from(Span::styled(
            "[Esc] to go back",
            theme::key_hint(),
        )));

        frame.render_widget(Paragraph::new(lines), inner);
    }
}

/// Styled line for one tree row.
fn row_line(row: &Row, selected: bool) -> Line<'_> {
    let indent = "  ".repeat(row.depth);
    let marker = if row.has_children {
        if row.expanded { "▾ " } else { "▸ " }
    } else {
        "  "
    };

    let label_style = if selected {
        theme::selected_row()
    } else {
        match row.id.kind {
            NodeKind::Root => theme::title_style(),
            NodeKind::Vhost => Style::default().fg(theme::RABBIT_ORANGE),
            NodeKind::Exchange => Style::default().fg(theme::SKY_CYAN),
            NodeKind::Queue => Style::default().fg(theme::LEAF_GREEN),
        }
    };

    Line::from(vec![
        Span::raw(indent),
        Span::styled(marker, theme::key_hint()),
        Span::styled(row.label.clone(), label_style),
    ])
}

/// Flatten the tree into visible rows: a node's children appear only
/// when the node is in the expansion set.
fn flatten(tree: &TreeNode, expanded: &HashSet<NodeId>) -> Vec<Row> {
    let mut rows = Vec::new();
    push_rows(tree, expanded, 0, &mut rows);
    rows
}

fn push_rows(node: &TreeNode, expanded: &HashSet<NodeId>, depth: usize, rows: &mut Vec<Row>) {
    let is_expanded = expanded.contains(&node.id);
    rows.push(Row {
        id: node.id.clone(),
        label: node.label.clone(),
        depth,
        has_children: !node.children.is_empty(),
        expanded: is_expanded,
        payload: node.payload.clone(),
    });
    if is_expanded {
        for child in &node.children {
            push_rows(child, expanded, depth + 1, rows);
        }
    }
}

/// Collect every id in the tree (for dropping stale navigation state).
fn collect_ids(node: &TreeNode, ids: &mut HashSet<NodeId>) {
    ids.insert(node.id.clone());
    for child in &node.children {
        collect_ids(child, ids);
    }
}

// ── Detail views ─────────────────────────────────────────────────────

/// Exchange attributes plus every binding originating from it, found by
/// a linear equality scan over the snapshot.
fn exchange_detail(ex: &Exchange, topology: &Topology) -> DetailView {
    let mut lines = vec![
        format!("Type: {}", ex.exchange_type),
        format!("Durable: {}", ex.durable),
        format!("Auto-Delete: {}", ex.auto_delete),
        String::new(),
        "Bindings:".to_owned(),
    ];

    for binding in topology
        .bindings
        .iter()
        .filter(|b| b.source == ex.name && b.vhost == ex.vhost)
    {
        let dest_kind = match binding.destination_type {
            DestinationType::Queue => "queue",
            DestinationType::Exchange => "exchange",
        };
        lines.push(format!(
            "  ➤ {} → {} ({dest_kind}) [key: {}]",
            binding.source, binding.destination, binding.routing_key
        ));
    }

    DetailView {
        title: format!(" Exchange: {} ", ex.name),
        lines,
    }
}

/// Queue attributes, message counters, inbound bindings, and consumers.
fn queue_detail(queue: &Queue, topology: &Topology) -> DetailView {
    let mut lines = vec![
        format!("Durable: {}", queue.durable),
        format!("Auto-Delete: {}", queue.auto_delete),
    ];

    let stats = &queue.message_stats;
    if stats.messages_ready != 0 {
        lines.push(format!("Ready messages: {}", stats.messages_ready));
    }
    if stats.messages_unacked != 0 {
        lines.push(format!("Unacknowledged messages: {}", stats.messages_unacked));
    }

    lines.push(String::new());
    lines.push("Bindings:".to_owned());
    for binding in topology.bindings.iter().filter(|b| {
        b.destination == queue.name
            && b.vhost == queue.vhost
            && b.destination_type == DestinationType::Queue
    }) {
        lines.push(format!(
            "  ➤ {} → {} [key: {}]",
            binding.source, binding.destination, binding.routing_key
        ));
    }

    lines.push(String::new());
    lines.push("Consumers:".to_owned());
    for consumer in topology
        .consumers
        .iter()
        .filter(|c| c.queue == queue.name && c.vhost == queue.vhost)
    {
        lines.push(format!(
            "  ➤ {} (PID {})",
            consumer.consumer_tag, consumer.channel_details.pid
        ));
    }

    DetailView {
        title: format!(" Queue: {} ", queue.name),
        lines,
    }
}
