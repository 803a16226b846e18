//! Warren palette and semantic styling for the explorer.

use ratatui::style::{Color, Modifier, Style};

// ── Core Palette ──────────────────────────────────────────────────────

pub const RABBIT_ORANGE: Color = Color::Rgb(255, 140, 66); // #ff8c42
pub const SKY_CYAN: Color = Color::Rgb(102, 217, 239); // #66d9ef
pub const LEAF_GREEN: Color = Color::Rgb(130, 200, 120); // #82c878
pub const SOFT_VIOLET: Color = Color::Rgb(189, 147, 249); // #bd93f9
pub const DIM_WHITE: Color = Color::Rgb(200, 202, 212); // #c8cad4
pub const BORDER_GRAY: Color = Color::Rgb(96, 106, 140); // #606a8c
pub const BG_HIGHLIGHT: Color = Color::Rgb(44, 46, 60); // #2c2e3c

// ── Semantic Styles ───────────────────────────────────────────────────

/// Title text for blocks/panels.
pub fn title_style() -> Style {
    Style::default()
        .fg(RABBIT_ORANGE)
        .add_modifier(Modifier::BOLD)
}

/// Border for the focused panel.
pub fn border_focused() -> Style {
    Style::default().fg(RABBIT_ORANGE)
}

/// Border for a modal overlay.
pub fn border_modal() -> Style {
    Style::default().fg(SOFT_VIOLET)
}

/// The currently selected tree row.
pub fn selected_row() -> Style {
    Style::default()
        .fg(SKY_CYAN)
        .bg(BG_HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

/// Keyboard hint text.
pub fn key_hint() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Highlighted key inside a hint line.
pub fn key_hint_key() -> Style {
    Style::default().fg(SKY_CYAN)
}
