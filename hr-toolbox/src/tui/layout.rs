// Screen layout: panel arrangement and sizing.
//
// +--------------------------------------------------+
// | Tab Bar (1 row)                                   |
// +--------------------------------------------------+
// | Main Panel (fill)                                 |
// |   Draw tab: Stage (60%) | History (40%)           |
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Resolved screen areas for each zone.
#[derive(Debug, Clone)]
pub struct AppLayout {
    pub tab_bar: Rect,
    /// Content of the active tab.
    pub main_panel: Rect,
    /// Latest notice, or a roster/pool summary.
    pub status_bar: Rect,
    /// Keyboard shortcut hints for the active tab.
    pub help_bar: Rect,
}

/// Build the screen layout from the available terminal area.
pub fn build_layout(area: Rect) -> AppLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // tab bar
            Constraint::Min(5),    // main panel
            Constraint::Length(1), // status bar
            Constraint::Length(1), // help bar
        ])
        .split(area);

    AppLayout {
        tab_bar: vertical[0],
        main_panel: vertical[1],
        status_bar: vertical[2],
        help_bar: vertical[3],
    }
}

/// Split the draw tab into the spin stage (left) and winner history (right).
pub fn split_draw_panel(area: Rect) -> (Rect, Rect) {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);
    (horizontal[0], horizontal[1])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
