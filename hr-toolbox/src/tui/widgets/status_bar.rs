// Tab bar, status line and help bar.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::draw::engine::DrawPhase;
use crate::protocol::TabId;
use crate::tui::ViewState;

/// Render the tab indicator row.
pub fn render_tabs(frame: &mut Frame, area: Rect, active: TabId) {
    let paragraph = Paragraph::new(Line::from(tab_spans(active)))
        .style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// Build tab indicator spans with the active tab highlighted.
/// E.g. " [1:Roster] [2:Lucky Draw] [3:Groups]"
pub fn tab_spans(active: TabId) -> Vec<Span<'static>> {
    let mut spans = vec![Span::raw(" ")];
    for (i, tab) in TabId::ALL.into_iter().enumerate() {
        let style = if tab == active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!("[{}:{}]", i + 1, tab.title()), style));
        spans.push(Span::raw(" "));
    }
    spans
}

/// Render the notice if one is pending, otherwise a summary line.
pub fn render_status(frame: &mut Frame, area: Rect, state: &ViewState) {
    let line = match &state.notice {
        Some(notice) => Line::from(Span::styled(
            format!(" {notice}"),
            Style::default().fg(Color::Yellow),
        )),
        None => Line::from(Span::styled(
            summary_text(state),
            Style::default().fg(Color::Gray),
        )),
    };
    let paragraph = Paragraph::new(line).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// E.g. " 12 participants | pool 10 | drawn 2 | spinning"
pub fn summary_text(state: &ViewState) -> String {
    let mut text = format!(
        " {} participants | pool {} | drawn {}",
        state.participants.len(),
        state.draw.pool_size,
        state.draw.history.len()
    );
    if state.draw.phase == DrawPhase::Spinning {
        text.push_str(" | spinning");
    }
    if state.grouping.generating {
        text.push_str(" | grouping");
    }
    text
}

/// Render shortcut hints for the active tab.
pub fn render_help(frame: &mut Frame, area: Rect, state: &ViewState) {
    let paragraph = Paragraph::new(Line::from(Span::styled(
        help_text(state.active_tab),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::DIM),
    )))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

pub fn help_text(tab: TabId) -> &'static str {
    match tab {
        TabId::Roster => {
            " a:Add | i:Import | d:Remove | u:Dedupe | s:Sample | C:Clear | 1-3:Tabs | q:Quit"
        }
        TabId::Draw => " Space:Draw | r:Repeat on/off | R:Reset | 1-3:Tabs | q:Quit",
        TabId::Groups => {
            " +/-:Size | e:Type size | g:Generate | v:Share | x:Export CSV | 1-3:Tabs | q:Quit"
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
