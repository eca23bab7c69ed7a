// Roster widget: participant list with selection and duplicate markers.
//
// " 3. Alice"          plain
// " 4. Bob  [dup]"     name occurs more than once (yellow)
// Selected row is reversed. Scrolls to keep the selection visible.

use std::collections::BTreeSet;

use ratatui::layout::{Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, List, ListItem, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
};
use ratatui::Frame;

use crate::roster::participant::Participant;
use crate::tui::ViewState;

/// Render the roster list into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let title = roster_title(state.participants.len(), &state.duplicate_names);

    if state.participants.is_empty() {
        let paragraph = Paragraph::new("  No participants. Press a to add names or s for a sample list.")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(paragraph, area);
        return;
    }

    let visible_rows = (area.height as usize).saturating_sub(2).max(1);
    let total = state.participants.len();
    let offset = scroll_offset(state.selected, visible_rows, total);

    let items: Vec<ListItem> = state
        .participants
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible_rows)
        .map(|(i, p)| {
            let duplicate = state.duplicate_names.contains(&p.name);
            format_row(i, p, duplicate, i == state.selected)
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(list, area);

    if total > visible_rows {
        let mut scrollbar_state =
            ScrollbarState::new(total.saturating_sub(visible_rows)).position(offset);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            area.inner(Margin { vertical: 1, horizontal: 0 }),
            &mut scrollbar_state,
        );
    }
}

/// First visible row so that `selected` stays on screen.
pub fn scroll_offset(selected: usize, visible_rows: usize, total: usize) -> usize {
    let max_offset = total.saturating_sub(visible_rows);
    selected
        .saturating_sub(visible_rows.saturating_sub(1))
        .min(max_offset)
}

pub fn roster_title(count: usize, duplicates: &BTreeSet<String>) -> String {
    if duplicates.is_empty() {
        format!("Roster ({count})")
    } else {
        format!("Roster ({count}, {} duplicate names)", duplicates.len())
    }
}

fn format_row<'a>(index: usize, p: &Participant, duplicate: bool, selected: bool) -> ListItem<'a> {
    let mut style = if duplicate {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    };
    if selected {
        style = style.add_modifier(Modifier::REVERSED);
    }
    ListItem::new(Line::from(Span::styled(format_row_text(index, p, duplicate), style)))
}

/// Plain text of a row (for testing).
pub fn format_row_text(index: usize, p: &Participant, duplicate: bool) -> String {
    if duplicate {
        format!(" {:>3}. {}  [dup]", index + 1, p.name)
    } else {
        format!(" {:>3}. {}", index + 1, p.name)
    }
}
