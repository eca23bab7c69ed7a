// Groups screen: a grid of bordered cards, one per group, tinted by theme.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::grouping::engine::{Group, Theme};
use crate::tui::ViewState;

/// Minimum card width including borders.
const CARD_WIDTH: u16 = 24;

pub fn theme_color(theme: Theme) -> Color {
    match theme {
        Theme::Blue => Color::Blue,
        Theme::Emerald => Color::Green,
        Theme::Violet => Color::Magenta,
        Theme::Amber => Color::Yellow,
        Theme::Rose => Color::LightRed,
        Theme::Cyan => Color::Cyan,
        Theme::Fuchsia => Color::LightMagenta,
        Theme::Orange => Color::Rgb(255, 165, 0),
    }
}

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let title = format!(" Groups (size {}) ", state.grouping.group_size);
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let placeholder = if state.grouping.generating {
        Some("Shuffling...")
    } else {
        match &state.grouping.result {
            None => Some("Press g to generate groups."),
            Some(result) if result.is_empty() => Some("No participants to group."),
            Some(_) => None,
        }
    };
    if let Some(text) = placeholder {
        frame.render_widget(
            Paragraph::new(format!("  {text}")).style(Style::default().fg(Color::DarkGray)),
            inner,
        );
        return;
    }

    let Some(result) = &state.grouping.result else {
        return;
    };

    let cols = columns_for(inner.width);
    let card_width = inner.width / cols as u16;
    let mut y = inner.y;

    for row in result.groups.chunks(cols).skip(state.groups_scroll) {
        let row_height = card_height(row);
        if y >= inner.bottom() {
            break;
        }
        let height = row_height.min(inner.bottom() - y);
        for (i, group) in row.iter().enumerate() {
            let card = Rect::new(inner.x + card_width * i as u16, y, card_width, height);
            render_card(frame, card, group);
        }
        y += height;
    }
}

/// How many cards fit side by side.
pub fn columns_for(width: u16) -> usize {
    usize::from((width / CARD_WIDTH).max(1))
}

/// Tallest card in a row: members plus borders.
fn card_height(row: &[Group]) -> u16 {
    let members = row.iter().map(|g| g.members.len()).max().unwrap_or(0);
    u16::try_from(members + 2).unwrap_or(u16::MAX)
}

fn render_card(frame: &mut Frame, area: Rect, group: &Group) {
    let color = theme_color(group.theme);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(Span::styled(
            format!(" {} ({}) ", group.name, group.members.len()),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
    let lines: Vec<Line> = group
        .members
        .iter()
        .map(|m| Line::raw(format!(" {}", m.name)))
        .collect();
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::engine::GroupingResult;
    use crate::roster::participant::Participant;
    use chrono::Utc;

    fn group(i: usize, members: usize) -> Group {
        Group {
            id: format!("group-{i}"),
            name: format!("Group {}", i + 1),
            members: (0..members).map(|m| Participant::new(format!("M{m}"))).collect(),
            theme: Theme::Amber,
        }
    }

    #[test]
    fn columns_scale_with_width() {
        assert_eq!(columns_for(10), 1);
        assert_eq!(columns_for(48), 2);
        assert_eq!(columns_for(100), 4);
    }

    #[test]
    fn card_height_uses_largest_group() {
        assert_eq!(card_height(&[group(0, 3), group(1, 1)]), 5);
        assert_eq!(card_height(&[]), 2);
    }

    #[test]
    fn every_theme_has_a_colour() {
        for theme in crate::grouping::engine::THEME_PALETTE {
            let _ = theme_color(theme);
        }
        assert_eq!(theme_color(Theme::Cyan), Color::Cyan);
    }

    #[test]
    fn render_many_groups_does_not_panic() {
        let backend = ratatui::backend::TestBackend::new(70, 10);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = ViewState::default();
        state.grouping.result = Some(GroupingResult {
            groups: (0..12).map(|i| group(i, 4)).collect(),
            group_size: 4,
            generated_at: Utc::now(),
        });
        state.groups_scroll = 1;
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }
}
