// Overlay widgets: yes/no confirmation, text prompt, share text.
//
// Each renders a centered dialog on top of the main layout.

use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::tui::input::{ConfirmAction, EditField};

const CONFIRM_HEIGHT: u16 = 3;
const PROMPT_WIDTH: u16 = 60;
const PROMPT_HEIGHT: u16 = 3;

/// Render a yes/no confirmation for `action`.
pub fn render_confirm(frame: &mut Frame, area: Rect, action: ConfirmAction) {
    let text = Line::from(vec![
        Span::raw(format!("  {}? (", action.question())),
        Span::styled("y", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
        Span::raw("/"),
        Span::styled("n", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        Span::raw(")  "),
    ]);
    let width = u16::try_from(text.width() + 2).unwrap_or(u16::MAX);
    let dialog_area = centered_rect(width, CONFIRM_HEIGHT, area);

    frame.render_widget(Clear, dialog_area);
    let block = dialog_block(action.title(), Color::Yellow);
    frame.render_widget(
        Paragraph::new(text)
            .block(block)
            .style(Style::default().bg(Color::Black)),
        dialog_area,
    );
}

/// Render a single-line text prompt with a trailing cursor.
pub fn render_prompt(frame: &mut Frame, area: Rect, field: EditField, buffer: &str) {
    let dialog_area = centered_rect(PROMPT_WIDTH, PROMPT_HEIGHT, area);
    frame.render_widget(Clear, dialog_area);

    // Keep the tail visible when the text is wider than the box.
    let room = usize::from(dialog_area.width.saturating_sub(4));
    let shown: String = {
        let chars: Vec<char> = buffer.chars().collect();
        let start = chars.len().saturating_sub(room);
        chars[start..].iter().collect()
    };

    let line = Line::from(vec![
        Span::raw(format!(" {shown}")),
        Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
    ]);
    frame.render_widget(
        Paragraph::new(line)
            .block(dialog_block(field.title(), Color::Cyan))
            .style(Style::default().bg(Color::Black)),
        dialog_area,
    );
}

/// Render the share text overlay.
pub fn render_share(frame: &mut Frame, area: Rect, text: &str) {
    let longest = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
    let width = u16::try_from(longest + 6).unwrap_or(u16::MAX).max(30);
    let height = u16::try_from(text.lines().count() + 3).unwrap_or(u16::MAX);
    let dialog_area = centered_rect(width, height, area);

    frame.render_widget(Clear, dialog_area);
    let mut lines: Vec<Line> = text.lines().map(|l| Line::raw(format!(" {l}"))).collect();
    lines.push(Line::from(Span::styled(
        " Esc to close",
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(dialog_block(" Share ", Color::Green))
            .style(Style::default().bg(Color::Black)),
        dialog_area,
    );
}

fn dialog_block(title: &str, color: Color) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(Span::styled(
            title,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
}

/// Compute a centered rectangle of the given size within `area`.
///
/// If the area is too small, the dialog is clamped to the available space.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let clamped_width = width.min(area.width);
    let clamped_height = height.min(area.height);

    let vertical = Layout::vertical([Constraint::Length(clamped_height)])
        .flex(Flex::Center)
        .split(area);

    let horizontal = Layout::horizontal([Constraint::Length(clamped_width)])
        .flex(Flex::Center)
        .split(vertical[0]);

    horizontal[0]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
