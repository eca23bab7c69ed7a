// Lucky draw screen: spin stage on the left, winner history on the right.

use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};
use ratatui::Frame;

use crate::draw::engine::{DrawPhase, WinnerRecord};
use crate::tui::layout::split_draw_panel;
use crate::tui::{CelebrationBanner, ViewState};

/// Banner colours, cycled per render tick while a celebration is up.
const CELEBRATION_COLORS: [Color; 4] = [Color::Yellow, Color::Magenta, Color::Cyan, Color::Green];

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let (stage, history) = split_draw_panel(area);
    render_stage(frame, stage, state);
    render_history(frame, history, &state.draw.history);
}

fn render_stage(frame: &mut Frame, area: Rect, state: &ViewState) {
    let block = Block::default().borders(Borders::ALL).title("Lucky Draw");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .split(inner);

    let info = format!(
        " Pool: {} | Repeat winners: {}",
        state.draw.pool_size,
        if state.draw.allow_repeat { "on" } else { "off" }
    );
    frame.render_widget(
        Paragraph::new(info).style(Style::default().fg(Color::Gray)),
        rows[0],
    );

    let (headline, style) = stage_headline(state);
    let mut lines = vec![Line::raw(""), Line::from(Span::styled(headline, style))];
    if let Some(banner) = &state.celebration {
        lines.push(Line::raw(""));
        lines.push(celebration_line(banner));
    }
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        rows[1],
    );

    let hint = match state.draw.phase {
        DrawPhase::Spinning => "Drawing...",
        _ if state.draw.pool_size == 0 => "Pool is empty. Add people or press R to reset.",
        _ => "Press Space to draw",
    };
    frame.render_widget(
        Paragraph::new(hint)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray)),
        rows[2],
    );
}

/// Big text in the middle of the stage and its style.
pub fn stage_headline(state: &ViewState) -> (String, Style) {
    match state.draw.phase {
        DrawPhase::Spinning => (
            state.spin_display.clone().unwrap_or_else(|| "...".into()),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        DrawPhase::Settled => match &state.draw.last_winner {
            Some(winner) => (
                format!("Winner: {}", winner.name),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            None => ("?".into(), Style::default()),
        },
        DrawPhase::Idle => ("?".into(), Style::default().fg(Color::DarkGray)),
    }
}

fn celebration_line(banner: &CelebrationBanner) -> Line<'static> {
    let color = CELEBRATION_COLORS[usize::from(banner.frames_left / 4) % CELEBRATION_COLORS.len()];
    Line::from(Span::styled(
        format!("*** Congratulations, {}! ***", banner.winner),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
}

fn render_history(frame: &mut Frame, area: Rect, history: &[WinnerRecord]) {
    let title = format!("History ({})", history.len());
    if history.is_empty() {
        let paragraph = Paragraph::new("  No winners yet.")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(paragraph, area);
        return;
    }

    let visible_rows = (area.height as usize).saturating_sub(2).max(1);
    let total = history.len();
    let items: Vec<ListItem> = history
        .iter()
        .enumerate()
        .take(visible_rows)
        .map(|(i, record)| {
            // History is newest first; number draws oldest first.
            let text = format_record(total - i, record);
            let style = if i == 0 {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(Line::from(Span::styled(text, style)))
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(list, area);
}

/// E.g. " #3 14:02:11  Alice" (UTC time of the draw)
pub fn format_record(number: usize, record: &WinnerRecord) -> String {
    format!(
        " #{} {}  {}",
        number,
        record.drawn_at.format("%H:%M:%S"),
        record.participant.name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::participant::Participant;
    use chrono::{TimeZone, Utc};

    #[test]
    fn headline_follows_phase() {
        let mut state = ViewState::default();
        assert_eq!(stage_headline(&state).0, "?");

        state.draw.phase = DrawPhase::Spinning;
        state.spin_display = Some("Bo".into());
        assert_eq!(stage_headline(&state).0, "Bo");

        state.draw.phase = DrawPhase::Settled;
        state.draw.last_winner = Some(Participant::new("Ann"));
        assert_eq!(stage_headline(&state).0, "Winner: Ann");
    }

    #[test]
    fn record_format() {
        let record = WinnerRecord {
            participant: Participant::new("Ann"),
            drawn_at: Utc.with_ymd_and_hms(2026, 10, 14, 9, 5, 0).unwrap(),
        };
        assert_eq!(format_record(2, &record), " #2 09:05:00  Ann");
    }

    #[test]
    fn render_with_celebration_does_not_panic() {
        let backend = ratatui::backend::TestBackend::new(80, 12);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = ViewState::default();
        state.draw.phase = DrawPhase::Settled;
        state.draw.last_winner = Some(Participant::new("Ann"));
        state.celebration = Some(CelebrationBanner {
            winner: "Ann".into(),
            frames_left: 7,
        });
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }
}
