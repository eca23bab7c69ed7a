// Terminal UI: layout, input handling, and widget rendering.
//
// The TUI owns a `ViewState` that mirrors the application state. The app
// orchestrator pushes `UiUpdate` messages over an mpsc channel; the TUI
// applies them to `ViewState` and re-renders at ~30 fps.

pub mod input;
pub mod layout;
pub mod widgets;

use std::collections::BTreeSet;
use std::time::Duration;

use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::Frame;
use tokio::sync::mpsc;

use crate::draw::engine::DrawPhase;
use crate::protocol::{
    AppSnapshot, DrawSnapshot, GroupingSnapshot, TabId, UiUpdate, UserCommand,
};
use crate::roster::participant::Participant;

use input::InputMode;
use layout::build_layout;

/// Render ticks a celebration banner stays up (~2s at 33ms per tick).
pub const CELEBRATION_FRAMES: u16 = 60;

/// Winner banner shown after a draw settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CelebrationBanner {
    pub winner: String,
    pub frames_left: u16,
}

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// TUI-local state that mirrors the application state for rendering.
///
/// Updated incrementally via `UiUpdate` messages from the app orchestrator.
/// The `render_frame` function reads this struct to draw the screen.
pub struct ViewState {
    pub participants: Vec<Participant>,
    pub duplicate_names: BTreeSet<String>,
    pub draw: DrawSnapshot,
    pub grouping: GroupingSnapshot,
    /// Candidate currently shown by the spin animation.
    pub spin_display: Option<String>,
    pub celebration: Option<CelebrationBanner>,
    /// Share text overlay, open while `Some`.
    pub share_text: Option<String>,
    /// Last status message from the app. Cleared on the next key press.
    pub notice: Option<String>,
    pub active_tab: TabId,
    pub mode: InputMode,
    /// Text typed into the open prompt.
    pub input_buffer: String,
    /// Highlighted row on the roster tab.
    pub selected: usize,
    /// First visible row of group cards.
    pub groups_scroll: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            participants: Vec::new(),
            duplicate_names: BTreeSet::new(),
            draw: DrawSnapshot {
                phase: DrawPhase::Idle,
                pool_size: 0,
                displayed: None,
                last_winner: None,
                history: Vec::new(),
                allow_repeat: false,
            },
            grouping: GroupingSnapshot {
                group_size: 4,
                generating: false,
                result: None,
            },
            spin_display: None,
            celebration: None,
            share_text: None,
            notice: None,
            active_tab: TabId::Roster,
            mode: InputMode::Normal,
            input_buffer: String::new(),
            selected: 0,
            groups_scroll: 0,
        }
    }
}

impl ViewState {
    /// Apply a full state snapshot from the app orchestrator.
    ///
    /// Local UI state (tab, mode, prompt text, overlays) is left unchanged.
    /// The roster selection is clamped to the new length.
    pub fn apply_snapshot(&mut self, snapshot: AppSnapshot) {
        self.participants = snapshot.participants;
        self.duplicate_names = snapshot.duplicate_names.into_iter().collect();
        self.spin_display = snapshot.draw.displayed.clone();
        self.draw = snapshot.draw;
        self.grouping = snapshot.grouping;
        self.selected = self.selected.min(self.participants.len().saturating_sub(1));
    }

    /// Advance time-based effects by one render tick.
    pub fn tick_animation(&mut self) {
        if let Some(banner) = &mut self.celebration {
            banner.frames_left = banner.frames_left.saturating_sub(1);
            if banner.frames_left == 0 {
                self.celebration = None;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply a single UiUpdate to the ViewState.
fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::StateSnapshot(snapshot) => {
            state.apply_snapshot(*snapshot);
        }
        UiUpdate::SpinTick { displayed } => {
            state.celebration = None;
            state.spin_display = Some(displayed);
        }
        UiUpdate::Celebrate { winner } => {
            state.celebration = Some(CelebrationBanner {
                winner,
                frames_left: CELEBRATION_FRAMES,
            });
        }
        UiUpdate::ShareText(text) => {
            state.share_text = Some(text);
        }
        UiUpdate::Notice(message) => {
            state.notice = Some(message);
        }
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

/// Render the complete frame: tabs, active screen, status, help, overlays.
fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area());

    widgets::status_bar::render_tabs(frame, layout.tab_bar, state.active_tab);

    match state.active_tab {
        TabId::Roster => widgets::roster_list::render(frame, layout.main_panel, state),
        TabId::Draw => widgets::draw_stage::render(frame, layout.main_panel, state),
        TabId::Groups => widgets::group_cards::render(frame, layout.main_panel, state),
    }

    widgets::status_bar::render_status(frame, layout.status_bar, state);
    widgets::status_bar::render_help(frame, layout.help_bar, state);

    if let Some(text) = &state.share_text {
        widgets::modal::render_share(frame, frame.area(), text);
    }
    match state.mode {
        InputMode::Confirm(action) => widgets::modal::render_confirm(frame, frame.area(), action),
        InputMode::Editing(field) => {
            widgets::modal::render_prompt(frame, frame.area(), field, &state.input_buffer)
        }
        InputMode::Normal => {}
    }
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// 1. Initializes the terminal (raw mode, alternate screen).
/// 2. Installs a panic hook to restore the terminal on crash.
/// 3. Runs an async select loop: UI updates, keyboard input, render ticks.
/// 4. Restores the terminal on exit.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
) -> anyhow::Result<()> {
    // 1. Initialize terminal
    let mut terminal = ratatui::init();

    // 2. Set panic hook to restore terminal on crash.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = ratatui::restore();
        original_hook(panic_info);
    }));

    // 3. Create ViewState
    let mut view_state = ViewState::default();

    // 4. Create crossterm EventStream for async keyboard input
    let mut event_stream = EventStream::new();

    // 5. Create render interval (~30fps)
    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    // 6. Main loop
    let result = loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    // Channel closed: app is shutting down
                    None => break Ok(()),
                }
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(cmd) = input::handle_key(key_event, &mut view_state) {
                            let quit = cmd == UserCommand::Quit;
                            let _ = cmd_tx.send(cmd).await;
                            if quit {
                                break Ok(());
                            }
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => break Err(anyhow::Error::from(e).context("terminal input error")),
                    None => break Ok(()),
                }
            }

            _ = render_tick.tick() => {
                view_state.tick_animation();
                if let Err(e) = terminal.draw(|frame| render_frame(frame, &view_state)) {
                    break Err(anyhow::Error::from(e).context("failed to draw frame"));
                }
            }
        }
    };

    // 7. Restore terminal
    ratatui::restore();

    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
