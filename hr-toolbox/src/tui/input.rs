// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into UserCommand messages sent to the
// app orchestrator, or into local ViewState mutations (tab switching,
// selection, text entry). Destructive commands go through a confirmation
// mode first.

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::ViewState;
use crate::grouping::engine::parse_group_size;
use crate::protocol::{TabId, UserCommand};

/// The `-` key never takes the group size below this.
pub const MIN_DECREMENT_GROUP_SIZE: usize = 2;

/// What the keyboard is currently driving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing(EditField),
    Confirm(ConfirmAction),
}

/// Text prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    BulkAdd,
    ImportPath,
    GroupSize,
}

impl EditField {
    pub fn title(self) -> &'static str {
        match self {
            EditField::BulkAdd => " Add names (comma separated) ",
            EditField::ImportPath => " Import file path ",
            EditField::GroupSize => " Group size ",
        }
    }
}

/// Operations that need a yes/no before they are sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    ClearRoster,
    ResetPool,
    Quit,
}

impl ConfirmAction {
    pub fn title(self) -> &'static str {
        match self {
            ConfirmAction::ClearRoster => " Clear roster? ",
            ConfirmAction::ResetPool => " Reset draw? ",
            ConfirmAction::Quit => " Quit? ",
        }
    }

    pub fn question(self) -> &'static str {
        match self {
            ConfirmAction::ClearRoster => "Remove everyone",
            ConfirmAction::ResetPool => "Restore pool, clear winners",
            ConfirmAction::Quit => "Really quit",
        }
    }

    fn command(self) -> UserCommand {
        match self {
            ConfirmAction::ClearRoster => UserCommand::ClearRoster,
            ConfirmAction::ResetPool => UserCommand::ResetDrawPool,
            ConfirmAction::Quit => UserCommand::Quit,
        }
    }
}

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should be forwarded to the
/// app orchestrator. Returns `None` when it was handled locally by mutating
/// `ViewState`.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // Only process key press events. On Windows, crossterm emits both
    // Press and Release events for each physical keypress.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    // Ctrl+C always quits immediately regardless of mode (escape hatch)
    if key_event.modifiers.contains(KeyModifiers::CONTROL)
        && key_event.code == KeyCode::Char('c')
    {
        return Some(UserCommand::Quit);
    }

    match view_state.mode {
        InputMode::Confirm(action) => return handle_confirm(key_event, view_state, action),
        InputMode::Editing(field) => return handle_editing(key_event, view_state, field),
        InputMode::Normal => {}
    }

    // Share overlay swallows everything until closed
    if view_state.share_text.is_some() {
        if matches!(
            key_event.code,
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('v') | KeyCode::Char('q')
        ) {
            view_state.share_text = None;
        }
        return None;
    }

    view_state.notice = None;

    match key_event.code {
        KeyCode::Char('1') => return switch_tab(view_state, TabId::Roster),
        KeyCode::Char('2') => return switch_tab(view_state, TabId::Draw),
        KeyCode::Char('3') => return switch_tab(view_state, TabId::Groups),
        KeyCode::Tab => {
            let next = view_state.active_tab.next();
            return switch_tab(view_state, next);
        }
        KeyCode::Char('q') => {
            view_state.mode = InputMode::Confirm(ConfirmAction::Quit);
            return None;
        }
        _ => {}
    }

    match view_state.active_tab {
        TabId::Roster => handle_roster_key(key_event, view_state),
        TabId::Draw => handle_draw_key(key_event, view_state),
        TabId::Groups => handle_groups_key(key_event, view_state),
    }
}

fn switch_tab(view_state: &mut ViewState, tab: TabId) -> Option<UserCommand> {
    view_state.active_tab = tab;
    Some(UserCommand::SwitchTab(tab))
}

fn start_editing(view_state: &mut ViewState, field: EditField, initial: String) {
    view_state.input_buffer = initial;
    view_state.mode = InputMode::Editing(field);
}

fn handle_roster_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('a') => {
            start_editing(view_state, EditField::BulkAdd, String::new());
            None
        }
        KeyCode::Char('i') => {
            start_editing(view_state, EditField::ImportPath, String::new());
            None
        }
        KeyCode::Char('d') | KeyCode::Delete => view_state
            .participants
            .get(view_state.selected)
            .map(|p| UserCommand::RemoveParticipant(p.id.clone())),
        KeyCode::Char('u') => Some(UserCommand::DedupeByName),
        KeyCode::Char('s') => Some(UserCommand::LoadSample),
        KeyCode::Char('C') => {
            if !view_state.participants.is_empty() {
                view_state.mode = InputMode::Confirm(ConfirmAction::ClearRoster);
            }
            None
        }
        KeyCode::Up | KeyCode::Char('k') => {
            view_state.selected = view_state.selected.saturating_sub(1);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if view_state.selected + 1 < view_state.participants.len() {
                view_state.selected += 1;
            }
            None
        }
        _ => None,
    }
}

fn handle_draw_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char(' ') | KeyCode::Enter => Some(UserCommand::StartDraw),
        KeyCode::Char('r') => Some(UserCommand::SetAllowRepeat(!view_state.draw.allow_repeat)),
        KeyCode::Char('R') => {
            view_state.mode = InputMode::Confirm(ConfirmAction::ResetPool);
            None
        }
        _ => None,
    }
}

fn handle_groups_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    let size = view_state.grouping.group_size;
    match key_event.code {
        KeyCode::Char('+') | KeyCode::Char('=') => Some(set_size(size.saturating_add(1))),
        KeyCode::Char('-') => {
            (size > MIN_DECREMENT_GROUP_SIZE).then(|| set_size(size - 1))
        }
        KeyCode::Char('e') => {
            start_editing(view_state, EditField::GroupSize, size.to_string());
            None
        }
        KeyCode::Char('g') | KeyCode::Enter => Some(UserCommand::GenerateGroups),
        KeyCode::Char('x') => Some(UserCommand::ExportCsv),
        KeyCode::Char('v') => Some(UserCommand::ShareGroups),
        KeyCode::Up | KeyCode::Char('k') => {
            view_state.groups_scroll = view_state.groups_scroll.saturating_sub(1);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            view_state.groups_scroll = view_state.groups_scroll.saturating_add(1);
            None
        }
        _ => None,
    }
}

fn set_size(size: usize) -> UserCommand {
    UserCommand::SetGroupSize(i64::try_from(size).unwrap_or(i64::MAX))
}

/// Handle key events while a confirmation modal is open.
///
/// - `y` confirms (sends the pending command)
/// - `n` or `Esc` cancels
/// - `q` additionally confirms a pending quit
/// - All other keys are blocked
fn handle_confirm(
    key_event: KeyEvent,
    view_state: &mut ViewState,
    action: ConfirmAction,
) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            view_state.mode = InputMode::Normal;
            Some(action.command())
        }
        KeyCode::Char('q') | KeyCode::Char('Q') if action == ConfirmAction::Quit => {
            Some(UserCommand::Quit)
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            view_state.mode = InputMode::Normal;
            None
        }
        _ => None,
    }
}

/// Handle key events while a text prompt is open.
///
/// Printable characters are appended, Backspace removes the last one,
/// Enter submits and Esc discards.
fn handle_editing(
    key_event: KeyEvent,
    view_state: &mut ViewState,
    field: EditField,
) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Esc => {
            view_state.mode = InputMode::Normal;
            view_state.input_buffer.clear();
            None
        }
        KeyCode::Enter => {
            view_state.mode = InputMode::Normal;
            let text = std::mem::take(&mut view_state.input_buffer);
            submit(field, text)
        }
        KeyCode::Backspace => {
            view_state.input_buffer.pop();
            None
        }
        KeyCode::Char(c) => {
            view_state.input_buffer.push(c);
            None
        }
        _ => None,
    }
}

fn submit(field: EditField, text: String) -> Option<UserCommand> {
    match field {
        EditField::BulkAdd => (!text.trim().is_empty()).then_some(UserCommand::AddBulk(text)),
        EditField::ImportPath => {
            let path = text.trim();
            (!path.is_empty()).then(|| UserCommand::ImportFile(PathBuf::from(path)))
        }
        EditField::GroupSize => Some(set_size(parse_group_size(&text))),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::participant::Participant;
    use crossterm::event::{KeyEventState, KeyModifiers};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn type_text(state: &mut ViewState, text: &str) {
        for c in text.chars() {
            assert_eq!(handle_key(key(KeyCode::Char(c)), state), None);
        }
    }

    fn roster_state(names: &[&str]) -> ViewState {
        let mut state = ViewState::default();
        state.participants = names.iter().map(|&n| Participant::new(n)).collect();
        state
    }

    // -- Global keys --

    #[test]
    fn ctrl_c_quits_from_any_mode() {
        let mut state = ViewState::default();
        state.mode = InputMode::Editing(EditField::BulkAdd);
        assert_eq!(handle_key(ctrl('c'), &mut state), Some(UserCommand::Quit));
    }

    #[test]
    fn release_events_are_ignored() {
        let mut state = ViewState::default();
        let mut event = key(KeyCode::Char('2'));
        event.kind = KeyEventKind::Release;
        assert_eq!(handle_key(event, &mut state), None);
        assert_eq!(state.active_tab, TabId::Roster);
    }

    #[test]
    fn number_keys_switch_tabs() {
        let mut state = ViewState::default();
        assert_eq!(
            handle_key(key(KeyCode::Char('3')), &mut state),
            Some(UserCommand::SwitchTab(TabId::Groups))
        );
        assert_eq!(state.active_tab, TabId::Groups);
        handle_key(key(KeyCode::Tab), &mut state);
        assert_eq!(state.active_tab, TabId::Roster);
    }

    #[test]
    fn q_asks_before_quitting() {
        let mut state = ViewState::default();
        assert_eq!(handle_key(key(KeyCode::Char('q')), &mut state), None);
        assert_eq!(state.mode, InputMode::Confirm(ConfirmAction::Quit));
        assert_eq!(
            handle_key(key(KeyCode::Char('q')), &mut state),
            Some(UserCommand::Quit)
        );
    }

    #[test]
    fn confirm_blocks_other_keys_and_cancels() {
        let mut state = ViewState::default();
        state.mode = InputMode::Confirm(ConfirmAction::Quit);
        assert_eq!(handle_key(key(KeyCode::Char('2')), &mut state), None);
        assert_eq!(state.active_tab, TabId::Roster);
        assert_eq!(handle_key(key(KeyCode::Esc), &mut state), None);
        assert_eq!(state.mode, InputMode::Normal);
    }

    // -- Roster tab --

    #[test]
    fn bulk_add_prompt_submits_text() {
        let mut state = ViewState::default();
        handle_key(key(KeyCode::Char('a')), &mut state);
        assert_eq!(state.mode, InputMode::Editing(EditField::BulkAdd));
        type_text(&mut state, "Ann, Bo");
        handle_key(key(KeyCode::Backspace), &mut state);
        assert_eq!(
            handle_key(key(KeyCode::Enter), &mut state),
            Some(UserCommand::AddBulk("Ann, B".into()))
        );
        assert_eq!(state.mode, InputMode::Normal);
        assert!(state.input_buffer.is_empty());
    }

    #[test]
    fn blank_bulk_add_sends_nothing() {
        let mut state = ViewState::default();
        handle_key(key(KeyCode::Char('a')), &mut state);
        type_text(&mut state, "  ");
        assert_eq!(handle_key(key(KeyCode::Enter), &mut state), None);
    }

    #[test]
    fn import_prompt_sends_trimmed_path() {
        let mut state = ViewState::default();
        handle_key(key(KeyCode::Char('i')), &mut state);
        type_text(&mut state, " staff.csv ");
        assert_eq!(
            handle_key(key(KeyCode::Enter), &mut state),
            Some(UserCommand::ImportFile(PathBuf::from("staff.csv")))
        );
    }

    #[test]
    fn escape_discards_prompt() {
        let mut state = ViewState::default();
        handle_key(key(KeyCode::Char('a')), &mut state);
        type_text(&mut state, "Zed");
        assert_eq!(handle_key(key(KeyCode::Esc), &mut state), None);
        assert_eq!(state.mode, InputMode::Normal);
        assert!(state.input_buffer.is_empty());
    }

    #[test]
    fn delete_removes_selected_participant() {
        let mut state = roster_state(&["Ann", "Bo", "Cy"]);
        handle_key(key(KeyCode::Down), &mut state);
        handle_key(key(KeyCode::Down), &mut state);
        handle_key(key(KeyCode::Down), &mut state);
        assert_eq!(state.selected, 2);
        let id = state.participants[2].id.clone();
        assert_eq!(
            handle_key(key(KeyCode::Char('d')), &mut state),
            Some(UserCommand::RemoveParticipant(id))
        );
    }

    #[test]
    fn delete_on_empty_roster_is_noop() {
        let mut state = ViewState::default();
        assert_eq!(handle_key(key(KeyCode::Char('d')), &mut state), None);
    }

    #[test]
    fn clear_roster_requires_confirmation() {
        let mut state = roster_state(&["Ann"]);
        assert_eq!(handle_key(key(KeyCode::Char('C')), &mut state), None);
        assert_eq!(state.mode, InputMode::Confirm(ConfirmAction::ClearRoster));
        assert_eq!(
            handle_key(key(KeyCode::Char('y')), &mut state),
            Some(UserCommand::ClearRoster)
        );
        assert_eq!(state.mode, InputMode::Normal);
    }

    #[test]
    fn clear_empty_roster_does_not_prompt() {
        let mut state = ViewState::default();
        handle_key(key(KeyCode::Char('C')), &mut state);
        assert_eq!(state.mode, InputMode::Normal);
    }

    #[test]
    fn roster_shortcuts() {
        let mut state = ViewState::default();
        assert_eq!(
            handle_key(key(KeyCode::Char('u')), &mut state),
            Some(UserCommand::DedupeByName)
        );
        assert_eq!(
            handle_key(key(KeyCode::Char('s')), &mut state),
            Some(UserCommand::LoadSample)
        );
    }

    // -- Draw tab --

    #[test]
    fn space_starts_draw() {
        let mut state = ViewState::default();
        state.active_tab = TabId::Draw;
        assert_eq!(
            handle_key(key(KeyCode::Char(' ')), &mut state),
            Some(UserCommand::StartDraw)
        );
    }

    #[test]
    fn r_toggles_repeat() {
        let mut state = ViewState::default();
        state.active_tab = TabId::Draw;
        assert_eq!(
            handle_key(key(KeyCode::Char('r')), &mut state),
            Some(UserCommand::SetAllowRepeat(true))
        );
        state.draw.allow_repeat = true;
        assert_eq!(
            handle_key(key(KeyCode::Char('r')), &mut state),
            Some(UserCommand::SetAllowRepeat(false))
        );
    }

    #[test]
    fn reset_requires_confirmation() {
        let mut state = ViewState::default();
        state.active_tab = TabId::Draw;
        assert_eq!(handle_key(key(KeyCode::Char('R')), &mut state), None);
        assert_eq!(
            handle_key(key(KeyCode::Char('y')), &mut state),
            Some(UserCommand::ResetDrawPool)
        );
    }

    // -- Groups tab --

    #[test]
    fn decrement_stops_at_two() {
        let mut state = ViewState::default();
        state.active_tab = TabId::Groups;
        state.grouping.group_size = 3;
        assert_eq!(
            handle_key(key(KeyCode::Char('-')), &mut state),
            Some(UserCommand::SetGroupSize(2))
        );
        state.grouping.group_size = 2;
        assert_eq!(handle_key(key(KeyCode::Char('-')), &mut state), None);
        assert_eq!(
            handle_key(key(KeyCode::Char('+')), &mut state),
            Some(UserCommand::SetGroupSize(3))
        );
    }

    #[test]
    fn typed_group_size_accepts_one() {
        let mut state = ViewState::default();
        state.active_tab = TabId::Groups;
        handle_key(key(KeyCode::Char('e')), &mut state);
        assert_eq!(state.input_buffer, "4");
        handle_key(key(KeyCode::Backspace), &mut state);
        type_text(&mut state, "1");
        assert_eq!(
            handle_key(key(KeyCode::Enter), &mut state),
            Some(UserCommand::SetGroupSize(1))
        );
    }

    #[test]
    fn typed_garbage_group_size_becomes_one() {
        let mut state = ViewState::default();
        state.active_tab = TabId::Groups;
        handle_key(key(KeyCode::Char('e')), &mut state);
        handle_key(key(KeyCode::Backspace), &mut state);
        type_text(&mut state, "abc");
        assert_eq!(
            handle_key(key(KeyCode::Enter), &mut state),
            Some(UserCommand::SetGroupSize(1))
        );
    }

    #[test]
    fn groups_shortcuts() {
        let mut state = ViewState::default();
        state.active_tab = TabId::Groups;
        assert_eq!(
            handle_key(key(KeyCode::Char('g')), &mut state),
            Some(UserCommand::GenerateGroups)
        );
        assert_eq!(
            handle_key(key(KeyCode::Char('x')), &mut state),
            Some(UserCommand::ExportCsv)
        );
        assert_eq!(
            handle_key(key(KeyCode::Char('v')), &mut state),
            Some(UserCommand::ShareGroups)
        );
    }

    #[test]
    fn share_overlay_closes_before_anything_else() {
        let mut state = ViewState::default();
        state.active_tab = TabId::Groups;
        state.share_text = Some("Group 1:\n - Ann".into());
        assert_eq!(handle_key(key(KeyCode::Char('g')), &mut state), None);
        assert!(state.share_text.is_some());
        assert_eq!(handle_key(key(KeyCode::Esc), &mut state), None);
        assert!(state.share_text.is_none());
    }

    #[test]
    fn keypress_clears_notice() {
        let mut state = ViewState::default();
        state.notice = Some("Saved".into());
        handle_key(key(KeyCode::Char('j')), &mut state);
        assert!(state.notice.is_none());
    }
}
