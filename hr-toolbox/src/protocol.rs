// Messages exchanged between the app event loop, its background tasks, and
// the TUI.

use std::path::PathBuf;

use crate::draw::engine::{DrawPhase, WinnerRecord};
use crate::grouping::engine::GroupingResult;
use crate::roster::participant::Participant;

// ---------------------------------------------------------------------------
// TUI -> app
// ---------------------------------------------------------------------------

/// Top-level screens of the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabId {
    Roster,
    Draw,
    Groups,
}

impl TabId {
    pub const ALL: [TabId; 3] = [TabId::Roster, TabId::Draw, TabId::Groups];

    pub fn title(self) -> &'static str {
        match self {
            TabId::Roster => "Roster",
            TabId::Draw => "Lucky Draw",
            TabId::Groups => "Groups",
        }
    }

    pub fn next(self) -> TabId {
        match self {
            TabId::Roster => TabId::Draw,
            TabId::Draw => TabId::Groups,
            TabId::Groups => TabId::Roster,
        }
    }
}

/// Commands sent from the TUI to the app orchestrator.
///
/// Destructive commands (`ClearRoster`, `ResetDrawPool`) are sent only
/// after the user confirmed them in the TUI.
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    SwitchTab(TabId),

    // Roster
    AddBulk(String),
    ImportFile(PathBuf),
    RemoveParticipant(String),
    DedupeByName,
    LoadSample,
    ClearRoster,

    // Draw
    StartDraw,
    SetAllowRepeat(bool),
    ResetDrawPool,

    // Groups
    SetGroupSize(i64),
    GenerateGroups,
    ExportCsv,
    ShareGroups,

    Quit,
}

// ---------------------------------------------------------------------------
// Background tasks -> app
// ---------------------------------------------------------------------------

/// Events from deferred work spawned by the app. Each carries the
/// generation of the task that produced it; stale generations are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskEvent {
    SpinTick { generation: u64 },
    SpinFinished { generation: u64 },
    GroupingReady { generation: u64 },
}

// ---------------------------------------------------------------------------
// App -> TUI
// ---------------------------------------------------------------------------

/// Everything the TUI needs to render the draw screen.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawSnapshot {
    pub phase: DrawPhase,
    pub pool_size: usize,
    pub displayed: Option<String>,
    pub last_winner: Option<Participant>,
    /// Most recent first.
    pub history: Vec<WinnerRecord>,
    pub allow_repeat: bool,
}

/// Everything the TUI needs to render the groups screen.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupingSnapshot {
    pub group_size: usize,
    pub generating: bool,
    pub result: Option<GroupingResult>,
}

/// Full application state as seen by the TUI.
#[derive(Debug, Clone, PartialEq)]
pub struct AppSnapshot {
    pub participants: Vec<Participant>,
    pub duplicate_names: Vec<String>,
    pub draw: DrawSnapshot,
    pub grouping: GroupingSnapshot,
}

/// Updates pushed from the app orchestrator to the TUI.
#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    StateSnapshot(Box<AppSnapshot>),
    /// The spin animation moved to a new candidate.
    SpinTick { displayed: String },
    /// A draw settled; play the celebration effect.
    Celebrate { winner: String },
    /// Share text for the current grouping result.
    ShareText(String),
    /// One-line status message for the user.
    Notice(String),
}
