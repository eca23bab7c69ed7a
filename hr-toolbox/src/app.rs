// Application state and orchestration logic.
//
// The central event loop that owns the roster and both engines, processes
// user commands from the TUI and timer events from spawned tasks, persists
// the roster write-through, and pushes UI updates to the TUI render loop.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::db::Database;
use crate::draw::celebration::{self, Celebration};
use crate::draw::engine::{DrawEngine, DrawError, RosterSync, WinnerRecord};
use crate::draw::schedule::{run_spin, SpinSchedule};
use crate::grouping::engine::{self, clamp_group_size, GroupingResult};
use crate::grouping::export::{self, ExportError};
use crate::protocol::{
    AppSnapshot, DrawSnapshot, GroupingSnapshot, TaskEvent, UiUpdate, UserCommand,
};
use crate::roster::state::Roster;

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// Grouping screen state: the chosen size and the latest result.
#[derive(Debug, Clone)]
pub struct GroupingState {
    pub group_size: usize,
    /// A delayed generation is pending.
    pub generating: bool,
    pub result: Option<GroupingResult>,
}

/// Outcome of a generate request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupingRequest {
    /// Result is available now.
    Generated,
    /// A delay task was spawned; the result arrives with `GroupingReady`.
    Scheduled,
    /// A generation was already pending.
    Ignored,
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// The complete application state.
pub struct AppState {
    pub config: Config,
    pub roster: Roster,
    pub draw: DrawEngine,
    pub grouping: GroupingState,
    pub db: Database,
    rng: StdRng,
    pub spin_task: Option<JoinHandle<()>>,
    /// Identifies the current spin task. Bumped on every spawn and cancel;
    /// events carrying another value are discarded.
    pub spin_generation: u64,
    pub grouping_task: Option<JoinHandle<()>>,
    pub grouping_generation: u64,
    /// Spawned tasks send their events back to the loop through clones of
    /// this sender.
    pub task_tx: mpsc::Sender<TaskEvent>,
    pub celebration: Option<Arc<dyn Celebration>>,
}

impl AppState {
    pub fn new(
        config: Config,
        roster: Roster,
        db: Database,
        task_tx: mpsc::Sender<TaskEvent>,
    ) -> Self {
        let draw = DrawEngine::new(roster.snapshot(), config.draw.allow_repeat);
        let grouping = GroupingState {
            group_size: config.grouping.default_group_size,
            generating: false,
            result: None,
        };

        AppState {
            config,
            roster,
            draw,
            grouping,
            db,
            rng: StdRng::from_os_rng(),
            spin_task: None,
            spin_generation: 0,
            grouping_task: None,
            grouping_generation: 0,
            task_tx,
            celebration: None,
        }
    }

    /// Replace the random source (seeded generators in tests).
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_celebration(mut self, celebration: Arc<dyn Celebration>) -> Self {
        self.celebration = Some(celebration);
        self
    }

    // -----------------------------------------------------------------------
    // Roster
    // -----------------------------------------------------------------------

    /// Apply a roster mutation, then persist and re-seed the draw pool.
    fn mutate_roster<T>(&mut self, f: impl FnOnce(&mut Roster) -> T) -> T {
        let out = f(&mut self.roster);
        self.persist_roster();
        if self.draw.sync_roster(self.roster.snapshot()) == RosterSync::Deferred {
            info!("Roster changed during a spin; pool update deferred");
        }
        out
    }

    fn persist_roster(&self) {
        if let Err(e) = self.db.save_roster(self.roster.participants()) {
            warn!("Failed to persist roster: {:#}", e);
        }
    }

    pub fn add_bulk(&mut self, raw_text: &str) -> usize {
        let added = self.mutate_roster(|r| r.add_bulk(raw_text));
        info!("Added {} participants", added.len());
        added.len()
    }

    pub fn import_text(&mut self, content: &str) -> usize {
        let added = self.mutate_roster(|r| r.import_from_text(content));
        info!("Imported {} participants", added.len());
        added.len()
    }

    pub fn remove_participant(&mut self, id: &str) -> bool {
        let removed = self.mutate_roster(|r| r.remove(id));
        match &removed {
            Some(p) => info!("Removed participant '{}'", p.name),
            None => debug!("Remove ignored, no participant with id {}", id),
        }
        removed.is_some()
    }

    pub fn dedupe(&mut self) -> usize {
        let dropped = self.mutate_roster(|r| r.dedupe_by_name());
        info!("Dedupe dropped {} participants", dropped);
        dropped
    }

    pub fn load_sample(&mut self) {
        self.mutate_roster(|r| r.load_sample());
        info!("Loaded sample roster ({} names)", self.roster.len());
    }

    pub fn clear_roster(&mut self) -> usize {
        let dropped = self.mutate_roster(|r| r.clear());
        info!("Cleared roster ({} removed)", dropped);
        dropped
    }

    // -----------------------------------------------------------------------
    // Draw
    // -----------------------------------------------------------------------

    /// Abort the spin task if one is running. Events it already queued
    /// become stale.
    pub fn cancel_spin_task(&mut self) {
        if let Some(handle) = self.spin_task.take() {
            handle.abort();
            debug!("Cancelled spin task (gen: {})", self.spin_generation);
        }
        self.spin_generation += 1;
    }

    /// Start a draw and spawn its tick chain.
    pub fn start_draw(&mut self) -> Result<(), DrawError> {
        self.draw.start_draw()?;
        self.cancel_spin_task();
        let generation = self.spin_generation;
        let schedule = SpinSchedule::from_config(&self.config.draw);
        let tx = self.task_tx.clone();
        self.spin_task = Some(tokio::spawn(run_spin(schedule, generation, tx)));
        debug!("Spawned spin task (gen: {})", generation);
        Ok(())
    }

    /// Cancel any spin and restore the pool to the whole roster.
    pub fn reset_draw_pool(&mut self) {
        self.cancel_spin_task();
        self.draw.reset_pool();
    }

    pub fn set_allow_repeat(&mut self, allow: bool) {
        self.draw.set_allow_repeat(allow);
        info!("Repeat winners {}", if allow { "enabled" } else { "disabled" });
    }

    /// Advance the animation. Returns the displayed name, or `None` when the
    /// event is stale.
    pub fn on_spin_tick(&mut self, generation: u64) -> Option<String> {
        if generation != self.spin_generation {
            debug!(
                "Discarding stale spin tick (event gen: {}, current gen: {})",
                generation, self.spin_generation
            );
            return None;
        }
        match self.draw.tick(&mut self.rng) {
            Ok(p) => Some(p.name.clone()),
            Err(e) => {
                debug!("Ignoring spin tick: {}", e);
                None
            }
        }
    }

    /// Settle the current draw. `None` when the event is stale.
    pub fn on_spin_finished(&mut self, generation: u64) -> Option<WinnerRecord> {
        if generation != self.spin_generation {
            debug!(
                "Discarding stale spin finish (event gen: {}, current gen: {})",
                generation, self.spin_generation
            );
            return None;
        }
        self.spin_task = None;
        match self.draw.settle(&mut self.rng) {
            Ok(record) => {
                celebration::fire(self.celebration.as_ref(), &record.participant);
                Some(record)
            }
            Err(e) => {
                debug!("Ignoring spin finish: {}", e);
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Grouping
    // -----------------------------------------------------------------------

    pub fn set_group_size(&mut self, requested: i64) {
        self.grouping.group_size = clamp_group_size(requested);
        debug!("Group size set to {}", self.grouping.group_size);
    }

    /// Generate now, or after `grouping.generation_delay_ms` when non-zero.
    pub fn request_grouping(&mut self) -> GroupingRequest {
        if self.grouping.generating {
            debug!("Grouping already pending, request ignored");
            return GroupingRequest::Ignored;
        }

        let delay_ms = self.config.grouping.generation_delay_ms;
        if delay_ms == 0 {
            self.generate_groups();
            return GroupingRequest::Generated;
        }

        self.grouping_generation += 1;
        let generation = self.grouping_generation;
        let delay = Duration::from_millis(delay_ms);
        let tx = self.task_tx.clone();
        self.grouping.generating = true;
        self.grouping_task = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(TaskEvent::GroupingReady { generation }).await;
        }));
        GroupingRequest::Scheduled
    }

    /// Finish a delayed generation. Returns `false` for stale events.
    pub fn on_grouping_ready(&mut self, generation: u64) -> bool {
        if generation != self.grouping_generation || !self.grouping.generating {
            debug!(
                "Discarding stale grouping event (event gen: {}, current gen: {})",
                generation, self.grouping_generation
            );
            return false;
        }
        self.grouping_task = None;
        self.grouping.generating = false;
        self.generate_groups();
        true
    }

    fn generate_groups(&mut self) -> &GroupingResult {
        let snapshot = self.roster.snapshot();
        let result = engine::generate(&snapshot, self.grouping.group_size, &mut self.rng);
        info!(
            "Generated {} groups of up to {} from {} participants",
            result.groups.len(),
            result.group_size,
            result.member_count()
        );
        self.grouping.result.insert(result)
    }

    pub fn cancel_grouping_task(&mut self) {
        if let Some(handle) = self.grouping_task.take() {
            handle.abort();
            debug!("Cancelled grouping task (gen: {})", self.grouping_generation);
        }
        self.grouping.generating = false;
        self.grouping_generation += 1;
    }

    /// Share text for the latest non-empty result.
    pub fn share_text(&self) -> Option<String> {
        self.grouping
            .result
            .as_ref()
            .filter(|r| !r.is_empty())
            .map(export::to_share_text)
    }

    /// Write the latest result as CSV into the configured export directory.
    pub fn export_csv(&self, date: NaiveDate) -> Result<PathBuf, ExportError> {
        let result = self.grouping.result.as_ref().ok_or(ExportError::NoGroups)?;
        let dir = PathBuf::from(&self.config.export.dir);
        export::write_csv(&dir, result, date)
    }

    // -----------------------------------------------------------------------
    // Snapshot & shutdown
    // -----------------------------------------------------------------------

    /// Build a snapshot of the current state for the TUI.
    pub fn build_snapshot(&self) -> AppSnapshot {
        AppSnapshot {
            participants: self.roster.snapshot(),
            duplicate_names: self.roster.duplicate_names().into_iter().collect(),
            draw: DrawSnapshot {
                phase: self.draw.phase(),
                pool_size: self.draw.pool().len(),
                displayed: self.draw.displayed().map(|p| p.name.clone()),
                last_winner: self.draw.last_winner().cloned(),
                history: self.draw.history().iter().cloned().collect(),
                allow_repeat: self.draw.allow_repeat(),
            },
            grouping: GroupingSnapshot {
                group_size: self.grouping.group_size,
                generating: self.grouping.generating,
                result: self.grouping.result.clone(),
            },
        }
    }

    /// Abort every background task.
    pub fn shutdown(&mut self) {
        self.cancel_spin_task();
        self.cancel_grouping_task();
    }
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the main application event loop.
///
/// Listens on two channels using `tokio::select!`:
/// 1. User commands from the TUI
/// 2. Events from spawned spin and grouping tasks
///
/// Pushes UI updates through `ui_tx` for the TUI render loop.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    mut task_rx: mpsc::Receiver<TaskEvent>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");

    send_snapshot(&state, &ui_tx).await;

    loop {
        tokio::select! {
            // --- User commands ---
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => {
                        handle_user_command(&mut state, cmd, &ui_tx).await;
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }

            // --- Task events ---
            // `state` holds a sender, so this channel never closes while the
            // loop runs.
            Some(event) = task_rx.recv() => {
                handle_task_event(&mut state, event, &ui_tx).await;
            }
        }
    }

    // Cleanup
    state.shutdown();
    info!("Application event loop exiting");
    Ok(())
}

async fn send_snapshot(state: &AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let snapshot = state.build_snapshot();
    let _ = ui_tx.send(UiUpdate::StateSnapshot(Box::new(snapshot))).await;
}

async fn send_notice(ui_tx: &mpsc::Sender<UiUpdate>, message: impl Into<String>) {
    let _ = ui_tx.send(UiUpdate::Notice(message.into())).await;
}

/// Handle a user command from the TUI.
async fn handle_user_command(
    state: &mut AppState,
    cmd: UserCommand,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    match cmd {
        UserCommand::SwitchTab(tab) => {
            // Tabs are TUI-local; nothing to change here.
            debug!("Switched to tab: {:?}", tab);
            return;
        }
        UserCommand::AddBulk(text) => {
            let added = state.add_bulk(&text);
            if added == 0 {
                send_notice(ui_tx, "No names found").await;
            }
        }
        UserCommand::ImportFile(path) => match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                let added = state.import_text(&content);
                send_notice(
                    ui_tx,
                    format!("Imported {} names from {}", added, path.display()),
                )
                .await;
            }
            Err(e) => {
                warn!("Failed to read import file {}: {}", path.display(), e);
                send_notice(ui_tx, format!("Could not read {}: {}", path.display(), e)).await;
                return;
            }
        },
        UserCommand::RemoveParticipant(id) => {
            if !state.remove_participant(&id) {
                return;
            }
        }
        UserCommand::DedupeByName => {
            let dropped = state.dedupe();
            send_notice(ui_tx, format!("Removed {} duplicate names", dropped)).await;
        }
        UserCommand::LoadSample => state.load_sample(),
        UserCommand::ClearRoster => {
            state.clear_roster();
        }
        UserCommand::StartDraw => {
            if let Err(e) = state.start_draw() {
                info!("Draw rejected: {}", e);
                send_notice(ui_tx, e.to_string()).await;
                return;
            }
        }
        UserCommand::SetAllowRepeat(allow) => state.set_allow_repeat(allow),
        UserCommand::ResetDrawPool => {
            state.reset_draw_pool();
            send_notice(ui_tx, "Draw pool reset").await;
        }
        UserCommand::SetGroupSize(size) => state.set_group_size(size),
        UserCommand::GenerateGroups => {
            if state.request_grouping() == GroupingRequest::Ignored {
                return;
            }
            if state.grouping.result.as_ref().is_some_and(|r| r.is_empty())
                && !state.grouping.generating
            {
                send_notice(ui_tx, "No participants to group").await;
            }
        }
        UserCommand::ExportCsv => {
            match state.export_csv(Utc::now().date_naive()) {
                Ok(path) => {
                    info!("Exported grouping to {}", path.display());
                    send_notice(ui_tx, format!("Saved {}", path.display())).await;
                }
                Err(ExportError::NoGroups) => {
                    send_notice(ui_tx, "Generate groups before exporting").await;
                }
                Err(e) => {
                    warn!("CSV export failed: {}", e);
                    send_notice(ui_tx, format!("Export failed: {e}")).await;
                }
            }
            return;
        }
        UserCommand::ShareGroups => {
            match state.share_text() {
                Some(text) => {
                    let _ = ui_tx.send(UiUpdate::ShareText(text)).await;
                }
                None => send_notice(ui_tx, "Generate groups before sharing").await,
            }
            return;
        }
        UserCommand::Quit => {
            // Handled in the main loop
            return;
        }
    }

    send_snapshot(state, ui_tx).await;
}

/// Handle an event from a spawned task. Stale generations are dropped
/// without touching the UI.
async fn handle_task_event(
    state: &mut AppState,
    event: TaskEvent,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    match event {
        TaskEvent::SpinTick { generation } => {
            if let Some(displayed) = state.on_spin_tick(generation) {
                let _ = ui_tx.send(UiUpdate::SpinTick { displayed }).await;
            }
        }
        TaskEvent::SpinFinished { generation } => {
            if state.on_spin_finished(generation).is_some() {
                send_snapshot(state, ui_tx).await;
            }
        }
        TaskEvent::GroupingReady { generation } => {
            if state.on_grouping_ready(generation) {
                send_snapshot(state, ui_tx).await;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Startup recovery
// ---------------------------------------------------------------------------

/// Restore the roster saved by a previous session.
///
/// Never fails: a missing blob starts an empty roster, an unreadable one is
/// logged and also starts empty.
pub fn recover_roster(db: &Database) -> Roster {
    match db.load_roster() {
        Ok(Some(participants)) => {
            let roster = Roster::from_participants(participants);
            info!("Restored {} participants from database", roster.len());
            roster
        }
        Ok(None) => {
            info!("No saved roster, starting empty");
            Roster::new()
        }
        Err(e) => {
            warn!("Saved roster is unreadable, starting empty: {:#}", e);
            Roster::new()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
