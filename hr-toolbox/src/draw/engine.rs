// Draw engine: candidate pool, spin/settle transitions, winner history.
//
// The engine is synchronous and owns no timers. The app drives it: one
// `start_draw`, a series of `tick`s paced by the spin task, then `settle`.
// Randomness is injected so tests can use a seeded generator.

use std::collections::{HashSet, VecDeque};

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::roster::participant::Participant;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrawError {
    #[error("the draw pool is empty")]
    EmptyPool,

    #[error("a draw is already in progress")]
    AlreadySpinning,

    #[error("no draw is in progress")]
    NotSpinning,
}

/// Where the engine is in its draw cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawPhase {
    Idle,
    Spinning,
    Settled,
}

/// A completed draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinnerRecord {
    pub participant: Participant,
    pub drawn_at: DateTime<Utc>,
}

/// Result of handing the engine a new roster snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterSync {
    /// The pool was rebuilt from the snapshot.
    Applied,
    /// A spin is in flight; the snapshot is held until it ends.
    Deferred,
}

/// The prize draw state machine.
#[derive(Debug, Clone)]
pub struct DrawEngine {
    phase: DrawPhase,
    /// Candidates for the next draw.
    pool: Vec<Participant>,
    /// Last roster snapshot applied to the pool.
    roster: Vec<Participant>,
    /// Ids taken out of the pool by completed draws since the last reset.
    removed: HashSet<String>,
    /// Newest roster snapshot received mid-spin.
    pending_roster: Option<Vec<Participant>>,
    /// Candidate currently shown by the spin animation.
    displayed: Option<Participant>,
    ticks_done: u32,
    last_winner: Option<Participant>,
    /// Most recent first.
    history: VecDeque<WinnerRecord>,
    allow_repeat: bool,
}

impl DrawEngine {
    /// Create an idle engine whose pool is the full roster snapshot.
    pub fn new(roster: Vec<Participant>, allow_repeat: bool) -> Self {
        DrawEngine {
            phase: DrawPhase::Idle,
            pool: roster.clone(),
            roster,
            removed: HashSet::new(),
            pending_roster: None,
            displayed: None,
            ticks_done: 0,
            last_winner: None,
            history: VecDeque::new(),
            allow_repeat,
        }
    }

    pub fn phase(&self) -> DrawPhase {
        self.phase
    }

    pub fn is_spinning(&self) -> bool {
        self.phase == DrawPhase::Spinning
    }

    pub fn pool(&self) -> &[Participant] {
        &self.pool
    }

    pub fn displayed(&self) -> Option<&Participant> {
        self.displayed.as_ref()
    }

    pub fn ticks_done(&self) -> u32 {
        self.ticks_done
    }

    pub fn last_winner(&self) -> Option<&Participant> {
        self.last_winner.as_ref()
    }

    pub fn history(&self) -> &VecDeque<WinnerRecord> {
        &self.history
    }

    pub fn allow_repeat(&self) -> bool {
        self.allow_repeat
    }

    /// Takes effect from the next settle onwards.
    pub fn set_allow_repeat(&mut self, allow: bool) {
        self.allow_repeat = allow;
    }

    pub fn has_pending_roster(&self) -> bool {
        self.pending_roster.is_some()
    }

    /// Begin a spin cycle.
    ///
    /// Accepted from `Idle` or `Settled` when the pool is non-empty.
    pub fn start_draw(&mut self) -> Result<(), DrawError> {
        if self.is_spinning() {
            return Err(DrawError::AlreadySpinning);
        }
        if self.pool.is_empty() {
            return Err(DrawError::EmptyPool);
        }
        self.phase = DrawPhase::Spinning;
        self.last_winner = None;
        self.displayed = None;
        self.ticks_done = 0;
        info!("Draw started with {} candidates", self.pool.len());
        Ok(())
    }

    /// Advance the spin animation by one step and return the displayed
    /// candidate. Carries no selection weight.
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<&Participant, DrawError> {
        if !self.is_spinning() {
            return Err(DrawError::NotSpinning);
        }
        let idx = rng.random_range(0..self.pool.len());
        self.ticks_done += 1;
        Ok(self.displayed.insert(self.pool[idx].clone()))
    }

    /// Finish the spin: pick the winner independently of the displayed
    /// candidate, record it, and (unless repeats are allowed) take it out
    /// of the pool.
    pub fn settle<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<WinnerRecord, DrawError> {
        if !self.is_spinning() {
            return Err(DrawError::NotSpinning);
        }
        let idx = rng.random_range(0..self.pool.len());
        let winner = if self.allow_repeat {
            self.pool[idx].clone()
        } else {
            let winner = self.pool.remove(idx);
            self.removed.insert(winner.id.clone());
            winner
        };

        let record = WinnerRecord {
            participant: winner.clone(),
            drawn_at: Utc::now(),
        };
        self.history.push_front(record.clone());
        self.last_winner = Some(winner);
        self.displayed = None;
        self.phase = DrawPhase::Settled;
        info!(
            "Draw settled: '{}' ({} left in pool)",
            record.participant.name,
            self.pool.len()
        );

        self.apply_pending_roster();
        Ok(record)
    }

    /// Run a whole cycle without pacing: start, `ticks` animation steps,
    /// settle.
    pub fn run_cycle<R: Rng + ?Sized>(
        &mut self,
        ticks: u32,
        rng: &mut R,
    ) -> Result<WinnerRecord, DrawError> {
        self.start_draw()?;
        for _ in 0..ticks {
            self.tick(rng)?;
        }
        self.settle(rng)
    }

    /// Abandon an in-flight spin without recording a winner.
    ///
    /// Returns `true` if a spin was cancelled.
    pub fn cancel_spin(&mut self) -> bool {
        if !self.is_spinning() {
            return false;
        }
        self.phase = DrawPhase::Idle;
        self.displayed = None;
        self.ticks_done = 0;
        info!("Draw cancelled");
        self.apply_pending_roster();
        true
    }

    /// Restore the pool to the full roster and forget all winners.
    pub fn reset_pool(&mut self) {
        if let Some(snapshot) = self.pending_roster.take() {
            self.roster = snapshot;
        }
        self.phase = DrawPhase::Idle;
        self.removed.clear();
        self.pool = self.roster.clone();
        self.displayed = None;
        self.ticks_done = 0;
        self.last_winner = None;
        self.history.clear();
        info!("Draw pool reset to {} candidates", self.pool.len());
    }

    /// Hand the engine a new roster snapshot.
    ///
    /// While spinning the snapshot is buffered (replacing any earlier one)
    /// and the in-flight pool stays frozen.
    pub fn sync_roster(&mut self, snapshot: Vec<Participant>) -> RosterSync {
        if self.is_spinning() {
            debug!("Roster changed mid-spin, deferring pool update");
            self.pending_roster = Some(snapshot);
            return RosterSync::Deferred;
        }
        self.apply_roster(snapshot);
        RosterSync::Applied
    }

    fn apply_pending_roster(&mut self) {
        if let Some(snapshot) = self.pending_roster.take() {
            self.apply_roster(snapshot);
        }
    }

    fn apply_roster(&mut self, snapshot: Vec<Participant>) {
        self.pool = snapshot
            .iter()
            .filter(|p| !self.removed.contains(&p.id))
            .cloned()
            .collect();
        self.roster = snapshot;
    }
}
