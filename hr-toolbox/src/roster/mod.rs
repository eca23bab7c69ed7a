// Participant roster: identity, text tokenizing, and the canonical list.

pub mod parse;
pub mod participant;
pub mod state;
