// The canonical participant roster.

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::warn;

use super::parse::{split_bulk, split_import};
use super::participant::Participant;

/// Fixed demonstration list used by [`Roster::load_sample`].
pub const SAMPLE_NAMES: [&str; 15] = [
    "Olivia Chen",
    "Marcus Reed",
    "Priya Nair",
    "Daniel Okafor",
    "Sofia Rossi",
    "Liam Walsh",
    "Hana Sato",
    "Mateo Garcia",
    "Amara Diallo",
    "Noah Fischer",
    "Elena Petrova",
    "Jonas Berg",
    "Aisha Rahman",
    "Lucas Moreau",
    "Grace Kim",
];

/// Ordered list of participants, insertion order preserved.
///
/// No two participants share an `id`. Name collisions are allowed and can be
/// inspected with [`Roster::duplicate_names`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    participants: Vec<Participant>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a roster from previously persisted participants.
    ///
    /// Later entries repeating an already-seen id are dropped.
    pub fn from_participants(participants: Vec<Participant>) -> Self {
        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(participants.len());
        for p in participants {
            if seen.insert(p.id.clone()) {
                kept.push(p);
            } else {
                warn!("Dropping participant '{}' with duplicate id {}", p.name, p.id);
            }
        }
        Roster { participants: kept }
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Owned copy of the current roster, handed to the engines.
    pub fn snapshot(&self) -> Vec<Participant> {
        self.participants.clone()
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    /// Append every name found in manually entered text.
    ///
    /// Returns the participants that were appended, in order.
    pub fn add_bulk(&mut self, raw_text: &str) -> Vec<Participant> {
        self.append_names(split_bulk(raw_text))
    }

    /// Append every name found in imported file content, skipping a
    /// `name` header cell.
    pub fn import_from_text(&mut self, content: &str) -> Vec<Participant> {
        self.append_names(split_import(content))
    }

    fn append_names(&mut self, names: Vec<String>) -> Vec<Participant> {
        let added: Vec<Participant> = names.into_iter().map(Participant::new).collect();
        self.participants.extend(added.iter().cloned());
        added
    }

    /// Remove the participant with the given id. No-op if absent.
    pub fn remove(&mut self, id: &str) -> Option<Participant> {
        let idx = self.participants.iter().position(|p| p.id == id)?;
        Some(self.participants.remove(idx))
    }

    /// Remove everyone. Returns how many participants were dropped.
    pub fn clear(&mut self) -> usize {
        let count = self.participants.len();
        self.participants.clear();
        count
    }

    /// Keep only the first participant for each distinct name.
    ///
    /// Names are compared exactly (no case folding). Returns how many
    /// participants were dropped.
    pub fn dedupe_by_name(&mut self) -> usize {
        let before = self.participants.len();
        let mut seen = HashSet::new();
        self.participants.retain(|p| seen.insert(p.name.clone()));
        before - self.participants.len()
    }

    /// Names that occur more than once.
    pub fn duplicate_names(&self) -> BTreeSet<String> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for p in &self.participants {
            *counts.entry(p.name.as_str()).or_insert(0) += 1;
        }
        counts
            .into_iter()
            .filter(|&(_, count)| count > 1)
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// Replace the whole roster with the demonstration list.
    pub fn load_sample(&mut self) {
        self.participants = SAMPLE_NAMES.iter().map(|&n| Participant::new(n)).collect();
    }
}
