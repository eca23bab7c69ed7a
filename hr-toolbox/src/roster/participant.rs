// Participant identity.

use serde::{Deserialize, Serialize};

/// A named entry on the roster.
///
/// Identity is `id`; `name` is user-supplied and may collide with other
/// participants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Participant {
    /// Opaque unique identifier (UUID v4, simple form).
    pub id: String,
    /// Display name, already trimmed.
    pub name: String,
}

impl Participant {
    /// Create a participant with a freshly generated id.
    pub fn new(name: impl Into<String>) -> Self {
        Participant {
            id: generate_id(),
            name: name.into(),
        }
    }
}

/// Generate a new participant id.
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
