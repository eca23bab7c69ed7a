// Prize draw: pool state machine, spin timing, and the celebration hook.

pub mod celebration;
pub mod engine;
pub mod schedule;
