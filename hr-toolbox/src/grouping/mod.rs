// Random team grouping and its share/CSV export.

pub mod engine;
pub mod export;
