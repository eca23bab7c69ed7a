// TUI widget modules for each screen and overlay.

pub mod draw_stage;
pub mod group_cards;
pub mod modal;
pub mod roster_list;
pub mod status_bar;
