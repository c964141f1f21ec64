// ── Board state ──

mod board;
mod views;

pub use board::{BoardMode, EmergencyBoard};
pub use views::{BoardView, active_count, filtered};
