//! Ratatui front-end wiring the persistence layer to the keyboard.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
