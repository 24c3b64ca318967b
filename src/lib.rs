#![warn(missing_docs)]

//! # timer-grid
//!
//! A grid of independent countdown timers for the terminal, built on
//! [bubbletea-rs](https://github.com/whit3rabbit/bubbletea-rs) and styled with
//! lipgloss. Each timer has its own start/pause/reset controls, an editable
//! label and an audible alert when it runs out; the grid decides how many
//! timers exist and how many share a row.
//!
//! ## Components
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`timer`] | One countdown: `New → Running ⇄ Paused → New` |
//! | [`grid`] | Timer count, timers per row, focus and tick routing |
//! | [`app`] | The bubbletea-rs `Model` tying the grid to the keyboard |
//! | [`store`] | Durable key/value store for finished durations |
//! | [`alert`] | The sound played when a timer finishes |
//! | [`clock`] | `M : SS` readouts and size classes |
//! | [`label`] | Label editor |
//! | [`key`], [`help`] | Key bindings and the help bar |
//! | [`config`], [`logging`], [`error`] | Configuration file, logs, errors |
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use timer_grid::prelude::*;
//!
//! let alert = Arc::new(Counter::new());
//! let mut grid = Grid::new(4, 2, Arc::new(MemoryStore::new()), alert.clone());
//! assert_eq!(grid.rows().count(), 2);
//!
//! // Five per row would exceed the four timers.
//! assert!(grid.set_timers_per_row(3).is_ok());
//! assert!(grid.set_timers_per_row(5).is_err());
//!
//! let timer = grid.focused_mut();
//! let _tick = timer.start_with(0, 1);
//! assert_eq!(timer.state(), TimerState::Running);
//! ```

pub mod alert;
pub mod app;
pub mod clock;
pub mod config;
pub mod error;
pub mod grid;
pub mod help;
pub mod key;
pub mod label;
pub mod logging;
pub mod store;
pub mod timer;

use bubbletea_rs::Cmd;

/// Keyboard focus for components.
///
/// The grid focuses exactly one timer at a time. A focused timer highlights its
/// frame and its active configuration field; blurring it also closes an open
/// label editor.
///
/// ```rust
/// use std::sync::Arc;
/// use timer_grid::prelude::*;
///
/// let mut timer = Timer::new(0, Arc::new(MemoryStore::new()), Arc::new(Silent));
/// assert!(!timer.focused());
/// timer.focus();
/// assert!(timer.focused());
/// timer.blur();
/// assert!(!timer.focused());
/// ```
pub trait Component {
    /// Gives the component focus. May return a command to run.
    fn focus(&mut self) -> Option<Cmd>;

    /// Takes focus away.
    fn blur(&mut self);

    /// Whether the component has focus.
    fn focused(&self) -> bool;
}

/// Common imports.
pub mod prelude {
    pub use crate::alert::{Alert, Counter, Silent, SineTone, TerminalBell, Tone};
    pub use crate::app::{App, Setting, Settings};
    pub use crate::clock::{format_clock, SizeClass};
    pub use crate::error::{Error, GridError, Result};
    pub use crate::grid::Grid;
    pub use crate::store::{FileStore, MemoryStore, Store};
    pub use crate::timer::{Model as Timer, TickMsg, TimerState};
    pub use crate::Component;
}
