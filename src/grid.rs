//! Grid of timers.
//!
//! The grid owns how many timers exist and how many share a row. Both knobs
//! are validated against each other:
//!
//! - the timer count must be at least 1 and at least the timers per row;
//! - the timers per row must be at least 1 and at most the timer count.
//!
//! A rejected setting returns a [`GridError`] and leaves the grid untouched.
//!
//! Growing the grid creates timers for the new slots (each reads its saved
//! durations from the store); shrinking drops the timers at the end, which
//! also ends their tick loops.

use crate::alert::Alert;
use crate::clock::SizeClass;
use crate::error::GridError;
use crate::store::Store;
use crate::timer::{self, TickMsg};
use crate::Component;
use bubbletea_rs::{Cmd, Msg};
use lipgloss_extras::lipgloss;
use std::sync::Arc;

/// Default number of timers.
pub const DEFAULT_TIMER_COUNT: usize = 4;

/// Default number of timers per row.
pub const DEFAULT_TIMERS_PER_ROW: usize = 2;

/// Columns of space between two cards in a row.
pub const GAP: usize = 1;

/// Grid of timer cards.
#[derive(Debug)]
pub struct Grid {
    timers: Vec<timer::Model>,
    timers_per_row: usize,
    focused: usize,
    width: usize,
    store: Arc<dyn Store>,
    alert: Arc<dyn Alert>,
}

impl Grid {
    /// Creates a grid. Out-of-range values are pulled into range: the count
    /// to at least 1, the timers per row to `1..=count`.
    pub fn new(
        timer_count: usize,
        timers_per_row: usize,
        store: Arc<dyn Store>,
        alert: Arc<dyn Alert>,
    ) -> Self {
        let timer_count = timer_count.max(1);
        let mut grid = Self {
            timers: Vec::with_capacity(timer_count),
            timers_per_row: timers_per_row.clamp(1, timer_count),
            focused: 0,
            width: 0,
            store,
            alert,
        };
        grid.grow_to(timer_count);
        if let Some(first) = grid.timers.first_mut() {
            first.focus();
        }
        grid
    }

    /// Number of timers.
    pub fn timer_count(&self) -> usize {
        self.timers.len()
    }

    /// Timers per row.
    pub fn timers_per_row(&self) -> usize {
        self.timers_per_row
    }

    /// Rendering hint given to every card.
    pub fn size_class(&self) -> SizeClass {
        SizeClass::for_timers_per_row(self.timers_per_row)
    }

    /// Changes the number of timers.
    ///
    /// Growing creates timers for the new slots, each reading what its index
    /// saved earlier. Shrinking drops the trailing timers along with their
    /// tick loops and moves focus onto the last remaining timer if needed.
    ///
    /// # Arguments
    ///
    /// * `count` - The new number of timers
    ///
    /// # Errors
    ///
    /// [`GridError::CountTooSmall`] for zero, [`GridError::CountBelowRow`]
    /// when `count` is below the timers per row. The grid is unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use timer_grid::prelude::*;
    ///
    /// let mut grid = Grid::new(4, 2, Arc::new(MemoryStore::new()), Arc::new(Silent));
    /// grid.set_timer_count(5).unwrap();
    /// assert_eq!(grid.rows().count(), 3);
    ///
    /// assert_eq!(
    ///     grid.set_timer_count(1),
    ///     Err(GridError::CountBelowRow { count: 1, per_row: 2 })
    /// );
    /// assert_eq!(grid.timer_count(), 5);
    /// ```
    pub fn set_timer_count(&mut self, count: usize) -> Result<(), GridError> {
        if count < 1 {
            return Err(GridError::CountTooSmall);
        }
        if count < self.timers_per_row {
            return Err(GridError::CountBelowRow {
                count,
                per_row: self.timers_per_row,
            });
        }

        let old = self.timers.len();
        if count > old {
            self.grow_to(count);
        } else if count < old {
            self.timers.truncate(count);
            if self.focused >= count {
                self.set_focus(count - 1);
            }
        }
        tracing::debug!(old, count, "timer count changed");
        Ok(())
    }

    /// Changes the number of timers per row and re-derives every card's
    /// [`SizeClass`].
    ///
    /// # Errors
    ///
    /// [`GridError::RowTooSmall`] for zero, [`GridError::RowAboveCount`] when
    /// `per_row` exceeds the timer count. The grid is unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use timer_grid::prelude::*;
    ///
    /// let mut grid = Grid::new(3, 1, Arc::new(MemoryStore::new()), Arc::new(Silent));
    /// grid.set_timers_per_row(3).unwrap();
    /// assert_eq!(grid.size_class(), SizeClass::Medium);
    /// assert!(grid.set_timers_per_row(5).is_err());
    /// assert_eq!(grid.timers_per_row(), 3);
    /// ```
    pub fn set_timers_per_row(&mut self, per_row: usize) -> Result<(), GridError> {
        if per_row < 1 {
            return Err(GridError::RowTooSmall);
        }
        if per_row > self.timers.len() {
            return Err(GridError::RowAboveCount {
                per_row,
                count: self.timers.len(),
            });
        }
        self.timers_per_row = per_row;
        self.relayout();
        tracing::debug!(per_row, "timers per row changed");
        Ok(())
    }

    fn grow_to(&mut self, count: usize) {
        for index in self.timers.len()..count {
            self.timers.push(timer::Model::new(
                index,
                Arc::clone(&self.store),
                Arc::clone(&self.alert),
            ));
        }
        self.relayout();
    }

    /// Sets the width available to the grid and resizes the cards.
    pub fn set_width(&mut self, width: usize) {
        self.width = width;
        self.relayout();
    }

    /// Outer width of one card for the current width, or 0 when unknown.
    pub fn card_width(&self) -> usize {
        if self.width == 0 {
            return 0;
        }
        let gaps = GAP * (self.timers_per_row - 1);
        self.width.saturating_sub(gaps) / self.timers_per_row
    }

    fn relayout(&mut self) {
        let size_class = self.size_class();
        let card_width = self.card_width();
        for timer in &mut self.timers {
            timer.set_size_class(size_class);
            timer.set_width(card_width);
        }
    }

    /// All timers in order.
    pub fn timers(&self) -> &[timer::Model] {
        &self.timers
    }

    /// Timer at `index`.
    pub fn timer(&self, index: usize) -> Option<&timer::Model> {
        self.timers.get(index)
    }

    /// Mutable timer at `index`.
    pub fn timer_mut(&mut self, index: usize) -> Option<&mut timer::Model> {
        self.timers.get_mut(index)
    }

    /// Timers chunked into rows.
    pub fn rows(&self) -> impl Iterator<Item = &[timer::Model]> {
        self.timers.chunks(self.timers_per_row)
    }

    /// Index of the focused timer.
    pub fn focused_index(&self) -> usize {
        self.focused
    }

    /// The focused timer.
    pub fn focused(&self) -> &timer::Model {
        &self.timers[self.focused]
    }

    /// The focused timer, mutably.
    pub fn focused_mut(&mut self) -> &mut timer::Model {
        &mut self.timers[self.focused]
    }

    /// Moves focus to `index`, clamped to the last timer.
    pub fn set_focus(&mut self, index: usize) {
        let index = index.min(self.timers.len() - 1);
        if let Some(old) = self.timers.get_mut(self.focused) {
            old.blur();
        }
        self.focused = index;
        self.timers[index].focus();
    }

    /// Focuses the next timer in reading order.
    pub fn focus_next(&mut self) {
        if self.focused + 1 < self.timers.len() {
            self.set_focus(self.focused + 1);
        }
    }

    /// Focuses the previous timer in reading order.
    pub fn focus_prev(&mut self) {
        if self.focused > 0 {
            self.set_focus(self.focused - 1);
        }
    }

    /// Focuses the timer one row down, or the last timer on a partial row.
    pub fn focus_down(&mut self) {
        let row_start = (self.focused / self.timers_per_row + 1) * self.timers_per_row;
        if row_start < self.timers.len() {
            self.set_focus(self.focused + self.timers_per_row);
        }
    }

    /// Focuses the timer one row up.
    pub fn focus_up(&mut self) {
        if self.focused >= self.timers_per_row {
            self.set_focus(self.focused - self.timers_per_row);
        }
    }

    /// Routes a message to the timer it belongs to. Ticks for timers that are
    /// no longer in the grid are dropped.
    pub fn update(&mut self, msg: Msg) -> Option<Cmd> {
        let id = msg.downcast_ref::<TickMsg>()?.id;
        match self.timers.iter_mut().find(|t| t.id() == id) {
            Some(timer) => timer.update(msg),
            None => {
                tracing::trace!(id, "dropped tick for removed timer");
                None
            }
        }
    }

    /// Renders the rows of cards.
    pub fn view(&self) -> String {
        let gap = " ".repeat(GAP);
        self.rows()
            .map(|row| {
                let cards: Vec<String> = row.iter().map(timer::Model::view).collect();
                let mut parts: Vec<&str> = Vec::with_capacity(cards.len() * 2);
                for (i, card) in cards.iter().enumerate() {
                    if i > 0 {
                        parts.push(&gap);
                    }
                    parts.push(card);
                }
                lipgloss::join_horizontal(lipgloss::TOP, &parts)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
