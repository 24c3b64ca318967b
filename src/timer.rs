//! Countdown timer card.
//!
//! One timer in the grid. Each timer owns a small state machine:
//!
//! ```text
//!   New ──start──▶ Running ──pause──▶ Paused ──reset──▶ New
//!                    ▲  │                │
//!                    │  └──expire───────▶│
//!                    └──────resume───────┘
//! ```
//!
//! While `New` the card shows two numeric fields (minutes and seconds).
//! Starting computes the duration from them and arms the tick loop. While
//! `Running` a [`TickMsg`] arrives once per second and counts the remaining
//! time down; when it reaches zero the timer pauses itself, stores the
//! durations for its grid slot and rings the alert.
//!
//! # Tick loop
//!
//! The tick loop is a chain of `tick` commands: handling a tick schedules the
//! next one. Every message carries the timer's `id` and the generation `tag`
//! it was armed with. Pausing, resetting and expiring bump the tag, so a tick
//! that is already in flight is rejected when it lands. A timer dropped from
//! the grid simply never sees its ticks again because ids are never reused.
//!
//! ```rust
//! use std::sync::Arc;
//! use timer_grid::alert::Counter;
//! use timer_grid::store::MemoryStore;
//! use timer_grid::timer::{Model, TimerState};
//!
//! let alert = Arc::new(Counter::new());
//! let mut timer = Model::new(0, Arc::new(MemoryStore::new()), alert.clone());
//! timer.set_minutes_input("0");
//! timer.set_seconds_input("2");
//! let _cmd = timer.start();
//! assert_eq!(timer.state(), TimerState::Running);
//!
//! // Deliver the ticks the runtime would deliver.
//! while let Some(tick) = timer.pending_tick() {
//!     timer.update(Box::new(tick));
//! }
//! assert_eq!(timer.state(), TimerState::Paused);
//! assert_eq!(timer.remaining_seconds(), 0);
//! assert_eq!(alert.count(), 1);
//! ```

use crate::alert::{Alert, Tone};
use crate::clock::{block_digits, format_clock, letter_spaced, SizeClass};
use crate::label::LabelEditor;
use crate::store::{self, SavedDurations, Store};
use crate::Component;
use bubbletea_rs::{tick as bubbletea_tick, Cmd, Msg};
use lipgloss_extras::lipgloss;
use lipgloss_extras::prelude::*;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Time between ticks.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Largest accepted minutes value.
pub const MAX_MINUTES: u64 = 999;

/// Largest accepted seconds value.
pub const MAX_SECONDS: u64 = 59;

static LAST_ID: AtomicI64 = AtomicI64::new(0);

fn next_id() -> i64 {
    LAST_ID.fetch_add(1, Ordering::SeqCst) + 1
}

/// Parses a configuration field. Anything that is not a non-negative integer
/// counts as zero; values above `max` are clamped.
pub fn parse_field(input: &str, max: u64) -> u64 {
    input.trim().parse::<u64>().map_or(0, |v| v.min(max))
}

/// Countdown state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// Waiting for a duration.
    New,
    /// Counting down.
    Running,
    /// Stopped by the user or by reaching zero.
    Paused,
}

impl std::fmt::Display for TimerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TimerState::New => "new",
            TimerState::Running => "running",
            TimerState::Paused => "paused",
        })
    }
}

/// Which configuration field receives digits while the timer is `New`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// The minutes field.
    Minutes,
    /// The seconds field.
    Seconds,
}

/// One step of a running timer's tick loop.
#[derive(Debug, Clone)]
pub struct TickMsg {
    /// Id of the timer the tick belongs to.
    pub id: i64,
    tag: u64,
}

/// Colours for a timer card.
#[derive(Debug, Clone)]
pub struct Styles {
    /// Card frame when not focused.
    pub card: Style,
    /// Card frame when focused.
    pub focused_card: Style,
    /// Card frame after the countdown reached zero.
    pub finished_card: Style,
    /// Label line.
    pub label: Style,
    /// State badge next to the label.
    pub badge: Style,
    /// Remaining time.
    pub readout: Style,
    /// Total duration under the remaining time.
    pub total: Style,
    /// Configuration field that receives digits.
    pub active_field: Style,
    /// The other configuration field.
    pub field: Style,
}

impl Default for Styles {
    fn default() -> Self {
        let frame = Style::new()
            .border_style(lipgloss::normal_border())
            .padding(0, 1, 0, 1);
        Self {
            card: frame.clone().border_foreground(Color::from("#444444")),
            focused_card: frame.clone().border_foreground(Color::from("#874BFD")),
            finished_card: frame.border_foreground(Color::from("#F25D94")),
            label: Style::new().bold(true),
            badge: Style::new().faint(true),
            readout: Style::new().bold(true),
            total: Style::new().faint(true),
            active_field: Style::new().reverse(true),
            field: Style::new().underline(true),
        }
    }
}

/// A single countdown timer.
///
/// A timer starts in [`TimerState::New`] with two editable fields, minutes and
/// seconds. Starting it computes the total and arms a one-second tick loop;
/// every tick takes one second off until the countdown reaches zero. The
/// timer then pauses itself, saves its durations under its grid index and
/// rings its [`Alert`] once.
///
/// # Message Filtering
///
/// Each scheduled [`TickMsg`] carries the timer's id and the generation tag
/// current when it was scheduled. Pausing, resetting, restarting and expiring
/// all move the tag on, so a tick scheduled before any of those is ignored.
/// A tick meant for another timer is ignored as well.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use timer_grid::prelude::*;
///
/// let alert = Arc::new(Counter::new());
/// let mut timer = Timer::new(0, Arc::new(MemoryStore::new()), alert.clone());
/// timer.set_minutes_input("0");
/// timer.set_seconds_input("2");
///
/// // Starting returns the command that schedules the first tick.
/// assert!(timer.start().is_some());
/// assert_eq!(timer.remaining_seconds(), 2);
///
/// // Deliver the scheduled ticks by hand instead of waiting for them.
/// while let Some(tick) = timer.pending_tick() {
///     timer.update(Box::new(tick));
/// }
/// assert_eq!(timer.state(), TimerState::Paused);
/// assert!(timer.finished());
/// assert_eq!(alert.count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Model {
    /// Interval between ticks. One second outside tests.
    pub interval: Duration,
    /// The tone rung when the countdown finishes.
    pub tone: Tone,
    /// Card colours.
    pub styles: Styles,

    index: usize,
    id: i64,
    tag: u64,
    label: String,
    state: TimerState,
    total_seconds: u64,
    remaining_seconds: u64,
    minutes_input: String,
    seconds_input: String,
    field: Field,
    label_editor: Option<LabelEditor>,
    saved: SavedDurations,
    size_class: SizeClass,
    width: usize,
    focus: bool,
    store: Arc<dyn Store>,
    alert: Arc<dyn Alert>,
}

impl Model {
    /// Creates the timer for grid slot `index`.
    ///
    /// The durations saved for this slot are read once here. A saved full
    /// duration pre-fills the minutes and seconds fields.
    pub fn new(index: usize, store: Arc<dyn Store>, alert: Arc<dyn Alert>) -> Self {
        let saved = store::load_durations(store.as_ref(), index);
        let (minutes_input, seconds_input) = if saved.full_time > 0 {
            (
                (saved.full_time / 60).min(MAX_MINUTES).to_string(),
                (saved.full_time % 60).to_string(),
            )
        } else {
            (String::new(), String::new())
        };
        tracing::debug!(index, ?saved, "created timer");

        Self {
            interval: TICK_INTERVAL,
            tone: Tone::default(),
            styles: Styles::default(),
            index,
            id: next_id(),
            tag: 0,
            label: format!("Timer {}", index + 1),
            state: TimerState::New,
            total_seconds: 0,
            remaining_seconds: 0,
            minutes_input,
            seconds_input,
            field: Field::Minutes,
            label_editor: None,
            saved,
            size_class: SizeClass::default(),
            width: 0,
            focus: false,
            store,
            alert,
        }
    }

    /// Position in the grid.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Process-unique id used to route ticks.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Current label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Current state.
    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Whether the countdown is running.
    pub fn running(&self) -> bool {
        self.state == TimerState::Running
    }

    /// Duration the timer was started with; 0 while `New`.
    pub fn total_seconds(&self) -> u64 {
        self.total_seconds
    }

    /// Seconds left; 0 while `New`.
    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    /// Whether the countdown ran out (paused at zero).
    pub fn finished(&self) -> bool {
        self.state == TimerState::Paused && self.remaining_seconds == 0
    }

    /// Durations read from the store when the timer was created.
    pub fn saved(&self) -> SavedDurations {
        self.saved
    }

    /// Text of the minutes field.
    pub fn minutes_input(&self) -> &str {
        &self.minutes_input
    }

    /// Text of the seconds field.
    pub fn seconds_input(&self) -> &str {
        &self.seconds_input
    }

    /// Field that currently receives digits.
    pub fn active_field(&self) -> Field {
        self.field
    }

    /// Replaces the minutes field.
    pub fn set_minutes_input(&mut self, text: impl Into<String>) {
        self.minutes_input = text.into();
    }

    /// Replaces the seconds field.
    pub fn set_seconds_input(&mut self, text: impl Into<String>) {
        self.seconds_input = text.into();
    }

    /// Moves input to the other configuration field.
    pub fn switch_field(&mut self) {
        self.field = match self.field {
            Field::Minutes => Field::Seconds,
            Field::Seconds => Field::Minutes,
        };
    }

    /// Appends a digit to the active field. Minutes take up to three digits,
    /// seconds two; other characters are ignored. Only meaningful while `New`.
    pub fn push_digit(&mut self, c: char) {
        if self.state != TimerState::New || !c.is_ascii_digit() {
            return;
        }
        let (text, limit) = match self.field {
            Field::Minutes => (&mut self.minutes_input, 3),
            Field::Seconds => (&mut self.seconds_input, 2),
        };
        if text.len() < limit {
            text.push(c);
        }
    }

    /// Removes the last digit of the active field.
    pub fn pop_digit(&mut self) {
        if self.state != TimerState::New {
            return;
        }
        match self.field {
            Field::Minutes => self.minutes_input.pop(),
            Field::Seconds => self.seconds_input.pop(),
        };
    }

    /// Starts a `New` timer from its configuration fields.
    pub fn start(&mut self) -> Option<Cmd> {
        let minutes = parse_field(&self.minutes_input, MAX_MINUTES);
        let seconds = parse_field(&self.seconds_input, MAX_SECONDS);
        self.start_with(minutes, seconds)
    }

    /// Starts a `New` timer for `minutes`:`seconds`. Values are clamped to
    /// [`MAX_MINUTES`] and [`MAX_SECONDS`]. Zero is allowed and finishes on
    /// the first tick. Does nothing in any other state.
    pub fn start_with(&mut self, minutes: u64, seconds: u64) -> Option<Cmd> {
        if self.state != TimerState::New {
            return None;
        }
        let total = minutes.min(MAX_MINUTES) * 60 + seconds.min(MAX_SECONDS);
        self.total_seconds = total;
        self.remaining_seconds = total;
        self.state = TimerState::Running;
        tracing::debug!(index = self.index, total, "timer started");
        Some(self.arm())
    }

    /// Pauses a running timer. The pending tick is invalidated.
    pub fn pause(&mut self) {
        if self.state != TimerState::Running {
            return;
        }
        self.state = TimerState::Paused;
        self.disarm();
        tracing::debug!(index = self.index, remaining = self.remaining_seconds, "timer paused");
    }

    /// Resumes a paused timer from where it stopped.
    pub fn resume(&mut self) -> Option<Cmd> {
        if self.state != TimerState::Paused {
            return None;
        }
        self.state = TimerState::Running;
        tracing::debug!(index = self.index, remaining = self.remaining_seconds, "timer resumed");
        Some(self.arm())
    }

    /// Returns a paused timer to `New`, clearing its durations and fields.
    /// A running timer has to be paused first.
    pub fn reset(&mut self) {
        if self.state != TimerState::Paused {
            return;
        }
        self.state = TimerState::New;
        self.total_seconds = 0;
        self.remaining_seconds = 0;
        self.minutes_input.clear();
        self.seconds_input.clear();
        self.field = Field::Minutes;
        self.disarm();
        tracing::debug!(index = self.index, "timer reset");
    }

    /// The primary action: start when `New`, pause when `Running`, resume
    /// when `Paused`.
    pub fn toggle(&mut self) -> Option<Cmd> {
        match self.state {
            TimerState::New => self.start(),
            TimerState::Running => {
                self.pause();
                None
            }
            TimerState::Paused => self.resume(),
        }
    }

    /// Whether the label is being edited.
    pub fn editing_label(&self) -> bool {
        self.label_editor.is_some()
    }

    /// Opens the label editor seeded with the current label.
    pub fn begin_label_edit(&mut self) {
        if self.label_editor.is_none() {
            self.label_editor = Some(LabelEditor::new(&self.label));
        }
    }

    /// The open label editor, if any.
    pub fn label_editor_mut(&mut self) -> Option<&mut LabelEditor> {
        self.label_editor.as_mut()
    }

    /// Takes the editor's text as the new label and closes the editor. Any
    /// text is accepted, including an empty one.
    pub fn commit_label_edit(&mut self) {
        if let Some(editor) = self.label_editor.take() {
            self.label = editor.value();
        }
    }

    /// Closes the editor and keeps the old label.
    pub fn cancel_label_edit(&mut self) {
        self.label_editor = None;
    }

    /// Replaces the label directly.
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// Sets the rendering hint.
    pub fn set_size_class(&mut self, size_class: SizeClass) {
        self.size_class = size_class;
    }

    /// Current rendering hint.
    pub fn size_class(&self) -> SizeClass {
        self.size_class
    }

    /// Sets the outer width of the card in cells; 0 sizes the card to fit.
    pub fn set_width(&mut self, width: usize) {
        self.width = width;
    }

    /// The tick the live loop is waiting for, or `None` when the timer is
    /// not running. Delivering it has the same effect as the runtime firing
    /// the scheduled tick.
    pub fn pending_tick(&self) -> Option<TickMsg> {
        self.running().then_some(TickMsg {
            id: self.id,
            tag: self.tag,
        })
    }

    /// Handles a message. Only this timer's current [`TickMsg`] has an effect;
    /// the returned command schedules the following tick.
    pub fn update(&mut self, msg: Msg) -> Option<Cmd> {
        let tick = msg.downcast_ref::<TickMsg>()?;
        if !self.running() || tick.id != self.id || tick.tag != self.tag {
            return None;
        }
        self.advance()
    }

    // Reaching zero expires in the same tick, so a running timer never shows
    // 0 : 00 and a one-second timer finishes after one tick.
    fn advance(&mut self) -> Option<Cmd> {
        if self.remaining_seconds > 0 {
            self.remaining_seconds -= 1;
            if self.remaining_seconds > 0 {
                return Some(self.tick());
            }
        }
        self.expire();
        None
    }

    fn expire(&mut self) {
        self.state = TimerState::Paused;
        self.disarm();
        tracing::info!(index = self.index, total = self.total_seconds, label = %self.label, "timer finished");
        store::save_durations(
            self.store.as_ref(),
            self.index,
            SavedDurations {
                seconds_left: self.remaining_seconds,
                full_time: self.total_seconds,
            },
        );
        self.alert.ring(&self.tone);
    }

    fn arm(&mut self) -> Cmd {
        self.tag = self.tag.wrapping_add(1);
        self.tick()
    }

    fn disarm(&mut self) {
        self.tag = self.tag.wrapping_add(1);
    }

    fn tick(&self) -> Cmd {
        let id = self.id;
        let tag = self.tag;
        bubbletea_tick(self.interval, move |_| Box::new(TickMsg { id, tag }) as Msg)
    }

    /// Renders the card.
    pub fn view(&self) -> String {
        let frame = if self.focus {
            &self.styles.focused_card
        } else if self.finished() {
            &self.styles.finished_card
        } else {
            &self.styles.card
        };

        let mut lines = vec![self.header_view(), String::new()];
        match self.state {
            TimerState::New => lines.push(self.fields_view()),
            TimerState::Running | TimerState::Paused => {
                lines.push(self.readout_view());
                lines.push(
                    self.styles
                        .total
                        .clone()
                        .inline(true)
                        .render(&format_clock(self.total_seconds)),
                );
            }
        }
        let body = lines.join("\n");

        let inner = self.inner_width(&body);
        let centered = body
            .lines()
            .map(|line| center(line, inner))
            .collect::<Vec<_>>()
            .join("\n");

        // Width covers content plus horizontal padding; the border sits outside.
        frame.clone().width((inner + 2) as i32).render(&centered)
    }

    fn inner_width(&self, body: &str) -> usize {
        let natural = body
            .lines()
            .map(lipgloss::width_visible)
            .max()
            .unwrap_or(0);
        if self.width >= 4 {
            (self.width - 4).max(1)
        } else {
            natural
        }
    }

    fn header_view(&self) -> String {
        let label = match &self.label_editor {
            Some(editor) => editor.view(),
            None => self.styles.label.clone().inline(true).render(&self.label),
        };
        let badge = match self.state {
            TimerState::New => "·",
            TimerState::Running => "▶",
            TimerState::Paused if self.finished() => "■",
            TimerState::Paused => "⏸",
        };
        format!(
            "{} {}",
            label,
            self.styles.badge.clone().inline(true).render(badge)
        )
    }

    fn fields_view(&self) -> String {
        let render = |text: &str, placeholder: &str, active: bool| {
            let shown = format!("{:>3}", if text.is_empty() { placeholder } else { text });
            let style = if active && self.focus {
                &self.styles.active_field
            } else {
                &self.styles.field
            };
            style.clone().inline(true).render(&shown)
        };
        format!(
            "{} : {}",
            render(&self.minutes_input, "0", self.field == Field::Minutes),
            render(&self.seconds_input, "00", self.field == Field::Seconds)
        )
    }

    fn readout_view(&self) -> String {
        let text = format_clock(self.remaining_seconds);
        let fits = |size: SizeClass| self.width == 0 || size.readout_width(&text) + 4 <= self.width;
        let readout = &self.styles.readout;
        match self.size_class {
            SizeClass::Large if fits(SizeClass::Large) => block_digits(&text),
            SizeClass::Large | SizeClass::Medium if fits(SizeClass::Medium) => {
                readout.clone().inline(true).render(&letter_spaced(&text))
            }
            SizeClass::Compact => text,
            _ => readout.clone().inline(true).render(&text),
        }
    }
}

impl Component for Model {
    fn focus(&mut self) -> Option<Cmd> {
        self.focus = true;
        None
    }

    fn blur(&mut self) {
        self.focus = false;
        self.cancel_label_edit();
    }

    fn focused(&self) -> bool {
        self.focus
    }
}

fn center(line: &str, width: usize) -> String {
    let w = lipgloss::width_visible(line);
    if w >= width {
        return line.to_string();
    }
    let left = (width - w) / 2;
    format!("{}{}{}", " ".repeat(left), line, " ".repeat(width - w - left))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::Counter;
    use crate::store::{full_time_key, seconds_left_key, MemoryStore};

    fn timer() -> (Model, Arc<Counter>, Arc<MemoryStore>) {
        let alert = Arc::new(Counter::new());
        let store = Arc::new(MemoryStore::new());
        let model = Model::new(0, store.clone(), alert.clone());
        (model, alert, store)
    }

    fn tick(model: &mut Model) -> Option<Cmd> {
        let msg = model.pending_tick().expect("timer should be running");
        model.update(Box::new(msg))
    }

    #[test]
    fn test_new_timer_defaults() {
        let (t, _, _) = timer();
        assert_eq!(t.state(), TimerState::New);
        assert_eq!(t.label(), "Timer 1");
        assert_eq!(t.total_seconds(), 0);
        assert_eq!(t.remaining_seconds(), 0);
        assert!(t.pending_tick().is_none());
        assert!(!t.editing_label());
    }

    #[test]
    fn test_unique_ids() {
        let (a, _, _) = timer();
        let (b, _, _) = timer();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_start_computes_total() {
        for (m, s) in [(0, 0), (0, 59), (1, 0), (7, 30), (120, 5)] {
            let (mut t, _, _) = timer();
            assert!(t.start_with(m, s).is_some());
            assert_eq!(t.state(), TimerState::Running);
            assert_eq!(t.total_seconds(), m * 60 + s);
            assert_eq!(t.remaining_seconds(), t.total_seconds());
        }
    }

    #[test]
    fn test_start_reads_fields() {
        let (mut t, _, _) = timer();
        t.set_minutes_input("2");
        t.set_seconds_input(" 5 ");
        t.start();
        assert_eq!(t.total_seconds(), 125);
    }

    #[test]
    fn test_invalid_fields_are_zero() {
        let (mut t, _, _) = timer();
        t.set_minutes_input("abc");
        t.set_seconds_input("");
        t.start();
        assert_eq!(t.state(), TimerState::Running);
        assert_eq!(t.total_seconds(), 0);
    }

    #[test]
    fn test_fields_are_clamped() {
        assert_eq!(parse_field("75", MAX_SECONDS), 59);
        assert_eq!(parse_field("5000", MAX_MINUTES), 999);
        assert_eq!(parse_field("-3", MAX_SECONDS), 0);
        assert_eq!(parse_field("1.5", MAX_SECONDS), 0);
    }

    #[test]
    fn test_tick_decrements() {
        let (mut t, alert, _) = timer();
        t.start_with(0, 10);
        let next = tick(&mut t);
        assert!(next.is_some());
        assert_eq!(t.remaining_seconds(), 9);
        assert_eq!(t.state(), TimerState::Running);
        assert_eq!(alert.count(), 0);
    }

    #[test]
    fn test_zero_duration_expires_on_first_tick() {
        let (mut t, alert, _) = timer();
        t.start_with(0, 0);
        assert!(tick(&mut t).is_none());
        assert_eq!(t.state(), TimerState::Paused);
        assert_eq!(t.remaining_seconds(), 0);
        assert_eq!(alert.count(), 1);
        assert!(t.finished());
    }

    #[test]
    fn test_two_second_scenario() {
        let (mut t, alert, store) = timer();
        t.set_minutes_input("0");
        t.set_seconds_input("2");
        t.start();

        tick(&mut t);
        assert_eq!(t.remaining_seconds(), 1);
        tick(&mut t);

        assert_eq!(t.state(), TimerState::Paused);
        assert_eq!(t.remaining_seconds(), 0);
        assert_eq!(t.total_seconds(), 2);
        assert_eq!(alert.count(), 1);
        assert_eq!(store.get(&full_time_key(0)).as_deref(), Some("2"));
        assert_eq!(store.get(&seconds_left_key(0)).as_deref(), Some("0"));

        let view = t.view();
        assert!(view.contains("0 : 02"));
    }

    #[test]
    fn test_pause_resume_preserves_remaining() {
        let (mut t, _, _) = timer();
        t.start_with(1, 0);
        tick(&mut t);
        tick(&mut t);
        t.pause();
        assert_eq!(t.state(), TimerState::Paused);
        assert_eq!(t.remaining_seconds(), 58);
        assert!(t.resume().is_some());
        assert_eq!(t.state(), TimerState::Running);
        assert_eq!(t.remaining_seconds(), 58);
        assert_eq!(t.total_seconds(), 60);
    }

    #[test]
    fn test_stale_tick_after_pause_is_ignored() {
        let (mut t, _, _) = timer();
        t.start_with(0, 30);
        let stale = t.pending_tick().unwrap();
        t.pause();
        assert!(t.update(Box::new(stale.clone())).is_none());
        assert_eq!(t.remaining_seconds(), 30);

        // Resuming arms a new generation; the old tick still does nothing.
        t.resume();
        assert!(t.update(Box::new(stale)).is_none());
        assert_eq!(t.remaining_seconds(), 30);
        tick(&mut t);
        assert_eq!(t.remaining_seconds(), 29);
    }

    #[test]
    fn test_stale_tick_after_reset_is_ignored() {
        let (mut t, _, _) = timer();
        t.start_with(0, 30);
        let stale = t.pending_tick().unwrap();
        t.pause();
        t.reset();
        assert_eq!(t.state(), TimerState::New);
        assert!(t.update(Box::new(stale.clone())).is_none());

        t.start_with(0, 5);
        assert!(t.update(Box::new(stale)).is_none());
        assert_eq!(t.remaining_seconds(), 5);
        assert_eq!(t.state(), TimerState::Running);
    }

    #[test]
    fn test_last_second_expires_in_same_tick() {
        let (mut t, alert, _) = timer();
        t.start_with(0, 1);
        assert!(tick(&mut t).is_none());
        assert_eq!(t.remaining_seconds(), 0);
        assert_eq!(t.state(), TimerState::Paused);
        assert_eq!(alert.count(), 1);
        assert!(t.pending_tick().is_none());
    }

    #[test]
    fn test_tick_for_other_timer_is_ignored() {
        let (mut a, _, _) = timer();
        let (mut b, _, _) = timer();
        a.start_with(0, 5);
        b.start_with(0, 5);
        let for_b = b.pending_tick().unwrap();
        assert!(a.update(Box::new(for_b)).is_none());
        assert_eq!(a.remaining_seconds(), 5);
    }

    #[test]
    fn test_unrelated_message_is_ignored() {
        let (mut t, _, _) = timer();
        t.start_with(0, 5);
        assert!(t.update(Box::new(42u32)).is_none());
        assert_eq!(t.remaining_seconds(), 5);
    }

    #[test]
    fn test_reset_only_from_paused() {
        let (mut t, _, _) = timer();
        t.start_with(0, 5);
        t.reset();
        assert_eq!(t.state(), TimerState::Running);

        t.pause();
        t.reset();
        assert_eq!(t.state(), TimerState::New);
        assert_eq!(t.total_seconds(), 0);
        assert_eq!(t.remaining_seconds(), 0);
        assert_eq!(t.minutes_input(), "");
        assert_eq!(t.seconds_input(), "");
    }

    #[test]
    fn test_restart_after_reset_uses_fresh_input() {
        let (mut t, _, _) = timer();
        t.start_with(3, 0);
        t.pause();
        t.reset();
        t.set_seconds_input("9");
        t.start();
        assert_eq!(t.total_seconds(), 9);
    }

    #[test]
    fn test_invalid_transitions_are_noops() {
        let (mut t, _, _) = timer();
        t.pause();
        assert_eq!(t.state(), TimerState::New);
        assert!(t.resume().is_none());
        assert_eq!(t.state(), TimerState::New);

        t.start_with(0, 3);
        assert!(t.start_with(1, 0).is_none());
        assert_eq!(t.total_seconds(), 3);
    }

    #[test]
    fn test_toggle_cycles_states() {
        let (mut t, _, _) = timer();
        t.set_seconds_input("4");
        assert!(t.toggle().is_some());
        assert_eq!(t.state(), TimerState::Running);
        assert!(t.toggle().is_none());
        assert_eq!(t.state(), TimerState::Paused);
        assert!(t.toggle().is_some());
        assert_eq!(t.state(), TimerState::Running);
    }

    #[test]
    fn test_digit_entry() {
        let (mut t, _, _) = timer();
        for c in ['1', '2', '3', '4', 'x'] {
            t.push_digit(c);
        }
        assert_eq!(t.minutes_input(), "123");
        t.switch_field();
        assert_eq!(t.active_field(), Field::Seconds);
        for c in ['4', '5', '6'] {
            t.push_digit(c);
        }
        assert_eq!(t.seconds_input(), "45");
        t.pop_digit();
        assert_eq!(t.seconds_input(), "4");
        t.start();
        assert_eq!(t.total_seconds(), 123 * 60 + 4);

        // Digits are ignored once the timer runs.
        t.push_digit('9');
        assert_eq!(t.seconds_input(), "4");
    }

    #[test]
    fn test_label_edit_commit() {
        let (mut t, _, _) = timer();
        t.begin_label_edit();
        assert!(t.editing_label());
        let editor = t.label_editor_mut().unwrap();
        assert_eq!(editor.value(), "Timer 1");
        editor.clear();
        editor.insert("Pasta");
        t.commit_label_edit();
        assert!(!t.editing_label());
        assert_eq!(t.label(), "Pasta");
    }

    #[test]
    fn test_label_edit_allows_empty() {
        let (mut t, _, _) = timer();
        t.begin_label_edit();
        t.label_editor_mut().unwrap().clear();
        t.commit_label_edit();
        assert_eq!(t.label(), "");
    }

    #[test]
    fn test_label_edit_cancel() {
        let (mut t, _, _) = timer();
        t.begin_label_edit();
        t.label_editor_mut().unwrap().insert("!!!");
        t.cancel_label_edit();
        assert_eq!(t.label(), "Timer 1");
    }

    #[test]
    fn test_label_edit_independent_of_countdown() {
        let (mut t, _, _) = timer();
        t.start_with(0, 3);
        t.begin_label_edit();
        tick(&mut t);
        assert_eq!(t.remaining_seconds(), 2);
        assert!(t.editing_label());
    }

    #[test]
    fn test_created_from_saved_durations() {
        let store = Arc::new(MemoryStore::new());
        store.set(&full_time_key(2), "150").unwrap();
        store.set(&seconds_left_key(2), "0").unwrap();
        let t = Model::new(2, store, Arc::new(Counter::new()));

        assert_eq!(t.label(), "Timer 3");
        assert_eq!(t.state(), TimerState::New);
        assert_eq!(t.total_seconds(), 0);
        assert_eq!(t.saved().full_time, 150);
        assert_eq!(t.minutes_input(), "2");
        assert_eq!(t.seconds_input(), "30");
    }

    #[test]
    fn test_view_new_shows_fields() {
        let (mut t, _, _) = timer();
        t.set_minutes_input("5");
        let view = t.view();
        assert!(view.contains("Timer 1"));
        assert!(view.contains("5"));
        assert!(view.contains(":"));
    }

    #[test]
    fn test_view_running_small() {
        let (mut t, _, _) = timer();
        t.set_size_class(SizeClass::Small);
        t.start_with(2, 5);
        let view = t.view();
        assert!(view.contains("2 : 05"));
    }

    #[test]
    fn test_view_large_uses_block_digits() {
        let (mut t, _, _) = timer();
        t.set_size_class(SizeClass::Large);
        t.start_with(1, 0);
        assert!(t.view().contains('█'));
        assert!(t.view().contains("1 : 00"));
    }

    #[test]
    fn test_view_respects_width() {
        let (mut t, _, _) = timer();
        t.set_size_class(SizeClass::Compact);
        t.set_width(30);
        t.start_with(0, 59);
        let view = t.view();
        assert!(view.contains("0 : 59"));
        let widths: Vec<usize> = view.lines().map(lipgloss::width_visible).collect();
        assert!(widths.iter().all(|w| *w == widths[0]));
        assert!(widths[0] >= 26 && widths[0] <= 32);
    }

    #[test]
    fn test_blur_cancels_label_edit() {
        let (mut t, _, _) = timer();
        t.focus();
        assert!(t.focused());
        t.begin_label_edit();
        t.blur();
        assert!(!t.focused());
        assert!(!t.editing_label());
    }
}
