//! The timer grid application model.
//!
//! [`App`] implements the bubbletea-rs `Model` trait. It owns the [`Grid`],
//! turns key presses into timer operations for the focused card, edits the two
//! grid settings, and renders a status line, the cards and the help bar.
//!
//! Keys go to the first of these that wants them:
//!
//! 1. `ctrl+c` always quits.
//! 2. An open setting field (timer count or timers per row) takes digits,
//!    `enter` applies the value through the grid, `esc` cancels.
//! 3. An open label editor takes text, `enter` commits, `esc` cancels.
//! 4. Otherwise the normal bindings apply to the focused timer.
//!
//! `bubbletea_rs::Model::init` takes no arguments, so the binary hands the
//! startup [`Settings`] over with [`configure`] before starting the program.

use crate::alert::{Alert, Silent};
use crate::grid::{Grid, DEFAULT_TIMERS_PER_ROW, DEFAULT_TIMER_COUNT};
use crate::help;
use crate::key::{Binding, KeyMap};
use crate::store::{MemoryStore, Store};
use crate::timer::{TickMsg, TimerState};
use bubbletea_rs::{quit, Cmd, KeyMsg, Model as BubbleTeaModel, Msg, WindowSizeMsg};
use crossterm::event::{KeyCode, KeyModifiers};
use lipgloss_extras::prelude::*;
use std::sync::{Arc, OnceLock};

/// Startup settings for the application.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Initial number of timers.
    pub timer_count: usize,
    /// Initial timers per row.
    pub timers_per_row: usize,
    /// Where finished durations are kept.
    pub store: Arc<dyn Store>,
    /// What plays the alert.
    pub alert: Arc<dyn Alert>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timer_count: DEFAULT_TIMER_COUNT,
            timers_per_row: DEFAULT_TIMERS_PER_ROW,
            store: Arc::new(MemoryStore::new()),
            alert: Arc::new(Silent),
        }
    }
}

static SETTINGS: OnceLock<Settings> = OnceLock::new();

/// Registers the settings [`App::init`] starts from. Only the first call has
/// an effect; returns whether this call was it.
pub fn configure(settings: Settings) -> bool {
    SETTINGS.set(settings).is_ok()
}

/// One of the two grid settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    /// Number of timers.
    TimerCount,
    /// Timers per row.
    TimersPerRow,
}

#[derive(Debug, Clone)]
struct SettingInput {
    target: Setting,
    buffer: String,
}

/// Key bindings of the application.
#[derive(Debug, Clone)]
pub struct Keys {
    /// Focus the timer above.
    pub up: Binding,
    /// Focus the timer below.
    pub down: Binding,
    /// Focus the previous timer.
    pub left: Binding,
    /// Focus the next timer.
    pub right: Binding,
    /// Focus the next timer, wrapping rows.
    pub next: Binding,
    /// Focus the previous timer, wrapping rows.
    pub prev: Binding,
    /// Start, pause or resume the focused timer.
    pub toggle: Binding,
    /// Reset the focused timer.
    pub reset: Binding,
    /// Switch between the minutes and seconds field.
    pub switch_field: Binding,
    /// Edit the focused timer's label.
    pub edit_label: Binding,
    /// Edit the number of timers.
    pub timer_count: Binding,
    /// Edit the number of timers per row.
    pub timers_per_row: Binding,
    /// Confirm an edit.
    pub confirm: Binding,
    /// Cancel an edit.
    pub cancel: Binding,
    /// Toggle the full help.
    pub help: Binding,
    /// Quit.
    pub quit: Binding,
    /// Quit from anywhere.
    pub force_quit: Binding,
    editing: bool,
}

impl Default for Keys {
    fn default() -> Self {
        Self {
            up: Binding::new(vec![KeyCode::Up, KeyCode::Char('k')]).with_help("↑/k", "up"),
            down: Binding::new(vec![KeyCode::Down, KeyCode::Char('j')]).with_help("↓/j", "down"),
            left: Binding::new(vec![KeyCode::Left, KeyCode::Char('h')]).with_help("←/h", "left"),
            right: Binding::new(vec![KeyCode::Right, KeyCode::Char('l')])
                .with_help("→/l", "right"),
            next: Binding::new(vec![KeyCode::Tab]).with_help("tab", "next"),
            prev: Binding::new(vec![KeyCode::BackTab]).with_help("shift+tab", "prev"),
            toggle: Binding::new(vec![KeyCode::Char(' '), KeyCode::Enter])
                .with_help("space", "start"),
            reset: Binding::new(vec![KeyCode::Char('r')]).with_help("r", "reset"),
            switch_field: Binding::new(vec![KeyCode::Char(':')]).with_help(":", "min/sec"),
            edit_label: Binding::new(vec![KeyCode::Char('e')]).with_help("e", "rename"),
            timer_count: Binding::new(vec![KeyCode::Char('c')]).with_help("c", "timers"),
            timers_per_row: Binding::new(vec![KeyCode::Char('w')]).with_help("w", "per row"),
            confirm: Binding::new(vec![KeyCode::Enter]).with_help("enter", "confirm"),
            cancel: Binding::new(vec![KeyCode::Esc]).with_help("esc", "cancel"),
            help: Binding::new(vec![KeyCode::Char('?')]).with_help("?", "help"),
            quit: Binding::new(vec![KeyCode::Char('q')]).with_help("q", "quit"),
            force_quit: Binding::new(vec![(KeyCode::Char('c'), KeyModifiers::CONTROL)])
                .with_help("ctrl+c", "force quit"),
            editing: false,
        }
    }
}

impl Keys {
    /// Enables the bindings that apply to a focused timer in `state`.
    pub fn sync(&mut self, state: TimerState, editing: bool) {
        self.editing = editing;
        let desc = match state {
            TimerState::New => "start",
            TimerState::Running => "pause",
            TimerState::Paused => "resume",
        };
        self.toggle.set_help("space", desc);
        self.reset.set_enabled(state == TimerState::Paused);
        self.switch_field.set_enabled(state == TimerState::New);
    }
}

impl KeyMap for Keys {
    fn short_help(&self) -> Vec<&Binding> {
        if self.editing {
            return vec![&self.confirm, &self.cancel];
        }
        vec![
            &self.toggle,
            &self.reset,
            &self.switch_field,
            &self.edit_label,
            &self.help,
            &self.quit,
        ]
    }

    fn full_help(&self) -> Vec<Vec<&Binding>> {
        if self.editing {
            return vec![vec![&self.confirm, &self.cancel]];
        }
        vec![
            vec![&self.up, &self.down, &self.left, &self.right, &self.next],
            vec![&self.toggle, &self.reset, &self.switch_field, &self.edit_label],
            vec![&self.timer_count, &self.timers_per_row],
            vec![&self.help, &self.quit, &self.force_quit],
        ]
    }
}

/// The application model.
///
/// `App` is what the binary hands to `bubbletea_rs::Program`. It can also be
/// driven directly by feeding it messages, which is how it is tested.
///
/// # Examples
///
/// ```rust
/// use bubbletea_rs::{KeyMsg, Model as _};
/// use crossterm::event::{KeyCode, KeyModifiers};
/// use timer_grid::prelude::*;
///
/// let mut app = App::new(Settings::default());
/// for c in ['1', ' '] {
///     app.update(Box::new(KeyMsg {
///         key: KeyCode::Char(c),
///         modifiers: KeyModifiers::NONE,
///     }));
/// }
/// assert_eq!(app.grid().focused().state(), TimerState::Running);
/// assert_eq!(app.grid().focused().total_seconds(), 60);
/// assert!(app.view().contains("pause"));
/// ```
#[derive(Debug)]
pub struct App {
    /// Key bindings.
    pub keys: Keys,
    /// Help bar.
    pub help: help::Model,
    grid: Grid,
    setting: Option<SettingInput>,
    title_style: Style,
    status_style: Style,
    active_setting_style: Style,
}

impl App {
    /// Creates the application from startup settings.
    pub fn new(settings: Settings) -> Self {
        let grid = Grid::new(
            settings.timer_count,
            settings.timers_per_row,
            settings.store,
            settings.alert,
        );
        let mut app = Self {
            keys: Keys::default(),
            help: help::Model::new(),
            grid,
            setting: None,
            title_style: Style::new().bold(true).foreground(Color::from("#874BFD")),
            status_style: Style::new().faint(true),
            active_setting_style: Style::new().reverse(true),
        };
        app.sync_keys();
        app
    }

    /// The grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The grid, mutably.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    /// The setting being edited, if any.
    pub fn editing_setting(&self) -> Option<Setting> {
        self.setting.as_ref().map(|s| s.target)
    }

    fn sync_keys(&mut self) {
        let timer = self.grid.focused();
        let editing = self.setting.is_some() || timer.editing_label();
        let state = timer.state();
        self.keys.sync(state, editing);
    }

    fn handle_key(&mut self, key: &KeyMsg) -> Option<Cmd> {
        if self.keys.force_quit.matches(key) {
            return Some(quit());
        }
        if self.setting.is_some() {
            self.handle_setting_key(key);
            return None;
        }
        if self.grid.focused().editing_label() {
            self.handle_label_key(key);
            return None;
        }

        let keys = &self.keys;
        if keys.quit.matches(key) {
            return Some(quit());
        }
        if keys.help.matches(key) {
            self.help.toggle();
        } else if keys.up.matches(key) {
            self.grid.focus_up();
        } else if keys.down.matches(key) {
            self.grid.focus_down();
        } else if keys.left.matches(key) || keys.prev.matches(key) {
            self.grid.focus_prev();
        } else if keys.right.matches(key) || keys.next.matches(key) {
            self.grid.focus_next();
        } else if keys.toggle.matches(key) {
            return self.grid.focused_mut().toggle();
        } else if keys.reset.matches(key) {
            self.grid.focused_mut().reset();
        } else if keys.switch_field.matches(key) {
            self.grid.focused_mut().switch_field();
        } else if keys.edit_label.matches(key) {
            self.grid.focused_mut().begin_label_edit();
        } else if keys.timer_count.matches(key) {
            self.open_setting(Setting::TimerCount);
        } else if keys.timers_per_row.matches(key) {
            self.open_setting(Setting::TimersPerRow);
        } else if let KeyCode::Char(c) = key.key {
            self.grid.focused_mut().push_digit(c);
        } else if key.key == KeyCode::Backspace {
            self.grid.focused_mut().pop_digit();
        }
        None
    }

    fn handle_label_key(&mut self, key: &KeyMsg) {
        let timer = self.grid.focused_mut();
        if self.keys.confirm.matches(key) {
            timer.commit_label_edit();
        } else if self.keys.cancel.matches(key) {
            timer.cancel_label_edit();
        } else if let Some(editor) = timer.label_editor_mut() {
            editor.handle_key(key);
        }
    }

    fn open_setting(&mut self, target: Setting) {
        let current = match target {
            Setting::TimerCount => self.grid.timer_count(),
            Setting::TimersPerRow => self.grid.timers_per_row(),
        };
        self.setting = Some(SettingInput {
            target,
            buffer: current.to_string(),
        });
    }

    fn handle_setting_key(&mut self, key: &KeyMsg) {
        if self.keys.confirm.matches(key) {
            if let Some(input) = self.setting.take() {
                self.apply_setting(input.target, &input.buffer);
            }
            return;
        }
        if self.keys.cancel.matches(key) {
            self.setting = None;
            return;
        }
        let Some(input) = self.setting.as_mut() else {
            return;
        };
        match key.key {
            KeyCode::Char(c) if c.is_ascii_digit() && input.buffer.len() < 4 => {
                input.buffer.push(c);
            }
            KeyCode::Backspace => {
                input.buffer.pop();
            }
            _ => {}
        }
    }

    /// Applies a typed setting value. Values that do not parse or that the
    /// grid rejects leave everything as it was.
    pub fn apply_setting(&mut self, target: Setting, value: &str) {
        let Ok(n) = value.trim().parse::<usize>() else {
            tracing::debug!(?target, value, "ignored non-numeric setting");
            return;
        };
        let result = match target {
            Setting::TimerCount => self.grid.set_timer_count(n),
            Setting::TimersPerRow => self.grid.set_timers_per_row(n),
        };
        if let Err(err) = result {
            tracing::debug!(?target, error = %err, "rejected grid setting");
        }
        self.sync_keys();
    }

    fn status_view(&self) -> String {
        let field = |target: Setting, value: usize| match &self.setting {
            Some(input) if input.target == target => self
                .active_setting_style
                .clone()
                .inline(true)
                .render(&format!("{:>2}", input.buffer)),
            _ => format!("{:>2}", value),
        };
        let running = self.grid.timers().iter().filter(|t| t.running()).count();
        format!(
            "{}  {}",
            self.title_style.clone().inline(true).render("Timers"),
            self.status_style.clone().inline(true).render(&format!(
                "count {} · per row {} · {} running",
                field(Setting::TimerCount, self.grid.timer_count()),
                field(Setting::TimersPerRow, self.grid.timers_per_row()),
                running
            ))
        )
    }
}

impl BubbleTeaModel for App {
    fn init() -> (Self, Option<Cmd>) {
        let settings = SETTINGS.get().cloned().unwrap_or_default();
        (App::new(settings), None)
    }

    fn update(&mut self, msg: Msg) -> Option<Cmd> {
        if let Some(size) = msg.downcast_ref::<WindowSizeMsg>() {
            self.grid.set_width(size.width as usize);
            self.help.width = size.width as usize;
            return None;
        }

        let cmd = if msg.downcast_ref::<TickMsg>().is_some() {
            self.grid.update(msg)
        } else if let Some(key) = msg.downcast_ref::<KeyMsg>() {
            self.handle_key(key)
        } else {
            None
        };
        self.sync_keys();
        cmd
    }

    fn view(&self) -> String {
        format!(
            "{}\n\n{}\n\n{}",
            self.status_view(),
            self.grid.view(),
            self.help.view(&self.keys)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::Counter;

    fn app(count: usize, per_row: usize) -> (App, Arc<Counter>) {
        let alert = Arc::new(Counter::new());
        let app = App::new(Settings {
            timer_count: count,
            timers_per_row: per_row,
            store: Arc::new(MemoryStore::new()),
            alert: alert.clone(),
        });
        (app, alert)
    }

    fn press(app: &mut App, code: KeyCode) -> Option<Cmd> {
        app.update(Box::new(KeyMsg {
            key: code,
            modifiers: KeyModifiers::NONE,
        }))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn deliver_tick(app: &mut App, index: usize) -> Option<Cmd> {
        let tick = app.grid().timer(index).unwrap().pending_tick().unwrap();
        app.update(Box::new(tick))
    }

    #[test]
    fn test_start_from_keyboard() {
        let (mut app, alert) = app(4, 2);
        type_text(&mut app, "0:2");
        assert_eq!(app.grid().focused().minutes_input(), "0");
        assert_eq!(app.grid().focused().seconds_input(), "2");

        assert!(press(&mut app, KeyCode::Char(' ')).is_some());
        assert_eq!(app.grid().focused().state(), TimerState::Running);
        assert_eq!(app.keys.toggle.help().desc, "pause");

        deliver_tick(&mut app, 0);
        deliver_tick(&mut app, 0);
        let t = app.grid().focused();
        assert_eq!(t.state(), TimerState::Paused);
        assert_eq!(t.total_seconds(), 2);
        assert_eq!(alert.count(), 1);
        assert!(app.keys.reset.enabled());
    }

    #[test]
    fn test_pause_resume_reset_keys() {
        let (mut app, _) = app(1, 1);
        type_text(&mut app, "1");
        press(&mut app, KeyCode::Enter);
        deliver_tick(&mut app, 0);

        // A running timer ignores reset.
        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.grid().focused().state(), TimerState::Running);

        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.grid().focused().state(), TimerState::Paused);
        assert_eq!(app.grid().focused().remaining_seconds(), 59);

        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.grid().focused().state(), TimerState::Running);
        assert_eq!(app.grid().focused().remaining_seconds(), 59);

        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.grid().focused().state(), TimerState::New);
        assert!(!app.keys.reset.enabled());
    }

    #[test]
    fn test_rename_with_letters_that_are_bindings() {
        let (mut app, _) = app(2, 2);
        press(&mut app, KeyCode::Char('e'));
        assert!(app.grid().focused().editing_label());
        assert_eq!(app.keys.short_help().len(), 2);

        for _ in 0.."Timer 1".len() {
            press(&mut app, KeyCode::Backspace);
        }
        assert!(press(&mut app, KeyCode::Char('q')).is_none());
        type_text(&mut app, "ueue");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.grid().focused().label(), "queue");
        assert!(!app.grid().focused().editing_label());
    }

    #[test]
    fn test_rename_cancel() {
        let (mut app, _) = app(2, 2);
        press(&mut app, KeyCode::Char('e'));
        type_text(&mut app, "xyz");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.grid().focused().label(), "Timer 1");
    }

    #[test]
    fn test_edit_timer_count() {
        let (mut app, _) = app(4, 2);
        press(&mut app, KeyCode::Char('c'));
        assert_eq!(app.editing_setting(), Some(Setting::TimerCount));
        press(&mut app, KeyCode::Backspace);
        type_text(&mut app, "6");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.editing_setting(), None);
        assert_eq!(app.grid().timer_count(), 6);
    }

    #[test]
    fn test_rejected_settings_leave_grid() {
        let (mut app, _) = app(3, 2);
        app.apply_setting(Setting::TimersPerRow, "5");
        assert_eq!(app.grid().timers_per_row(), 2);
        app.apply_setting(Setting::TimerCount, "1");
        assert_eq!(app.grid().timer_count(), 3);
        app.apply_setting(Setting::TimerCount, "lots");
        assert_eq!(app.grid().timer_count(), 3);
        app.apply_setting(Setting::TimerCount, "0");
        assert_eq!(app.grid().timer_count(), 3);
    }

    #[test]
    fn test_setting_cancel() {
        let (mut app, _) = app(4, 2);
        press(&mut app, KeyCode::Char('w'));
        type_text(&mut app, "1");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.grid().timers_per_row(), 2);
    }

    #[test]
    fn test_navigation_keys() {
        let (mut app, _) = app(4, 2);
        press(&mut app, KeyCode::Char('l'));
        assert_eq!(app.grid().focused_index(), 1);
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.grid().focused_index(), 3);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.grid().focused_index(), 2);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.grid().focused_index(), 0);
    }

    #[test]
    fn test_quit_keys() {
        let (mut app, _) = app(1, 1);
        assert!(press(&mut app, KeyCode::Char('q')).is_some());
        let force = app.update(Box::new(KeyMsg {
            key: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
        }));
        assert!(force.is_some());
    }

    #[test]
    fn test_window_size_sets_card_width() {
        let (mut app, _) = app(4, 2);
        app.update(Box::new(WindowSizeMsg {
            width: 81,
            height: 30,
        }));
        assert_eq!(app.grid().card_width(), 40);
        assert_eq!(app.help.width, 81);
    }

    #[test]
    fn test_help_toggle_and_view() {
        let (mut app, _) = app(2, 2);
        let view = app.view();
        assert!(view.contains("Timer 1"));
        assert!(view.contains("start"));
        press(&mut app, KeyCode::Char('?'));
        assert!(app.help.show_all);
        assert!(app.view().contains("per row"));
    }
}
