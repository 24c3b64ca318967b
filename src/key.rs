//! Type-safe key bindings with help text.
//!
//! A [`Binding`] groups the key presses that trigger one action together with
//! the short text shown for it in the help bar. Components expose their
//! bindings through the [`KeyMap`] trait so the [`help`](crate::help) view can
//! render them.
//!
//! ```rust
//! use timer_grid::key::Binding;
//! use crossterm::event::{KeyCode, KeyModifiers};
//!
//! let start = Binding::new(vec![KeyCode::Char(' '), KeyCode::Enter])
//!     .with_help("space", "start/pause");
//! let quit = Binding::new(vec![(KeyCode::Char('c'), KeyModifiers::CONTROL)])
//!     .with_help("ctrl+c", "quit");
//!
//! assert_eq!(start.help().key, "space");
//! assert!(quit.enabled());
//! ```

use bubbletea_rs::KeyMsg;
use crossterm::event::{KeyCode, KeyModifiers};

/// A single key press: a key code plus the modifiers that must be held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    /// The key.
    pub code: KeyCode,
    /// Required modifiers. `NONE` accepts any combination of shift.
    pub modifiers: KeyModifiers,
}

impl From<KeyCode> for KeyPress {
    fn from(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }
}

impl From<(KeyCode, KeyModifiers)> for KeyPress {
    fn from((code, modifiers): (KeyCode, KeyModifiers)) -> Self {
        Self { code, modifiers }
    }
}

impl KeyPress {
    fn matches(&self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        if self.code != key {
            return false;
        }
        if self.modifiers.is_empty() {
            // Shift is already folded into the character for printable keys.
            return !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
        }
        modifiers.contains(self.modifiers)
    }
}

/// Help text for a binding: the key label and what it does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Help {
    /// Key label, e.g. `"space"` or `"↑/k"`.
    pub key: String,
    /// Short description, e.g. `"pause"`.
    pub desc: String,
}

/// A set of key presses bound to one action.
#[derive(Debug, Clone)]
pub struct Binding {
    keys: Vec<KeyPress>,
    help: Help,
    disabled: bool,
}

impl Binding {
    /// Creates a binding for the given keys.
    pub fn new<K: Into<KeyPress>>(keys: Vec<K>) -> Self {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            help: Help::default(),
            disabled: false,
        }
    }

    /// Sets the help key label and description.
    pub fn with_help(mut self, key: impl Into<String>, desc: impl Into<String>) -> Self {
        self.help = Help {
            key: key.into(),
            desc: desc.into(),
        };
        self
    }

    /// Replaces the help text in place.
    pub fn set_help(&mut self, key: impl Into<String>, desc: impl Into<String>) {
        self.help = Help {
            key: key.into(),
            desc: desc.into(),
        };
    }

    /// Marks the binding as disabled.
    pub fn with_disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Enables or disables the binding in place.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.disabled = !enabled;
    }

    /// Whether the binding is active. Disabled bindings never match and are
    /// hidden from help.
    pub fn enabled(&self) -> bool {
        !self.disabled && !self.keys.is_empty()
    }

    /// The help text for this binding.
    pub fn help(&self) -> &Help {
        &self.help
    }

    /// Reports whether `msg` triggers this binding.
    pub fn matches(&self, msg: &KeyMsg) -> bool {
        self.enabled()
            && self
                .keys
                .iter()
                .any(|press| press.matches(msg.key, msg.modifiers))
    }
}

/// Something that exposes key bindings for help rendering.
pub trait KeyMap {
    /// Bindings for the one-line help bar.
    fn short_help(&self) -> Vec<&Binding>;
    /// Bindings grouped into columns for the expanded help view.
    fn full_help(&self) -> Vec<Vec<&Binding>>;
}
