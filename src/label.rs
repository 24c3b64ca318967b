//! Single-line editor for timer labels.
//!
//! The editor holds a copy of the label while it is being edited. The timer
//! only takes the text back when the edit is confirmed, so cancelling leaves
//! the old label untouched. Editing is grapheme aware: the cursor never lands
//! inside a combined character and backspace removes whole graphemes.

use bubbletea_rs::KeyMsg;
use crossterm::event::{KeyCode, KeyModifiers};
use lipgloss_extras::prelude::*;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Label editor state.
#[derive(Debug, Clone)]
pub struct LabelEditor {
    graphemes: Vec<String>,
    cursor: usize,
    cursor_style: Style,
}

impl LabelEditor {
    /// Opens an editor seeded with `label`, cursor at the end.
    pub fn new(label: &str) -> Self {
        let graphemes: Vec<String> = label.graphemes(true).map(str::to_string).collect();
        let cursor = graphemes.len();
        Self {
            graphemes,
            cursor,
            cursor_style: Style::new().reverse(true),
        }
    }

    /// Current text.
    pub fn value(&self) -> String {
        self.graphemes.concat()
    }

    /// Cursor position in graphemes.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Display width of the current text in terminal cells.
    pub fn width(&self) -> usize {
        self.value().width()
    }

    /// Inserts text at the cursor.
    pub fn insert(&mut self, text: &str) {
        for g in text.graphemes(true) {
            self.graphemes.insert(self.cursor, g.to_string());
            self.cursor += 1;
        }
    }

    /// Removes the grapheme before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.graphemes.remove(self.cursor);
        }
    }

    /// Removes the grapheme under the cursor.
    pub fn delete(&mut self) {
        if self.cursor < self.graphemes.len() {
            self.graphemes.remove(self.cursor);
        }
    }

    /// Clears the text.
    pub fn clear(&mut self) {
        self.graphemes.clear();
        self.cursor = 0;
    }

    /// Handles an editing key. Returns `false` for keys the editor does not
    /// use (enter and esc are left to the caller).
    pub fn handle_key(&mut self, key: &KeyMsg) -> bool {
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            if key.modifiers.contains(KeyModifiers::CONTROL) && key.key == KeyCode::Char('u') {
                self.clear();
                return true;
            }
            return false;
        }
        match key.key {
            KeyCode::Char(c) => {
                let mut buf = [0u8; 4];
                self.insert(c.encode_utf8(&mut buf));
            }
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.graphemes.len()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.graphemes.len(),
            _ => return false,
        }
        true
    }

    /// Renders the text with a block cursor.
    pub fn view(&self) -> String {
        let before = self.graphemes[..self.cursor].concat();
        let (under, after) = match self.graphemes.get(self.cursor) {
            Some(g) => (g.as_str(), self.graphemes[self.cursor + 1..].concat()),
            None => (" ", String::new()),
        };
        format!(
            "{}{}{}",
            before,
            self.cursor_style.clone().inline(true).render(under),
            after
        )
    }
}
