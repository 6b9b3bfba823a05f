//! Filter engine
//!
//! Case-insensitive substring match on the process name, applied to the
//! already-sorted rows so their order is kept.

use super::process::ProcessRecord;

/// Filter text plus whether the user is currently typing into it
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    text: String,
    editing: bool,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the whole filter text
    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn push_char(&mut self, c: char) {
        self.text.push(c);
    }

    pub fn backspace(&mut self) {
        self.text.pop();
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Check if filter has text
    pub fn is_active(&self) -> bool {
        !self.text.is_empty()
    }

    /// Check if the filter bar has keyboard focus
    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn start_editing(&mut self) {
        self.editing = true;
    }

    /// Leave the filter bar, keeping the text
    pub fn confirm(&mut self) {
        self.editing = false;
    }

    /// Leave the filter bar and drop the text
    pub fn cancel(&mut self) {
        self.editing = false;
        self.clear();
    }
}

/// Keep the records whose name contains `text`, ignoring case.
/// Empty text keeps everything.
pub fn apply_filter<'a>(records: Vec<&'a ProcessRecord>, text: &str) -> Vec<&'a ProcessRecord> {
    if text.is_empty() {
        return records;
    }
    let needle = text.to_lowercase();
    records
        .into_iter()
        .filter(|r| r.name.to_lowercase().contains(&needle))
        .collect()
}
