//! RichString - text with per-character attributes
//!
//! Table rows and the header are built up cell by cell, each cell in its own
//! color, then written to the screen in one pass.

use ncurses::{attr_t, A_NORMAL};

use super::Crt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RichChar {
    pub ch: char,
    pub attr: attr_t,
}

#[derive(Debug, Clone, Default)]
pub struct RichString {
    chars: Vec<RichChar>,
}

impl RichString {
    pub fn new() -> Self {
        RichString { chars: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Append a string with attributes
    pub fn append(&mut self, text: &str, attr: attr_t) {
        self.chars
            .extend(text.chars().map(|ch| RichChar { ch, attr }));
    }

    /// Append a character repeated n times
    #[cfg(test)]
    pub fn append_chr(&mut self, ch: char, attr: attr_t, n: usize) {
        self.chars
            .extend(std::iter::repeat(RichChar { ch, attr }).take(n));
    }

    /// Override every character's attribute (selection highlight)
    pub fn set_all_attr(&mut self, attr: attr_t) {
        for rc in &mut self.chars {
            rc.attr = attr;
        }
    }

    pub fn text(&self) -> String {
        self.chars.iter().map(|rc| rc.ch).collect()
    }

    #[cfg(test)]
    pub fn attr_at(&self, index: usize) -> Option<attr_t> {
        self.chars.get(index).map(|rc| rc.attr)
    }

    pub fn last_char(&self) -> Option<char> {
        self.chars.last().map(|rc| rc.ch)
    }

    /// Remove n characters from the end
    pub fn rewind(&mut self, n: usize) {
        let new_len = self.chars.len().saturating_sub(n);
        self.chars.truncate(new_len);
    }

    /// Write exactly `width` cells at (y, x): truncated if longer, padded
    /// with spaces in the last attribute if shorter
    pub fn write_at_width(&self, crt: &Crt, y: i32, x: i32, width: usize) {
        let mut current_attr = A_NORMAL;
        crt.mv(y, x);
        crt.attrset(current_attr);

        let mut buf = String::new();
        for rc in self.chars.iter().take(width) {
            if rc.attr != current_attr {
                if !buf.is_empty() {
                    crt.addstr_raw(&buf);
                    buf.clear();
                }
                current_attr = rc.attr;
                crt.attrset(current_attr);
            }
            buf.push(rc.ch);
        }
        if !buf.is_empty() {
            crt.addstr_raw(&buf);
        }

        for _ in self.chars.len()..width {
            crt.addch_raw(' ' as u32);
        }
        crt.attrset(A_NORMAL);
    }
}
