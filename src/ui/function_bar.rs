//! FunctionBar - key labels at the bottom of the screen
//!
//! - Keys (F4, F9, etc.) use FUNCTION_KEY color
//! - Labels (Filter, Kill, etc.) use FUNCTION_BAR color
//! - Labels are fixed 6-character width with trailing spaces
//! - No padding between key-label pairs

use super::crt::ColorElement;
use super::Crt;

/// Default function key labels (6-char fixed width with trailing spaces)
pub const DEFAULT_FUNCTIONS: [(&str, &str); 3] = [
    ("F4", "Filter"),
    ("F9", "Kill  "),
    ("F10", "Quit  "),
];

/// Function bar at the bottom of the screen
#[derive(Debug, Clone)]
pub struct FunctionBar {
    pub functions: Vec<(String, String)>,
}

impl FunctionBar {
    /// Create a new function bar with default labels
    pub fn new() -> Self {
        FunctionBar {
            functions: DEFAULT_FUNCTIONS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Create a simple Enter/Esc function bar
    pub fn new_enter_esc(enter_label: &str, esc_label: &str) -> Self {
        FunctionBar {
            functions: vec![
                ("Enter".to_string(), format!("{:6}", enter_label)),
                ("Esc".to_string(), format!("{:6}", esc_label)),
            ],
        }
    }

    /// Replace the label shown next to `key`
    pub fn set_label(&mut self, key: &str, label: &str) {
        if let Some(entry) = self.functions.iter_mut().find(|(k, _)| k == key) {
            entry.1 = format!("{:6}", label);
        }
    }

    /// Show whether a filter is active, the way the F4 label does
    pub fn update_filter_label(&mut self, filter_active: bool) {
        self.set_label("F4", if filter_active { "FILTER" } else { "Filter" });
    }

    /// Total width of all key-label pairs
    pub fn width(&self) -> usize {
        self.functions
            .iter()
            .map(|(k, l)| k.chars().count() + l.chars().count())
            .sum()
    }

    /// Draw the function bar and return the ending x position, so callers
    /// can append content (like the filter prompt) after it
    pub fn draw(&self, crt: &Crt, y: i32) -> i32 {
        let width = crt.width();
        let bar_color = crt.color(ColorElement::FunctionBar);
        let key_color = crt.color(ColorElement::FunctionKey);

        crt.fill_line(y, bar_color);

        let mut x = 0i32;
        for (key, label) in &self.functions {
            if x >= width {
                break;
            }
            crt.print_at(y, x, key_color, key);
            x += key.chars().count() as i32;
            crt.print_at(y, x, bar_color, label);
            x += label.chars().count() as i32;
        }
        x
    }
}

impl Default for FunctionBar {
    fn default() -> Self {
        FunctionBar::new()
    }
}
