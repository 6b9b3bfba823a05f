//! Dynamic column widths for the process table
//!
//! Numeric columns size themselves from their content:
//! - PID: width based on max PID value (min 5 digits)
//! - CPU %/Memory MB: grow to the widest value seen, never shrink
//! - User: widest account name, capped
//!
//! Name and Parent share whatever screen width is left.

use super::process::{Column, ProcessRecord};

/// Minimum width for the PID column
pub const MIN_PID_DIGITS: usize = 5;
/// Maximum width for the PID column
pub const MAX_PID_DIGITS: usize = 19;

/// Cap for the user column; longer names are truncated
pub const MAX_USER_WIDTH: usize = 12;

/// Smallest width Name/Parent are squeezed to on narrow terminals
const MIN_TEXT_WIDTH: usize = 6;

/// Name gets this share of the flexible width, Parent the rest
const NAME_SHARE_PERCENT: usize = 55;

#[derive(Debug, Clone)]
pub struct FieldWidths {
    pub pid_digits: usize,
    pub user_width: usize,
    pub cpu_width: usize,
    pub memory_width: usize,
}

impl Default for FieldWidths {
    fn default() -> Self {
        Self {
            pid_digits: MIN_PID_DIGITS,
            user_width: Column::User.title().len(),
            cpu_width: Column::Cpu.title().len(),
            memory_width: Column::Memory.title().len(),
        }
    }
}

impl FieldWidths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update PID column width based on max PID value
    /// Returns true if the width changed
    pub fn set_pid_width(&mut self, max_pid: i32) -> bool {
        let old = self.pid_digits;
        let digits = count_digits(max_pid.max(0) as u64);
        self.pid_digits = digits.clamp(MIN_PID_DIGITS, MAX_PID_DIGITS);
        self.pid_digits != old
    }

    /// Recompute content-driven widths from the rows about to be drawn
    pub fn update(&mut self, rows: &[&ProcessRecord]) {
        let max_pid = rows.iter().map(|r| r.pid).max().unwrap_or(0);
        self.set_pid_width(max_pid);

        let user = rows.iter().map(|r| text_width(&r.user)).max().unwrap_or(0);
        self.user_width = user.clamp(Column::User.title().len(), MAX_USER_WIDTH);

        // Only expand, never shrink, so the table does not jitter
        let cpu = rows.iter().map(|r| text_width(&r.cpu.display)).max().unwrap_or(0);
        self.cpu_width = self.cpu_width.max(cpu);
        let mem = rows
            .iter()
            .map(|r| text_width(&r.memory.display))
            .max()
            .unwrap_or(0);
        self.memory_width = self.memory_width.max(mem);
    }

    /// Widths of all six columns (excluding the one-space separator) for a
    /// screen `screen_width` cells wide
    pub fn layout(&self, screen_width: usize) -> [usize; 6] {
        let fixed = self.pid_digits + self.user_width + self.cpu_width + self.memory_width;
        // One separator after each column
        let used = fixed + Column::ALL.len();
        let flexible = screen_width.saturating_sub(used).max(MIN_TEXT_WIDTH * 2);
        let name = flexible * NAME_SHARE_PERCENT / 100;
        let parent = flexible - name;

        let mut widths = [0; 6];
        for (slot, column) in widths.iter_mut().zip(Column::ALL) {
            *slot = match column {
                Column::Pid => self.pid_digits,
                Column::User => self.user_width,
                Column::Name => name,
                Column::Parent => parent,
                Column::Cpu => self.cpu_width,
                Column::Memory => self.memory_width,
            };
        }
        widths
    }
}

/// Pad or truncate `text` to exactly `width` cells
pub fn fit(text: &str, width: usize, right_align: bool) -> String {
    let len = text_width(text);
    if len > width {
        return text.chars().take(width).collect();
    }
    if right_align {
        format!("{:>width$}", text, width = width)
    } else {
        format!("{:<width$}", text, width = width)
    }
}

fn text_width(s: &str) -> usize {
    s.chars().count()
}

/// Count the number of decimal digits needed to represent a number
fn count_digits(n: u64) -> usize {
    if n == 0 {
        return 1;
    }
    let mut count = 0;
    let mut val = n;
    while val > 0 {
        count += 1;
        val /= 10;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_digits() {
        assert_eq!(count_digits(0), 1);
        assert_eq!(count_digits(9), 1);
        assert_eq!(count_digits(10), 2);
        assert_eq!(count_digits(99999), 5);
        assert_eq!(count_digits(100000), 6);
    }

    #[test]
    fn test_pid_width() {
        let mut fw = FieldWidths::new();
        assert_eq!(fw.pid_digits, 5);

        // Small PIDs should keep min width
        assert!(!fw.set_pid_width(1000));
        assert_eq!(fw.pid_digits, 5);

        // Large PIDs should expand
        assert!(fw.set_pid_width(4194304));
        assert_eq!(fw.pid_digits, 7);
    }

    #[test]
    fn test_update_never_shrinks_metrics() {
        let wide = ProcessRecord::new(1, "root", "a", "b", "1234.56 %", "123456.7 MB");
        let narrow = ProcessRecord::new(2, "root", "a", "b", "1.00 %", "1.0 MB");
        let mut fw = FieldWidths::new();

        fw.update(&[&wide]);
        assert_eq!(fw.cpu_width, 9);
        assert_eq!(fw.memory_width, 11);

        fw.update(&[&narrow]);
        assert_eq!(fw.cpu_width, 9);
        assert_eq!(fw.memory_width, 11);
    }

    #[test]
    fn test_user_width_capped() {
        let r = ProcessRecord::new(1, "a-very-long-service-account", "a", "b", "0 %", "0 MB");
        let mut fw = FieldWidths::new();
        fw.update(&[&r]);
        assert_eq!(fw.user_width, MAX_USER_WIDTH);
    }

    #[test]
    fn test_layout_fills_screen() {
        let fw = FieldWidths::new();
        let widths = fw.layout(100);
        let total: usize = widths.iter().sum::<usize>() + widths.len();
        assert_eq!(total, 100);
        assert!(widths[2] >= widths[3]);
    }

    #[test]
    fn test_layout_narrow_screen_keeps_minimum() {
        let fw = FieldWidths::new();
        let widths = fw.layout(10);
        assert_eq!(widths[2] + widths[3], MIN_TEXT_WIDTH * 2);
    }

    #[test]
    fn test_fit() {
        assert_eq!(fit("42", 5, true), "   42");
        assert_eq!(fit("bash", 6, false), "bash  ");
        assert_eq!(fit("systemd-journald", 7, false), "systemd");
    }
}
