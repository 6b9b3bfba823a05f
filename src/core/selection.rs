//! Selection tracker
//!
//! At most one selected process, tracked by pid rather than row index so it
//! follows the process through re-sorts and refreshes.

use super::process::{Pid, ProcessRecord};
use super::snapshot::Snapshot;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    selected: Option<Pid>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<Pid> {
        self.selected
    }

    pub fn is_selected(&self, pid: Pid) -> bool {
        self.selected == Some(pid)
    }

    /// Select `pid`; selecting the current pid again keeps it selected
    pub fn select(&mut self, pid: Pid) {
        self.selected = Some(pid);
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    /// Check the selection against a fresh snapshot.
    ///
    /// The selection is kept even when the pid is gone; a missing pid just
    /// renders as no selected row. Returns whether the pid is still present.
    pub fn reconcile(&self, snapshot: &Snapshot) -> bool {
        match self.selected {
            Some(pid) => snapshot.contains(pid),
            None => true,
        }
    }

    /// Move the selection `delta` rows through `visible`, clamping at both
    /// ends. When the current pid is not visible the move starts from the
    /// first row. No-op on an empty list.
    pub fn step(&mut self, visible: &[&ProcessRecord], delta: isize) {
        if visible.is_empty() {
            return;
        }
        let target = match self.position_in(visible) {
            Some(current) => {
                let last = visible.len() as isize - 1;
                (current as isize + delta).clamp(0, last) as usize
            }
            None => 0,
        };
        self.selected = Some(visible[target].pid);
    }

    /// Jump to the first (`to_end == false`) or last visible row
    pub fn jump(&mut self, visible: &[&ProcessRecord], to_end: bool) {
        let row = if to_end { visible.last() } else { visible.first() };
        if let Some(r) = row {
            self.selected = Some(r.pid);
        }
    }

    /// Index of the selected pid among `visible`, if shown
    pub fn position_in(&self, visible: &[&ProcessRecord]) -> Option<usize> {
        let pid = self.selected?;
        visible.iter().position(|r| r.pid == pid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(pid: Pid) -> ProcessRecord {
        ProcessRecord::new(pid, "u", format!("p{}", pid), "init", "0 %", "0 MB")
    }

    #[test]
    fn test_select_is_idempotent() {
        let mut sel = Selection::new();
        sel.select(4);
        sel.select(4);
        assert_eq!(sel.selected(), Some(4));
        sel.select(9);
        assert!(sel.is_selected(9));
        assert!(!sel.is_selected(4));
        sel.clear();
        assert_eq!(sel.selected(), None);
    }

    #[test]
    fn test_reconcile_never_clears() {
        let mut snap = Snapshot::new();
        snap.replace(vec![rec(1), rec(2)]);
        let mut sel = Selection::new();
        sel.select(2);
        assert!(sel.reconcile(&snap));

        snap.replace(vec![rec(1)]);
        assert!(!sel.reconcile(&snap));
        assert_eq!(sel.selected(), Some(2));
    }

    #[test]
    fn test_step_clamps() {
        let records = vec![rec(10), rec(20), rec(30)];
        let visible: Vec<&ProcessRecord> = records.iter().collect();
        let mut sel = Selection::new();

        sel.step(&visible, 1);
        assert_eq!(sel.selected(), Some(10));
        sel.step(&visible, 1);
        assert_eq!(sel.selected(), Some(20));
        sel.step(&visible, 10);
        assert_eq!(sel.selected(), Some(30));
        sel.step(&visible, -10);
        assert_eq!(sel.selected(), Some(10));
    }

    #[test]
    fn test_step_from_hidden_selection_starts_at_top() {
        let records = vec![rec(10), rec(20)];
        let visible: Vec<&ProcessRecord> = records.iter().collect();
        let mut sel = Selection::new();
        sel.select(99);
        sel.step(&visible, 1);
        assert_eq!(sel.selected(), Some(10));

        sel.step(&[], 1);
        assert_eq!(sel.selected(), Some(10));
    }

    #[test]
    fn test_jump() {
        let records = vec![rec(1), rec(2), rec(3)];
        let visible: Vec<&ProcessRecord> = records.iter().collect();
        let mut sel = Selection::new();
        sel.jump(&visible, true);
        assert_eq!(sel.position_in(&visible), Some(2));
        sel.jump(&visible, false);
        assert_eq!(sel.position_in(&visible), Some(0));
    }
}
