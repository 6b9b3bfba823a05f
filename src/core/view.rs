//! View state controller
//!
//! `ViewState` owns the snapshot together with the sort, filter, selection
//! and context menu state. Every user interaction is a method here; the
//! terminal layer only translates input into these calls and draws the
//! rows returned by [`ViewState::rows`].

use tracing::{debug, info};

use super::context_menu::{ContextMenu, Point, Size};
use super::filter::{apply_filter, FilterState};
use super::process::{Column, Pid, ProcessRecord, SortKey};
use super::selection::Selection;
use super::snapshot::Snapshot;
use super::sort::{apply_sort, SortState};

/// One rendered table row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    pub pid: Pid,
    /// Cell text in column order: pid, user, name, parent, cpu, memory
    pub cells: [String; 6],
    pub selected: bool,
}

/// Project visible records plus the selection into display rows
pub fn render(visible: &[&ProcessRecord], selection: &Selection) -> Vec<DisplayRow> {
    visible
        .iter()
        .map(|r| DisplayRow {
            pid: r.pid,
            cells: Column::ALL.map(|c| c.cell(r)),
            selected: selection.is_selected(r.pid),
        })
        .collect()
}

#[derive(Debug, Default)]
pub struct ViewState {
    snapshot: Snapshot,
    sort: SortState,
    filter: FilterState,
    selection: Selection,
    menu: ContextMenu,
}

impl ViewState {
    pub fn new(sort: SortState, filter: FilterState) -> Self {
        ViewState {
            sort,
            filter,
            ..Default::default()
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut FilterState {
        &mut self.filter
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn menu(&self) -> &ContextMenu {
        &self.menu
    }

    /// Install a freshly fetched snapshot and re-check the selection
    pub fn apply_snapshot(&mut self, records: Vec<ProcessRecord>) {
        self.snapshot.replace(records);
        let present = self.selection.reconcile(&self.snapshot);
        if !present {
            if let Some(pid) = self.selection.selected() {
                debug!(pid, "selected process not in new snapshot");
            }
        }
        debug!(
            generation = self.snapshot.generation(),
            count = self.snapshot.len(),
            "snapshot replaced"
        );
    }

    /// Records after sort then filter
    pub fn visible(&self) -> Vec<&ProcessRecord> {
        let sorted = apply_sort(self.snapshot.records(), &self.sort);
        apply_filter(sorted, self.filter.text())
    }

    /// Display rows for the current state
    #[cfg(test)]
    pub fn rows(&self) -> Vec<DisplayRow> {
        render(&self.visible(), &self.selection)
    }

    /// Header click (or sort hotkey) on `column`. Returns false for columns
    /// that are not sortable.
    pub fn click_header(&mut self, column: Column) -> bool {
        match column.sort_key() {
            Some(key) => {
                self.toggle_sort(key);
                true
            }
            None => false,
        }
    }

    pub fn toggle_sort(&mut self, key: SortKey) {
        self.sort.toggle(key);
        info!(key = key.name(), direction = ?self.sort.direction(), "sort changed");
    }

    /// Plain row click: select the row and dismiss any open menu
    pub fn click_row(&mut self, pid: Pid) {
        self.menu.close();
        self.selection.select(pid);
    }

    /// Contextual trigger on a row: select it and open the menu for it
    pub fn context_row(&mut self, pid: Pid, cursor: Point, menu: Size, viewport: Size) {
        self.selection.select(pid);
        self.menu.open(pid, cursor, menu, viewport);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn close_menu(&mut self) {
        self.menu.close();
    }

    /// Pid to terminate, if the menu has a target. Closes the menu.
    pub fn confirm_terminate(&mut self) -> Option<Pid> {
        self.menu.confirm_terminate()
    }

    /// Move the selection through the visible rows
    pub fn step_selection(&mut self, delta: isize) {
        let sorted = apply_sort(self.snapshot.records(), &self.sort);
        let visible = apply_filter(sorted, self.filter.text());
        self.selection.step(&visible, delta);
    }

    pub fn jump_selection(&mut self, to_end: bool) {
        let sorted = apply_sort(self.snapshot.records(), &self.sort);
        let visible = apply_filter(sorted, self.filter.text());
        self.selection.jump(&visible, to_end);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(pid: Pid, name: &str, cpu: &str) -> ProcessRecord {
        ProcessRecord::new(pid, "alice", name, "systemd", cpu, "64.0 MB")
    }

    fn pids(rows: &[DisplayRow]) -> Vec<Pid> {
        rows.iter().map(|r| r.pid).collect()
    }

    fn selected(rows: &[DisplayRow]) -> Vec<Pid> {
        rows.iter().filter(|r| r.selected).map(|r| r.pid).collect()
    }

    fn two_process_view() -> ViewState {
        let mut view = ViewState::default();
        view.apply_snapshot(vec![rec(1, "a", "5 %"), rec(2, "b", "10 %")]);
        view
    }

    #[test]
    fn test_render_columns_in_order() {
        let view = two_process_view();
        let rows = view.rows();
        assert_eq!(
            rows[0].cells,
            [
                "1".to_string(),
                "alice".to_string(),
                "a".to_string(),
                "systemd".to_string(),
                "5 %".to_string(),
                "64.0 MB".to_string(),
            ]
        );
    }

    #[test]
    fn test_sort_then_filter_scenario() {
        let mut view = two_process_view();

        assert!(view.click_header(Column::Cpu));
        assert_eq!(pids(&view.rows()), vec![2, 1]);

        view.click_header(Column::Cpu);
        assert_eq!(pids(&view.rows()), vec![1, 2]);

        view.filter_mut().set("b");
        assert_eq!(pids(&view.rows()), vec![2]);
    }

    #[test]
    fn test_user_header_is_inert() {
        let mut view = two_process_view();
        assert!(!view.click_header(Column::User));
        assert_eq!(view.sort().key(), SortKey::None);
    }

    #[test]
    fn test_selection_follows_pid_across_refresh() {
        let mut view = two_process_view();
        view.click_row(2);
        assert_eq!(selected(&view.rows()), vec![2]);

        // Reordered snapshot, pid 2 still present
        view.apply_snapshot(vec![rec(2, "b", "1 %"), rec(3, "c", "2 %")]);
        assert_eq!(selected(&view.rows()), vec![2]);
    }

    #[test]
    fn test_selection_persists_when_pid_disappears() {
        let mut view = two_process_view();
        view.click_row(2);
        view.apply_snapshot(vec![rec(1, "a", "5 %")]);

        assert_eq!(view.selection().selected(), Some(2));
        assert!(selected(&view.rows()).is_empty());

        // Process comes back (or pid is reused): selected again
        view.apply_snapshot(vec![rec(2, "b", "1 %")]);
        assert_eq!(selected(&view.rows()), vec![2]);
    }

    #[test]
    fn test_selection_hidden_by_filter() {
        let mut view = two_process_view();
        view.click_row(1);
        view.filter_mut().set("b");
        assert!(selected(&view.rows()).is_empty());
        view.filter_mut().clear();
        assert_eq!(selected(&view.rows()), vec![1]);
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut view = two_process_view();
        view.click_header(Column::Name);
        view.click_row(1);
        assert_eq!(view.rows(), view.rows());
    }

    #[test]
    fn test_context_row_selects_and_opens() {
        let mut view = two_process_view();
        view.click_row(1);
        view.context_row(2, Point::new(5, 5), Size::new(16, 3), Size::new(80, 24));
        assert_eq!(view.selection().selected(), Some(2));
        assert_eq!(view.menu().target(), Some(2));

        // Plain click closes the menu
        view.click_row(1);
        assert!(!view.menu().is_open());
        assert_eq!(view.confirm_terminate(), None);
    }

    #[test]
    fn test_confirm_terminate_does_not_touch_state() {
        let mut view = two_process_view();
        view.context_row(1, Point::new(0, 0), Size::new(16, 3), Size::new(80, 24));
        assert_eq!(view.confirm_terminate(), Some(1));
        assert_eq!(view.snapshot().len(), 2);
        assert_eq!(view.selection().selected(), Some(1));
    }

    #[test]
    fn test_keyboard_stepping_uses_visible_order() {
        let mut view = two_process_view();
        view.click_header(Column::Cpu);
        view.step_selection(1);
        assert_eq!(view.selection().selected(), Some(2));
        view.step_selection(1);
        assert_eq!(view.selection().selected(), Some(1));
        view.jump_selection(false);
        assert_eq!(view.selection().selected(), Some(2));
    }
}
