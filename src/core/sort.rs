//! Sort engine
//!
//! Orders a snapshot by one column. Clicking a column header cycles that
//! column between descending and ascending; clicking another column makes it
//! the only sorted column, starting descending.

use std::cmp::Ordering;

use super::process::{ProcessRecord, SortDirection, SortKey};

/// Current sort column and direction.
///
/// `key == SortKey::None` exactly when `direction == SortDirection::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortState {
    key: SortKey,
    direction: SortDirection,
}

impl SortState {
    /// Startup state. A real key starts descending, `SortKey::None` keeps
    /// source order.
    pub fn new(key: SortKey) -> Self {
        let direction = match key {
            SortKey::None => SortDirection::None,
            _ => SortDirection::Descending,
        };
        SortState { key, direction }
    }

    pub fn key(&self) -> SortKey {
        self.key
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Header click on `key`
    pub fn toggle(&mut self, key: SortKey) {
        if key == SortKey::None {
            return;
        }
        if key == self.key {
            self.direction = self.direction.flipped();
        } else {
            self.key = key;
            self.direction = SortDirection::Descending;
        }
    }

    /// Glyph to append to `key`'s header, None for every inactive column
    pub fn indicator(&self, key: SortKey, unicode: bool) -> Option<&'static str> {
        if key == SortKey::None || key != self.key {
            return None;
        }
        match (self.direction, unicode) {
            (SortDirection::Descending, true) => Some("\u{25BC}"),
            (SortDirection::Ascending, true) => Some("\u{25B2}"),
            (SortDirection::Descending, false) => Some("v"),
            (SortDirection::Ascending, false) => Some("^"),
            (SortDirection::None, _) => None,
        }
    }

    /// Three-way comparison of two records under this state
    pub fn compare(&self, a: &ProcessRecord, b: &ProcessRecord) -> Ordering {
        let ord = a.compare_by_key(b, self.key);
        match self.direction {
            SortDirection::Descending => ord.reverse(),
            _ => ord,
        }
    }
}

/// Order `records` by `state`.
///
/// The output borrows from the input; the snapshot itself is never
/// reordered. Ties keep their snapshot order in both directions.
pub fn apply_sort<'a>(records: &'a [ProcessRecord], state: &SortState) -> Vec<&'a ProcessRecord> {
    let mut ordered: Vec<&ProcessRecord> = records.iter().collect();
    if state.key() == SortKey::None {
        return ordered;
    }
    // slice::sort_by is stable
    ordered.sort_by(|a, b| state.compare(a, b));
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::process::Pid;
    use proptest::prelude::*;

    fn rec(pid: Pid, name: &str, cpu: &str) -> ProcessRecord {
        ProcessRecord::new(pid, "user", name, "parent", cpu, "10.0 MB")
    }

    fn pids(rows: &[&ProcessRecord]) -> Vec<Pid> {
        rows.iter().map(|r| r.pid).collect()
    }

    #[test]
    fn test_toggle_cycle() {
        let mut state = SortState::default();
        assert_eq!(state.key(), SortKey::None);
        assert_eq!(state.direction(), SortDirection::None);

        state.toggle(SortKey::Cpu);
        assert_eq!(state.direction(), SortDirection::Descending);
        state.toggle(SortKey::Cpu);
        assert_eq!(state.direction(), SortDirection::Ascending);
        state.toggle(SortKey::Cpu);
        assert_eq!(state.direction(), SortDirection::Descending);
    }

    #[test]
    fn test_new_key_starts_descending_and_resets_indicator() {
        let mut state = SortState::new(SortKey::Pid);
        state.toggle(SortKey::Pid);
        assert_eq!(state.direction(), SortDirection::Ascending);

        state.toggle(SortKey::Name);
        assert_eq!(state.key(), SortKey::Name);
        assert_eq!(state.direction(), SortDirection::Descending);
        assert_eq!(state.indicator(SortKey::Pid, true), None);
        assert_eq!(state.indicator(SortKey::Name, true), Some("\u{25BC}"));
    }

    #[test]
    fn test_exactly_one_indicator() {
        let mut state = SortState::default();
        let shown = |s: &SortState| {
            SortKey::all()
                .iter()
                .filter(|k| s.indicator(**k, false).is_some())
                .count()
        };
        assert_eq!(shown(&state), 0);
        state.toggle(SortKey::Mem);
        assert_eq!(shown(&state), 1);
        state.toggle(SortKey::Parent);
        state.toggle(SortKey::Parent);
        assert_eq!(shown(&state), 1);
        assert_eq!(state.indicator(SortKey::Parent, false), Some("^"));
    }

    #[test]
    fn test_none_keeps_source_order() {
        let records = vec![rec(3, "c", "1 %"), rec(1, "a", "9 %"), rec(2, "b", "5 %")];
        let out = apply_sort(&records, &SortState::default());
        assert_eq!(pids(&out), vec![3, 1, 2]);
    }

    #[test]
    fn test_cpu_example_scenario() {
        let records = vec![rec(1, "a", "5 %"), rec(2, "b", "10 %")];
        let mut state = SortState::default();

        state.toggle(SortKey::Cpu);
        assert_eq!(pids(&apply_sort(&records, &state)), vec![2, 1]);

        state.toggle(SortKey::Cpu);
        assert_eq!(pids(&apply_sort(&records, &state)), vec![1, 2]);
    }

    #[test]
    fn test_numeric_not_lexicographic() {
        let records = vec![rec(1, "a", "9 %"), rec(2, "b", "10 %"), rec(3, "c", "100 %")];
        let out = apply_sort(&records, &SortState::new(SortKey::Cpu));
        assert_eq!(pids(&out), vec![3, 2, 1]);
    }

    #[test]
    fn test_unparseable_sorts_as_minimum() {
        let records = vec![rec(1, "a", "n/a"), rec(2, "b", "0 %"), rec(3, "c", "")];
        let mut state = SortState::new(SortKey::Cpu);
        assert_eq!(pids(&apply_sort(&records, &state)), vec![2, 1, 3]);

        state.toggle(SortKey::Cpu);
        assert_eq!(pids(&apply_sort(&records, &state)), vec![1, 3, 2]);
    }

    #[test]
    fn test_name_is_case_insensitive() {
        let records = vec![rec(1, "beta", "0 %"), rec(2, "Alpha", "0 %"), rec(3, "alpha", "0 %")];
        let mut state = SortState::new(SortKey::Name);
        state.toggle(SortKey::Name);
        // Ascending; the two alphas tie and keep snapshot order
        assert_eq!(pids(&apply_sort(&records, &state)), vec![2, 3, 1]);
    }

    #[test]
    fn test_name_collates_accents_and_punctuation() {
        let records = vec![
            rec(1, "zsh", "0 %"),
            rec(2, "éclair", "0 %"),
            rec(3, "fish", "0 %"),
            rec(4, "1apt", "0 %"),
            rec(5, "_apt", "0 %"),
        ];
        let mut state = SortState::new(SortKey::Name);
        state.toggle(SortKey::Name);
        assert_eq!(pids(&apply_sort(&records, &state)), vec![5, 4, 2, 3, 1]);

        state.toggle(SortKey::Name);
        assert_eq!(pids(&apply_sort(&records, &state)), vec![1, 3, 2, 4, 5]);
    }

    #[test]
    fn test_ties_stable_when_descending() {
        let records = vec![rec(1, "x", "5 %"), rec(2, "y", "5 %"), rec(3, "z", "7 %")];
        let out = apply_sort(&records, &SortState::new(SortKey::Cpu));
        assert_eq!(pids(&out), vec![3, 1, 2]);
    }

    fn arb_record() -> impl Strategy<Value = ProcessRecord> {
        (
            0i32..50,
            "[a-cA-C]{0,3}",
            prop_oneof![
                (0u32..20).prop_map(|v| format!("{} %", v)),
                Just("n/a".to_string()),
            ],
        )
            .prop_map(|(pid, name, cpu)| {
                ProcessRecord::new(pid, "u", name.clone(), name, cpu, "1 MB")
            })
    }

    fn arb_state() -> impl Strategy<Value = SortState> {
        (0usize..6, any::<bool>()).prop_map(|(i, flip)| {
            let key = [
                SortKey::None,
                SortKey::Pid,
                SortKey::Name,
                SortKey::Parent,
                SortKey::Cpu,
                SortKey::Mem,
            ][i];
            let mut state = SortState::new(key);
            if flip {
                state.toggle(key);
            }
            state
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_sort_is_permutation(
            records in prop::collection::vec(arb_record(), 0..30),
            state in arb_state()
        ) {
            let out = apply_sort(&records, &state);
            prop_assert_eq!(out.len(), records.len());
            let mut seen = vec![false; records.len()];
            for r in &out {
                let idx = records
                    .iter()
                    .position(|orig| std::ptr::eq(orig, *r))
                    .ok_or_else(|| TestCaseError::fail("record not from input"))?;
                prop_assert!(!seen[idx]);
                seen[idx] = true;
            }
        }

        #[test]
        fn prop_sort_is_ordered_and_stable(
            records in prop::collection::vec(arb_record(), 0..30),
            state in arb_state()
        ) {
            let out = apply_sort(&records, &state);
            let index_of = |r: &ProcessRecord| {
                records.iter().position(|orig| std::ptr::eq(orig, r)).unwrap_or(usize::MAX)
            };
            for pair in out.windows(2) {
                let ord = state.compare(pair[0], pair[1]);
                prop_assert_ne!(ord, Ordering::Greater);
                if ord == Ordering::Equal {
                    prop_assert!(index_of(pair[0]) < index_of(pair[1]));
                }
            }
        }
    }
}
