//! Process representation
//!
//! This module contains the ProcessRecord struct and the sort column types
//! that describe one row of the process table.

use std::cmp::Ordering;

use icu_collator::{Collator, CollatorOptions, Strength};

/// Process identifier (matches the OS pid type)
pub type Pid = i32;

/// A numeric value that arrived as a unit-suffixed display string
/// ("3.50 %", "128.0 MB").
///
/// The numeric prefix is parsed once at ingestion; sorting never re-parses.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    /// Parsed numeric prefix, None if the prefix was not a number
    pub value: Option<f64>,
    /// Original string shown in the table
    pub display: String,
}

impl Metric {
    /// Parse the leading whitespace-delimited token of `display`
    pub fn parse(display: impl Into<String>) -> Self {
        let display = display.into();
        let value = display
            .split_whitespace()
            .next()
            .and_then(|token| token.parse::<f64>().ok())
            .filter(|v| !v.is_nan());
        Metric { value, display }
    }

    /// Build a metric from a known value and its unit suffix
    pub fn with_unit(value: f64, precision: usize, unit: &str) -> Self {
        Metric {
            value: Some(value),
            display: format!("{:.*} {}", precision, value, unit),
        }
    }

    /// Three-way numeric comparison; unparseable values are the minimum
    pub fn compare(&self, other: &Metric) -> Ordering {
        match (self.value, other.value) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        }
    }
}

/// One running process in a snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessRecord {
    pub pid: Pid,
    pub user: String,
    pub name: String,
    pub parent: String,
    pub cpu: Metric,
    pub memory: Metric,
}

impl ProcessRecord {
    /// Create a record from the raw display strings the host reports
    pub fn new(
        pid: Pid,
        user: impl Into<String>,
        name: impl Into<String>,
        parent: impl Into<String>,
        cpu: impl Into<String>,
        memory: impl Into<String>,
    ) -> Self {
        ProcessRecord {
            pid,
            user: user.into(),
            name: name.into(),
            parent: parent.into(),
            cpu: Metric::parse(cpu),
            memory: Metric::parse(memory),
        }
    }

    /// Compare two records by a sort key (always ascending)
    pub fn compare_by_key(&self, other: &ProcessRecord, key: SortKey) -> Ordering {
        match key {
            SortKey::None => Ordering::Equal,
            SortKey::Pid => self.pid.cmp(&other.pid),
            SortKey::Name => compare_caseless(&self.name, &other.name),
            SortKey::Parent => compare_caseless(&self.parent, &other.parent),
            SortKey::Cpu => self.cpu.compare(&other.cpu),
            SortKey::Mem => self.memory.compare(&other.memory),
        }
    }
}

thread_local! {
    /// Root-locale collator at secondary strength: accents count, case does not
    static COLLATOR: Option<Collator> = {
        let mut options = CollatorOptions::new();
        options.strength = Some(Strength::Secondary);
        match Collator::try_new(&Default::default(), options) {
            Ok(collator) => Some(collator),
            Err(e) => {
                tracing::warn!(error = ?e, "collator unavailable, comparing code points");
                None
            }
        }
    };
}

/// Case-insensitive, locale-aware three-way string comparison
pub fn compare_caseless(a: &str, b: &str) -> Ordering {
    COLLATOR.with(|collator| match collator {
        Some(collator) => collator.compare(a, b),
        None => a
            .chars()
            .flat_map(char::to_lowercase)
            .cmp(b.chars().flat_map(char::to_lowercase)),
    })
}

/// Sortable columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortKey {
    #[default]
    None,
    Pid,
    Name,
    Parent,
    Cpu,
    Mem,
}

impl SortKey {
    /// Get all sortable keys (None excluded)
    pub fn all() -> &'static [SortKey] {
        &[
            SortKey::Pid,
            SortKey::Name,
            SortKey::Parent,
            SortKey::Cpu,
            SortKey::Mem,
        ]
    }

    /// Name used on the command line
    pub fn name(self) -> &'static str {
        match self {
            SortKey::None => "none",
            SortKey::Pid => "pid",
            SortKey::Name => "name",
            SortKey::Parent => "parent",
            SortKey::Cpu => "cpu",
            SortKey::Mem => "mem",
        }
    }

    /// Get the description for a sort key
    pub fn description(self) -> &'static str {
        match self {
            SortKey::None => "Order reported by the system",
            SortKey::Pid => "Process ID",
            SortKey::Name => "Process name",
            SortKey::Parent => "Parent process name",
            SortKey::Cpu => "Percentage of CPU time",
            SortKey::Mem => "Resident memory in megabytes",
        }
    }

    /// Create a sort key from a name string
    pub fn from_name(name: &str) -> Option<SortKey> {
        match name.to_lowercase().as_str() {
            "pid" => Some(SortKey::Pid),
            "name" | "command" | "comm" => Some(SortKey::Name),
            "parent" | "ppid" => Some(SortKey::Parent),
            "cpu" | "cpu%" | "percent_cpu" => Some(SortKey::Cpu),
            "mem" | "memory" | "mem%" | "percent_mem" => Some(SortKey::Mem),
            _ => None,
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    None,
    /// Larger (or lexicographically later) first
    Descending,
    Ascending,
}

impl SortDirection {
    /// The opposite direction; None stays None
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Descending => SortDirection::Ascending,
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::None => SortDirection::None,
        }
    }
}

/// Table columns in fixed display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Pid,
    User,
    Name,
    Parent,
    Cpu,
    Memory,
}

impl Column {
    /// All columns in display order
    pub const ALL: [Column; 6] = [
        Column::Pid,
        Column::User,
        Column::Name,
        Column::Parent,
        Column::Cpu,
        Column::Memory,
    ];

    /// Column header label
    pub fn title(self) -> &'static str {
        match self {
            Column::Pid => "PID",
            Column::User => "User",
            Column::Name => "Name",
            Column::Parent => "Parent",
            Column::Cpu => "CPU %",
            Column::Memory => "Memory MB",
        }
    }

    /// Sort key bound to this column's header, if the header is sortable
    pub fn sort_key(self) -> Option<SortKey> {
        match self {
            Column::Pid => Some(SortKey::Pid),
            Column::User => None,
            Column::Name => Some(SortKey::Name),
            Column::Parent => Some(SortKey::Parent),
            Column::Cpu => Some(SortKey::Cpu),
            Column::Memory => Some(SortKey::Mem),
        }
    }

    /// Right-align numeric columns
    pub fn right_aligned(self) -> bool {
        matches!(self, Column::Pid | Column::Cpu | Column::Memory)
    }

    /// Get the display text of this column for a record
    pub fn cell(self, record: &ProcessRecord) -> String {
        match self {
            Column::Pid => record.pid.to_string(),
            Column::User => record.user.clone(),
            Column::Name => record.name.clone(),
            Column::Parent => record.parent.clone(),
            Column::Cpu => record.cpu.display.clone(),
            Column::Memory => record.memory.display.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_parses_numeric_prefix() {
        let m = Metric::parse("3.5 %");
        assert_eq!(m.value, Some(3.5));
        assert_eq!(m.display, "3.5 %");

        assert_eq!(Metric::parse("128 MB").value, Some(128.0));
        assert_eq!(Metric::parse("  7.25   MB").value, Some(7.25));
        assert_eq!(Metric::parse("-1 %").value, Some(-1.0));
    }

    #[test]
    fn test_metric_unparseable_is_minimum() {
        let bad = Metric::parse("n/a");
        let empty = Metric::parse("");
        let nan = Metric::parse("NaN %");
        assert_eq!(bad.value, None);
        assert_eq!(empty.value, None);
        assert_eq!(nan.value, None);

        let negative = Metric::parse("-50 %");
        assert_eq!(bad.compare(&negative), Ordering::Less);
        assert_eq!(negative.compare(&bad), Ordering::Greater);
        assert_eq!(bad.compare(&empty), Ordering::Equal);
    }

    #[test]
    fn test_metric_with_unit() {
        let m = Metric::with_unit(12.345, 2, "%");
        assert_eq!(m.display, "12.35 %");
        assert_eq!(m.value, Some(12.345));
    }

    #[test]
    fn test_compare_caseless() {
        assert_eq!(compare_caseless("Bash", "bash"), Ordering::Equal);
        assert_eq!(compare_caseless("alpha", "Beta"), Ordering::Less);
        assert_eq!(compare_caseless("Zsh", "apt"), Ordering::Greater);
        assert_eq!(compare_caseless("ÉCLAIR", "éclair"), Ordering::Equal);
    }

    #[test]
    fn test_compare_caseless_collates_accents_and_punctuation() {
        assert_eq!(compare_caseless("éclair", "fish"), Ordering::Less);
        assert_eq!(compare_caseless("fish", "zsh"), Ordering::Less);
        assert_eq!(compare_caseless("Éclair", "fish"), Ordering::Less);
        assert_eq!(compare_caseless("_apt", "1apt"), Ordering::Less);
        assert_eq!(compare_caseless("1apt", "apt"), Ordering::Less);
    }

    #[test]
    fn test_sort_key_names_round_trip() {
        for key in SortKey::all() {
            assert_eq!(SortKey::from_name(key.name()), Some(*key));
        }
        assert_eq!(SortKey::from_name("MEMORY"), Some(SortKey::Mem));
        assert_eq!(SortKey::from_name("bogus"), None);
    }

    #[test]
    fn test_user_column_is_not_sortable() {
        let sortable: Vec<_> = Column::ALL.iter().filter_map(|c| c.sort_key()).collect();
        assert_eq!(sortable.len(), 5);
        assert_eq!(Column::User.sort_key(), None);
    }
}
