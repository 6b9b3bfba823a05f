//! Core module containing the view-state engine
//!
//! This module contains:
//! - ProcessRecord: one row of the process table
//! - Snapshot: the latest process list
//! - SortState / FilterState / Selection / ContextMenu: interaction state
//! - ViewState: the controller tying them together and rendering rows
//! - RefreshLoop: fetch scheduling
//! - Settings: user configuration
//! - FieldWidths: dynamic column width management

mod context_menu;
mod error;
mod field_widths;
mod filter;
mod process;
mod refresh;
mod selection;
mod settings;
mod snapshot;
mod sort;
mod view;

pub use context_menu::*;
pub use error::*;
pub use field_widths::*;
pub use filter::*;
pub use process::*;
pub use refresh::*;
pub use selection::*;
pub use settings::*;
pub use snapshot::*;
pub use sort::*;
pub use view::*;
