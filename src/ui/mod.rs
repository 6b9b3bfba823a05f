//! UI module
//!
//! This module contains all UI-related components:
//! - CRT: Terminal abstraction using ncurses
//! - RichString: Attributed string for colored output
//! - FunctionBar: key labels at the bottom
//! - MainPanel: the process table
//! - ContextMenuView: per-row popup menu
//! - ScreenManager: event loop and input handling

mod context_menu;
mod crt;
mod function_bar;
mod main_panel;
mod rich_string;
mod screen_manager;

pub use crt::*;
pub use main_panel::*;
pub use rich_string::*;
pub use screen_manager::*;
