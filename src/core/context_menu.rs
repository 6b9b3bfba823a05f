//! Context action relay
//!
//! State of the per-row popup menu. The menu keeps its own target pid,
//! separate from the row selection, for the lifetime of one open/close.

use super::process::Pid;

/// A screen position in cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// A width/height pair in cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }
}

impl Size {
    pub fn new(width: i32, height: i32) -> Self {
        Size { width, height }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContextMenu {
    target: Option<Pid>,
    anchor: Point,
    size: Size,
}

impl ContextMenu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the menu for `pid` near `cursor`, shifted so that a menu of
    /// `menu` cells fits inside `viewport`. The anchor never goes negative.
    pub fn open(&mut self, pid: Pid, cursor: Point, menu: Size, viewport: Size) {
        self.target = Some(pid);
        self.size = menu;
        self.anchor = Point {
            x: cursor.x.min(viewport.width - menu.width).max(0),
            y: cursor.y.min(viewport.height - menu.height).max(0),
        };
    }

    /// Hide the menu and forget its target
    pub fn close(&mut self) {
        self.target = None;
    }

    pub fn is_open(&self) -> bool {
        self.target.is_some()
    }

    pub fn target(&self) -> Option<Pid> {
        self.target
    }

    /// Top-left corner of the open menu
    pub fn anchor(&self) -> Point {
        self.anchor
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Check if a screen position falls inside the open menu
    pub fn contains(&self, at: Point) -> bool {
        self.is_open()
            && at.x >= self.anchor.x
            && at.x < self.anchor.x + self.size.width
            && at.y >= self.anchor.y
            && at.y < self.anchor.y + self.size.height
    }

    /// Take the target for termination and close the menu.
    /// Returns None (and does nothing) when no target is set.
    pub fn confirm_terminate(&mut self) -> Option<Pid> {
        self.target.take()
    }
}
