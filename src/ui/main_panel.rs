//! MainPanel - the process table
//!
//! Draws the header row (with the sort indicator on the active column) and
//! one line per display row. It remembers which pid was drawn on which line
//! and where each column starts, so mouse clicks can be mapped back onto
//! the view state.

use ncurses::attr_t;

use super::crt::ColorElement;
use super::{Crt, RichString};
use crate::core::{fit, render, Column, DisplayRow, FieldWidths, Pid, SortState, ViewState};

/// Colors used to build a row, looked up once per draw
#[derive(Debug, Clone, Copy)]
pub struct RowColors {
    pub normal: attr_t,
    pub megabytes: attr_t,
    pub selected: attr_t,
}

/// Process table panel
#[derive(Debug)]
pub struct MainPanel {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    /// First visible row index
    pub scroll_v: i32,
    widths: FieldWidths,
    /// Column widths from the last draw (without separators)
    layout: [usize; 6],
    /// Pids in visible order from the last draw
    pids: Vec<Pid>,
    /// Scroll to the selected row on the next draw
    follow_selection: bool,
}

impl MainPanel {
    pub fn new() -> Self {
        let widths = FieldWidths::new();
        MainPanel {
            x: 0,
            y: 1,
            w: 80,
            h: 20,
            scroll_v: 0,
            layout: widths.layout(80),
            widths,
            pids: Vec::new(),
            follow_selection: false,
        }
    }

    /// Place the panel; `h` includes the header row
    pub fn move_resize(&mut self, x: i32, y: i32, w: i32, h: i32) {
        self.x = x;
        self.y = y;
        self.w = w;
        self.h = h;
        self.layout = self.widths.layout(w.max(0) as usize);
    }

    /// Number of table rows that fit below the header
    pub fn visible_height(&self) -> i32 {
        (self.h - 1).max(0)
    }

    /// Column under screen column `x`, or None past the last column
    pub fn column_at_x(&self, x: i32) -> Option<Column> {
        let rel_x = x - self.x;
        if rel_x < 0 {
            return None;
        }

        let mut current_x = 0i32;
        for (column, width) in Column::ALL.iter().zip(self.layout) {
            // Each column owns its trailing separator
            let span = width as i32 + 1;
            if rel_x < current_x + span {
                return Some(*column);
            }
            current_x += span;
        }
        None
    }

    /// Pid drawn on screen line `y` during the last draw
    pub fn pid_at_y(&self, y: i32) -> Option<Pid> {
        let row = y - (self.y + 1);
        if row < 0 || row >= self.visible_height() {
            return None;
        }
        self.pids.get((self.scroll_v + row) as usize).copied()
    }

    /// Request that the selected row be scrolled into view
    pub fn follow(&mut self) {
        self.follow_selection = true;
    }

    /// Ensure the row at `index` is visible
    pub fn ensure_visible(&mut self, index: i32, count: i32) {
        let visible_height = self.visible_height();

        if index < self.scroll_v {
            self.scroll_v = index;
        } else if index >= self.scroll_v + visible_height {
            self.scroll_v = index - visible_height + 1;
        }

        self.clamp_scroll(count);
    }

    fn clamp_scroll(&mut self, count: i32) {
        let max_scroll = (count - self.visible_height()).max(0);
        self.scroll_v = self.scroll_v.clamp(0, max_scroll);
    }

    /// Scroll the viewport by wheel amount; the selection stays put
    pub fn scroll_wheel(&mut self, amount: i32) {
        self.scroll_v += amount;
        self.follow_selection = false;
        self.clamp_scroll(self.pids.len() as i32);
    }

    /// Rows moved by PgUp/PgDn
    pub fn page_size(&self) -> isize {
        self.visible_height().max(1) as isize
    }

    /// Header line: titles padded to their columns, the sort column
    /// highlighted with its trailing space replaced by the indicator
    pub fn build_header(
        &self,
        sort: &SortState,
        header_attr: attr_t,
        sort_attr: attr_t,
        utf8: bool,
    ) -> RichString {
        let mut str = RichString::new();

        for (column, width) in Column::ALL.iter().zip(self.layout) {
            let indicator = column.sort_key().and_then(|key| sort.indicator(key, utf8));
            let attr = if indicator.is_some() {
                sort_attr
            } else {
                header_attr
            };

            str.append(&fit(column.title(), width, column.right_aligned()), attr);
            str.append(" ", attr);

            if let Some(glyph) = indicator {
                if str.last_char() == Some(' ') {
                    str.rewind(1);
                    str.append(glyph, attr);
                }
            }
        }
        str
    }

    /// One table line for `row`
    pub fn build_row(&self, row: &DisplayRow, colors: RowColors) -> RichString {
        let mut str = RichString::new();

        for ((column, width), cell) in Column::ALL.iter().zip(self.layout).zip(&row.cells) {
            let attr = match column {
                Column::Memory => colors.megabytes,
                _ => colors.normal,
            };
            str.append(&fit(cell, width, column.right_aligned()), attr);
            str.append(" ", colors.normal);
        }

        if row.selected {
            str.set_all_attr(colors.selected);
        }
        str
    }

    /// Screen line the row for `pid` was drawn on, if it is on screen
    pub fn row_y(&self, pid: Pid) -> Option<i32> {
        let index = self.pids.iter().position(|p| *p == pid)? as i32;
        let row = index - self.scroll_v;
        if row < 0 || row >= self.visible_height() {
            return None;
        }
        Some(self.y + 1 + row)
    }

    /// Recompute widths, row order and scroll position from the view state
    /// and return the rows to draw
    pub fn sync(&mut self, view: &ViewState) -> Vec<DisplayRow> {
        let visible = view.visible();
        self.widths.update(&visible);
        self.layout = self.widths.layout(self.w.max(0) as usize);

        let rows = render(&visible, view.selection());
        self.pids = rows.iter().map(|r| r.pid).collect();
        let count = rows.len() as i32;

        if self.follow_selection {
            if let Some(index) = rows.iter().position(|r| r.selected) {
                self.ensure_visible(index as i32, count);
            }
            self.follow_selection = false;
        }
        self.clamp_scroll(count);
        rows
    }

    /// Draw header and rows for the current view state
    pub fn draw(&mut self, crt: &Crt, view: &ViewState) {
        let rows = self.sync(view);

        let header_attr = crt.color(ColorElement::PanelHeaderFocus);
        let header = self.build_header(
            view.sort(),
            header_attr,
            crt.color(ColorElement::PanelSortColumn),
            crt.utf8,
        );
        crt.fill_line(self.y, header_attr);
        header.write_at_width(crt, self.y, self.x, self.w as usize);

        let colors = RowColors {
            normal: crt.color(ColorElement::Process),
            megabytes: crt.color(ColorElement::ProcessMegabytes),
            selected: crt.color(ColorElement::PanelSelectionFocus),
        };
        let empty = RichString::new();

        for i in 0..self.visible_height() {
            let y = self.y + 1 + i;
            match rows.get((self.scroll_v + i) as usize) {
                Some(row) => self
                    .build_row(row, colors)
                    .write_at_width(crt, y, self.x, self.w as usize),
                None => empty.write_at_width(crt, y, self.x, self.w as usize),
            }
        }
    }
}

impl Default for MainPanel {
    fn default() -> Self {
        Self::new()
    }
}
