//! CRT - Terminal abstraction using ncurses
//!
//! This module provides the terminal interface using the ncurses library.

#![allow(dead_code)]

use ncurses::CURSOR_VISIBILITY::{CURSOR_INVISIBLE, CURSOR_VISIBLE};
use ncurses::*;

use crate::core::{ColorScheme, Settings};

/// Color elements for the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ColorElement {
    ResetColor = 0,
    DefaultColor,
    FunctionBar,
    FunctionKey,
    PanelHeaderFocus,
    PanelSelectionFocus,
    /// Header cell of the active sort column
    PanelSortColumn,
    PanelEdit,
    Process,
    ProcessMegabytes,
    StatusText,
    StatusValue,
    NoticeOk,
    NoticeError,
    MenuBorder,
    MenuItem,
    LastColorElement,
}

/// Synthesized key codes for mouse input (outside the ncurses key range)
pub const KEY_WHEELUP: i32 = KEY_F0 + 30;
pub const KEY_WHEELDOWN: i32 = KEY_F0 + 31;
pub const KEY_RIGHTCLICK: i32 = KEY_F0 + 33;
pub const KEY_HEADER_CLICK: i32 = KEY_F0 + 35;

/// Plain control characters
pub const KEY_ESC: i32 = 0x1B;
pub const KEY_LF: i32 = 0x0A;
pub const KEY_CR: i32 = 0x0D;
pub const KEY_DEL_MAC: i32 = 127;
pub const KEY_CTRL_L: i32 = 0x0C;

/// Key F-number helper constants
pub const KEY_F3: i32 = KEY_F0 + 3;
pub const KEY_F4: i32 = KEY_F0 + 4;
pub const KEY_F9: i32 = KEY_F0 + 9;
pub const KEY_F10: i32 = KEY_F0 + 10;

/// Compute color pair index for a foreground/background combination
/// (pair 0 is the terminal default and cannot be redefined, so shift by one)
#[inline]
const fn color_index(fg: i16, bg: i16) -> i16 {
    fg * 8 + bg + 1
}

#[inline]
fn color_pair(fg: i16, bg: i16) -> attr_t {
    COLOR_PAIR(color_index(fg, bg))
}

/// Mouse event data
#[derive(Debug, Clone, Copy, Default)]
pub struct MouseEvent {
    pub x: i32,
    pub y: i32,
    pub bstate: u64,
}

/// BUTTON5_PRESSED constant for wheel down (if not available in ncurses)
/// The typical value from ncurses 6 mouse version 2 is 0x200000
const BUTTON5_PRESSED_COMPAT: u64 = 0x200000;

impl MouseEvent {
    /// Check if this was a left button release
    pub fn is_left_click(&self) -> bool {
        (self.bstate & BUTTON1_RELEASED as u64) != 0
    }

    /// Check if this was a right button release
    pub fn is_right_click(&self) -> bool {
        (self.bstate & BUTTON3_RELEASED as u64) != 0
    }

    /// Check if this was a wheel up event
    pub fn is_wheel_up(&self) -> bool {
        (self.bstate & BUTTON4_PRESSED as u64) != 0
    }

    /// Check if this was a wheel down event
    pub fn is_wheel_down(&self) -> bool {
        (self.bstate & BUTTON5_PRESSED_COMPAT) != 0
    }
}

/// Translate a decoded mouse event into a key code.
///
/// Left clicks on the header row become `KEY_HEADER_CLICK`; other left
/// clicks stay `KEY_MOUSE` and are resolved by position later.
pub fn mouse_event_to_key(event: &MouseEvent, header_y: i32) -> Option<i32> {
    if event.is_wheel_up() {
        Some(KEY_WHEELUP)
    } else if event.is_wheel_down() {
        Some(KEY_WHEELDOWN)
    } else if event.is_right_click() {
        Some(KEY_RIGHTCLICK)
    } else if event.is_left_click() {
        if event.y == header_y {
            Some(KEY_HEADER_CLICK)
        } else {
            Some(KEY_MOUSE)
        }
    } else {
        None
    }
}

/// CRT - Terminal handler
pub struct Crt {
    pub colors: Vec<attr_t>,
    pub color_scheme: ColorScheme,
    pub utf8: bool,
    screen_width: i32,
    screen_height: i32,
    mouse_enabled: bool,
    /// Last mouse event (stored for position lookup)
    last_mouse_event: Option<MouseEvent>,
}

impl Crt {
    /// Initialize the terminal
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        // Locale must be set before initscr for wide characters to render
        #[cfg(unix)]
        unsafe {
            let lc_ctype = std::env::var("LC_CTYPE")
                .ok()
                .or_else(|| std::env::var("LC_ALL").ok());

            if let Some(lc) = lc_ctype {
                let c_str = std::ffi::CString::new(lc).unwrap_or_default();
                libc::setlocale(libc::LC_CTYPE, c_str.as_ptr());
            } else {
                libc::setlocale(libc::LC_CTYPE, b"\0".as_ptr() as *const libc::c_char);
            }
        }

        initscr();
        noecho();
        cbreak();
        curs_set(CURSOR_INVISIBLE);
        keypad(stdscr(), true);

        if has_colors() {
            start_color();
            use_default_colors();
        }

        let utf8 = settings.allow_unicode && Self::check_utf8_support();

        let mut crt = Crt {
            colors: vec![0; ColorElement::LastColorElement as usize],
            color_scheme: settings.color_scheme,
            utf8,
            screen_width: 0,
            screen_height: 0,
            mouse_enabled: false,
            last_mouse_event: None,
        };

        crt.set_mouse(settings.enable_mouse);
        crt.set_colors(settings.color_scheme);
        crt.update_size();

        Ok(crt)
    }

    /// Check if UTF-8 is supported
    fn check_utf8_support() -> bool {
        #[cfg(unix)]
        {
            use std::ffi::CStr;

            let codeset = unsafe {
                let ptr = libc::nl_langinfo(libc::CODESET);
                if !ptr.is_null() {
                    CStr::from_ptr(ptr).to_string_lossy().to_string()
                } else {
                    String::new()
                }
            };

            let codeset = codeset.to_uppercase();
            if codeset == "UTF-8" || codeset == "UTF8" {
                return true;
            }
        }

        ["LC_ALL", "LC_CTYPE", "LANG"].iter().any(|var| {
            std::env::var(var)
                .map(|v| v.to_lowercase().contains("utf"))
                .unwrap_or(false)
        })
    }

    /// Set up color pairs for a color scheme
    pub fn set_colors(&mut self, scheme: ColorScheme) {
        self.color_scheme = scheme;

        if !has_colors() || scheme == ColorScheme::Monochrome {
            self.setup_monochrome();
            return;
        }

        for fg in 0i16..8 {
            for bg in 0i16..8 {
                // Black background means the terminal's own background
                let bg_color = if bg == COLOR_BLACK { -1 } else { bg };
                init_pair(color_index(fg, bg), fg, bg_color);
            }
        }

        self.setup_default_colors();
    }

    fn setup_default_colors(&mut self) {
        use ColorElement::*;

        let assign = |crt: &mut Crt, element: ColorElement, attr: attr_t| {
            crt.colors[element as usize] = attr;
        };

        assign(self, ResetColor, color_pair(COLOR_WHITE, COLOR_BLACK));
        assign(self, DefaultColor, color_pair(COLOR_WHITE, COLOR_BLACK));
        // FunctionBar: Black text on Cyan background (labels like "Filter")
        assign(self, FunctionBar, color_pair(COLOR_BLACK, COLOR_CYAN));
        // FunctionKey: White text on default background ("F4", "F9", ...)
        assign(self, FunctionKey, color_pair(COLOR_WHITE, COLOR_BLACK));
        assign(self, PanelHeaderFocus, color_pair(COLOR_BLACK, COLOR_GREEN));
        assign(self, PanelSelectionFocus, color_pair(COLOR_BLACK, COLOR_CYAN));
        assign(self, PanelSortColumn, color_pair(COLOR_BLACK, COLOR_CYAN));
        assign(self, PanelEdit, color_pair(COLOR_WHITE, COLOR_BLUE));
        assign(self, Process, color_pair(COLOR_WHITE, COLOR_BLACK));
        assign(self, ProcessMegabytes, color_pair(COLOR_CYAN, COLOR_BLACK));
        assign(self, StatusText, color_pair(COLOR_CYAN, COLOR_BLACK));
        assign(self, StatusValue, color_pair(COLOR_CYAN, COLOR_BLACK) | A_BOLD);
        assign(self, NoticeOk, color_pair(COLOR_GREEN, COLOR_BLACK) | A_BOLD);
        assign(self, NoticeError, color_pair(COLOR_RED, COLOR_BLACK) | A_BOLD);
        assign(self, MenuBorder, color_pair(COLOR_WHITE, COLOR_BLUE) | A_BOLD);
        assign(self, MenuItem, color_pair(COLOR_WHITE, COLOR_BLUE));
    }

    fn setup_monochrome(&mut self) {
        // Monochrome uses terminal attributes (A_BOLD, A_REVERSE) instead of colors
        for color in &mut self.colors {
            *color = A_NORMAL;
        }

        self.colors[ColorElement::FunctionBar as usize] = A_REVERSE;
        self.colors[ColorElement::PanelHeaderFocus as usize] = A_REVERSE;
        self.colors[ColorElement::PanelSelectionFocus as usize] = A_REVERSE;
        self.colors[ColorElement::PanelSortColumn as usize] = A_BOLD;
        self.colors[ColorElement::PanelEdit as usize] = A_BOLD;
        self.colors[ColorElement::StatusValue as usize] = A_BOLD;
        self.colors[ColorElement::NoticeOk as usize] = A_BOLD;
        self.colors[ColorElement::NoticeError as usize] = A_BOLD | A_REVERSE;
        self.colors[ColorElement::MenuBorder as usize] = A_BOLD;
        self.colors[ColorElement::MenuItem as usize] = A_REVERSE;
    }

    /// Get color attribute for an element
    pub fn color(&self, element: ColorElement) -> attr_t {
        self.colors
            .get(element as usize)
            .copied()
            .unwrap_or(A_NORMAL)
    }

    /// Update screen dimensions
    pub fn update_size(&mut self) {
        getmaxyx(stdscr(), &mut self.screen_height, &mut self.screen_width);
    }

    /// Get screen width
    pub fn width(&self) -> i32 {
        self.screen_width
    }

    /// Get screen height
    pub fn height(&self) -> i32 {
        self.screen_height
    }

    /// Block at most `ms` milliseconds in the next `read_key`
    pub fn set_timeout_ms(&self, ms: i32) {
        ncurses::timeout(ms.max(0));
    }

    /// Read a key from input
    pub fn read_key(&self) -> Option<i32> {
        let ch = getch();
        if ch == ERR {
            None
        } else {
            Some(ch)
        }
    }

    /// Get mouse event after KEY_MOUSE was returned and store it
    pub fn get_mouse_event(&mut self) -> Option<MouseEvent> {
        if !self.mouse_enabled {
            return None;
        }

        let mut mevent = MEVENT {
            id: 0,
            x: 0,
            y: 0,
            z: 0,
            bstate: 0,
        };

        if getmouse(&mut mevent) == OK {
            let event = MouseEvent {
                x: mevent.x,
                y: mevent.y,
                bstate: mevent.bstate as u64,
            };
            self.last_mouse_event = Some(event);
            Some(event)
        } else {
            None
        }
    }

    /// Get the last stored mouse event
    pub fn last_mouse_event(&self) -> Option<MouseEvent> {
        self.last_mouse_event
    }

    /// Process a mouse event and convert to a key code
    /// This is called when KEY_MOUSE is received
    pub fn process_mouse_event(&mut self, header_y: i32) -> Option<i32> {
        let event = self.get_mouse_event()?;
        mouse_event_to_key(&event, header_y)
    }

    /// Set mouse enabled state
    pub fn set_mouse(&mut self, enabled: bool) {
        self.mouse_enabled = enabled;
        if enabled {
            let mask = BUTTON1_RELEASED
                | BUTTON3_RELEASED
                | BUTTON4_PRESSED
                | BUTTON5_PRESSED_COMPAT as i32;
            mousemask(mask as mmask_t, None);
            mouseinterval(0);
        } else {
            mousemask(0, None);
        }
    }

    pub fn clear(&self) {
        clear();
    }

    pub fn refresh(&self) {
        refresh();
    }

    pub fn mv(&self, y: i32, x: i32) {
        mv(y, x);
    }

    pub fn attrset(&self, attr: attr_t) {
        attrset(attr);
    }

    /// Write text at the cursor with the current attribute
    pub fn addstr_raw(&self, text: &str) {
        let _ = addstr(text);
    }

    pub fn addch_raw(&self, ch: u32) {
        addch(ch);
    }

    /// Print a string with attributes
    pub fn print_at(&self, y: i32, x: i32, attr: attr_t, text: &str) {
        attrset(attr);
        let _ = mvaddstr(y, x, text);
        attrset(A_NORMAL);
    }

    /// Fill a whole screen row with spaces in `attr`
    pub fn fill_line(&self, y: i32, attr: attr_t) {
        mv(y, 0);
        attrset(attr);
        for _ in 0..self.screen_width {
            addch(' ' as u32);
        }
        attrset(A_NORMAL);
    }

    /// Draw a horizontal line
    pub fn hline(&self, y: i32, x: i32, ch: u32, n: i32) {
        mv(y, x);
        hline(ch, n);
    }

    /// Draw a box
    pub fn draw_box(&self, y: i32, x: i32, h: i32, w: i32) {
        self.hline(y, x, ACS_HLINE(), w);
        mvaddch(y, x, ACS_ULCORNER());
        mvaddch(y, x + w - 1, ACS_URCORNER());

        for i in 1..h - 1 {
            mvaddch(y + i, x, ACS_VLINE());
            mvaddch(y + i, x + w - 1, ACS_VLINE());
        }

        self.hline(y + h - 1, x, ACS_HLINE(), w);
        mvaddch(y + h - 1, x, ACS_LLCORNER());
        mvaddch(y + h - 1, x + w - 1, ACS_LRCORNER());
    }

    /// Show or hide the text cursor
    pub fn show_cursor(&self, visible: bool) {
        curs_set(if visible { CURSOR_VISIBLE } else { CURSOR_INVISIBLE });
    }

    /// Clean up terminal
    pub fn done(&self) {
        restore_terminal();
    }
}

/// Leave curses mode without a `Crt` handle (panic hook). Safe to repeat.
pub fn restore_terminal() {
    curs_set(CURSOR_VISIBLE);
    endwin();
}

impl Drop for Crt {
    fn drop(&mut self) {
        self.done();
    }
}
