//! ScreenManager - owns the view state and runs the main event loop
//!
//! Each iteration collects finished background work (fetches, kills), asks
//! the refresh schedule whether to start a fetch, draws, then waits for one
//! key or mouse event. Keys are first mapped to an [`Action`] for the
//! current input mode; actions are applied to the view state here, on the
//! loop thread only.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use ncurses::{
    KEY_BACKSPACE, KEY_DOWN, KEY_END, KEY_ENTER, KEY_HOME, KEY_MOUSE, KEY_NPAGE, KEY_PPAGE,
    KEY_RESIZE, KEY_UP,
};
use tracing::{debug, info, warn};

use super::context_menu::{ContextMenuView, MENU_SIZE};
use super::crt::{
    ColorElement, KEY_CR, KEY_CTRL_L, KEY_DEL_MAC, KEY_ESC, KEY_F10, KEY_F3, KEY_F4, KEY_F9,
    KEY_HEADER_CLICK, KEY_LF, KEY_RIGHTCLICK, KEY_WHEELDOWN, KEY_WHEELUP,
};
use super::function_bar::FunctionBar;
use super::main_panel::MainPanel;
use super::{Crt, RichString};
use crate::core::{Pid, Point, RefreshLoop, Settings, Size, SortKey, Tick, ViewState};
use crate::platform::HostWorker;

/// Lines scrolled per wheel notch
const WHEEL_LINES: i32 = 10;

/// Longest wait for input, so background results and notice expiry are
/// picked up while the user is idle
const MAX_INPUT_WAIT: Duration = Duration::from_millis(250);

/// Result of handling one input event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerResult {
    Handled,
    Ignored,
    BreakLoop,
    Redraw,
    Resize,
}

/// Which part of the screen has the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Table,
    Filter,
    Menu,
}

/// What an input event asks for, before it touches any state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Resize,
    Redraw,
    Sort(SortKey),
    /// Left click on the header row at the pointer
    HeaderClick,
    /// Left click in the body at the pointer
    PointerClick,
    /// Right click at the pointer
    PointerContext,
    Step(isize),
    Page(isize),
    Jump { to_end: bool },
    ClearSelection,
    Scroll(i32),
    StartFilter,
    FilterChar(char),
    FilterBackspace,
    FilterDone,
    FilterClear,
    /// Keyboard trigger for the menu on the selected row
    OpenMenu,
    ConfirmMenu,
    CloseMenu,
    None,
}

/// Map a key code to an action for the given input mode
pub fn key_action(key: i32, mode: InputMode) -> Action {
    // Keys that mean the same thing everywhere
    match key {
        KEY_RESIZE => return Action::Resize,
        KEY_WHEELUP => return Action::Scroll(-1),
        KEY_WHEELDOWN => return Action::Scroll(1),
        _ => {}
    }

    match mode {
        InputMode::Filter => match key {
            KEY_ENTER | KEY_LF | KEY_CR => Action::FilterDone,
            KEY_ESC => Action::FilterClear,
            KEY_BACKSPACE | KEY_DEL_MAC | 0x08 => Action::FilterBackspace,
            KEY_HEADER_CLICK => Action::HeaderClick,
            KEY_MOUSE => Action::PointerClick,
            KEY_RIGHTCLICK => Action::PointerContext,
            k if (0x20..0x7F).contains(&k) => Action::FilterChar(k as u8 as char),
            _ => Action::None,
        },
        InputMode::Menu => match key {
            KEY_ENTER | KEY_LF | KEY_CR => Action::ConfirmMenu,
            KEY_ESC | KEY_HEADER_CLICK => Action::CloseMenu,
            KEY_MOUSE => Action::PointerClick,
            KEY_RIGHTCLICK => Action::PointerContext,
            KEY_F10 => Action::Quit,
            k if k == 'q' as i32 || k == 'Q' as i32 => Action::Quit,
            _ => Action::None,
        },
        InputMode::Table => match key {
            KEY_F10 => Action::Quit,
            KEY_F3 | KEY_F4 => Action::StartFilter,
            KEY_F9 => Action::OpenMenu,
            KEY_UP => Action::Step(-1),
            KEY_DOWN => Action::Step(1),
            KEY_PPAGE => Action::Page(-1),
            KEY_NPAGE => Action::Page(1),
            KEY_HOME => Action::Jump { to_end: false },
            KEY_END => Action::Jump { to_end: true },
            KEY_HEADER_CLICK => Action::HeaderClick,
            KEY_MOUSE => Action::PointerClick,
            KEY_RIGHTCLICK => Action::PointerContext,
            KEY_CTRL_L => Action::Redraw,
            KEY_ESC => Action::ClearSelection,
            k if (0..0x80).contains(&k) => match k as u8 as char {
                'q' | 'Q' => Action::Quit,
                '/' | '\\' => Action::StartFilter,
                'k' => Action::OpenMenu,
                'N' => Action::Sort(SortKey::Pid),
                'C' => Action::Sort(SortKey::Name),
                'R' => Action::Sort(SortKey::Parent),
                'P' => Action::Sort(SortKey::Cpu),
                'M' => Action::Sort(SortKey::Mem),
                _ => Action::None,
            },
            _ => Action::None,
        },
    }
}

/// A short message on the status line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub is_error: bool,
    pub expires: Instant,
}

/// Screen manager state
pub struct ScreenManager {
    view: ViewState,
    main_panel: MainPanel,
    function_bar: FunctionBar,
    settings: Settings,
    worker: HostWorker,
    refresh: RefreshLoop,
    notice: Option<Notice>,
    fetch_failures: u64,
    /// Fetches left before exiting (-1 = unlimited)
    iterations_remaining: i64,
    /// Host description for the status line
    host: String,
}

impl ScreenManager {
    pub fn new(settings: Settings, view: ViewState, worker: HostWorker) -> Self {
        let refresh = RefreshLoop::new(Duration::from_millis(settings.refresh_interval_ms));
        let info = os_info::get();
        let mut function_bar = FunctionBar::new();
        function_bar.update_filter_label(view.filter().is_active());

        ScreenManager {
            view,
            main_panel: MainPanel::new(),
            function_bar,
            settings,
            worker,
            refresh,
            notice: None,
            fetch_failures: 0,
            iterations_remaining: -1,
            host: format!("{} {}", info.os_type(), info.version()),
        }
    }

    /// Stop after `n` completed fetches
    pub fn set_max_iterations(&mut self, n: i64) {
        self.iterations_remaining = n;
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn fetch_failures(&self) -> u64 {
        self.fetch_failures
    }

    pub fn input_mode(&self) -> InputMode {
        if self.view.menu().is_open() {
            InputMode::Menu
        } else if self.view.filter().is_editing() {
            InputMode::Filter
        } else {
            InputMode::Table
        }
    }

    /// Place the panel: status line on top, bar at the bottom
    fn layout(&mut self, crt: &Crt) {
        self.main_panel
            .move_resize(0, 1, crt.width(), (crt.height() - 2).max(1));
    }

    fn show_notice(&mut self, text: String, is_error: bool, now: Instant) {
        self.notice = Some(Notice {
            text,
            is_error,
            expires: now + Duration::from_secs(self.settings.notice_secs),
        });
    }

    /// Collect finished background work and start a fetch when one is due
    pub fn poll_background(&mut self, now: Instant) {
        if let Some(result) = self.worker.take_fetch() {
            match result {
                Ok(records) => self.view.apply_snapshot(records),
                Err(e) => {
                    self.fetch_failures += 1;
                    warn!(
                        error = %e,
                        failures = self.fetch_failures,
                        "process fetch failed, keeping previous snapshot"
                    );
                }
            }
            if self.iterations_remaining > 0 {
                self.iterations_remaining -= 1;
            }
        }

        if let Some((pid, result)) = self.worker.take_terminate() {
            match result {
                Ok(()) => {
                    info!(pid, signal = self.settings.kill_signal.name(), "process killed");
                    self.show_notice(format!("Sent kill to {}", pid), false, now);
                }
                Err(e) => {
                    warn!(pid, error = %e, "kill failed");
                    self.show_notice(format!("Kill {} failed: {}", pid, e), true, now);
                }
            }
        }

        match self.refresh.poll(now, self.worker.fetch_in_flight()) {
            Tick::Fetch => {
                self.worker.start_fetch();
            }
            Tick::Skip => debug!(
                skipped = self.refresh.skipped(),
                "refresh tick skipped, previous fetch still running"
            ),
            Tick::Idle => {}
        }

        if self.notice.as_ref().is_some_and(|n| n.expires <= now) {
            self.notice = None;
        }
    }

    /// Open the menu for `pid`, or refuse in read-only mode
    fn open_menu(&mut self, pid: Pid, cursor: Point, viewport: Size, now: Instant) {
        if self.settings.readonly {
            self.view.click_row(pid);
            self.show_notice("Kill is disabled in read-only mode".to_string(), true, now);
            return;
        }
        self.view.context_row(pid, cursor, MENU_SIZE, viewport);
    }

    fn confirm_menu(&mut self, now: Instant) {
        let Some(pid) = self.view.confirm_terminate() else {
            return;
        };
        if self.worker.start_terminate(pid) {
            info!(pid, "kill requested");
        } else {
            self.show_notice("A previous kill is still running".to_string(), true, now);
        }
    }

    /// Apply one action. `pointer` is the last mouse position, `viewport`
    /// the terminal size.
    pub fn apply(
        &mut self,
        action: Action,
        pointer: Option<Point>,
        viewport: Size,
        now: Instant,
    ) -> HandlerResult {
        match action {
            Action::Quit => return HandlerResult::BreakLoop,
            Action::Resize => return HandlerResult::Resize,
            Action::Redraw => return HandlerResult::Redraw,
            Action::None => return HandlerResult::Ignored,

            Action::Sort(key) => self.view.toggle_sort(key),
            Action::HeaderClick => {
                let Some(at) = pointer else {
                    return HandlerResult::Ignored;
                };
                if self.view.menu().is_open() {
                    self.view.close_menu();
                } else if let Some(column) = self.main_panel.column_at_x(at.x) {
                    self.view.click_header(column);
                }
            }
            Action::PointerClick => {
                let Some(at) = pointer else {
                    return HandlerResult::Ignored;
                };
                if self.view.menu().contains(at) {
                    self.confirm_menu(now);
                } else if let Some(pid) = self.main_panel.pid_at_y(at.y) {
                    self.view.click_row(pid);
                } else {
                    self.view.close_menu();
                }
            }
            Action::PointerContext => {
                let Some(at) = pointer else {
                    return HandlerResult::Ignored;
                };
                match self.main_panel.pid_at_y(at.y) {
                    Some(pid) => self.open_menu(pid, at, viewport, now),
                    None => self.view.close_menu(),
                }
            }
            Action::OpenMenu => {
                let target = self
                    .view
                    .selection()
                    .selected()
                    .and_then(|pid| self.main_panel.row_y(pid).map(|y| (pid, y)));
                match target {
                    Some((pid, y)) => {
                        let cursor = Point::new(self.main_panel.x, y);
                        self.open_menu(pid, cursor, viewport, now);
                    }
                    None => self.show_notice("No process selected".to_string(), true, now),
                }
            }
            Action::ConfirmMenu => self.confirm_menu(now),
            Action::CloseMenu => self.view.close_menu(),

            Action::Step(delta) => {
                self.view.step_selection(delta);
                self.main_panel.follow();
            }
            Action::Page(direction) => {
                self.view.step_selection(direction * self.main_panel.page_size());
                self.main_panel.follow();
            }
            Action::Jump { to_end } => {
                self.view.jump_selection(to_end);
                self.main_panel.follow();
            }
            Action::ClearSelection => self.view.clear_selection(),
            Action::Scroll(direction) => self.main_panel.scroll_wheel(direction * WHEEL_LINES),

            Action::StartFilter => self.view.filter_mut().start_editing(),
            Action::FilterChar(c) => self.view.filter_mut().push_char(c),
            Action::FilterBackspace => self.view.filter_mut().backspace(),
            Action::FilterDone => self.view.filter_mut().confirm(),
            Action::FilterClear => self.view.filter_mut().cancel(),
        }

        self.function_bar
            .update_filter_label(self.view.filter().is_active());
        HandlerResult::Handled
    }

    /// Handle a key event
    fn handle_key(&mut self, key: i32, crt: &Crt) -> HandlerResult {
        let action = key_action(key, self.input_mode());
        let pointer = crt.last_mouse_event().map(|e| Point::new(e.x, e.y));
        let viewport = Size::new(crt.width(), crt.height());
        self.apply(action, pointer, viewport, Instant::now())
    }

    fn draw_status(&self, crt: &Crt, y: i32) {
        let text = crt.color(ColorElement::StatusText);
        let value = crt.color(ColorElement::StatusValue);
        let snapshot = self.view.snapshot();

        let mut str = RichString::new();
        str.append(" ", text);
        str.append(&self.host, text);
        str.append("  Tasks: ", text);
        str.append(&snapshot.len().to_string(), value);
        str.append(", shown: ", text);
        str.append(&self.view.visible().len().to_string(), value);
        str.append("  Updated: ", text);
        match snapshot.taken_at() {
            Some(at) => str.append(&at.format("%H:%M:%S").to_string(), value),
            None => str.append("never", value),
        }
        if self.fetch_failures > 0 {
            str.append("  Failed fetches: ", text);
            str.append(
                &self.fetch_failures.to_string(),
                crt.color(ColorElement::NoticeError),
            );
        }
        if let Some(notice) = &self.notice {
            let attr = if notice.is_error {
                crt.color(ColorElement::NoticeError)
            } else {
                crt.color(ColorElement::NoticeOk)
            };
            str.append("  ", text);
            str.append(&notice.text, attr);
        }

        crt.fill_line(y, crt.color(ColorElement::DefaultColor));
        str.write_at_width(crt, y, 0, crt.width().max(0) as usize);
    }

    /// Filter prompt: "Enter" "Done  " "Esc" "Clear " "  " " Filter: " [text]
    fn draw_filter_bar(&self, crt: &Crt, y: i32) {
        let bar_color = crt.color(ColorElement::FunctionBar);
        let key_color = crt.color(ColorElement::FunctionKey);

        let mut x = FunctionBar::new_enter_esc("Done", "Clear").draw(crt, y);
        crt.print_at(y, x, key_color, "  ");
        x += 2;
        let prompt = format!(" Filter: {}", self.view.filter().text());
        crt.print_at(y, x, bar_color, &prompt);
        x += prompt.chars().count() as i32;

        crt.mv(y, x.min(crt.width() - 1));
        crt.show_cursor(true);
    }

    /// Draw the entire screen
    fn draw(&mut self, crt: &Crt) {
        self.draw_status(crt, 0);
        self.main_panel.draw(crt, &self.view);
        ContextMenuView::draw(crt, self.view.menu());

        let y = crt.height() - 1;
        if self.view.filter().is_editing() {
            self.draw_filter_bar(crt, y);
        } else {
            self.function_bar.draw(crt, y);
            crt.show_cursor(false);
        }

        crt.refresh();
    }

    /// Handle resize
    fn handle_resize(&mut self, crt: &mut Crt) {
        crt.update_size();
        self.layout(crt);
        // Keep the menu inside the new screen
        self.view.close_menu();
        crt.clear();
    }

    /// Run the main event loop
    pub fn run(&mut self, crt: &mut Crt, running: &AtomicBool) -> anyhow::Result<()> {
        self.layout(crt);
        crt.clear();
        info!(
            interval_ms = self.refresh.period().as_millis() as u64,
            "event loop started"
        );

        loop {
            if !running.load(Ordering::SeqCst) {
                info!("termination signal received");
                break;
            }

            if self.iterations_remaining == 0 {
                break;
            }

            let now = Instant::now();
            self.poll_background(now);
            self.draw(crt);

            let wait = self.refresh.time_until_due(now).min(MAX_INPUT_WAIT);
            crt.set_timeout_ms(wait.as_millis() as i32);

            let mut key = crt.read_key();
            if key == Some(KEY_MOUSE) {
                key = crt.process_mouse_event(self.main_panel.y);
            }

            if let Some(key) = key {
                match self.handle_key(key, crt) {
                    HandlerResult::BreakLoop => break,
                    HandlerResult::Resize => self.handle_resize(crt),
                    HandlerResult::Redraw => crt.clear(),
                    HandlerResult::Handled | HandlerResult::Ignored => {}
                }
            }
        }

        Ok(())
    }
}
