//! ContextMenuView - the popup drawn over the table for the menu's target

use super::crt::ColorElement;
use super::Crt;
use crate::core::{ContextMenu, Size};

/// The single action the menu offers
pub const KILL_ITEM: &str = "Kill process";

/// Box around one item line, with room for the pid in the top border
pub const MENU_SIZE: Size = Size {
    width: 18,
    height: 3,
};

/// Text for the item line, centered inside the box borders
pub fn item_line(width: i32) -> String {
    let inner = (width - 2).max(0) as usize;
    format!("{:^inner$}", KILL_ITEM, inner = inner)
}

/// Title written into the top border
pub fn title(pid: i32) -> String {
    format!(" PID {} ", pid)
}

pub struct ContextMenuView;

impl ContextMenuView {
    /// Draw `menu` if it is open
    pub fn draw(crt: &Crt, menu: &ContextMenu) {
        let Some(pid) = menu.target() else {
            return;
        };
        let at = menu.anchor();
        let size = menu.size();
        if size.width < 4 || size.height < 3 {
            return;
        }

        let border = crt.color(ColorElement::MenuBorder);
        crt.attrset(border);
        crt.draw_box(at.y, at.x, size.height, size.width);

        let label = title(pid);
        if (label.chars().count() as i32) <= size.width - 2 {
            crt.print_at(at.y, at.x + 1, border, &label);
        }

        let item = crt.color(ColorElement::MenuItem);
        for row in 1..size.height - 1 {
            let text = if row == 1 {
                item_line(size.width)
            } else {
                " ".repeat((size.width - 2) as usize)
            };
            crt.print_at(at.y + row, at.x + 1, item, &text);
        }
    }
}
