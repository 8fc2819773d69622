use anyhow::Result;
use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use tracing::debug;

use crate::app::interaction::{HitTarget, InteractionKind};
use crate::app::{App, PendingPress};

impl App {
    pub(crate) fn handle_mouse(&mut self, mouse: MouseEvent) -> Result<()> {
        let position = (mouse.column, mouse.row);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.pointer = Some(position);
                self.handle_press(mouse.column, mouse.row);
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                self.pointer = Some(position);
                self.handle_drag_motion(mouse.column, mouse.row);
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.pointer = Some(position);
                self.handle_release(mouse.column, mouse.row);
            }
            MouseEventKind::Moved => {
                self.pointer = Some(position);
            }
            MouseEventKind::ScrollDown => self.handle_wheel(mouse.column, mouse.row, 1),
            MouseEventKind::ScrollUp => self.handle_wheel(mouse.column, mouse.row, -1),
            MouseEventKind::ScrollRight => {
                if !self.drag.is_dragging() {
                    self.scroll_board(1);
                }
            }
            MouseEventKind::ScrollLeft => {
                if !self.drag.is_dragging() {
                    self.scroll_board(-1);
                }
            }
            _ => {}
        }

        Ok(())
    }

    fn handle_press(&mut self, col: u16, row: u16) {
        self.pending_press = None;
        self.footer_notice = None;
        let target = self
            .interaction_map
            .resolve(col, row, InteractionKind::Press)
            .cloned();

        if self.editing.is_some() && target != Some(HitTarget::EditField) {
            self.blur_edit();
        }

        let Some(target) = target else {
            return;
        };

        match target {
            HitTarget::Card { .. } | HitTarget::ColumnHeader { .. } | HitTarget::ColumnTitle { .. } => {
                self.pending_press = Some(PendingPress {
                    origin: (col, row),
                    target,
                });
            }
            HitTarget::DeleteCard { column_id, card_id } => self.delete_card(&column_id, &card_id),
            HitTarget::DeleteColumn { column_id } => self.delete_column(&column_id),
            HitTarget::AddCard { column_id } => self.begin_new_card(&column_id),
            HitTarget::AddColumn => self.add_column(),
            HitTarget::ToggleTheme => self.toggle_theme(),
            HitTarget::ColumnBody { .. } | HitTarget::EditField => {}
        }
    }

    fn handle_drag_motion(&mut self, col: u16, row: u16) {
        if self.drag.is_dragging() {
            self.hovered_drop = self.drop_id_at(col, row);
            return;
        }

        let Some(pending) = self.pending_press.as_ref() else {
            return;
        };
        let (origin_col, origin_row) = pending.origin;
        let travelled = col.abs_diff(origin_col).max(row.abs_diff(origin_row));
        if travelled < self.settings().drag_threshold {
            return;
        }

        let start = pending.target.drag_start();
        self.pending_press = None;
        if let Some(start) = start {
            self.start_drag(&start);
            self.hovered_drop = self.drop_id_at(col, row);
        }
    }

    fn handle_release(&mut self, col: u16, row: u16) {
        if self.drag.is_dragging() {
            let over_id = self.drop_id_at(col, row);
            debug!("pointer released at ({col}, {row}) over {over_id:?}");
            self.end_drag(over_id);
            return;
        }

        // A press that never travelled is a click.
        if let Some(PendingPress {
            target: HitTarget::ColumnTitle { column_id },
            ..
        }) = self.pending_press.take()
        {
            self.begin_rename(&column_id);
        }
    }

    /// Vertical wheel over a column's cards scrolls that column, during a
    /// drag too. Anywhere else it scrolls the board sideways.
    fn handle_wheel(&mut self, col: u16, row: u16, delta: i32) {
        let column_id = match self.interaction_map.resolve(col, row, InteractionKind::Drop) {
            Some(HitTarget::Card { column_id, .. } | HitTarget::ColumnBody { column_id }) => {
                Some(column_id.clone())
            }
            _ => None,
        };

        match column_id {
            Some(column_id) => {
                self.scroll_column(&column_id, delta);
                if self.drag.is_dragging() {
                    self.hovered_drop = None;
                }
            }
            None if !self.drag.is_dragging() => self.scroll_board(delta),
            None => {}
        }
    }

    fn drop_id_at(&self, col: u16, row: u16) -> Option<String> {
        let kind = self.drag.session().kind()?;
        self.interaction_map
            .resolve(col, row, InteractionKind::Drop)
            .and_then(|target| target.drop_id(kind))
            .map(str::to_string)
    }
}
