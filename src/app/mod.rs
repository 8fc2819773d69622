//! Application state for the terminal board: owns the board, routes user
//! intents to board transitions, and persists every committed change.

pub mod input;
pub mod interaction;
pub mod messages;

use std::collections::HashMap;

use anyhow::Result;
use tracing::{debug, info};

use crate::board::Board;
use crate::drag::{DragController, DragEnd, DragSession, DragStart};
use crate::persistence::PersistenceGateway;
use crate::settings::Settings;
use crate::theme::{Theme, ThemeMode};

use self::interaction::{HitTarget, InteractionMap};
pub use self::messages::Message;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum InlineEdit {
    ColumnTitle { column_id: String, buffer: String },
    NewCard { column_id: String, buffer: String },
}

impl InlineEdit {
    pub fn column_id(&self) -> &str {
        match self {
            Self::ColumnTitle { column_id, .. } | Self::NewCard { column_id, .. } => column_id,
        }
    }

    pub fn buffer(&self) -> &str {
        match self {
            Self::ColumnTitle { buffer, .. } | Self::NewCard { buffer, .. } => buffer,
        }
    }

    fn buffer_mut(&mut self) -> &mut String {
        match self {
            Self::ColumnTitle { buffer, .. } | Self::NewCard { buffer, .. } => buffer,
        }
    }
}

/// A left-button press on a drag handle that has not yet travelled far
/// enough to become a drag.
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) struct PendingPress {
    pub origin: (u16, u16),
    pub target: HitTarget,
}

pub struct App {
    board: Board,
    gateway: PersistenceGateway,
    drag: DragController,
    theme_mode: ThemeMode,
    theme: Theme,
    settings: Settings,
    pub(crate) interaction_map: InteractionMap,
    pub(crate) pending_press: Option<PendingPress>,
    pub(crate) pointer: Option<(u16, u16)>,
    pub(crate) hovered_drop: Option<String>,
    pub(crate) editing: Option<InlineEdit>,
    pub(crate) board_scroll: usize,
    /// First visible card per column id.
    pub(crate) column_scroll: HashMap<String, usize>,
    pub(crate) footer_notice: Option<String>,
    should_quit: bool,
}

impl App {
    /// Loads the stored board (seeding and saving the default one when
    /// nothing usable is stored) and the theme. `theme_override` wins over
    /// the stored theme for this session without being written.
    pub fn new(
        mut gateway: PersistenceGateway,
        settings: Settings,
        theme_override: Option<ThemeMode>,
    ) -> Self {
        let board = match gateway.load() {
            Some(board) => {
                info!("loaded board with {} column(s)", board.columns().len());
                board
            }
            None => {
                let board = Board::seeded();
                gateway.save(&board);
                board
            }
        };
        let theme_mode = theme_override.unwrap_or_else(|| gateway.load_theme());

        Self {
            board,
            gateway,
            drag: DragController::new(),
            theme_mode,
            theme: Theme::from_mode(theme_mode),
            settings,
            interaction_map: InteractionMap::default(),
            pending_press: None,
            pointer: None,
            hovered_drop: None,
            editing: None,
            board_scroll: 0,
            column_scroll: HashMap::new(),
            footer_notice: None,
            should_quit: false,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn theme_mode(&self) -> ThemeMode {
        self.theme_mode
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn drag_session(&self) -> &DragSession {
        self.drag.session()
    }

    pub fn editing(&self) -> Option<&InlineEdit> {
        self.editing.as_ref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn update(&mut self, message: Message) -> Result<()> {
        match message {
            Message::Key(key) => self.handle_key(key),
            Message::Mouse(mouse) => self.handle_mouse(mouse),
            Message::Resize(width, height) => {
                debug!("terminal resized to {width}x{height}");
                self.clamp_board_scroll();
                Ok(())
            }
        }
    }

    /// Swaps in `next` and persists it, unless the transition changed
    /// nothing.
    fn commit(&mut self, next: Board) {
        if next == self.board {
            return;
        }
        self.board = next;
        self.gateway.save(&self.board);
        self.clamp_board_scroll();
        self.column_scroll
            .retain(|column_id, _| self.board.column(column_id).is_some());
    }

    pub fn add_column(&mut self) {
        let next = self.board.add_column();
        self.commit(next);
    }

    pub fn delete_column(&mut self, column_id: &str) {
        let next = self.board.delete_column(column_id);
        self.commit(next);
    }

    /// Applies a title edit. Blank titles and unchanged titles are dropped.
    pub fn rename_column(&mut self, column_id: &str, title: &str) {
        if title.trim().is_empty() {
            return;
        }
        let unchanged = self
            .board
            .column(column_id)
            .is_some_and(|column| column.title == title);
        if unchanged {
            return;
        }
        let next = self.board.rename_column(column_id, title);
        self.commit(next);
    }

    /// Returns whether a card was added; blank content is rejected here so
    /// it never reaches the board.
    pub fn add_card(&mut self, column_id: &str, content: &str) -> bool {
        if content.trim().is_empty() {
            return false;
        }
        let next = self.board.add_card(column_id, content);
        let added = next != self.board;
        self.commit(next);
        added
    }

    pub fn delete_card(&mut self, column_id: &str, card_id: &str) {
        let next = self.board.delete_card(column_id, card_id);
        self.commit(next);
    }

    pub fn toggle_theme(&mut self) {
        self.theme_mode = self.theme_mode.toggled();
        self.theme = Theme::from_mode(self.theme_mode);
        self.gateway.save_theme(self.theme_mode);
        info!("theme switched to {}", self.theme_mode.as_str());
    }

    pub fn start_drag(&mut self, start: &DragStart) {
        self.drag.on_drag_start(&self.board, start);
        if self.drag.is_dragging() {
            self.footer_notice = Some(format!(
                "Picked up {} {}",
                start.active_kind.as_str(),
                start.active_id
            ));
        }
    }

    /// Ends the active drag over `over_id`. Without an active session there
    /// is nothing to drop.
    pub fn end_drag(&mut self, over_id: Option<String>) {
        let session = self.drag.session();
        let (Some(active_id), Some(active_kind)) = (session.active_id(), session.kind()) else {
            return;
        };
        let end = DragEnd {
            active_id: active_id.to_string(),
            active_kind,
            over_id,
        };
        self.hovered_drop = None;
        self.footer_notice = Some(match &end.over_id {
            Some(over_id) => format!(
                "Dropped {} {} over {over_id}",
                active_kind.as_str(),
                end.active_id
            ),
            None => format!(
                "Dropped {} {} outside any column",
                active_kind.as_str(),
                end.active_id
            ),
        });
        if let Some(next) = self.drag.on_drag_end(&self.board, &end) {
            self.commit(next);
        }
    }

    pub fn cancel_drag(&mut self) {
        if self.drag.is_dragging() {
            self.footer_notice = Some("Drag cancelled".to_string());
        }
        self.drag.cancel();
        self.pending_press = None;
        self.hovered_drop = None;
    }

    pub fn begin_rename(&mut self, column_id: &str) {
        let Some(column) = self.board.column(column_id) else {
            return;
        };
        self.editing = Some(InlineEdit::ColumnTitle {
            column_id: column.id.clone(),
            buffer: column.title.clone(),
        });
    }

    pub fn begin_new_card(&mut self, column_id: &str) {
        if self.board.column(column_id).is_none() {
            return;
        }
        self.editing = Some(InlineEdit::NewCard {
            column_id: column_id.to_string(),
            buffer: String::new(),
        });
    }

    pub(crate) fn edit_push(&mut self, ch: char) {
        if let Some(edit) = self.editing.as_mut() {
            edit.buffer_mut().push(ch);
        }
    }

    pub(crate) fn edit_pop(&mut self) {
        if let Some(edit) = self.editing.as_mut() {
            edit.buffer_mut().pop();
        }
    }

    /// Enter in an inline editor. A title edit always closes; the new-card
    /// input stays open for the next card once a card was added.
    pub(crate) fn submit_edit(&mut self) {
        match self.editing.take() {
            Some(InlineEdit::ColumnTitle { column_id, buffer }) => {
                self.rename_column(&column_id, &buffer);
            }
            Some(InlineEdit::NewCard { column_id, buffer }) => {
                let buffer = if self.add_card(&column_id, &buffer) {
                    String::new()
                } else {
                    buffer
                };
                if self.board.column(&column_id).is_some() {
                    self.editing = Some(InlineEdit::NewCard { column_id, buffer });
                }
            }
            None => {}
        }
    }

    /// Focus left the editor: a pending title edit is applied, a half-typed
    /// card is dropped.
    pub(crate) fn blur_edit(&mut self) {
        match self.editing.take() {
            Some(InlineEdit::ColumnTitle { column_id, buffer }) => {
                self.rename_column(&column_id, &buffer);
            }
            Some(InlineEdit::NewCard { .. }) | None => {}
        }
    }

    pub(crate) fn cancel_edit(&mut self) {
        self.editing = None;
    }

    pub(crate) fn quit(&mut self) {
        self.cancel_drag();
        self.should_quit = true;
    }

    pub(crate) fn scroll_board(&mut self, delta: i32) {
        if delta > 0 {
            self.board_scroll = self.board_scroll.saturating_add(1);
        } else {
            self.board_scroll = self.board_scroll.saturating_sub(1);
        }
        self.clamp_board_scroll();
    }

    /// Moves a column's card list by one card. The offset never passes the
    /// last card, so every card can be scrolled into view.
    pub(crate) fn scroll_column(&mut self, column_id: &str, delta: i32) {
        if self.board.column(column_id).is_none() {
            return;
        }
        let current = self.clamped_column_scroll(column_id);
        let next = if delta > 0 {
            current.saturating_add(1).min(self.max_column_scroll(column_id))
        } else {
            current.saturating_sub(1)
        };
        self.column_scroll.insert(column_id.to_string(), next);
    }

    pub(crate) fn clamped_column_scroll(&self, column_id: &str) -> usize {
        self.column_scroll
            .get(column_id)
            .copied()
            .unwrap_or(0)
            .min(self.max_column_scroll(column_id))
    }

    fn max_column_scroll(&self, column_id: &str) -> usize {
        self.board
            .column(column_id)
            .map_or(0, |column| column.tasks.len().saturating_sub(1))
    }

    fn clamp_board_scroll(&mut self) {
        let max = self.board.columns().len().saturating_sub(1);
        self.board_scroll = self.board_scroll.min(max);
    }
}
