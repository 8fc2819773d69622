//! Drag session controller.
//!
//! The presentation layer only reports which item is being dragged and what
//! is under the pointer when the gesture ends. This module turns that generic
//! `(active, over)` pair into a column reorder, a same-column card reorder, or
//! a cross-column card move.

use tracing::debug;

use crate::board::{Board, Card, Column};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum DragKind {
    Column,
    Task,
}

impl DragKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Column => "column",
            Self::Task => "task",
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DragStart {
    pub active_id: String,
    pub active_kind: DragKind,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DragEnd {
    pub active_id: String,
    pub active_kind: DragKind,
    pub over_id: Option<String>,
}

/// The in-flight gesture. The snapshot is what the overlay renders while the
/// pointer moves; it is never written back to the board.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub enum DragSession {
    #[default]
    Idle,
    DraggingColumn(Column),
    DraggingTask(Card),
}

impl DragSession {
    pub fn active_id(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::DraggingColumn(column) => Some(column.id.as_str()),
            Self::DraggingTask(card) => Some(card.id.as_str()),
        }
    }

    pub fn kind(&self) -> Option<DragKind> {
        match self {
            Self::Idle => None,
            Self::DraggingColumn(_) => Some(DragKind::Column),
            Self::DraggingTask(_) => Some(DragKind::Task),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DropAction {
    ReorderColumns {
        from: usize,
        to: usize,
    },
    MoveCard {
        source_column_id: String,
        dest_column_id: String,
        card_id: String,
        dest_index: usize,
    },
}

impl DropAction {
    pub fn apply(&self, board: &Board) -> Board {
        match self {
            Self::ReorderColumns { from, to } => board.reorder_columns(*from, *to),
            Self::MoveCard {
                source_column_id,
                dest_column_id,
                card_id,
                dest_index,
            } => board.move_card(source_column_id, dest_column_id, card_id, *dest_index),
        }
    }
}

/// Works out which board transition a finished gesture asks for. `None` means
/// the drop changes nothing: no target, dropped on itself, or ids that no
/// longer resolve against `board`.
pub fn resolve_drop(board: &Board, end: &DragEnd) -> Option<DropAction> {
    let over_id = end.over_id.as_deref()?;
    if over_id == end.active_id {
        return None;
    }

    match end.active_kind {
        DragKind::Column => {
            let from = board.column_index(&end.active_id)?;
            let to = board.column_index(over_id)?;
            Some(DropAction::ReorderColumns { from, to })
        }
        DragKind::Task => {
            let source = board.column_containing_card(&end.active_id)?;
            let dest = board
                .column(over_id)
                .or_else(|| board.column_containing_card(over_id))?;
            let dest_index = if dest.id == over_id {
                dest.tasks.len()
            } else {
                dest.card_index(over_id)?
            };
            Some(DropAction::MoveCard {
                source_column_id: source.id.clone(),
                dest_column_id: dest.id.clone(),
                card_id: end.active_id.clone(),
                dest_index,
            })
        }
    }
}

#[derive(Debug, Default)]
pub struct DragController {
    session: DragSession,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &DragSession {
        &self.session
    }

    pub fn is_dragging(&self) -> bool {
        self.session != DragSession::Idle
    }

    /// Captures a snapshot of the dragged item. An id that is not on the
    /// board leaves the controller idle; the matching drag end still resolves
    /// (to nothing).
    pub fn on_drag_start(&mut self, board: &Board, start: &DragStart) {
        if self.is_dragging() {
            debug!(
                "drag start for {} while {:?} is active; replacing session",
                start.active_id,
                self.session.active_id()
            );
        }

        self.session = match start.active_kind {
            DragKind::Column => board
                .column(&start.active_id)
                .cloned()
                .map(DragSession::DraggingColumn)
                .unwrap_or_default(),
            DragKind::Task => board
                .card(&start.active_id)
                .cloned()
                .map(DragSession::DraggingTask)
                .unwrap_or_default(),
        };

        debug!(
            "drag start: {} {} (tracked: {})",
            start.active_kind.as_str(),
            start.active_id,
            self.is_dragging()
        );
    }

    /// Ends the gesture and returns the board the drop produces, if any. The
    /// session is cleared whatever the outcome.
    pub fn on_drag_end(&mut self, board: &Board, end: &DragEnd) -> Option<Board> {
        self.session = DragSession::Idle;

        let Some(action) = resolve_drop(board, end) else {
            debug!(
                "drag end: {} {} over {:?} ignored",
                end.active_kind.as_str(),
                end.active_id,
                end.over_id
            );
            return None;
        };

        debug!("drag end: applying {:?}", action);
        Some(action.apply(board))
    }

    pub fn cancel(&mut self) {
        if self.is_dragging() {
            debug!("drag cancelled: {:?}", self.session.active_id());
        }
        self.session = DragSession::Idle;
    }
}
