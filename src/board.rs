//! Board state model: columns of cards and the pure transitions between
//! board states.
//!
//! Every mutating operation borrows the current board and returns a new one.
//! Operations that reference an unknown id return an unchanged copy instead of
//! failing, since ids always come from a previously rendered board.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_COLUMN_TITLE: &str = "New Column";

const COLUMN_ID_PREFIX: &str = "col";
const CARD_ID_PREFIX: &str = "task";

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Card {
    pub id: String,
    pub content: String,
}

impl Card {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Column {
    pub id: String,
    pub title: String,
    pub tasks: Vec<Card>,
}

impl Column {
    pub fn new(id: impl Into<String>, title: impl Into<String>, tasks: Vec<Card>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            tasks,
        }
    }

    pub fn card_index(&self, card_id: &str) -> Option<usize> {
        self.tasks.iter().position(|card| card.id == card_id)
    }

    pub fn contains_card(&self, card_id: &str) -> bool {
        self.card_index(card_id).is_some()
    }
}

/// Ordered columns, left to right. Serialized as a bare JSON array.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(transparent)]
pub struct Board {
    columns: Vec<Column>,
}

impl Board {
    pub fn from_columns(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// The board shown on first launch or after the stored board was unreadable.
    pub fn seeded() -> Self {
        Self::from_columns(vec![
            Column::new(
                "col-1",
                "To Do",
                vec![Card::new("task-1", "Try dragging this card")],
            ),
            Column::new(
                "col-2",
                "In Progress",
                vec![Card::new("task-2", "Build a kanban board")],
            ),
            Column::new("col-3", "Done", Vec::new()),
        ])
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.id == column_id)
    }

    pub fn column_index(&self, column_id: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.id == column_id)
    }

    pub fn column_containing_card(&self, card_id: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|column| column.contains_card(card_id))
    }

    pub fn card(&self, card_id: &str) -> Option<&Card> {
        self.columns
            .iter()
            .flat_map(|column| column.tasks.iter())
            .find(|card| card.id == card_id)
    }

    pub fn card_ids(&self) -> Vec<&str> {
        self.columns
            .iter()
            .flat_map(|column| column.tasks.iter().map(|card| card.id.as_str()))
            .collect()
    }

    pub fn card_count(&self) -> usize {
        self.columns.iter().map(|column| column.tasks.len()).sum()
    }

    /// Column ids are pairwise distinct and card ids are pairwise distinct
    /// across the whole board.
    pub fn has_unique_ids(&self) -> bool {
        let mut column_ids = HashSet::new();
        let mut card_ids = HashSet::new();
        self.columns.iter().all(|column| column_ids.insert(column.id.as_str()))
            && self
                .columns
                .iter()
                .flat_map(|column| column.tasks.iter())
                .all(|card| card_ids.insert(card.id.as_str()))
    }

    pub fn add_column(&self) -> Self {
        let id = self.fresh_id(COLUMN_ID_PREFIX);
        let mut columns = self.columns.clone();
        columns.push(Column::new(id, DEFAULT_COLUMN_TITLE, Vec::new()));
        Self { columns }
    }

    pub fn delete_column(&self, column_id: &str) -> Self {
        let columns = self
            .columns
            .iter()
            .filter(|column| column.id != column_id)
            .cloned()
            .collect();
        Self { columns }
    }

    pub fn rename_column(&self, column_id: &str, new_title: &str) -> Self {
        self.map_column(column_id, |column| column.title = new_title.to_string())
    }

    /// Appends a card to the named column. Rejecting blank content is the
    /// caller's job.
    pub fn add_card(&self, column_id: &str, content: &str) -> Self {
        if self.column(column_id).is_none() {
            return self.clone();
        }
        let card = Card::new(self.fresh_id(CARD_ID_PREFIX), content);
        self.map_column(column_id, move |column| column.tasks.push(card))
    }

    pub fn delete_card(&self, column_id: &str, card_id: &str) -> Self {
        self.map_column(column_id, |column| {
            column.tasks.retain(|card| card.id != card_id);
        })
    }

    pub fn reorder_columns(&self, from_index: usize, to_index: usize) -> Self {
        let len = self.columns.len();
        if from_index == to_index || from_index >= len || to_index >= len {
            return self.clone();
        }
        let mut columns = self.columns.clone();
        let column = columns.remove(from_index);
        columns.insert(to_index, column);
        Self { columns }
    }

    /// Moves `card_id` out of `source_column_id` into `dest_column_id` at
    /// `dest_index`.
    ///
    /// For a same-column move the index is read against the sequence after
    /// the card was taken out; for a cross-column move it is read against the
    /// destination as it stands. In both cases the index is clamped to the
    /// destination length, so "the position of the hovered card" always lands
    /// the moved card where a remove-then-insert-before-target would.
    pub fn move_card(
        &self,
        source_column_id: &str,
        dest_column_id: &str,
        card_id: &str,
        dest_index: usize,
    ) -> Self {
        let Some(source_idx) = self.column_index(source_column_id) else {
            return self.clone();
        };
        let Some(dest_idx) = self.column_index(dest_column_id) else {
            return self.clone();
        };
        let Some(card_idx) = self.columns[source_idx].card_index(card_id) else {
            return self.clone();
        };

        let mut columns = self.columns.clone();
        let card = columns[source_idx].tasks.remove(card_idx);
        let dest_tasks = &mut columns[dest_idx].tasks;
        let index = dest_index.min(dest_tasks.len());
        dest_tasks.insert(index, card);
        Self { columns }
    }

    fn map_column(&self, column_id: &str, edit: impl FnOnce(&mut Column)) -> Self {
        let mut columns = self.columns.clone();
        if let Some(column) = columns.iter_mut().find(|column| column.id == column_id) {
            edit(column);
        }
        Self { columns }
    }

    fn fresh_id(&self, prefix: &str) -> String {
        loop {
            let candidate = format!("{prefix}-{}", Uuid::new_v4().simple());
            let taken = self.column(&candidate).is_some() || self.card(&candidate).is_some();
            if !taken {
                return candidate;
            }
        }
    }
}
