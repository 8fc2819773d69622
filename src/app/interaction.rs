use tuirealm::ratatui::layout::Rect;

use crate::drag::{DragKind, DragStart};

/// What sits under a screen cell, as registered by the last render.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum HitTarget {
    Card { column_id: String, card_id: String },
    ColumnHeader { column_id: String },
    ColumnTitle { column_id: String },
    ColumnBody { column_id: String },
    DeleteCard { column_id: String, card_id: String },
    DeleteColumn { column_id: String },
    AddCard { column_id: String },
    EditField,
    AddColumn,
    ToggleTheme,
}

impl HitTarget {
    /// The drag a press on this target arms, if it is a drag handle.
    pub fn drag_start(&self) -> Option<DragStart> {
        match self {
            Self::Card { card_id, .. } => Some(DragStart {
                active_id: card_id.clone(),
                active_kind: DragKind::Task,
            }),
            Self::ColumnHeader { column_id } | Self::ColumnTitle { column_id } => {
                Some(DragStart {
                    active_id: column_id.clone(),
                    active_kind: DragKind::Column,
                })
            }
            _ => None,
        }
    }

    /// The id this target reports as `over` when something of `kind` is
    /// released on it. A hovered card stands in for its column while a
    /// column is being dragged.
    pub fn drop_id(&self, kind: DragKind) -> Option<&str> {
        match self {
            Self::Card { column_id, card_id } => match kind {
                DragKind::Task => Some(card_id.as_str()),
                DragKind::Column => Some(column_id.as_str()),
            },
            Self::ColumnHeader { column_id }
            | Self::ColumnTitle { column_id }
            | Self::ColumnBody { column_id } => Some(column_id.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum InteractionLayer {
    Board,
    Controls,
}

impl InteractionLayer {
    fn priority(self) -> u8 {
        match self {
            Self::Board => 0,
            Self::Controls => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum InteractionKind {
    Press,
    Drop,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct InteractionNode {
    pub rect: Rect,
    pub target: HitTarget,
    pub layer: InteractionLayer,
    pub pressable: bool,
    pub droppable: bool,
}

impl InteractionNode {
    pub fn draggable(rect: Rect, target: HitTarget) -> Self {
        Self {
            rect,
            target,
            layer: InteractionLayer::Board,
            pressable: true,
            droppable: true,
        }
    }

    pub fn drop_zone(rect: Rect, target: HitTarget) -> Self {
        Self {
            rect,
            target,
            layer: InteractionLayer::Board,
            pressable: false,
            droppable: true,
        }
    }

    pub fn button(rect: Rect, target: HitTarget) -> Self {
        Self {
            rect,
            target,
            layer: InteractionLayer::Controls,
            pressable: true,
            droppable: false,
        }
    }

    fn contains(&self, col: u16, row: u16) -> bool {
        col >= self.rect.x
            && col < self.rect.x.saturating_add(self.rect.width)
            && row >= self.rect.y
            && row < self.rect.y.saturating_add(self.rect.height)
    }

    fn supports(&self, kind: InteractionKind) -> bool {
        match kind {
            InteractionKind::Press => self.pressable,
            InteractionKind::Drop => self.droppable,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct InteractionMap {
    nodes: Vec<InteractionNode>,
}

impl InteractionMap {
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn register(&mut self, node: InteractionNode) {
        self.nodes.push(node);
    }

    pub fn resolve(&self, col: u16, row: u16, kind: InteractionKind) -> Option<&HitTarget> {
        self.resolve_node(col, row, kind).map(|node| &node.target)
    }

    /// Higher layers win; within a layer the latest registration wins, so
    /// nested regions must be registered after the region around them.
    pub fn resolve_node(
        &self,
        col: u16,
        row: u16,
        kind: InteractionKind,
    ) -> Option<&InteractionNode> {
        let mut best: Option<(usize, &InteractionNode)> = None;
        for (idx, node) in self.nodes.iter().enumerate() {
            if !node.contains(col, row) || !node.supports(kind) {
                continue;
            }
            match best {
                None => best = Some((idx, node)),
                Some((best_idx, best_node)) => {
                    let has_higher_layer = node.layer.priority() > best_node.layer.priority();
                    let same_layer_later_registration =
                        node.layer.priority() == best_node.layer.priority() && idx > best_idx;
                    if has_higher_layer || same_layer_later_registration {
                        best = Some((idx, node));
                    }
                }
            }
        }
        best.map(|(_, node)| node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card_target() -> HitTarget {
        HitTarget::Card {
            column_id: "col".to_string(),
            card_id: "card".to_string(),
        }
    }

    fn body_target() -> HitTarget {
        HitTarget::ColumnBody {
            column_id: "col".to_string(),
        }
    }

    #[test]
    fn resolve_prefers_controls_layer_for_presses() {
        let mut map = InteractionMap::default();
        let rect = Rect::new(10, 10, 5, 2);
        map.register(InteractionNode::draggable(rect, card_target()));
        map.register(InteractionNode::button(
            Rect::new(13, 10, 2, 1),
            HitTarget::DeleteCard {
                column_id: "col".to_string(),
                card_id: "card".to_string(),
            },
        ));
        // registered after the button but on a lower layer
        map.register(InteractionNode::draggable(rect, body_target()));

        assert!(matches!(
            map.resolve(13, 10, InteractionKind::Press),
            Some(HitTarget::DeleteCard { .. })
        ));
        assert_eq!(map.resolve(11, 11, InteractionKind::Press), Some(&body_target()));
    }

    #[test]
    fn resolve_prefers_latest_within_same_layer() {
        let mut map = InteractionMap::default();
        map.register(InteractionNode::drop_zone(Rect::new(0, 0, 20, 20), body_target()));
        map.register(InteractionNode::draggable(Rect::new(2, 2, 5, 3), card_target()));

        assert_eq!(map.resolve(3, 3, InteractionKind::Drop), Some(&card_target()));
        assert_eq!(map.resolve(15, 15, InteractionKind::Drop), Some(&body_target()));
    }

    #[test]
    fn drops_ignore_buttons() {
        let mut map = InteractionMap::default();
        map.register(InteractionNode::draggable(Rect::new(0, 0, 10, 3), card_target()));
        map.register(InteractionNode::button(Rect::new(8, 1, 2, 1), HitTarget::AddColumn));

        assert_eq!(map.resolve(8, 1, InteractionKind::Drop), Some(&card_target()));
        assert_eq!(map.resolve(8, 1, InteractionKind::Press), Some(&HitTarget::AddColumn));
        assert_eq!(map.resolve(30, 30, InteractionKind::Drop), None);
    }

    #[test]
    fn drop_zones_are_not_pressable() {
        let mut map = InteractionMap::default();
        map.register(InteractionNode::drop_zone(Rect::new(0, 0, 10, 10), body_target()));
        assert_eq!(map.resolve(1, 1, InteractionKind::Press), None);
    }

    #[test]
    fn card_drop_id_depends_on_drag_kind() {
        let target = card_target();
        assert_eq!(target.drop_id(DragKind::Task), Some("card"));
        assert_eq!(target.drop_id(DragKind::Column), Some("col"));
        assert_eq!(body_target().drop_id(DragKind::Task), Some("col"));
        assert_eq!(HitTarget::AddColumn.drop_id(DragKind::Task), None);
    }

    #[test]
    fn drag_handles_arm_matching_kind() {
        assert_eq!(
            card_target().drag_start(),
            Some(DragStart {
                active_id: "card".to_string(),
                active_kind: DragKind::Task,
            })
        );
        let header = HitTarget::ColumnHeader {
            column_id: "col".to_string(),
        };
        assert_eq!(
            header.drag_start().map(|start| start.active_kind),
            Some(DragKind::Column)
        );
        assert_eq!(body_target().drag_start(), None);
        assert_eq!(HitTarget::ToggleTheme.drag_start(), None);
    }
}
