use tuirealm::ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, BorderType, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation,
        ScrollbarState,
    },
};

use crate::app::interaction::{HitTarget, InteractionNode};
use crate::app::{App, InlineEdit};
use crate::board::{Card, Column};
use crate::drag::DragSession;

const COLUMN_GAP: u16 = 1;
const CARD_HEIGHT: u16 = 3;
const ADD_COLUMN_LABEL: &str = "+ Add column";
const ADD_CARD_LABEL: &str = "+ Add a card";
const DELETE_GLYPH: &str = "✕";
const CURSOR_GLYPH: &str = "▏";

/// Draws the whole board and rebuilds the interaction map the mouse handler
/// resolves against.
pub fn render(frame: &mut Frame<'_>, app: &mut App) {
    let mut nodes = Vec::new();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, chunks[0], app, &mut nodes);
    render_board(frame, chunks[1], app, &mut nodes);
    render_footer(frame, chunks[2], app);
    render_drag_overlay(frame, app);

    app.interaction_map.clear();
    for node in nodes {
        app.interaction_map.register(node);
    }
}

fn render_header(frame: &mut Frame<'_>, area: Rect, app: &App, nodes: &mut Vec<InteractionNode>) {
    let theme = app.theme();
    let background = Style::default().bg(theme.base.surface);
    frame.render_widget(Block::default().style(background), area);

    let title = Line::from(vec![
        Span::styled(
            " dnd-kanban ",
            Style::default()
                .fg(theme.base.header)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(
                "{} columns · {} cards",
                app.board().columns().len(),
                app.board().card_count()
            ),
            Style::default().fg(theme.base.text_muted),
        ),
    ]);
    frame.render_widget(Paragraph::new(title).style(background), area);

    let label = format!("[ {} ]", app.theme_mode().as_str());
    let width = (label.chars().count() as u16).min(area.width);
    let toggle = Rect::new(area.right().saturating_sub(width), area.y, width, 1);
    frame.render_widget(
        Paragraph::new(label).style(
            Style::default()
                .fg(theme.base.accent)
                .bg(theme.base.surface)
                .add_modifier(Modifier::BOLD),
        ),
        toggle,
    );
    nodes.push(InteractionNode::button(toggle, HitTarget::ToggleTheme));
}

fn render_footer(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let theme = app.theme();
    let hints = if app.editing().is_some() {
        " Enter: save  Esc: cancel  click elsewhere: leave editor "
    } else if app.drag_session() != &DragSession::Idle {
        " release: drop  Esc: cancel drag "
    } else {
        " drag: move cards and columns  wheel: scroll cards  n: add column  t: theme  ←/→: scroll  q: quit "
    };
    let text = app.footer_notice.as_deref().unwrap_or(hints);
    frame.render_widget(
        Paragraph::new(format!(" {text} "))
            .alignment(Alignment::Center)
            .style(
                Style::default()
                    .fg(theme.base.text_muted)
                    .bg(theme.base.surface),
            ),
        area,
    );
}

fn render_board(frame: &mut Frame<'_>, area: Rect, app: &App, nodes: &mut Vec<InteractionNode>) {
    let theme = app.theme();
    frame.render_widget(
        Block::default().style(Style::default().bg(theme.base.canvas)),
        area,
    );

    if app.board().is_empty() {
        render_empty_state(frame, area, app, nodes);
        return;
    }

    let column_width = app.settings().column_width;
    let mut x = area.x;
    for column in app.board().columns().iter().skip(app.board_scroll) {
        let remaining = area.right().saturating_sub(x);
        if remaining < 4 {
            return;
        }
        let rect = Rect::new(x, area.y, column_width.min(remaining), area.height);
        render_column(frame, rect, column, app, nodes);
        x = x.saturating_add(column_width + COLUMN_GAP);
    }

    let remaining = area.right().saturating_sub(x);
    if remaining >= 4 {
        let width = (ADD_COLUMN_LABEL.chars().count() as u16 + 4).min(remaining);
        render_add_column(frame, Rect::new(x, area.y, width, 3.min(area.height)), app, nodes);
    }
}

fn render_empty_state(
    frame: &mut Frame<'_>,
    area: Rect,
    app: &App,
    nodes: &mut Vec<InteractionNode>,
) {
    let width = (ADD_COLUMN_LABEL.chars().count() as u16 + 4).min(area.width);
    render_add_column(frame, Rect::new(area.x, area.y, width, 3.min(area.height)), app, nodes);

    let message_area = Rect::new(
        area.x,
        area.y.saturating_add(4),
        area.width,
        area.height.saturating_sub(4),
    );
    frame.render_widget(
        Paragraph::new("No columns yet. Press n or click + Add column to start a board.")
            .alignment(Alignment::Center)
            .style(
                Style::default()
                    .fg(app.theme().base.text_muted)
                    .bg(app.theme().base.canvas),
            ),
        message_area,
    );
}

fn render_add_column(
    frame: &mut Frame<'_>,
    rect: Rect,
    app: &App,
    nodes: &mut Vec<InteractionNode>,
) {
    let theme = app.theme();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.interactive.border))
        .style(Style::default().bg(theme.base.canvas));
    frame.render_widget(
        Paragraph::new(ADD_COLUMN_LABEL)
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme.base.accent))
            .block(block),
        rect,
    );
    nodes.push(InteractionNode::button(rect, HitTarget::AddColumn));
}

fn render_column(
    frame: &mut Frame<'_>,
    rect: Rect,
    column: &Column,
    app: &App,
    nodes: &mut Vec<InteractionNode>,
) {
    let theme = app.theme();
    let is_placeholder =
        matches!(app.drag_session(), DragSession::DraggingColumn(dragged) if dragged.id == column.id);
    let is_drop_target = app.hovered_drop.as_deref() == Some(column.id.as_str());

    let border_color = if is_placeholder {
        theme.tile.placeholder
    } else if is_drop_target {
        theme.interactive.drop_target
    } else {
        theme.interactive.border
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(if is_drop_target {
            BorderType::Double
        } else {
            BorderType::Rounded
        })
        .border_style(Style::default().fg(border_color))
        .style(Style::default().bg(theme.base.surface));
    let inner = block.inner(rect);
    frame.render_widget(block, rect);

    nodes.push(InteractionNode::drop_zone(
        rect,
        HitTarget::ColumnBody {
            column_id: column.id.clone(),
        },
    ));

    if is_placeholder {
        frame.render_widget(
            Paragraph::new(column.title.as_str())
                .alignment(Alignment::Center)
                .style(Style::default().fg(theme.base.text_muted)),
            inner,
        );
        return;
    }

    if inner.height < 2 || inner.width < 6 {
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(inner);

    nodes.push(InteractionNode::draggable(
        Rect::new(rect.x, rect.y, rect.width, 2.min(rect.height)),
        HitTarget::ColumnHeader {
            column_id: column.id.clone(),
        },
    ));
    render_column_header(frame, rows[0], column, app, nodes);
    render_cards(frame, rows[2], column, app, nodes);
    render_column_footer(frame, rows[3], column, app, nodes);
}

fn render_column_header(
    frame: &mut Frame<'_>,
    area: Rect,
    column: &Column,
    app: &App,
    nodes: &mut Vec<InteractionNode>,
) {
    let theme = app.theme();
    let title_width = area.width.saturating_sub(4);

    match app.editing() {
        Some(InlineEdit::ColumnTitle { column_id, buffer }) if column_id == &column.id => {
            let field = Rect::new(area.x, area.y, title_width, 1);
            render_edit_field(frame, field, buffer, app);
            nodes.push(InteractionNode::button(field, HitTarget::EditField));
        }
        _ => {
            let title = truncate(&column.title, title_width.saturating_sub(5) as usize);
            let shown = title.chars().count() as u16;
            frame.render_widget(
                Paragraph::new(Line::from(vec![
                    Span::styled(
                        title,
                        Style::default()
                            .fg(theme.base.text)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!(" ({})", column.tasks.len()),
                        Style::default().fg(theme.base.text_muted),
                    ),
                ])),
                Rect::new(area.x, area.y, title_width, 1),
            );
            if shown > 0 {
                nodes.push(InteractionNode::draggable(
                    Rect::new(area.x, area.y, shown, 1),
                    HitTarget::ColumnTitle {
                        column_id: column.id.clone(),
                    },
                ));
            }
        }
    }

    let delete = Rect::new(area.right().saturating_sub(3), area.y, 3, 1);
    frame.render_widget(
        Paragraph::new(DELETE_GLYPH)
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme.base.danger)),
        delete,
    );
    nodes.push(InteractionNode::button(
        delete,
        HitTarget::DeleteColumn {
            column_id: column.id.clone(),
        },
    ));
}

fn render_cards(
    frame: &mut Frame<'_>,
    area: Rect,
    column: &Column,
    app: &App,
    nodes: &mut Vec<InteractionNode>,
) {
    let capacity = (area.height / CARD_HEIGHT) as usize;
    let scroll_offset = app.clamped_column_scroll(&column.id);

    for (slot, card) in column
        .tasks
        .iter()
        .skip(scroll_offset)
        .take(capacity)
        .enumerate()
    {
        let tile = Rect::new(
            area.x,
            area.y + slot as u16 * CARD_HEIGHT,
            area.width,
            CARD_HEIGHT,
        );
        render_card(frame, tile, &column.id, card, app, nodes);
    }

    if column.tasks.len() > capacity && area.height > 0 {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .thumb_style(
                Style::default()
                    .fg(app.theme().base.text_muted)
                    .bg(app.theme().base.surface),
            )
            .track_symbol(Some("│"))
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"));
        let mut state =
            ScrollbarState::new(column.tasks.len().saturating_sub(1)).position(scroll_offset);
        // drawn over the column's right border, beside the tiles
        frame.render_stateful_widget(
            scrollbar,
            Rect::new(area.right(), area.y, 1, area.height),
            &mut state,
        );
    }
}

fn render_card(
    frame: &mut Frame<'_>,
    tile: Rect,
    column_id: &str,
    card: &Card,
    app: &App,
    nodes: &mut Vec<InteractionNode>,
) {
    let theme = app.theme();
    let is_placeholder =
        matches!(app.drag_session(), DragSession::DraggingTask(dragged) if dragged.id == card.id);
    let is_drop_target = app.hovered_drop.as_deref() == Some(card.id.as_str());

    let colors = theme.tile_colors(is_placeholder);
    let border = if is_drop_target {
        theme.interactive.drop_target
    } else {
        colors.border
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border))
        .style(Style::default().bg(colors.background));
    let inner = block.inner(tile);
    frame.render_widget(block, tile);

    nodes.push(InteractionNode::draggable(
        tile,
        HitTarget::Card {
            column_id: column_id.to_string(),
            card_id: card.id.clone(),
        },
    ));

    if is_placeholder || inner.width < 3 {
        return;
    }

    let text_width = inner.width.saturating_sub(3);
    frame.render_widget(
        Paragraph::new(truncate(&card.content, text_width as usize))
            .style(Style::default().fg(theme.base.text)),
        Rect::new(inner.x, inner.y, text_width, 1),
    );

    let delete = Rect::new(inner.right().saturating_sub(2), inner.y, 2, 1);
    frame.render_widget(
        Paragraph::new(DELETE_GLYPH)
            .alignment(Alignment::Right)
            .style(Style::default().fg(theme.base.text_muted)),
        delete,
    );
    nodes.push(InteractionNode::button(
        delete,
        HitTarget::DeleteCard {
            column_id: column_id.to_string(),
            card_id: card.id.clone(),
        },
    ));
}

fn render_column_footer(
    frame: &mut Frame<'_>,
    area: Rect,
    column: &Column,
    app: &App,
    nodes: &mut Vec<InteractionNode>,
) {
    match app.editing() {
        Some(InlineEdit::NewCard { column_id, buffer }) if column_id == &column.id => {
            render_edit_field(frame, area, buffer, app);
            nodes.push(InteractionNode::button(area, HitTarget::EditField));
        }
        _ => {
            frame.render_widget(
                Paragraph::new(ADD_CARD_LABEL).style(Style::default().fg(app.theme().base.accent)),
                area,
            );
            nodes.push(InteractionNode::button(
                area,
                HitTarget::AddCard {
                    column_id: column.id.clone(),
                },
            ));
        }
    }
}

fn render_edit_field(frame: &mut Frame<'_>, area: Rect, buffer: &str, app: &App) {
    let theme = app.theme();
    // show the tail so the cursor stays visible
    let room = area.width.saturating_sub(1) as usize;
    let skip = buffer.chars().count().saturating_sub(room);
    let visible: String = buffer.chars().skip(skip).collect();
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::raw(visible),
            Span::styled(CURSOR_GLYPH, Style::default().fg(theme.interactive.focus)),
        ]))
        .style(
            Style::default()
                .fg(theme.base.text)
                .bg(theme.interactive.input_bg),
        ),
        area,
    );
}

/// Floating copy of the dragged item next to the pointer. It registers no
/// hit nodes, so drops resolve against whatever lies beneath it.
fn render_drag_overlay(frame: &mut Frame<'_>, app: &App) {
    let Some((pointer_x, pointer_y)) = app.pointer else {
        return;
    };
    let label = match app.drag_session() {
        DragSession::Idle => return,
        DragSession::DraggingTask(card) => card.content.clone(),
        DragSession::DraggingColumn(column) => {
            format!("{} ({})", column.title, column.tasks.len())
        }
    };

    let theme = app.theme();
    let bounds = frame.area();
    let width = app.settings().column_width.min(bounds.width);
    let height = CARD_HEIGHT.min(bounds.height);
    let x = pointer_x
        .saturating_add(1)
        .min(bounds.right().saturating_sub(width));
    let y = pointer_y.min(bounds.bottom().saturating_sub(height));
    let area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Thick)
        .border_style(Style::default().fg(theme.base.accent))
        .style(Style::default().bg(theme.tile.overlay_bg));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(
        Paragraph::new(truncate(&label, inner.width as usize)).style(
            Style::default()
                .fg(theme.base.text)
                .add_modifier(Modifier::BOLD),
        ),
        inner,
    );
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(width - 1).collect();
    out.push('…');
    out
}
