//! # Editing Commands
//!
//! High-level semantic operations on a document, in the shape of a single
//! serializable enum applied against the tree.
//!
//! ## Command semantics
//!
//! - Structural requests outside their context (table commands with the
//!   selection outside a table) return `Applied::Noop` without mutating.
//! - Rejected input (localhost hrefs) is also a silent no-op.
//! - Programmer errors (commands naming a node that does not exist) are
//!   `CommandError`s.
//! - Every table-mutating command leaves the table rectangular, and a
//!   deletion that would leave zero rows or zero columns removes the whole
//!   table instead.

use crate::document::{Document, TableContext};
use crate::session::Selection;
use pressroom_schema::{
    is_allowed_href, Align, Mark, Node, NodeId, MAX_MEDIA_WIDTH, MIN_MEDIA_WIDTH,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Semantic editing operations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Command {
    /// Replace the text of a text node (atomic, not a character diff).
    UpdateText { id: NodeId, text: String },

    /// Write a media node's width, clamped to the resize range.
    SetMediaWidth { id: NodeId, width: u32 },

    /// Set a media node's block justification. Never touches width.
    SetMediaAlign { id: NodeId, align: Align },

    /// Attach a hyperlink to a media node. Localhost values are dropped.
    SetMediaHref { id: NodeId, href: String },

    /// Detach a media node's hyperlink.
    ClearMediaHref { id: NodeId },

    /// Attach a link mark to the selected text node.
    SetLinkMark { href: String },

    /// Remove link marks from the selected text node.
    UnsetLinkMark,

    /// Toggle the selected block to/from a heading of the given level.
    ToggleHeading { level: u8 },

    ToggleBulletList,
    ToggleOrderedList,
    ToggleBlockquote,

    /// Insert a rows x cols grid after the selected block. The first row
    /// holds header cells.
    InsertTable { rows: usize, cols: usize },

    AddRowBefore,
    AddRowAfter,
    AddColumnBefore,
    AddColumnAfter,
    DeleteRow,
    DeleteColumn,
    DeleteTable,

    /// Replace the selected node (used by drop and paste insertion).
    ReplaceSelection { node: Node },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Node is not a media node: {0}")]
    NotAMediaNode(String),

    #[error("Node is not text: {0}")]
    NotText(String),

    #[error("Invalid structure: {0}")]
    InvalidStructure(String),
}

/// Outcome of applying a command. The session only emits a change
/// notification for `Mutated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Mutated,
    Noop,
}

impl Command {
    /// Apply the command to the document against the current selection.
    pub fn apply(&self, doc: &mut Document, sel: &Selection) -> Result<Applied, CommandError> {
        match self {
            Command::UpdateText { id, text } => update_text(doc, id, text),
            Command::SetMediaWidth { id, width } => set_media_width(doc, id, *width),
            Command::SetMediaAlign { id, align } => set_media_align(doc, id, *align),
            Command::SetMediaHref { id, href } => set_media_href(doc, id, href),
            Command::ClearMediaHref { id } => clear_media_href(doc, id),
            Command::SetLinkMark { href } => set_link_mark(doc, sel, href),
            Command::UnsetLinkMark => unset_link_mark(doc, sel),
            Command::ToggleHeading { level } => toggle_heading(doc, sel, *level),
            Command::ToggleBulletList => toggle_list(doc, sel, false),
            Command::ToggleOrderedList => toggle_list(doc, sel, true),
            Command::ToggleBlockquote => toggle_blockquote(doc, sel),
            Command::InsertTable { rows, cols } => insert_table(doc, sel, *rows, *cols),
            Command::AddRowBefore => add_row(doc, sel, true),
            Command::AddRowAfter => add_row(doc, sel, false),
            Command::AddColumnBefore => add_column(doc, sel, true),
            Command::AddColumnAfter => add_column(doc, sel, false),
            Command::DeleteRow => delete_row(doc, sel),
            Command::DeleteColumn => delete_column(doc, sel),
            Command::DeleteTable => delete_table(doc, sel),
            Command::ReplaceSelection { node } => {
                doc.replace_or_append(sel.focus.as_deref(), node.clone());
                Ok(Applied::Mutated)
            }
        }
    }
}

fn update_text(doc: &mut Document, id: &str, new_text: &str) -> Result<Applied, CommandError> {
    let node = doc
        .find_mut(id)
        .ok_or_else(|| CommandError::NodeNotFound(id.to_string()))?;
    match node {
        Node::Text { text, .. } => {
            *text = new_text.to_string();
            Ok(Applied::Mutated)
        }
        _ => Err(CommandError::NotText(id.to_string())),
    }
}

fn media_attrs_mut<'a>(
    doc: &'a mut Document,
    id: &str,
) -> Result<&'a mut pressroom_schema::MediaAttrs, CommandError> {
    let node = doc
        .find_mut(id)
        .ok_or_else(|| CommandError::NodeNotFound(id.to_string()))?;
    node.media_attrs_mut()
        .ok_or_else(|| CommandError::NotAMediaNode(id.to_string()))
}

fn set_media_width(doc: &mut Document, id: &str, width: u32) -> Result<Applied, CommandError> {
    let attrs = media_attrs_mut(doc, id)?;
    attrs.width = width.clamp(MIN_MEDIA_WIDTH, MAX_MEDIA_WIDTH).to_string();
    Ok(Applied::Mutated)
}

fn set_media_align(doc: &mut Document, id: &str, align: Align) -> Result<Applied, CommandError> {
    let attrs = media_attrs_mut(doc, id)?;
    attrs.align = align;
    Ok(Applied::Mutated)
}

fn set_media_href(doc: &mut Document, id: &str, href: &str) -> Result<Applied, CommandError> {
    if !is_allowed_href(href) {
        return Ok(Applied::Noop);
    }
    let attrs = media_attrs_mut(doc, id)?;
    attrs.href = Some(href.to_string());
    Ok(Applied::Mutated)
}

fn clear_media_href(doc: &mut Document, id: &str) -> Result<Applied, CommandError> {
    let attrs = media_attrs_mut(doc, id)?;
    if attrs.href.take().is_some() {
        Ok(Applied::Mutated)
    } else {
        Ok(Applied::Noop)
    }
}

fn set_link_mark(doc: &mut Document, sel: &Selection, href: &str) -> Result<Applied, CommandError> {
    if !is_allowed_href(href) {
        return Ok(Applied::Noop);
    }
    let Some(focus) = sel.focus.as_deref() else {
        return Ok(Applied::Noop);
    };
    let node = doc
        .find_mut(focus)
        .ok_or_else(|| CommandError::NodeNotFound(focus.to_string()))?;
    match node {
        Node::Text { marks, .. } => {
            marks.retain(|m| !matches!(m, Mark::Link { .. }));
            marks.push(Mark::link(href));
            Ok(Applied::Mutated)
        }
        _ => Err(CommandError::NotText(focus.to_string())),
    }
}

fn unset_link_mark(doc: &mut Document, sel: &Selection) -> Result<Applied, CommandError> {
    let Some(focus) = sel.focus.as_deref() else {
        return Ok(Applied::Noop);
    };
    let node = doc
        .find_mut(focus)
        .ok_or_else(|| CommandError::NodeNotFound(focus.to_string()))?;
    match node {
        Node::Text { marks, .. } => {
            let before = marks.len();
            marks.retain(|m| !matches!(m, Mark::Link { .. }));
            if marks.len() < before {
                Ok(Applied::Mutated)
            } else {
                Ok(Applied::Noop)
            }
        }
        _ => Err(CommandError::NotText(focus.to_string())),
    }
}

/// Index of the top-level block holding the selection, if any.
fn focused_block(doc: &Document, sel: &Selection) -> Option<usize> {
    sel.focus
        .as_deref()
        .and_then(|id| doc.top_level_index(id))
}

fn toggle_heading(doc: &mut Document, sel: &Selection, level: u8) -> Result<Applied, CommandError> {
    let Some(index) = focused_block(doc, sel) else {
        return Ok(Applied::Noop);
    };
    let level = level.clamp(1, 6);
    let Some(node) = doc.remove_at_path(&[index]) else {
        return Ok(Applied::Noop);
    };

    let replacement = match node {
        Node::Heading { id, level: l, children } if l == level => {
            Node::Paragraph { id, children }
        }
        Node::Heading { id, children, .. } | Node::Paragraph { id, children } => {
            Node::Heading { id, level, children }
        }
        other => {
            doc.insert_at_path(&[index], other);
            return Ok(Applied::Noop);
        }
    };
    doc.insert_at_path(&[index], replacement);
    Ok(Applied::Mutated)
}

fn toggle_list(doc: &mut Document, sel: &Selection, ordered: bool) -> Result<Applied, CommandError> {
    let Some(index) = focused_block(doc, sel) else {
        return Ok(Applied::Noop);
    };
    let Some(node) = doc.remove_at_path(&[index]) else {
        return Ok(Applied::Noop);
    };

    match node {
        // Unwrap the matching list kind back into its blocks.
        Node::BulletList { children, .. } if !ordered => unwrap_blocks(doc, index, children),
        Node::OrderedList { children, .. } if ordered => unwrap_blocks(doc, index, children),

        // Convert between list kinds in place.
        Node::BulletList { id, children } => {
            doc.insert_at_path(&[index], Node::OrderedList { id, children });
            Ok(Applied::Mutated)
        }
        Node::OrderedList { id, children } => {
            doc.insert_at_path(&[index], Node::BulletList { id, children });
            Ok(Applied::Mutated)
        }

        block @ (Node::Paragraph { .. } | Node::Heading { .. }) => {
            let item_id = doc.new_id();
            let list_id = doc.new_id();
            let item = Node::ListItem {
                id: item_id,
                children: vec![block],
            };
            let list = if ordered {
                Node::OrderedList { id: list_id, children: vec![item] }
            } else {
                Node::BulletList { id: list_id, children: vec![item] }
            };
            doc.insert_at_path(&[index], list);
            Ok(Applied::Mutated)
        }

        other => {
            doc.insert_at_path(&[index], other);
            Ok(Applied::Noop)
        }
    }
}

fn unwrap_blocks(
    doc: &mut Document,
    index: usize,
    items: Vec<Node>,
) -> Result<Applied, CommandError> {
    let mut at = index;
    for item in items {
        let blocks = match item {
            Node::ListItem { children, .. } => children,
            other => vec![other],
        };
        for block in blocks {
            doc.insert_at_path(&[at], block);
            at += 1;
        }
    }
    Ok(Applied::Mutated)
}

fn toggle_blockquote(doc: &mut Document, sel: &Selection) -> Result<Applied, CommandError> {
    let Some(index) = focused_block(doc, sel) else {
        return Ok(Applied::Noop);
    };
    let Some(node) = doc.remove_at_path(&[index]) else {
        return Ok(Applied::Noop);
    };

    match node {
        Node::Blockquote { children, .. } => {
            let mut at = index;
            for block in children {
                doc.insert_at_path(&[at], block);
                at += 1;
            }
            Ok(Applied::Mutated)
        }
        block @ (Node::Paragraph { .. } | Node::Heading { .. }) => {
            let quote_id = doc.new_id();
            doc.insert_at_path(
                &[index],
                Node::Blockquote {
                    id: quote_id,
                    children: vec![block],
                },
            );
            Ok(Applied::Mutated)
        }
        other => {
            doc.insert_at_path(&[index], other);
            Ok(Applied::Noop)
        }
    }
}

fn empty_cell(doc: &mut Document, header: bool) -> Node {
    let cell_id = doc.new_id();
    let para_id = doc.new_id();
    Node::cell(cell_id, header, vec![Node::paragraph(para_id, Vec::new())])
}

fn insert_table(
    doc: &mut Document,
    sel: &Selection,
    rows: usize,
    cols: usize,
) -> Result<Applied, CommandError> {
    if rows == 0 || cols == 0 {
        return Err(CommandError::InvalidStructure(format!(
            "cannot insert a {rows}x{cols} table"
        )));
    }

    let table_id = doc.new_id();
    let mut row_nodes = Vec::with_capacity(rows);
    for row_index in 0..rows {
        let row_id = doc.new_id();
        let cells = (0..cols)
            .map(|_| empty_cell(doc, row_index == 0))
            .collect();
        row_nodes.push(Node::TableRow { id: row_id, cells });
    }
    let table = Node::Table {
        id: table_id,
        rows: row_nodes,
    };

    // Inserts at the cursor regardless of context: after the focused
    // top-level block, or at the end of the document.
    let index = focused_block(doc, sel)
        .map(|i| i + 1)
        .unwrap_or(doc.nodes().len());
    doc.insert_at_path(&[index], table);
    Ok(Applied::Mutated)
}

fn selection_table_context(doc: &Document, sel: &Selection) -> Option<TableContext> {
    sel.focus.as_deref().and_then(|id| doc.table_context(id))
}

fn add_row(doc: &mut Document, sel: &Selection, before: bool) -> Result<Applied, CommandError> {
    let Some(ctx) = selection_table_context(doc, sel) else {
        return Ok(Applied::Noop);
    };

    let cell_count = match doc.find(&ctx.table) {
        Some(Node::Table { rows, .. }) => rows
            .iter()
            .filter_map(|r| r.children().map(Vec::len))
            .max()
            .unwrap_or(0),
        _ => return Err(CommandError::NodeNotFound(ctx.table.clone())),
    };

    let row_id = doc.new_id();
    let cells = (0..cell_count).map(|_| empty_cell(doc, false)).collect();
    let new_row = Node::TableRow { id: row_id, cells };

    let insert_at = if before { ctx.row } else { ctx.row + 1 };
    if let Some(Node::Table { rows, .. }) = doc.find_mut(&ctx.table) {
        let insert_at = insert_at.min(rows.len());
        rows.insert(insert_at, new_row);
    }
    doc.normalize_table(&ctx.table);
    Ok(Applied::Mutated)
}

fn add_column(doc: &mut Document, sel: &Selection, before: bool) -> Result<Applied, CommandError> {
    let Some(ctx) = selection_table_context(doc, sel) else {
        return Ok(Applied::Noop);
    };
    let insert_at = if before { ctx.col } else { ctx.col + 1 };

    // Read pass: per-row insertion point and cell flavor (header rows get
    // header cells).
    let plan: Vec<(usize, bool)> = match doc.find(&ctx.table) {
        Some(Node::Table { rows, .. }) => rows
            .iter()
            .map(|row| {
                let cells = row.children().map(Vec::as_slice).unwrap_or_default();
                let neighbor = ctx.col.min(cells.len().saturating_sub(1));
                let header = cells.get(neighbor).is_some_and(Node::is_header_cell);
                (insert_at.min(cells.len()), header)
            })
            .collect(),
        _ => return Err(CommandError::NodeNotFound(ctx.table.clone())),
    };

    let new_cells: Vec<(usize, Node)> = plan
        .into_iter()
        .map(|(at, header)| (at, empty_cell(doc, header)))
        .collect();

    if let Some(Node::Table { rows, .. }) = doc.find_mut(&ctx.table) {
        for (row, (at, cell)) in rows.iter_mut().zip(new_cells) {
            if let Some(cells) = row.children_mut() {
                cells.insert(at, cell);
            }
        }
    }
    doc.normalize_table(&ctx.table);
    Ok(Applied::Mutated)
}

fn delete_row(doc: &mut Document, sel: &Selection) -> Result<Applied, CommandError> {
    let Some(ctx) = selection_table_context(doc, sel) else {
        return Ok(Applied::Noop);
    };

    let emptied = match doc.find_mut(&ctx.table) {
        Some(Node::Table { rows, .. }) => {
            if ctx.row < rows.len() {
                rows.remove(ctx.row);
            }
            rows.is_empty()
        }
        _ => return Err(CommandError::NodeNotFound(ctx.table.clone())),
    };

    if emptied {
        // A table with zero rows is invalid; delete it outright.
        doc.remove_at_path(&ctx.table_path);
    }
    Ok(Applied::Mutated)
}

fn delete_column(doc: &mut Document, sel: &Selection) -> Result<Applied, CommandError> {
    let Some(ctx) = selection_table_context(doc, sel) else {
        return Ok(Applied::Noop);
    };

    let emptied = match doc.find_mut(&ctx.table) {
        Some(Node::Table { rows, .. }) => {
            for row in rows.iter_mut() {
                if let Some(cells) = row.children_mut() {
                    if ctx.col < cells.len() {
                        cells.remove(ctx.col);
                    }
                }
            }
            rows.iter()
                .all(|r| r.children().map(Vec::is_empty).unwrap_or(true))
        }
        _ => return Err(CommandError::NodeNotFound(ctx.table.clone())),
    };

    if emptied {
        // Zero columns left: the table is degenerate, delete it.
        doc.remove_at_path(&ctx.table_path);
    } else {
        doc.normalize_table(&ctx.table);
    }
    Ok(Applied::Mutated)
}

fn delete_table(doc: &mut Document, sel: &Selection) -> Result<Applied, CommandError> {
    let Some(ctx) = selection_table_context(doc, sel) else {
        return Ok(Applied::Noop);
    };
    doc.remove_at_path(&ctx.table_path);
    Ok(Applied::Mutated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_serialization() {
        let command = Command::SetMediaAlign {
            id: "node-1".to_string(),
            align: Align::Center,
        };

        let json = serde_json::to_string(&command).unwrap();
        let deserialized: Command = serde_json::from_str(&json).unwrap();

        assert_eq!(command, deserialized);
    }

    #[test]
    fn test_width_clamped_at_both_ends() {
        let mut doc = Document::from_markup(r#"<img src="a.png" />"#);
        let id = doc.nodes()[0].id().to_string();
        let sel = Selection::default();

        Command::SetMediaWidth { id: id.clone(), width: 5 }
            .apply(&mut doc, &sel)
            .unwrap();
        assert_eq!(doc.find(&id).unwrap().media_attrs().unwrap().width, "100");

        Command::SetMediaWidth { id: id.clone(), width: 5000 }
            .apply(&mut doc, &sel)
            .unwrap();
        assert_eq!(doc.find(&id).unwrap().media_attrs().unwrap().width, "800");
    }

    #[test]
    fn test_localhost_href_is_silent_noop() {
        let mut doc = Document::from_markup(r#"<img src="a.png" />"#);
        let id = doc.nodes()[0].id().to_string();
        let sel = Selection::default();

        let applied = Command::SetMediaHref {
            id: id.clone(),
            href: "http://localhost:4200/x".to_string(),
        }
        .apply(&mut doc, &sel)
        .unwrap();

        assert_eq!(applied, Applied::Noop);
        assert!(doc.find(&id).unwrap().media_attrs().unwrap().href.is_none());
    }

    #[test]
    fn test_localhost_link_mark_is_silent_noop() {
        let mut doc = Document::from_markup("<p>read this</p>");
        let text_id = doc.nodes()[0].children().unwrap()[0].id().to_string();
        let sel = Selection {
            focus: Some(text_id.clone()),
        };

        Command::SetLinkMark {
            href: "https://example.com/story".to_string(),
        }
        .apply(&mut doc, &sel)
        .unwrap();

        let applied = Command::SetLinkMark {
            href: "http://LOCALHOST:3000/draft".to_string(),
        }
        .apply(&mut doc, &sel)
        .unwrap();
        assert_eq!(applied, Applied::Noop);

        // The existing mark survives the rejected request.
        let Some(Node::Text { marks, .. }) = doc.find(&text_id) else {
            panic!("expected text node");
        };
        assert_eq!(marks[0], Mark::link("https://example.com/story"));
    }

    #[test]
    fn test_media_command_on_paragraph_errors() {
        let mut doc = Document::from_markup("<p>x</p>");
        let id = doc.nodes()[0].id().to_string();
        let sel = Selection::default();

        let result = Command::SetMediaAlign { id, align: Align::Right }.apply(&mut doc, &sel);
        assert!(matches!(result, Err(CommandError::NotAMediaNode(_))));
    }

    #[test]
    fn test_table_command_outside_table_is_noop() {
        let mut doc = Document::from_markup("<p>x</p>");
        let focus = doc.nodes()[0].id().to_string();
        let sel = Selection { focus: Some(focus) };

        let before = doc.serialize();
        assert_eq!(Command::AddRowAfter.apply(&mut doc, &sel).unwrap(), Applied::Noop);
        assert_eq!(Command::DeleteColumn.apply(&mut doc, &sel).unwrap(), Applied::Noop);
        assert_eq!(doc.serialize(), before);
    }

    #[test]
    fn test_toggle_heading_round_trip() {
        let mut doc = Document::from_markup("<p>title</p>");
        let focus = doc.nodes()[0].id().to_string();
        let sel = Selection { focus: Some(focus) };

        Command::ToggleHeading { level: 2 }.apply(&mut doc, &sel).unwrap();
        assert!(matches!(doc.nodes()[0], Node::Heading { level: 2, .. }));

        Command::ToggleHeading { level: 2 }.apply(&mut doc, &sel).unwrap();
        assert!(matches!(doc.nodes()[0], Node::Paragraph { .. }));
    }

    #[test]
    fn test_toggle_list_wraps_and_unwraps() {
        let mut doc = Document::from_markup("<p>item</p>");
        let focus = doc.nodes()[0].id().to_string();
        let sel = Selection { focus: Some(focus.clone()) };

        Command::ToggleBulletList.apply(&mut doc, &sel).unwrap();
        assert!(matches!(doc.nodes()[0], Node::BulletList { .. }));

        // The paragraph keeps its ID inside the list, so the same selection
        // still resolves.
        Command::ToggleBulletList.apply(&mut doc, &sel).unwrap();
        assert!(matches!(doc.nodes()[0], Node::Paragraph { .. }));
    }

    #[test]
    fn test_insert_table_rejects_zero() {
        let mut doc = Document::empty();
        let sel = Selection::default();
        let result = Command::InsertTable { rows: 0, cols: 3 }.apply(&mut doc, &sel);
        assert!(matches!(result, Err(CommandError::InvalidStructure(_))));
    }
}
