//! # Document Handle
//!
//! Core document abstraction for Pressroom editing.
//!
//! A Document is the live tree behind one article body being authored.
//! It is created from externally supplied markup (always sanitized first),
//! mutated through commands, and serialized back to markup for the hosting
//! form. Nothing here persists: the document dies with its editing session
//! and only what the host chose to save survives.

use pressroom_schema::{parse, sanitize, serialize, IdGenerator, Node, NodeId};

/// Live document tree for one editing session.
#[derive(Debug)]
pub struct Document {
    /// Root sequence of block-level nodes.
    nodes: Vec<Node>,

    /// Current version number (increments on each applied command)
    pub version: u64,

    /// Node ID mint, seeded from the initial content.
    ids: IdGenerator,
}

/// Where the selection sits relative to a table: the enclosing table plus
/// the row/column of the selected cell.
#[derive(Debug, Clone, PartialEq)]
pub struct TableContext {
    pub table: NodeId,
    pub table_path: Vec<usize>,
    pub row: usize,
    pub col: usize,
}

impl Document {
    /// Build a document from externally supplied markup.
    ///
    /// External content is untrusted and is sanitized unconditionally
    /// before parsing.
    pub fn from_markup(markup: &str) -> Self {
        let clean = sanitize(markup);
        let mut ids = IdGenerator::new(&clean);
        let nodes = parse(&clean, &mut ids);
        Self {
            nodes,
            version: 0,
            ids,
        }
    }

    pub fn empty() -> Self {
        Self::from_markup("")
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Serialize the tree to its markup form.
    pub fn serialize(&self) -> String {
        serialize(&self.nodes)
    }

    /// Mint a fresh node ID.
    pub fn new_id(&mut self) -> NodeId {
        self.ids.new_id()
    }

    /// Parse a markup fragment with this document's ID mint, without
    /// inserting it. Callers sanitize first where the content is external.
    pub fn parse_fragment(&mut self, markup: &str) -> Vec<Node> {
        parse(markup, &mut self.ids)
    }

    /// Find a node anywhere in the tree.
    pub fn find(&self, id: &str) -> Option<&Node> {
        self.path_to(id)
            .and_then(|path| self.node_at_path(&path))
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Node> {
        let path = self.path_to(id)?;
        self.node_at_path_mut(&path)
    }

    /// Child indices from the root down to the node with `id`.
    pub fn path_to(&self, id: &str) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        if path_in(&self.nodes, id, &mut path) {
            Some(path)
        } else {
            None
        }
    }

    pub fn node_at_path(&self, path: &[usize]) -> Option<&Node> {
        let (&first, rest) = path.split_first()?;
        let mut node = self.nodes.get(first)?;
        for &index in rest {
            node = node.children()?.get(index)?;
        }
        Some(node)
    }

    pub fn node_at_path_mut(&mut self, path: &[usize]) -> Option<&mut Node> {
        let (&first, rest) = path.split_first()?;
        let mut node = self.nodes.get_mut(first)?;
        for &index in rest {
            node = node.children_mut()?.get_mut(index)?;
        }
        Some(node)
    }

    /// Remove the node at `path` and return it.
    pub fn remove_at_path(&mut self, path: &[usize]) -> Option<Node> {
        let (&last, parent_path) = path.split_last()?;
        let siblings = self.siblings_mut(parent_path)?;
        if last < siblings.len() {
            Some(siblings.remove(last))
        } else {
            None
        }
    }

    /// Insert `node` at `path` (clamped to the end of its sibling list).
    pub fn insert_at_path(&mut self, path: &[usize], node: Node) -> bool {
        let Some((&last, parent_path)) = path.split_last() else {
            return false;
        };
        let Some(siblings) = self.siblings_mut(parent_path) else {
            return false;
        };
        let index = last.min(siblings.len());
        siblings.insert(index, node);
        true
    }

    fn siblings_mut(&mut self, parent_path: &[usize]) -> Option<&mut Vec<Node>> {
        if parent_path.is_empty() {
            Some(&mut self.nodes)
        } else {
            self.node_at_path_mut(parent_path)?.children_mut()
        }
    }

    /// Table coordinates of the node with `id`, if it sits inside a table.
    ///
    /// Walks the path from the root and keys off the deepest enclosing
    /// table; a selection on the table node itself yields row/col 0.
    pub fn table_context(&self, id: &str) -> Option<TableContext> {
        let path = self.path_to(id)?;

        for prefix_len in (1..=path.len()).rev() {
            let prefix = &path[..prefix_len];
            let node = self.node_at_path(prefix)?;
            if !node.is_table() {
                continue;
            }
            let row = path.get(prefix_len).copied().unwrap_or(0);
            let col = path.get(prefix_len + 1).copied().unwrap_or(0);
            return Some(TableContext {
                table: node.id().to_string(),
                table_path: prefix.to_vec(),
                row,
                col,
            });
        }
        None
    }

    /// Index of the top-level block containing `id`, if any.
    pub fn top_level_index(&self, id: &str) -> Option<usize> {
        self.path_to(id).map(|path| path[0])
    }

    /// Replace the node with `id` by `node`; with no target, append at the
    /// end of the document. Returns the ID of the inserted node.
    pub fn replace_or_append(&mut self, target: Option<&str>, node: Node) -> NodeId {
        let inserted = node.id().to_string();
        match target.and_then(|id| self.path_to(id)) {
            Some(path) => {
                self.remove_at_path(&path);
                self.insert_at_path(&path, node);
            }
            None => self.nodes.push(node),
        }
        inserted
    }

    /// Pad every row of a table to the widest row's cell count.
    ///
    /// Called by every table-mutating command before it returns, so the
    /// rectangularity invariant holds even for tables that arrived
    /// malformed from outside.
    pub fn normalize_table(&mut self, table_id: &str) {
        let Some(path) = self.path_to(table_id) else {
            return;
        };
        let widest = match self.node_at_path(&path) {
            Some(Node::Table { rows, .. }) => rows
                .iter()
                .filter_map(|r| r.children().map(Vec::len))
                .max()
                .unwrap_or(0),
            _ => return,
        };

        let mut pad = Vec::new();
        if let Some(Node::Table { rows, .. }) = self.node_at_path(&path) {
            for (row_index, row) in rows.iter().enumerate() {
                if let Some(cells) = row.children() {
                    for _ in cells.len()..widest {
                        pad.push((row_index, cells.last().is_some_and(Node::is_header_cell)));
                    }
                }
            }
        }

        for (row_index, header) in pad {
            let (cell_id, para_id) = (self.new_id(), self.new_id());
            if let Some(Node::Table { rows, .. }) = self.node_at_path_mut(&path) {
                if let Some(cells) = rows[row_index].children_mut() {
                    cells.push(Node::cell(
                        cell_id,
                        header,
                        vec![Node::paragraph(para_id, Vec::new())],
                    ));
                }
            }
        }
    }

    /// All media srcs currently reachable in the tree. Used to reconcile
    /// the object-handle registry after deletions.
    pub fn media_srcs(&self) -> Vec<String> {
        let mut srcs = Vec::new();
        collect_media_srcs(&self.nodes, &mut srcs);
        srcs
    }
}

fn path_in(nodes: &[Node], id: &str, path: &mut Vec<usize>) -> bool {
    for (index, node) in nodes.iter().enumerate() {
        if node.id() == id {
            path.push(index);
            return true;
        }
        if let Some(children) = node.children() {
            path.push(index);
            if path_in(children, id, path) {
                return true;
            }
            path.pop();
        }
    }
    false
}

fn collect_media_srcs(nodes: &[Node], srcs: &mut Vec<String>) {
    for node in nodes {
        if let Some(attrs) = node.media_attrs() {
            srcs.push(attrs.src.clone());
        }
        if let Some(children) = node.children() {
            collect_media_srcs(children, srcs);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_markup_sanitizes_first() {
        let doc = Document::from_markup(r#"<p style="color: red">x</p>"#);
        assert!(!doc.serialize().contains("color"));
    }

    #[test]
    fn test_path_navigation() {
        let doc = Document::from_markup("<ul><li><p>a</p></li></ul>");
        let list = &doc.nodes()[0];
        let item = &list.children().unwrap()[0];
        let para = &item.children().unwrap()[0];

        let path = doc.path_to(para.id()).unwrap();
        assert_eq!(path, vec![0, 0, 0]);
        assert_eq!(doc.node_at_path(&path).unwrap().id(), para.id());
    }

    #[test]
    fn test_table_context_from_cell_content() {
        let doc = Document::from_markup(
            "<table><tr><td><p>a</p></td><td><p>b</p></td></tr></table>",
        );
        let table = &doc.nodes()[0];
        let row = &table.children().unwrap()[0];
        let cell = &row.children().unwrap()[1];
        let para = &cell.children().unwrap()[0];

        let ctx = doc.table_context(para.id()).unwrap();
        assert_eq!(ctx.table, table.id());
        assert_eq!(ctx.row, 0);
        assert_eq!(ctx.col, 1);
    }

    #[test]
    fn test_table_context_outside_table() {
        let doc = Document::from_markup("<p>a</p>");
        let para = &doc.nodes()[0];
        assert!(doc.table_context(para.id()).is_none());
    }

    #[test]
    fn test_normalize_table_pads_short_rows() {
        let mut doc = Document::from_markup(
            "<table><tr><td>a</td><td>b</td></tr><tr><td>c</td></tr></table>",
        );
        let table_id = doc.nodes()[0].id().to_string();
        doc.normalize_table(&table_id);

        let Node::Table { rows, .. } = &doc.nodes()[0] else {
            panic!("expected table");
        };
        for row in rows {
            assert_eq!(row.children().unwrap().len(), 2);
        }
    }

    #[test]
    fn test_replace_or_append() {
        let mut doc = Document::from_markup("<p>a</p><p>b</p>");
        let first = doc.nodes()[0].id().to_string();
        let id = doc.new_id();
        doc.replace_or_append(Some(&first), Node::paragraph(id.clone(), Vec::new()));

        assert_eq!(doc.nodes().len(), 2);
        assert_eq!(doc.nodes()[0].id(), id);
    }
}
