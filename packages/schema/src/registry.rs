//! # Node Schema Registry
//!
//! Closed table of the node kinds a document may contain, replacing the
//! open-ended subclassing a plugin-style editor would use. The parser and
//! serializer both consult this table, so tag-to-kind mapping lives in
//! exactly one place.

use crate::node::Node;

/// The fixed set of node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Paragraph,
    Heading,
    BulletList,
    OrderedList,
    ListItem,
    Blockquote,
    Table,
    TableRow,
    TableCell,
    TableHeaderCell,
    Image,
    Video,
    Text,
}

/// What a node kind is allowed to contain. The parser normalizes parsed
/// children according to this class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentClass {
    /// Holds inline content (text with marks, media).
    Inline,
    /// Holds block-level children; loose inline content gets wrapped.
    Block,
    /// List: holds list items only; stray children get wrapped in one.
    ItemGroup,
    /// Table: holds rows only; anything else is dropped.
    RowGroup,
    /// Table row: holds cells only; anything else is dropped.
    CellGroup,
    /// Leaf node, no children.
    Leaf,
}

/// Per-kind schema entry.
#[derive(Debug, Clone, Copy)]
pub struct NodeSpec {
    pub kind: NodeKind,
    /// Markup tags this kind answers to. Headings list all six levels.
    pub tags: &'static [&'static str],
    pub content: ContentClass,
    /// Emitted as a void tag (`<img ... />`).
    pub void: bool,
}

const SPECS: &[NodeSpec] = &[
    NodeSpec {
        kind: NodeKind::Paragraph,
        tags: &["p"],
        content: ContentClass::Inline,
        void: false,
    },
    NodeSpec {
        kind: NodeKind::Heading,
        tags: &["h1", "h2", "h3", "h4", "h5", "h6"],
        content: ContentClass::Inline,
        void: false,
    },
    NodeSpec {
        kind: NodeKind::BulletList,
        tags: &["ul"],
        content: ContentClass::ItemGroup,
        void: false,
    },
    NodeSpec {
        kind: NodeKind::OrderedList,
        tags: &["ol"],
        content: ContentClass::ItemGroup,
        void: false,
    },
    NodeSpec {
        kind: NodeKind::ListItem,
        tags: &["li"],
        content: ContentClass::Block,
        void: false,
    },
    NodeSpec {
        kind: NodeKind::Blockquote,
        tags: &["blockquote"],
        content: ContentClass::Block,
        void: false,
    },
    NodeSpec {
        kind: NodeKind::Table,
        tags: &["table"],
        content: ContentClass::RowGroup,
        void: false,
    },
    NodeSpec {
        kind: NodeKind::TableRow,
        tags: &["tr"],
        content: ContentClass::CellGroup,
        void: false,
    },
    NodeSpec {
        kind: NodeKind::TableCell,
        tags: &["td"],
        content: ContentClass::Block,
        void: false,
    },
    NodeSpec {
        kind: NodeKind::TableHeaderCell,
        tags: &["th"],
        content: ContentClass::Block,
        void: false,
    },
    NodeSpec {
        kind: NodeKind::Image,
        tags: &["img"],
        content: ContentClass::Leaf,
        void: true,
    },
    NodeSpec {
        kind: NodeKind::Video,
        tags: &["video"],
        content: ContentClass::Leaf,
        void: false,
    },
    NodeSpec {
        kind: NodeKind::Text,
        tags: &[],
        content: ContentClass::Leaf,
        void: false,
    },
];

/// Lookup table over the fixed node-kind set.
pub struct SchemaRegistry;

impl SchemaRegistry {
    pub fn spec(kind: NodeKind) -> &'static NodeSpec {
        SPECS
            .iter()
            .find(|s| s.kind == kind)
            .expect("every kind has a spec")
    }

    /// Map a markup tag name (lowercase) to a node kind.
    pub fn kind_for_tag(tag: &str) -> Option<NodeKind> {
        SPECS
            .iter()
            .find(|s| s.tags.contains(&tag))
            .map(|s| s.kind)
    }

    /// Heading level carried by a tag, if it is a heading tag.
    pub fn heading_level(tag: &str) -> Option<u8> {
        match tag {
            "h1" => Some(1),
            "h2" => Some(2),
            "h3" => Some(3),
            "h4" => Some(4),
            "h5" => Some(5),
            "h6" => Some(6),
            _ => None,
        }
    }

    pub fn kind_of(node: &Node) -> NodeKind {
        match node {
            Node::Paragraph { .. } => NodeKind::Paragraph,
            Node::Heading { .. } => NodeKind::Heading,
            Node::BulletList { .. } => NodeKind::BulletList,
            Node::OrderedList { .. } => NodeKind::OrderedList,
            Node::ListItem { .. } => NodeKind::ListItem,
            Node::Blockquote { .. } => NodeKind::Blockquote,
            Node::Table { .. } => NodeKind::Table,
            Node::TableRow { .. } => NodeKind::TableRow,
            Node::TableCell { .. } => NodeKind::TableCell,
            Node::TableHeaderCell { .. } => NodeKind::TableHeaderCell,
            Node::Image { .. } => NodeKind::Image,
            Node::Video { .. } => NodeKind::Video,
            Node::Text { .. } => NodeKind::Text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_heading_tag_maps_to_heading() {
        for tag in ["h1", "h2", "h3", "h4", "h5", "h6"] {
            assert_eq!(SchemaRegistry::kind_for_tag(tag), Some(NodeKind::Heading));
        }
        assert_eq!(SchemaRegistry::heading_level("h3"), Some(3));
        assert_eq!(SchemaRegistry::heading_level("p"), None);
    }

    #[test]
    fn test_unknown_tags_have_no_kind() {
        assert_eq!(SchemaRegistry::kind_for_tag("div"), None);
        assert_eq!(SchemaRegistry::kind_for_tag("script"), None);
    }

    #[test]
    fn test_table_content_classes() {
        assert_eq!(
            SchemaRegistry::spec(NodeKind::Table).content,
            ContentClass::RowGroup
        );
        assert_eq!(
            SchemaRegistry::spec(NodeKind::TableRow).content,
            ContentClass::CellGroup
        );
        assert_eq!(
            SchemaRegistry::spec(NodeKind::TableCell).content,
            ContentClass::Block
        );
    }

    #[test]
    fn test_lists_hold_items_only() {
        assert_eq!(
            SchemaRegistry::spec(NodeKind::BulletList).content,
            ContentClass::ItemGroup
        );
        assert_eq!(
            SchemaRegistry::spec(NodeKind::OrderedList).content,
            ContentClass::ItemGroup
        );
        assert_eq!(
            SchemaRegistry::spec(NodeKind::ListItem).content,
            ContentClass::Block
        );
    }

    #[test]
    fn test_image_is_void() {
        assert!(SchemaRegistry::spec(NodeKind::Image).void);
        assert!(!SchemaRegistry::spec(NodeKind::Video).void);
    }
}
