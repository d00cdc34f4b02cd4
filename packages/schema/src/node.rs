use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseAlignError;

/// Identifier assigned to every node in a document tree.
pub type NodeId = String;

/// Minimum pixel width a media node may be resized to.
pub const MIN_MEDIA_WIDTH: u32 = 100;

/// Maximum pixel width a media node may be resized to.
pub const MAX_MEDIA_WIDTH: u32 = 800;

/// Block-level justification of a media node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl fmt::Display for Align {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Align::Left => write!(f, "left"),
            Align::Center => write!(f, "center"),
            Align::Right => write!(f, "right"),
        }
    }
}

impl FromStr for Align {
    type Err = ParseAlignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Align::Left),
            "center" => Ok(Align::Center),
            "right" => Ok(Align::Right),
            other => Err(ParseAlignError(other.to_string())),
        }
    }
}

/// Attributes shared by image and video nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaAttrs {
    /// Resource locator: data URI, object handle, or remote URL.
    pub src: String,

    /// Rendered width. Either a pixel count ("480") or the default "100%".
    pub width: String,

    /// Block-level justification.
    pub align: Align,

    /// Optional hyperlink wrapping. Localhost values are never admitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

impl MediaAttrs {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            width: "100%".to_string(),
            align: Align::Left,
            href: None,
        }
    }

    /// Current width as a pixel count, if one is set.
    ///
    /// The default "100%" (and any other non-pixel value) returns `None`.
    pub fn width_px(&self) -> Option<u32> {
        self.width.trim_end_matches("px").parse().ok()
    }
}

/// Inline mark attached to a text node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Mark {
    Link { href: String, target: String },
}

impl Mark {
    /// Link mark with the fixed new-window target.
    pub fn link(href: impl Into<String>) -> Self {
        Mark::Link {
            href: href.into(),
            target: "_blank".to_string(),
        }
    }
}

/// Document node. The root of a document is a sequence of block nodes.
///
/// Each node is exclusively owned by its parent; a node never appears in
/// two places in a tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    Paragraph {
        id: NodeId,
        children: Vec<Node>,
    },

    Heading {
        id: NodeId,
        level: u8,
        children: Vec<Node>,
    },

    BulletList {
        id: NodeId,
        children: Vec<Node>,
    },

    OrderedList {
        id: NodeId,
        children: Vec<Node>,
    },

    ListItem {
        id: NodeId,
        children: Vec<Node>,
    },

    Blockquote {
        id: NodeId,
        children: Vec<Node>,
    },

    Table {
        id: NodeId,
        rows: Vec<Node>,
    },

    TableRow {
        id: NodeId,
        cells: Vec<Node>,
    },

    TableCell {
        id: NodeId,
        children: Vec<Node>,
    },

    TableHeaderCell {
        id: NodeId,
        children: Vec<Node>,
    },

    Image {
        id: NodeId,
        attrs: MediaAttrs,
    },

    Video {
        id: NodeId,
        attrs: MediaAttrs,
    },

    Text {
        id: NodeId,
        text: String,
        marks: Vec<Mark>,
    },
}

impl Node {
    pub fn text(id: impl Into<NodeId>, text: impl Into<String>) -> Self {
        Node::Text {
            id: id.into(),
            text: text.into(),
            marks: Vec::new(),
        }
    }

    pub fn paragraph(id: impl Into<NodeId>, children: Vec<Node>) -> Self {
        Node::Paragraph {
            id: id.into(),
            children,
        }
    }

    pub fn cell(id: impl Into<NodeId>, header: bool, children: Vec<Node>) -> Self {
        if header {
            Node::TableHeaderCell {
                id: id.into(),
                children,
            }
        } else {
            Node::TableCell {
                id: id.into(),
                children,
            }
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Node::Paragraph { id, .. }
            | Node::Heading { id, .. }
            | Node::BulletList { id, .. }
            | Node::OrderedList { id, .. }
            | Node::ListItem { id, .. }
            | Node::Blockquote { id, .. }
            | Node::Table { id, .. }
            | Node::TableRow { id, .. }
            | Node::TableCell { id, .. }
            | Node::TableHeaderCell { id, .. }
            | Node::Image { id, .. }
            | Node::Video { id, .. }
            | Node::Text { id, .. } => id,
        }
    }

    /// Ordered children, uniformly across container variants.
    ///
    /// Table rows and row cells are the children of their containers;
    /// media and text nodes are leaves.
    pub fn children(&self) -> Option<&Vec<Node>> {
        match self {
            Node::Paragraph { children, .. }
            | Node::Heading { children, .. }
            | Node::BulletList { children, .. }
            | Node::OrderedList { children, .. }
            | Node::ListItem { children, .. }
            | Node::Blockquote { children, .. }
            | Node::TableCell { children, .. }
            | Node::TableHeaderCell { children, .. } => Some(children),
            Node::Table { rows, .. } => Some(rows),
            Node::TableRow { cells, .. } => Some(cells),
            Node::Image { .. } | Node::Video { .. } | Node::Text { .. } => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Paragraph { children, .. }
            | Node::Heading { children, .. }
            | Node::BulletList { children, .. }
            | Node::OrderedList { children, .. }
            | Node::ListItem { children, .. }
            | Node::Blockquote { children, .. }
            | Node::TableCell { children, .. }
            | Node::TableHeaderCell { children, .. } => Some(children),
            Node::Table { rows, .. } => Some(rows),
            Node::TableRow { cells, .. } => Some(cells),
            Node::Image { .. } | Node::Video { .. } | Node::Text { .. } => None,
        }
    }

    pub fn media_attrs(&self) -> Option<&MediaAttrs> {
        match self {
            Node::Image { attrs, .. } | Node::Video { attrs, .. } => Some(attrs),
            _ => None,
        }
    }

    pub fn media_attrs_mut(&mut self) -> Option<&mut MediaAttrs> {
        match self {
            Node::Image { attrs, .. } | Node::Video { attrs, .. } => Some(attrs),
            _ => None,
        }
    }

    pub fn is_table(&self) -> bool {
        matches!(self, Node::Table { .. })
    }

    pub fn is_cell(&self) -> bool {
        matches!(self, Node::TableCell { .. } | Node::TableHeaderCell { .. })
    }

    pub fn is_header_cell(&self) -> bool {
        matches!(self, Node::TableHeaderCell { .. })
    }
}

/// Whether a candidate href may be attached to a media node or link mark.
///
/// Anything pointing at localhost is silently rejected: bare `localhost`
/// substrings as well as `http://localhost` and `https://localhost`
/// prefixes, in any case. Empty values are rejected too.
pub fn is_allowed_href(href: &str) -> bool {
    let candidate = href.trim();
    if candidate.is_empty() {
        return false;
    }
    !candidate.to_ascii_lowercase().contains("localhost")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_attrs_defaults() {
        let attrs = MediaAttrs::new("https://cdn.example.com/a.png");
        assert_eq!(attrs.width, "100%");
        assert_eq!(attrs.align, Align::Left);
        assert!(attrs.href.is_none());
        assert_eq!(attrs.width_px(), None);
    }

    #[test]
    fn test_width_px_parses_pixel_values() {
        let mut attrs = MediaAttrs::new("a.png");
        attrs.width = "480".to_string();
        assert_eq!(attrs.width_px(), Some(480));

        attrs.width = "480px".to_string();
        assert_eq!(attrs.width_px(), Some(480));
    }

    #[test]
    fn test_localhost_hrefs_rejected() {
        assert!(!is_allowed_href("http://localhost:4200/admin"));
        assert!(!is_allowed_href("https://localhost/x"));
        assert!(!is_allowed_href("https://evil.test/?next=LOCALHOST"));
        assert!(!is_allowed_href(""));
        assert!(!is_allowed_href("   "));
        assert!(is_allowed_href("https://example.com/story"));
    }

    #[test]
    fn test_align_round_trip() {
        for align in [Align::Left, Align::Center, Align::Right] {
            assert_eq!(align.to_string().parse::<Align>().unwrap(), align);
        }
        assert!("middle".parse::<Align>().is_err());
    }

    #[test]
    fn test_node_serialization_is_tagged() {
        let node = Node::text("t-1", "Hello");
        let json = serde_json::to_string(&node).unwrap();
        assert!(json.contains(r#""type":"Text""#));

        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(back, node);
    }
}
