use crate::id_generator::IdGenerator;
use crate::node::{is_allowed_href, Align, Mark, MediaAttrs, Node};
use crate::registry::{ContentClass, NodeKind, SchemaRegistry};
use crate::tokenizer::{decode_entities, scan_close_tag, scan_tag, tokenize, RawTag, Token};
use std::ops::Range;

/// Parser for the markup form of a document.
///
/// Recovery is best-effort: unknown tags are transparent (their children are
/// inlined), stray close tags are skipped, unclosed elements close at end of
/// input, and loose text at block level is wrapped in a paragraph. Malformed
/// content yields the best tree available rather than an error.
pub struct Parser<'src> {
    tokens: Vec<(Token<'src>, Range<usize>)>,
    pos: usize,
}

/// Parse markup into the root block sequence, minting node IDs from `ids`.
pub fn parse(source: &str, ids: &mut IdGenerator) -> Vec<Node> {
    let mut parser = Parser::new(source);
    let children = parser.parse_children(None, None, ids);
    wrap_inline(children, ids)
}

// Tags that never carry content even without a trailing slash.
const VOID_HTML_TAGS: &[&str] = &[
    "br", "hr", "input", "meta", "link", "source", "embed", "col", "wbr",
];

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            tokens: tokenize(source),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<&Token<'src>> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    /// Parse children until the matching close tag (or end of input).
    ///
    /// `link` is the href of the nearest enclosing anchor, applied as a link
    /// mark to text and as the `href` attribute of media nodes.
    fn parse_children(
        &mut self,
        until: Option<&str>,
        link: Option<&str>,
        ids: &mut IdGenerator,
    ) -> Vec<Node> {
        let mut out = Vec::new();

        loop {
            match self.peek() {
                None => break,

                Some(Token::Text(raw)) => {
                    let decoded = decode_entities(raw);
                    self.pos += 1;
                    if decoded.trim().is_empty() {
                        continue;
                    }
                    let marks = match link {
                        Some(href) => vec![Mark::link(href)],
                        None => Vec::new(),
                    };
                    out.push(Node::Text {
                        id: ids.new_id(),
                        text: decoded,
                        marks,
                    });
                }

                Some(Token::CloseTag(slice)) => {
                    let name = scan_close_tag(slice);
                    if name.as_deref() == until {
                        self.pos += 1;
                        break;
                    }
                    if until.is_some() {
                        // Let an enclosing element claim this close tag.
                        break;
                    }
                    // Stray close at the root: skip it.
                    self.pos += 1;
                }

                Some(Token::Tag(slice)) => {
                    let Some(raw) = scan_tag(slice) else {
                        self.pos += 1;
                        continue;
                    };
                    self.pos += 1;
                    self.parse_tag(raw, link, ids, &mut out);
                }

                Some(Token::Comment) => {
                    self.pos += 1;
                }
            }
        }

        out
    }

    fn parse_tag(
        &mut self,
        raw: RawTag,
        link: Option<&str>,
        ids: &mut IdGenerator,
        out: &mut Vec<Node>,
    ) {
        if raw.name == "a" {
            let href = raw
                .attr("href")
                .filter(|h| is_allowed_href(h))
                .map(str::to_string);
            let inner = self.parse_children(Some("a"), href.as_deref().or(link), ids);
            out.extend(inner);
            return;
        }

        match SchemaRegistry::kind_for_tag(&raw.name) {
            Some(kind) => out.push(self.parse_element(kind, raw, link, ids)),
            None => {
                if raw.self_closing || VOID_HTML_TAGS.contains(&raw.name.as_str()) {
                    return;
                }
                // Unknown container tags are transparent.
                let name = raw.name.clone();
                let inner = self.parse_children(Some(&name), link, ids);
                out.extend(inner);
            }
        }
    }

    fn parse_element(
        &mut self,
        kind: NodeKind,
        raw: RawTag,
        link: Option<&str>,
        ids: &mut IdGenerator,
    ) -> Node {
        let id = ids.new_id();

        if matches!(kind, NodeKind::Image | NodeKind::Video) {
            let attrs = media_attrs_from(&raw, link);
            // Fallback content inside <video>...</video> is discarded.
            if !raw.self_closing && !SchemaRegistry::spec(kind).void {
                let name = raw.name.clone();
                let _ = self.parse_children(Some(&name), None, ids);
            }
            return match kind {
                NodeKind::Image => Node::Image { id, attrs },
                _ => Node::Video { id, attrs },
            };
        }

        let children = if raw.self_closing {
            Vec::new()
        } else {
            let name = raw.name.clone();
            self.parse_children(Some(&name), link, ids)
        };
        let children = normalize_children(SchemaRegistry::spec(kind).content, children, ids);

        match kind {
            NodeKind::Paragraph => Node::Paragraph { id, children },
            NodeKind::Heading => Node::Heading {
                id,
                level: SchemaRegistry::heading_level(&raw.name).unwrap_or(1),
                children,
            },
            NodeKind::BulletList => Node::BulletList { id, children },
            NodeKind::OrderedList => Node::OrderedList { id, children },
            NodeKind::ListItem => Node::ListItem { id, children },
            NodeKind::Blockquote => Node::Blockquote { id, children },
            NodeKind::Table => Node::Table { id, rows: children },
            NodeKind::TableRow => Node::TableRow { id, cells: children },
            NodeKind::TableCell => Node::TableCell { id, children },
            NodeKind::TableHeaderCell => Node::TableHeaderCell { id, children },
            // Media and text are constructed elsewhere.
            NodeKind::Image | NodeKind::Video | NodeKind::Text => unreachable!(),
        }
    }
}

/// Coerce parsed children to what the registry says the kind may contain.
fn normalize_children(
    content: ContentClass,
    children: Vec<Node>,
    ids: &mut IdGenerator,
) -> Vec<Node> {
    match content {
        ContentClass::Inline => children,
        ContentClass::Block => wrap_inline(children, ids),
        ContentClass::ItemGroup => into_list_items(children, ids),
        ContentClass::RowGroup => children
            .into_iter()
            .filter(|n| SchemaRegistry::kind_of(n) == NodeKind::TableRow)
            .collect(),
        ContentClass::CellGroup => children.into_iter().filter(Node::is_cell).collect(),
        ContentClass::Leaf => Vec::new(),
    }
}

fn media_attrs_from(raw: &RawTag, link: Option<&str>) -> MediaAttrs {
    let mut attrs = MediaAttrs::new(raw.attr("src").unwrap_or_default());
    if let Some(width) = raw.attr("width") {
        if !width.trim().is_empty() {
            attrs.width = width.trim().to_string();
        }
    }
    if let Some(align) = raw.attr("data-align") {
        attrs.align = align.parse().unwrap_or(Align::Left);
    }
    attrs.href = raw
        .attr("href")
        .filter(|h| is_allowed_href(h))
        .map(str::to_string)
        .or_else(|| link.map(str::to_string));
    attrs
}

/// Wrap loose inline nodes into paragraphs so block contexts hold blocks.
fn wrap_inline(children: Vec<Node>, ids: &mut IdGenerator) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::new();
    let mut run: Vec<Node> = Vec::new();

    for child in children {
        if matches!(child, Node::Text { .. }) {
            run.push(child);
        } else {
            if !run.is_empty() {
                out.push(Node::paragraph(ids.new_id(), std::mem::take(&mut run)));
            }
            out.push(child);
        }
    }
    if !run.is_empty() {
        out.push(Node::paragraph(ids.new_id(), run));
    }
    out
}

/// Lists may only hold list items; stray children get wrapped in one.
fn into_list_items(children: Vec<Node>, ids: &mut IdGenerator) -> Vec<Node> {
    children
        .into_iter()
        .map(|child| match child {
            item @ Node::ListItem { .. } => item,
            other => Node::ListItem {
                id: ids.new_id(),
                children: wrap_inline(vec![other], ids),
            },
        })
        .collect()
}
