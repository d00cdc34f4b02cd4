//! # Pressroom Schema
//!
//! Document node model for the Pressroom rich-content core: the closed
//! node-kind registry, the markup tokenizer/parser/serializer, and the
//! sanitization pipeline applied to externally supplied markup.

pub mod error;
pub mod id_generator;
pub mod node;
pub mod parser;
pub mod registry;
pub mod sanitize;
pub mod serializer;
pub mod tokenizer;

pub use error::ParseAlignError;
pub use id_generator::{document_seed, IdGenerator};
pub use node::{
    is_allowed_href, Align, Mark, MediaAttrs, Node, NodeId, MAX_MEDIA_WIDTH, MIN_MEDIA_WIDTH,
};
pub use parser::{parse, Parser};
pub use registry::{ContentClass, NodeKind, NodeSpec, SchemaRegistry};
pub use sanitize::{has_color_styles, sanitize};
pub use serializer::serialize;
pub use tokenizer::{tokenize, Token};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serialize_round_trip() {
        let markup = "<p>Hello <a href=\"https://example.com\" target=\"_blank\">world</a></p>";
        let mut ids = IdGenerator::new(markup);
        let nodes = parse(markup, &mut ids);
        assert_eq!(serialize(&nodes), markup);
    }
}
