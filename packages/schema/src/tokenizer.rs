use logos::Logos;
use std::ops::Range;

/// Token types for the markup form of a document
#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token<'src> {
    // Opening or void tag, attributes included: <img src="..." />
    #[regex(r"<[a-zA-Z][^<>]*>", |lex| lex.slice())]
    Tag(&'src str),

    // Closing tag: </p>
    #[regex(r"</[a-zA-Z][a-zA-Z0-9]*\s*>", |lex| lex.slice())]
    CloseTag(&'src str),

    // Comments and doctype-ish noise, dropped by tokenize()
    #[regex(r"<!--([^-]|-[^-])*-->")]
    #[regex(r"<![^>]*>")]
    Comment,

    // Character data between tags
    #[regex(r"[^<]+", |lex| lex.slice())]
    Text(&'src str),
}

/// Tokenize markup into (token, span) pairs.
///
/// Unlexable slices (a stray `<` and similar) are dropped rather than
/// reported: externally supplied content gets best-effort recovery, not a
/// validation error path.
pub fn tokenize(source: &str) -> Vec<(Token<'_>, Range<usize>)> {
    Token::lexer(source)
        .spanned()
        .filter_map(|(token, span)| match token {
            Ok(Token::Comment) => None,
            Ok(token) => Some((token, span)),
            Err(_) => None,
        })
        .collect()
}

/// A scanned opening tag: lowercased name, decoded attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTag {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub self_closing: bool,
}

impl RawTag {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Scan the inside of a `Token::Tag` slice into name and attributes.
pub fn scan_tag(slice: &str) -> Option<RawTag> {
    let inner = slice.strip_prefix('<')?.strip_suffix('>')?;
    let (inner, self_closing) = match inner.strip_suffix('/') {
        Some(rest) => (rest, true),
        None => (inner, false),
    };

    let name_end = inner
        .find(|c: char| c.is_whitespace())
        .unwrap_or(inner.len());
    let name = inner[..name_end].to_ascii_lowercase();
    if name.is_empty() {
        return None;
    }

    let mut attrs = Vec::new();
    let bytes = inner.as_bytes();
    let mut pos = name_end;
    while pos < inner.len() {
        // Skip whitespace before an attribute name
        while pos < inner.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos >= inner.len() {
            break;
        }

        let attr_start = pos;
        while pos < inner.len() && !bytes[pos].is_ascii_whitespace() && bytes[pos] != b'=' {
            pos += 1;
        }
        let attr_name = inner[attr_start..pos].to_ascii_lowercase();
        if attr_name.is_empty() {
            pos += 1;
            continue;
        }

        while pos < inner.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos >= inner.len() || bytes[pos] != b'=' {
            // Bare attribute (controls, disabled)
            attrs.push((attr_name, String::new()));
            continue;
        }
        pos += 1; // consume '='
        while pos < inner.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }

        let value = if pos < inner.len() && (bytes[pos] == b'"' || bytes[pos] == b'\'') {
            let quote = bytes[pos];
            pos += 1;
            let value_start = pos;
            while pos < inner.len() && bytes[pos] != quote {
                pos += 1;
            }
            let raw = &inner[value_start..pos];
            pos += 1; // consume closing quote (or step past EOF harmlessly)
            decode_entities(raw)
        } else {
            let value_start = pos;
            while pos < inner.len() && !bytes[pos].is_ascii_whitespace() {
                pos += 1;
            }
            decode_entities(&inner[value_start..pos])
        };

        attrs.push((attr_name, value));
    }

    Some(RawTag {
        name,
        attrs,
        self_closing,
    })
}

/// Name of a `Token::CloseTag` slice, lowercased.
pub fn scan_close_tag(slice: &str) -> Option<String> {
    let inner = slice.strip_prefix("</")?.strip_suffix('>')?;
    Some(inner.trim_end().to_ascii_lowercase())
}

/// Decode the five named character references plus `&#39;`.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&amp;", "\u{0}")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace('\u{0}', "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_basic() {
        let tokens = tokenize("<p>Hello</p>");
        assert_eq!(tokens.len(), 3);
        assert!(matches!(tokens[0].0, Token::Tag("<p>")));
        assert!(matches!(tokens[1].0, Token::Text("Hello")));
        assert!(matches!(tokens[2].0, Token::CloseTag("</p>")));
    }

    #[test]
    fn test_comments_are_dropped() {
        let tokens = tokenize("<p>a</p><!-- note -->x");
        assert_eq!(tokens.len(), 4);
    }

    #[test]
    fn test_scan_tag_with_attributes() {
        let tag = scan_tag(r#"<img src="a.png" width="300" data-align="center" />"#).unwrap();
        assert_eq!(tag.name, "img");
        assert!(tag.self_closing);
        assert_eq!(tag.attr("src"), Some("a.png"));
        assert_eq!(tag.attr("width"), Some("300"));
        assert_eq!(tag.attr("data-align"), Some("center"));
    }

    #[test]
    fn test_scan_tag_single_quotes_and_bare() {
        let tag = scan_tag("<video src='clip.mp4' controls>").unwrap();
        assert_eq!(tag.name, "video");
        assert!(!tag.self_closing);
        assert_eq!(tag.attr("src"), Some("clip.mp4"));
        assert_eq!(tag.attr("controls"), Some(""));
    }

    #[test]
    fn test_scan_close_tag() {
        assert_eq!(scan_close_tag("</TABLE >").as_deref(), Some("table"));
    }

    #[test]
    fn test_entity_decoding() {
        assert_eq!(decode_entities("a &amp;lt; b"), "a &lt; b");
        assert_eq!(decode_entities("&lt;p&gt; &quot;x&quot; &#39;y&#39;"), "<p> \"x\" 'y'");
    }
}
