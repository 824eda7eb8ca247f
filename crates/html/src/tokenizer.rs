//! Simplified HTML tokenizer with a constrained, practical tag-name character set.
//!
//! Supported tag-name characters (ASCII only): `[A-Za-z0-9:_-]`.
//! Attribute names use the same ASCII character class.
//!
//! Known limitations (intentional):
//! - Not a full HTML5 tokenizer/state machine (no spec parse-error recovery).
//! - A `<` that is not followed by a letter, `/` or `!` is text.
//! - Raw-text close-tag scanning accepts only ASCII whitespace before `>` (see
//!   `find_rawtext_close_tag`).
use crate::entities::decode_entities;
use crate::types::Token;
use memchr::memchr;

const HTML_COMMENT_START: &str = "<!--";
const HTML_COMMENT_END: &str = "-->";

fn starts_with_ignore_ascii_case_at(haystack: &[u8], start: usize, needle: &[u8]) -> bool {
    haystack.len() >= start + needle.len()
        && haystack[start..start + needle.len()].eq_ignore_ascii_case(needle)
}

fn is_name_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'-' || c == b'_' || c == b':'
}

/// `script` and `style` bodies are kept verbatim; `textarea` and `title` bodies are
/// kept as text but still have their character references decoded.
fn rawtext_kind(name: &str) -> Option<bool> {
    match name {
        "script" | "style" => Some(false),
        "textarea" | "title" => Some(true),
        _ => None,
    }
}

// only attempts matches starting at ASCII <, which cannot appear in UTF-8
// continuation bytes
fn find_rawtext_close_tag(haystack: &str, name: &str) -> Option<(usize, usize)> {
    let hay_bytes = haystack.as_bytes();
    let len = hay_bytes.len();
    let n = name.len() + 2;
    let mut i = 0;
    while i + n <= len {
        let rel = memchr(b'<', &hay_bytes[i..])?;
        i += rel;
        if i + n > len {
            return None;
        }
        if hay_bytes[i + 1] == b'/'
            && starts_with_ignore_ascii_case_at(hay_bytes, i + 2, name.as_bytes())
        {
            let mut k = i + n;
            while k < len && hay_bytes[k].is_ascii_whitespace() {
                k += 1;
            }
            if k < len && hay_bytes[k] == b'>' {
                return Some((i, k + 1));
            }
        }
        i += 1;
    }
    None
}

pub(crate) fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Whether the `<` at `i` opens markup rather than being literal text.
fn opens_markup(bytes: &[u8], i: usize) -> bool {
    match bytes.get(i + 1) {
        Some(b) => b.is_ascii_alphabetic() || *b == b'/' || *b == b'!',
        None => false,
    }
}

fn push_text(out: &mut Vec<Token>, raw: &str) {
    let decoded = decode_entities(raw);
    if !decoded.is_empty() {
        out.push(Token::Text(decoded));
    }
}

pub fn tokenize(input: &str) -> Vec<Token> {
    let mut out = Vec::new();
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut i = 0;
    // Invariant: slice endpoints are only cut at ASCII structural bytes, so they stay
    // UTF-8 boundaries.
    while i < len {
        if bytes[i] != b'<' || !opens_markup(bytes, i) {
            let start = i;
            i += 1;
            while i < len {
                match memchr(b'<', &bytes[i..]) {
                    Some(rel) => {
                        i += rel;
                        if opens_markup(bytes, i) {
                            break;
                        }
                        i += 1;
                    }
                    None => i = len,
                }
            }
            debug_assert!(input.is_char_boundary(start));
            debug_assert!(input.is_char_boundary(i));
            push_text(&mut out, &input[start..i]);
            continue;
        }

        if input[i..].starts_with(HTML_COMMENT_START) {
            let body_start = i + HTML_COMMENT_START.len();
            if let Some(end) = input[body_start..].find(HTML_COMMENT_END) {
                out.push(Token::Comment(input[body_start..body_start + end].to_string()));
                i = body_start + end + HTML_COMMENT_END.len();
                continue;
            }
            out.push(Token::Comment(input[body_start..].to_string()));
            break;
        }
        if starts_with_ignore_ascii_case_at(bytes, i, b"<!doctype") {
            let rest = &input[i + 2..];
            let Some(end) = rest.find('>') else {
                break;
            };
            out.push(Token::Doctype(rest[..end].trim().to_string()));
            i += 2 + end + 1;
            continue;
        }
        if bytes[i + 1] == b'!' {
            // bogus comment, e.g. `<![CDATA[...]]>`
            let rest = &input[i + 2..];
            let end = rest.find('>').unwrap_or(rest.len());
            out.push(Token::Comment(rest[..end].to_string()));
            i = (i + 2 + end + 1).min(len);
            continue;
        }

        if bytes[i + 1] == b'/' {
            let start = i + 2;
            let mut j = start;
            while j < len && is_name_char(bytes[j]) {
                j += 1;
            }
            let name = input[start..j].to_ascii_lowercase();
            while j < len && bytes[j] != b'>' {
                j += 1;
            }
            if j < len {
                j += 1;
            }
            if !name.is_empty() {
                out.push(Token::EndTag(name));
            }
            i = j;
            continue;
        }

        // start tag
        let start = i + 1;
        let mut k = start;
        while k < len && is_name_char(bytes[k]) {
            k += 1;
        }
        let name = input[start..k].to_ascii_lowercase();
        let mut attributes: Vec<(String, Option<String>)> = Vec::new();
        let mut self_closing = false;

        let skip_whitespace = |k: &mut usize| {
            while *k < len && bytes[*k].is_ascii_whitespace() {
                *k += 1;
            }
        };

        loop {
            skip_whitespace(&mut k);
            if k >= len {
                break;
            }
            if bytes[k] == b'>' {
                k += 1;
                break;
            }
            if bytes[k] == b'/' {
                if k + 1 < len && bytes[k + 1] == b'>' {
                    self_closing = true;
                    k += 2;
                    break;
                }
                k += 1;
                continue;
            }
            let name_start = k;
            while k < len && is_name_char(bytes[k]) {
                k += 1;
            }
            if name_start == k {
                k += 1;
                continue;
            }
            let attribute_name = input[name_start..k].to_ascii_lowercase();

            skip_whitespace(&mut k);
            let value = if k < len && bytes[k] == b'=' {
                k += 1;
                skip_whitespace(&mut k);
                if k < len && (bytes[k] == b'"' || bytes[k] == b'\'') {
                    let quote = bytes[k];
                    k += 1;
                    let vstart = k;
                    while k < len && bytes[k] != quote {
                        k += 1;
                    }
                    let raw = &input[vstart..k];
                    if k < len {
                        k += 1;
                    }
                    Some(decode_entities(raw))
                } else {
                    let vstart = k;
                    while k < len && !bytes[k].is_ascii_whitespace() && bytes[k] != b'>' {
                        if bytes[k] == b'/' && k + 1 < len && bytes[k + 1] == b'>' {
                            break;
                        }
                        k += 1;
                    }
                    Some(decode_entities(&input[vstart..k]))
                }
            } else {
                None
            };
            // first occurrence of an attribute wins
            if !attributes.iter().any(|(n, _)| *n == attribute_name) {
                attributes.push((attribute_name, value));
            }
        }
        if is_void_element(&name) {
            self_closing = true;
        }

        let rawtext = if self_closing { None } else { rawtext_kind(&name) };
        out.push(Token::StartTag {
            name: name.clone(),
            attributes,
            self_closing,
        });

        if let Some(decode) = rawtext {
            let body_start = k;
            let (body_end, resume) = match find_rawtext_close_tag(&input[body_start..], &name) {
                Some((rel_start, rel_end)) => (body_start + rel_start, body_start + rel_end),
                // missing close tag: the remainder is the element body
                None => (len, len),
            };
            let raw = &input[body_start..body_end];
            if !raw.is_empty() {
                let text = if decode {
                    decode_entities(raw)
                } else {
                    raw.to_string()
                };
                out.push(Token::Text(text));
            }
            out.push(Token::EndTag(name));
            i = resume;
            continue;
        }

        i = k;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_tokens(tokens: &[Token]) -> Vec<&str> {
        tokens
            .iter()
            .filter_map(|t| match t {
                Token::Text(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn tokenize_preserves_utf8_text_nodes() {
        let tokens = tokenize("<p>120×32</p>");
        assert_eq!(text_tokens(&tokens), vec!["120×32"]);
    }

    #[test]
    fn tokenize_handles_mixed_case_doctype() {
        let tokens = tokenize("<!DoCtYpE html><p>x</p>");
        assert_eq!(tokens[0], Token::Doctype("DoCtYpE html".to_string()));
    }

    #[test]
    fn tokenize_lowercases_names_and_decodes_attribute_values() {
        let tokens = tokenize(r#"<DIV Class="a&amp;b" hidden data-x=1>"#);
        assert_eq!(
            tokens,
            vec![Token::StartTag {
                name: "div".to_string(),
                attributes: vec![
                    ("class".to_string(), Some("a&b".to_string())),
                    ("hidden".to_string(), None),
                    ("data-x".to_string(), Some("1".to_string())),
                ],
                self_closing: false,
            }]
        );
    }

    #[test]
    fn tokenize_finds_script_end_tag_case_insensitive() {
        let tokens = tokenize("<script>if (a < b) x = '&amp;';</ScRiPt>");
        assert!(
            matches!(
                tokens.as_slice(),
                [Token::StartTag { name, .. }, Token::Text(body), Token::EndTag(end)]
                    if name == "script" && body == "if (a < b) x = '&amp;';" && end == "script"
            ),
            "expected raw script text and matching end tag, got: {tokens:?}"
        );
    }

    #[test]
    fn tokenize_decodes_textarea_body_but_keeps_markup_literal() {
        let tokens = tokenize("<textarea><b>&lt;</b></textarea>");
        assert_eq!(text_tokens(&tokens), vec!["<b><</b>"]);
    }

    #[test]
    fn tokenize_treats_lone_angle_bracket_as_text() {
        let tokens = tokenize("<p>a < b &lt; c</p>");
        assert_eq!(text_tokens(&tokens), vec!["a < b < c"]);
    }

    #[test]
    fn tokenize_marks_void_elements_self_closing() {
        let tokens = tokenize("a<br>b");
        assert!(matches!(
            &tokens[1],
            Token::StartTag { name, self_closing: true, .. } if name == "br"
        ));
    }

    #[test]
    fn tokenize_keeps_comments_and_unterminated_rawtext() {
        let tokens = tokenize("<!-- note --><style>p { color: red }");
        assert_eq!(tokens[0], Token::Comment(" note ".to_string()));
        assert_eq!(tokens.last(), Some(&Token::EndTag("style".to_string())));
    }
}
