use std::collections::HashMap;
use std::sync::LazyLock;

use memchr::memchr;

/// Named entities understood by [`decode_entities`], keyed by lowercase name.
///
/// The set is deliberately small: the ASCII punctuation names, the whitespace
/// names that [`encode_entities`] emits, and a handful of typographic marks.
static NAMED: LazyLock<HashMap<&'static str, char>> = LazyLock::new(|| {
    const TABLE: &[(&str, char)] = &[
        ("tab", '\t'),
        ("newline", '\n'),
        ("excl", '!'),
        ("quot", '"'),
        ("num", '#'),
        ("dollar", '$'),
        ("percnt", '%'),
        ("amp", '&'),
        ("apos", '\''),
        ("lpar", '('),
        ("rpar", ')'),
        ("ast", '*'),
        ("midast", '*'),
        ("plus", '+'),
        ("comma", ','),
        ("hyphen", '-'),
        ("dash", '-'),
        ("period", '.'),
        ("sol", '/'),
        ("colon", ':'),
        ("semi", ';'),
        ("lt", '<'),
        ("equals", '='),
        ("gt", '>'),
        ("quest", '?'),
        ("commat", '@'),
        ("lsqb", '['),
        ("lbrack", '['),
        ("bsol", '\\'),
        ("rsqb", ']'),
        ("rbrack", ']'),
        ("hat", '^'),
        ("lowbar", '_'),
        ("grave", '`'),
        ("diacriticalgrave", '`'),
        ("lcub", '{'),
        ("lbrace", '{'),
        ("verbar", '|'),
        ("vert", '|'),
        ("verticalline", '|'),
        ("rcub", '}'),
        ("rbrace", '}'),
        ("tilde", '~'),
        ("diacriticaltilde", '~'),
        ("nbsp", '\u{00A0}'),
        ("nonbreakingspace", '\u{00A0}'),
        ("copy", '\u{00A9}'),
        ("reg", '\u{00AE}'),
        ("trade", '\u{2122}'),
        ("hellip", '\u{2026}'),
        ("mdash", '\u{2014}'),
        ("ndash", '\u{2013}'),
        ("laquo", '\u{00AB}'),
        ("raquo", '\u{00BB}'),
        ("lsquo", '\u{2018}'),
        ("rsquo", '\u{2019}'),
        ("ldquo", '\u{201C}'),
        ("rdquo", '\u{201D}'),
        ("times", '\u{00D7}'),
        ("divide", '\u{00F7}'),
        ("middot", '\u{00B7}'),
        ("deg", '\u{00B0}'),
        ("para", '\u{00B6}'),
        ("sect", '\u{00A7}'),
        ("bull", '\u{2022}'),
    ];
    TABLE.iter().copied().collect()
});

// Longest table name is "diacriticalgrave"; anything longer cannot match.
const MAX_NAME_LEN: usize = 24;
const MAX_HEX_DIGITS: usize = 6; // 0x10FFFF
const MAX_DEC_DIGITS: usize = 7; // 1114111

/// Replace HTML character references with the characters they denote.
///
/// Contract:
/// - A candidate starts at `&` and ends at the first `;`. If whitespace, another `&`,
///   or the end of input comes first, the text is not a reference and is kept.
/// - Named references are looked up case-insensitively in a fixed table.
/// - `&#NNN;` and `&#xHH;` decode any valid Unicode scalar; surrogates and
///   out-of-range values are kept unchanged.
/// - Unknown names are kept unchanged.
pub fn decode_entities(s: &str) -> String {
    let bytes = s.as_bytes();
    if memchr(b'&', bytes).is_none() {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut copy_start = 0;
    let mut i = 0;

    while let Some(rel) = memchr(b'&', &bytes[i..]) {
        let amp = i + rel;
        match scan_candidate(bytes, amp) {
            Some(semi) => {
                let body = &s[amp + 1..semi];
                if let Some(ch) = resolve(body) {
                    out.push_str(&s[copy_start..amp]);
                    out.push(ch);
                    copy_start = semi + 1;
                }
                i = semi + 1;
            }
            None => i = amp + 1,
        }
        if i >= bytes.len() {
            break;
        }
    }

    out.push_str(&s[copy_start..]);
    out
}

/// Bounded scan for the `;` closing a candidate that starts at `amp`.
fn scan_candidate(bytes: &[u8], amp: usize) -> Option<usize> {
    let mut j = amp + 1;
    while j < bytes.len() {
        let b = bytes[j];
        if b == b';' {
            return Some(j);
        }
        if b == b'&' || b.is_ascii_whitespace() || j - amp > MAX_NAME_LEN {
            return None;
        }
        j += 1;
    }
    None
}

fn resolve(body: &str) -> Option<char> {
    if let Some(num) = body.strip_prefix('#') {
        let (digits, radix, max) = match num.strip_prefix(['x', 'X']) {
            Some(hex) => (hex, 16, MAX_HEX_DIGITS),
            None => (num, 10, MAX_DEC_DIGITS),
        };
        if digits.is_empty()
            || digits.len() > max
            || !digits.bytes().all(|b| (b as char).is_digit(radix))
        {
            return None;
        }
        return u32::from_str_radix(digits, radix)
            .ok()
            .and_then(char::from_u32);
    }
    if body.is_empty() || !body.is_ascii() {
        return None;
    }
    NAMED.get(body.to_ascii_lowercase().as_str()).copied()
}

/// Escape the characters that would otherwise be read back as markup or lost
/// to whitespace collapsing: `& < > " '`, tab, line feed and NBSP.
pub fn encode_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' => out.push_str("&Tab;"),
            '\n' => out.push_str("&NewLine;"),
            '\u{00A0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
    out
}
