// A single CSS property: "display: none !important"
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub value: String,
    pub important: bool,
}

// Set of selectors and declarations
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rule {
    pub selectors: Vec<Selector>,
    pub declarations: Vec<Declaration>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selector {
    Universal,
    Type(String),  // element/tag selector
    Id(String),    // #id selector
    Class(String), // .class selector
}

// A full stylesheet: multiple rules
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stylesheet {
    pub rules: Vec<Rule>,
}

fn strip_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

// input: "div, #id { display: none; } .class { white-space: pre; }"
// output: Stylesheet { rules: vec![Rule{ selectors: ..., declarations: ...}, ...] }
//
// At-rule blocks (`@media` and friends) are skipped whole; nested braces only
// appear inside them.
pub fn parse_stylesheet(input: &str) -> Stylesheet {
    let input = strip_comments(input);
    let mut rules = Vec::new();
    let mut rest = input.as_str();
    while let Some(open) = rest.find('{') {
        let selector_str = rest[..open].trim();
        let body_start = open + 1;
        if selector_str.starts_with('@') {
            rest = skip_block(&rest[body_start..]);
            continue;
        }
        let Some(close) = rest[body_start..].find('}') else {
            break;
        };
        let declaration_str = &rest[body_start..body_start + close];
        rest = &rest[body_start + close + 1..];

        let selectors = selector_str
            .split(',')
            .filter_map(parse_selector_one)
            .collect::<Vec<_>>();
        if selectors.is_empty() {
            continue;
        }
        let declarations = parse_declarations(declaration_str);
        if declarations.is_empty() {
            continue;
        }
        rules.push(Rule {
            selectors,
            declarations,
        });
    }
    Stylesheet { rules }
}

/// Skip past the `}` that balances an already-consumed `{`.
fn skip_block(s: &str) -> &str {
    let mut depth = 1usize;
    for (i, b) in s.bytes().enumerate() {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return &s[i + 1..];
                }
            }
            _ => {}
        }
    }
    ""
}

// input: "display: none; white-space: pre !important;"
pub fn parse_declarations(input: &str) -> Vec<Declaration> {
    input
        .split(';')
        .filter_map(|pair| {
            let (n, v) = pair.split_once(':')?;
            let name = n.trim().to_ascii_lowercase();
            if name.is_empty() {
                return None;
            }
            let mut value = v.trim();
            let mut important = false;
            if let Some(pos) = value.to_ascii_lowercase().rfind("!important") {
                important = true;
                value = value[..pos].trim_end();
            }
            Some(Declaration {
                name,
                value: value.to_string(),
                important,
            })
        })
        .collect()
}

// Simple selectors only; anything compound or combinator-based is dropped.
fn parse_selector_one(s: &str) -> Option<Selector> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if s == "*" {
        return Some(Selector::Universal);
    }
    let is_ident = |t: &str| {
        !t.is_empty()
            && t.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    };
    if let Some(id) = s.strip_prefix('#') {
        return is_ident(id).then(|| Selector::Id(id.to_string()));
    }
    if let Some(class) = s.strip_prefix('.') {
        return is_ident(class).then(|| Selector::Class(class.to_string()));
    }
    is_ident(s).then(|| Selector::Type(s.to_ascii_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rules_with_selector_lists() {
        let sheet = parse_stylesheet("DIV, #main { display: none } .code{white-space:pre;}");
        assert_eq!(sheet.rules.len(), 2);
        assert_eq!(
            sheet.rules[0].selectors,
            vec![Selector::Type("div".into()), Selector::Id("main".into())]
        );
        assert_eq!(sheet.rules[1].declarations[0].value, "pre");
    }

    #[test]
    fn skips_comments_at_rules_and_compound_selectors() {
        let sheet = parse_stylesheet(
            "/* x { display: none } */ @media print { p { display: none } } div p { display: none } b { display: block }",
        );
        assert_eq!(sheet.rules.len(), 1);
        assert_eq!(sheet.rules[0].selectors, vec![Selector::Type("b".into())]);
    }

    #[test]
    fn important_flag_is_split_from_value() {
        let decls = parse_declarations("display: none !IMPORTANT; color:red");
        assert_eq!(decls[0].value, "none");
        assert!(decls[0].important);
        assert!(!decls[1].important);
    }
}
