//! Allow-list HTML filter applied to free text before it leaves the API.
//!
//! Tags on the allow-list survive with their attributes reduced to the
//! per-tag allow-list. Every other tag, and any stray angle bracket, is
//! escaped into inert text. `&` is never touched, which keeps the filter
//! idempotent: already-escaped text passes through unchanged.

use once_cell::sync::Lazy;
use std::collections::HashMap;

const URL_ATTRIBUTES: &[&str] = &["href", "src", "cite"];

const SAFE_URL_PREFIXES: &[&str] = &[
    "#", "/", "./", "../", "http://", "https://", "mailto:", "tel:", "ftp://",
];

const NO_ATTRS: &[&str] = &[];
const LINK_ATTRS: &[&str] = &["target", "href", "title"];
const TITLE_ATTRS: &[&str] = &["title"];
const CITE_ATTRS: &[&str] = &["cite"];
const EDIT_ATTRS: &[&str] = &["datetime"];
const IMAGE_ATTRS: &[&str] = &["src", "alt", "title", "width", "height"];
const TABLE_ATTRS: &[&str] = &["width", "border", "align", "valign"];
const SECTION_ATTRS: &[&str] = &["align", "valign"];
const ROW_ATTRS: &[&str] = &["rowspan", "align", "valign"];
const CELL_ATTRS: &[&str] = &["width", "rowspan", "colspan", "align", "valign"];

static ALLOWED_TAGS: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    HashMap::from([
        ("a", LINK_ATTRS),
        ("abbr", TITLE_ATTRS),
        ("b", NO_ATTRS),
        ("blockquote", CITE_ATTRS),
        ("br", NO_ATTRS),
        ("code", NO_ATTRS),
        ("del", EDIT_ATTRS),
        ("div", NO_ATTRS),
        ("em", NO_ATTRS),
        ("h1", NO_ATTRS),
        ("h2", NO_ATTRS),
        ("h3", NO_ATTRS),
        ("h4", NO_ATTRS),
        ("h5", NO_ATTRS),
        ("h6", NO_ATTRS),
        ("hr", NO_ATTRS),
        ("i", NO_ATTRS),
        ("img", IMAGE_ATTRS),
        ("ins", EDIT_ATTRS),
        ("li", NO_ATTRS),
        ("mark", NO_ATTRS),
        ("ol", NO_ATTRS),
        ("p", NO_ATTRS),
        ("pre", NO_ATTRS),
        ("s", NO_ATTRS),
        ("small", NO_ATTRS),
        ("span", NO_ATTRS),
        ("strong", NO_ATTRS),
        ("sub", NO_ATTRS),
        ("sup", NO_ATTRS),
        ("table", TABLE_ATTRS),
        ("tbody", SECTION_ATTRS),
        ("td", CELL_ATTRS),
        ("th", CELL_ATTRS),
        ("thead", SECTION_ATTRS),
        ("tr", ROW_ATTRS),
        ("u", NO_ATTRS),
        ("ul", NO_ATTRS),
    ])
});

/// Neutralize markup in untrusted text.
pub fn sanitize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    loop {
        let Some(open) = rest.find('<') else {
            push_escaped(&mut out, rest);
            break;
        };
        push_escaped(&mut out, &rest[..open]);
        let candidate = &rest[open..];

        if let Some(comment) = candidate.strip_prefix("<!--") {
            match comment.find("-->") {
                Some(end) => {
                    rest = &comment[end + 3..];
                    continue;
                }
                None => {
                    push_escaped(&mut out, candidate);
                    break;
                }
            }
        }

        // A tag runs to the first '>'; a '<' before that makes this one plain text
        let body = &candidate[1..];
        match body.find(|c: char| c == '<' || c == '>') {
            Some(end) if body.as_bytes()[end] == b'>' => {
                let tag = &candidate[..end + 2];
                filter_tag(&mut out, tag);
                rest = &candidate[end + 2..];
            }
            Some(_) => {
                out.push_str("&lt;");
                rest = body;
            }
            None => {
                push_escaped(&mut out, candidate);
                break;
            }
        }
    }

    out
}

fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn push_escaped_attr(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

/// Emit `tag` (including its angle brackets) either rebuilt from the
/// allow-list or escaped as text.
fn filter_tag(out: &mut String, tag: &str) {
    let inner = &tag[1..tag.len() - 1];
    let (closing, inner) = match inner.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, inner),
    };

    let name_end = inner
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(inner.len());
    let name = inner[..name_end].to_ascii_lowercase();

    let Some(allowed) = ALLOWED_TAGS.get(name.as_str()) else {
        push_escaped(out, tag);
        return;
    };

    if closing {
        out.push_str("</");
        out.push_str(&name);
        out.push('>');
        return;
    }

    let mut attrs = inner[name_end..].trim_end();
    let self_closing = attrs.ends_with('/');
    if self_closing {
        attrs = &attrs[..attrs.len() - 1];
    }

    out.push('<');
    out.push_str(&name);
    for (attr, value) in parse_attributes(attrs) {
        let attr = attr.to_ascii_lowercase();
        if !allowed.contains(&attr.as_str()) {
            continue;
        }
        out.push(' ');
        out.push_str(&attr);
        if let Some(value) = value {
            let value = if URL_ATTRIBUTES.contains(&attr.as_str()) && !is_safe_url(value) {
                ""
            } else {
                value
            };
            out.push_str("=\"");
            push_escaped_attr(out, value);
            out.push('"');
        }
    }
    if self_closing {
        out.push_str(" /");
    }
    out.push('>');
}

/// Split `name=value` pairs out of the attribute section of a tag.
fn parse_attributes(src: &str) -> Vec<(&str, Option<&str>)> {
    let is_separator = |c: char| c.is_whitespace() || c == '/';
    let mut attrs = Vec::new();
    let mut rest = src;

    loop {
        rest = rest.trim_start_matches(is_separator);
        if rest.is_empty() {
            break;
        }

        let name_end = rest
            .find(|c: char| is_separator(c) || c == '=')
            .unwrap_or(rest.len());
        if name_end == 0 {
            // stray '='
            rest = &rest[1..];
            continue;
        }
        let name = &rest[..name_end];
        rest = rest[name_end..].trim_start();

        let Some(after_eq) = rest.strip_prefix('=') else {
            attrs.push((name, None));
            continue;
        };
        rest = after_eq.trim_start();

        let value = match rest.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let quoted = &rest[1..];
                let end = quoted.find(quote).unwrap_or(quoted.len());
                rest = quoted.get(end + 1..).unwrap_or("");
                &quoted[..end]
            }
            _ => {
                let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
                let value = &rest[..end];
                rest = &rest[end..];
                value
            }
        };
        attrs.push((name, Some(value)));
    }

    attrs
}

fn is_safe_url(value: &str) -> bool {
    let normalized: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();

    if SAFE_URL_PREFIXES.iter().any(|prefix| normalized.starts_with(prefix)) {
        return true;
    }

    // Relative reference; entity-encoded colons could smuggle a scheme
    !normalized.contains(':') && !normalized.contains("&#") && !normalized.contains("&colon")
}
