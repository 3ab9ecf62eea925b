//! HTML entity handling.
//!
//! Named HTML entities are converted to Unicode before tokenizing, since the
//! tokenizer only knows the five XML entities. Those five and numeric
//! references are decoded from the tokenizer's reference events.
//!
//! Text may also hold a bare `&` or a `<` that does not open a tag, as in
//! `{a && b}` or `{n < 3}`. HTML reads those as literal characters, so they
//! are escaped before tokenizing.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static ENTITY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&([a-zA-Z]+);").expect("invalid entity regex"));

/// Replace named HTML entities with Unicode, keeping XML entities as-is.
pub(crate) fn convert_html_entities(markup: &str) -> String {
    ENTITY_PATTERN
        .replace_all(markup, |caps: &regex::Captures| {
            entity_to_unicode(&caps[1]).map_or_else(|| caps[0].to_owned(), str::to_owned)
        })
        .into_owned()
}

fn entity_to_unicode(name: &str) -> Option<&'static str> {
    Some(match name {
        "nbsp" => "\u{00a0}",
        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "laquo" => "\u{00ab}",
        "raquo" => "\u{00bb}",
        "bull" => "\u{2022}",
        "hellip" => "\u{2026}",
        "middot" => "\u{00b7}",
        "rarr" => "\u{2192}",
        "larr" => "\u{2190}",
        "times" => "\u{00d7}",
        "divide" => "\u{00f7}",
        "plusmn" => "\u{00b1}",
        "le" => "\u{2264}",
        "ge" => "\u{2265}",
        "ne" => "\u{2260}",
        "copy" => "\u{00a9}",
        "reg" => "\u{00ae}",
        "trade" => "\u{2122}",
        "euro" => "\u{20ac}",
        "pound" => "\u{00a3}",
        "yen" => "\u{00a5}",
        "cent" => "\u{00a2}",
        "deg" => "\u{00b0}",
        "sect" => "\u{00a7}",
        "para" => "\u{00b6}",
        _ => return None,
    })
}

/// Escape `&` that does not start a reference and `<` that does not start
/// a tag, comment, declaration or processing instruction.
///
/// Comments and CDATA sections are copied verbatim. Inside tags, only a bare
/// `&` within a quoted attribute value is escaped.
pub(crate) fn escape_stray_markup(markup: &str) -> Cow<'_, str> {
    if !markup.contains(['&', '<']) {
        return Cow::Borrowed(markup);
    }

    let mut out = String::with_capacity(markup.len() + 16);
    let mut rest = markup;
    while let Some(pos) = rest.find(['&', '<']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if tail.starts_with('&') {
            push_ampersand(&mut out, &tail[1..]);
            rest = &tail[1..];
            continue;
        }

        let consumed = if let Some(len) = verbatim_len(tail) {
            out.push_str(&tail[..len]);
            len
        } else if opens_tag(tail) {
            copy_tag(tail, &mut out)
        } else {
            out.push_str("&lt;");
            1
        };
        rest = &tail[consumed..];
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn push_ampersand(out: &mut String, after: &str) {
    if starts_with_reference(after) {
        out.push('&');
    } else {
        out.push_str("&amp;");
    }
}

/// Whether the text after `&` is `name;`, `#digits;` or `#xhex;`.
fn starts_with_reference(after: &str) -> bool {
    let bytes = after.as_bytes();
    let (body_start, valid): (usize, fn(u8) -> bool) = match bytes {
        [b'#', b'x' | b'X', ..] => (2, |b| b.is_ascii_hexdigit()),
        [b'#', ..] => (1, |b| b.is_ascii_digit()),
        [first, ..] if first.is_ascii_alphabetic() => (0, |b| b.is_ascii_alphanumeric()),
        _ => return false,
    };
    let body_len = bytes[body_start..]
        .iter()
        .take_while(|b| valid(**b))
        .count();
    body_len > 0 && bytes.get(body_start + body_len) == Some(&b';')
}

/// Length of a comment or CDATA section starting at `tail`.
fn verbatim_len(tail: &str) -> Option<usize> {
    let (open, close) = if tail.starts_with("<!--") {
        ("<!--", "-->")
    } else if tail.starts_with("<![CDATA[") {
        ("<![CDATA[", "]]>")
    } else {
        return None;
    };
    Some(
        tail[open.len()..]
            .find(close)
            .map_or(tail.len(), |end| open.len() + end + close.len()),
    )
}

/// HTML only opens a tag for `<` followed by a letter, `/`, `!` or `?`.
fn opens_tag(tail: &str) -> bool {
    tail[1..]
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'))
}

/// Copy a tag up to its closing `>` outside quotes; returns the bytes consumed.
fn copy_tag(tail: &str, out: &mut String) -> usize {
    let mut quote = None;
    for (i, c) in tail.char_indices() {
        match (quote, c) {
            (None, '>') => {
                out.push('>');
                return i + 1;
            }
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), _) if q == c => quote = None,
            (Some(_), '&') => {
                push_ampersand(out, &tail[i + 1..]);
                continue;
            }
            _ => {}
        }
        out.push(c);
    }
    tail.len()
}

/// Decode an XML or numeric entity reference (without `&` and `;`).
///
/// Unknown references are preserved literally.
pub(crate) fn decode_entity(entity: &str) -> String {
    match entity {
        "lt" => "<".to_owned(),
        "gt" => ">".to_owned(),
        "amp" => "&".to_owned(),
        "apos" => "'".to_owned(),
        "quot" => "\"".to_owned(),
        s if s.starts_with('#') => {
            let code = if s.starts_with("#x") || s.starts_with("#X") {
                u32::from_str_radix(&s[2..], 16).ok()
            } else {
                s[1..].parse::<u32>().ok()
            };
            code.and_then(char::from_u32)
                .map_or_else(|| format!("&{entity};"), |c| c.to_string())
        }
        _ => format!("&{entity};"),
    }
}
