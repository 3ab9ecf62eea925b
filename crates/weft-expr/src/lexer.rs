//! Tokenizer for the expression language.

use crate::error::EvalError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    Str(String),
    Ident(String),
    Punct(&'static str),
}

impl Token {
    /// Source-like text for error messages.
    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Str(s) => format!("\"{s}\""),
            Self::Ident(name) => name.clone(),
            Self::Punct(p) => (*p).to_owned(),
        }
    }
}

/// Token with its byte offset.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Spanned {
    pub(crate) token: Token,
    pub(crate) offset: usize,
}

/// Punctuators, longest first so greedy matching works.
const PUNCTUATORS: &[&str] = &[
    "===", "!==", "==", "!=", "<=", ">=", "&&", "||", "??", "?.", ".", ",", "(", ")", "[", "]",
    "{", "}", ":", "?", "!", "+", "-", "*", "/", "%", "<", ">",
];

pub(crate) fn tokenize(source: &str) -> Result<Vec<Spanned>, EvalError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(offset, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        let starts_number = ch.is_ascii_digit()
            || (ch == '.' && source[offset + 1..].starts_with(|c: char| c.is_ascii_digit()));

        let token = if starts_number {
            let end = scan_number(source, offset);
            let text = &source[offset..end];
            let value = text
                .parse::<f64>()
                .map_err(|_| EvalError::InvalidNumber(text.to_owned()))?;
            advance_to(&mut chars, end);
            Token::Number(value)
        } else if ch == '"' || ch == '\'' {
            chars.next();
            Token::Str(scan_string(&mut chars, ch, offset)?)
        } else if is_ident_start(ch) {
            let end = source[offset..]
                .find(|c: char| !is_ident_continue(c))
                .map_or(source.len(), |len| offset + len);
            advance_to(&mut chars, end);
            Token::Ident(source[offset..end].to_owned())
        } else {
            let rest = &source[offset..];
            let punct = PUNCTUATORS
                .iter()
                .copied()
                .find(|p| rest.starts_with(*p))
                .ok_or(EvalError::UnexpectedChar { ch, offset })?;
            // `?.5` is a conditional followed by a number, not optional chaining.
            let punct = if punct == "?." && rest[2..].starts_with(|c: char| c.is_ascii_digit()) {
                "?"
            } else {
                punct
            };
            advance_to(&mut chars, offset + punct.len());
            Token::Punct(punct)
        };

        tokens.push(Spanned { token, offset });
    }

    Ok(tokens)
}

fn advance_to(chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>, end: usize) {
    while chars.next_if(|&(offset, _)| offset < end).is_some() {}
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

fn is_ident_continue(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

/// Byte offset just past a numeric literal starting at `start`.
fn scan_number(source: &str, start: usize) -> usize {
    let bytes = source.as_bytes();
    let digits = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = digits(start);
    if end + 1 < bytes.len() && bytes[end] == b'.' && bytes[end + 1].is_ascii_digit() {
        end = digits(end + 1);
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp = end + 1;
        if exp < bytes.len() && (bytes[exp] == b'+' || bytes[exp] == b'-') {
            exp += 1;
        }
        if exp < bytes.len() && bytes[exp].is_ascii_digit() {
            end = digits(exp);
        }
    }
    end
}

fn scan_string(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    quote: char,
    start: usize,
) -> Result<String, EvalError> {
    let mut out = String::new();
    loop {
        let Some((_, ch)) = chars.next() else {
            return Err(EvalError::UnterminatedString(start));
        };
        match ch {
            c if c == quote => return Ok(out),
            '\\' => {
                let Some((_, escaped)) = chars.next() else {
                    return Err(EvalError::UnterminatedString(start));
                };
                match escaped {
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    'r' => out.push('\r'),
                    '0' => out.push('\0'),
                    'u' => {
                        let hex: String = (0..4).filter_map(|_| chars.next().map(|(_, c)| c)).collect();
                        let decoded = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32);
                        out.push(decoded.unwrap_or(char::REPLACEMENT_CHARACTER));
                    }
                    other => out.push(other),
                }
            }
            c => out.push(c),
        }
    }
}
