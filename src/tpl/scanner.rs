use crate::tpl::token::{Token, TokenKind};

/// Outcome of trying one scanning rule at a given offset.
enum Rule {
    Token {
        kind: TokenKind,
        length: usize,
        text: Option<String>,
    },
    /// A comment of the given length; skipped without emitting a token.
    Comment(usize),
}

/// Characters that terminate a `??literal` fallback word.
const FALLBACK_STOP: &[u8] = b",;()[]{}@?:";

/// One-token-lookahead scanner over a template.
///
/// The scanner owns its cursor: `offset` is always the start of the `next`
/// token, and `advance` hands out that token while scanning the one after it.
pub(crate) struct Scanner<'a> {
    template: &'a str,
    offset: usize,
    next: Token,
}

impl<'a> Scanner<'a> {
    /// Creates a scanner positioned at the start of `template` with the first
    /// token primed.
    pub(crate) fn new(template: &'a str) -> Self {
        let mut scanner = Self {
            template,
            offset: 0,
            next: Token::eof(),
        };
        scanner.next = scanner.scan(false);
        scanner
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.next
    }

    pub(crate) fn offset(&self) -> usize {
        self.offset
    }

    pub(crate) fn at_end(&self) -> bool {
        self.next.kind == TokenKind::Eof
    }

    /// Returns the current token and scans the following one.
    /// Once the end is reached this keeps returning `Eof`.
    pub(crate) fn advance(&mut self) -> Token {
        if self.at_end() {
            return Token::eof();
        }
        self.offset += self.next.length;
        let after_key = self.next.kind == TokenKind::Key;
        let next = self.scan(after_key);
        std::mem::replace(&mut self.next, next)
    }

    /// Scans the token starting at `self.offset`, moving the offset past any
    /// comments on the way.
    fn scan(&mut self, after_key: bool) -> Token {
        loop {
            let rest = &self.template[self.offset..];
            if rest.is_empty() {
                return Token::eof();
            }
            let bytes = rest.as_bytes();

            match match_at(bytes, 0, after_key) {
                Some(Rule::Comment(length)) => {
                    self.offset += length;
                    continue;
                }
                Some(Rule::Token { kind, length, text }) => {
                    return Token { kind, text, length };
                }
                None => {}
            }

            // Everything up to the next recognised control sequence is literal SQL.
            // Inside a whitespace run nothing can match that did not already
            // match where the run starts, so only run starts are tried.
            let end = (1..bytes.len())
                .find(|&i| !in_ws_run(bytes, i) && match_at(bytes, i, false).is_some())
                .unwrap_or(bytes.len());
            return Token {
                kind: TokenKind::RawSql,
                text: Some(rest[..end].to_string()),
                length: end,
            };
        }
    }
}

/// Tries every rule, in priority order, at byte offset `i` of `s`.
///
/// Every rule starts on an ASCII byte, so a match always sits on a char boundary.
fn match_at(s: &[u8], i: usize, after_key: bool) -> Option<Rule> {
    if let Some(rule) = key(s, i) {
        return Some(rule);
    }
    if after_key
        && i == 0
        && let Some(rule) = fallback(s)
    {
        return Some(rule);
    }
    block_open(s, i, b'?', TokenKind::ConditionalOpen)
        .or_else(|| block_open(s, i, b':', TokenKind::ElseOpen))
        .or_else(|| lone_close(s, i, b'}', TokenKind::BlockClose))
        .or_else(|| list_open(s, i, b'&', TokenKind::AndListOpen))
        .or_else(|| list_open(s, i, b'|', TokenKind::OrListOpen))
        .or_else(|| list_open(s, i, b',', TokenKind::CommaListOpen))
        .or_else(|| lone_close(s, i, b']', TokenKind::ListClose))
        .or_else(|| separator(s, i))
        .or_else(|| spread(s, i))
        .or_else(|| line_comment(s, i))
        .or_else(|| block_comment(s, i))
}

fn at(s: &[u8], i: usize) -> Option<u8> {
    s.get(i).copied()
}

fn skip_ws(s: &[u8], mut i: usize) -> usize {
    while at(s, i).is_some_and(|b| b.is_ascii_whitespace()) {
        i += 1;
    }
    i
}

/// True when `i` continues a whitespace run rather than starting one.
fn in_ws_run(s: &[u8], i: usize) -> bool {
    i > 0 && s[i].is_ascii_whitespace() && s[i - 1].is_ascii_whitespace()
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// True when the byte before `i` exists and equals `c`.
fn preceded_by(s: &[u8], i: usize, c: u8) -> bool {
    i > 0 && at(s, i - 1) == Some(c)
}

fn token(kind: TokenKind, start: usize, end: usize) -> Option<Rule> {
    Some(Rule::Token {
        kind,
        length: end - start,
        text: None,
    })
}

/// `@name`, but never the second half of an `@@` escape.
fn key(s: &[u8], i: usize) -> Option<Rule> {
    if at(s, i) != Some(b'@') || preceded_by(s, i, b'@') {
        return None;
    }
    let mut end = i + 1;
    while at(s, end).is_some_and(is_name_byte) {
        end += 1;
    }
    if end == i + 1 {
        return None;
    }
    Some(Rule::Token {
        kind: TokenKind::Key,
        length: end - i,
        text: Some(String::from_utf8_lossy(&s[i + 1..end]).into_owned()),
    })
}

/// `??word` directly after a key.
fn fallback(s: &[u8]) -> Option<Rule> {
    if !s.starts_with(b"??") {
        return None;
    }
    let mut end = 2;
    while at(s, end).is_some_and(|b| !b.is_ascii_whitespace() && !FALLBACK_STOP.contains(&b)) {
        end += 1;
    }
    if end == 2 {
        return None;
    }
    Some(Rule::Token {
        kind: TokenKind::Fallback,
        length: end,
        text: Some(String::from_utf8_lossy(&s[2..end]).into_owned()),
    })
}

/// `?{` / `:{` with whitespace allowed around both characters.
fn block_open(s: &[u8], i: usize, marker: u8, kind: TokenKind) -> Option<Rule> {
    let j = skip_ws(s, i);
    if at(s, j) != Some(marker) {
        return None;
    }
    let j = skip_ws(s, j + 1);
    if at(s, j) != Some(b'{') || at(s, j + 1) == Some(b'{') {
        return None;
    }
    token(kind, i, skip_ws(s, j + 1))
}

/// `}` or `]` that is not part of a doubled escape; swallows leading whitespace.
fn lone_close(s: &[u8], i: usize, c: u8, kind: TokenKind) -> Option<Rule> {
    let j = skip_ws(s, i);
    if at(s, j) != Some(c) || preceded_by(s, j, c) || at(s, j + 1) == Some(c) {
        return None;
    }
    token(kind, i, j + 1)
}

/// `(&)[`, `(|)[`, `(,)[`
fn list_open(s: &[u8], i: usize, op: u8, kind: TokenKind) -> Option<Rule> {
    if at(s, i) != Some(b'(') || at(s, i + 1) != Some(op) || at(s, i + 2) != Some(b')') {
        return None;
    }
    let j = skip_ws(s, i + 3);
    if at(s, j) != Some(b'[') || at(s, j + 1) == Some(b'[') {
        return None;
    }
    token(kind, i, skip_ws(s, j + 1))
}

fn separator(s: &[u8], i: usize) -> Option<Rule> {
    let j = skip_ws(s, i);
    if at(s, j) != Some(b';') || preceded_by(s, j, b';') || at(s, j + 1) == Some(b';') {
        return None;
    }
    token(TokenKind::Separator, i, skip_ws(s, j + 1))
}

/// Exactly three dots.
fn spread(s: &[u8], i: usize) -> Option<Rule> {
    let j = skip_ws(s, i);
    if !s.get(j..).is_some_and(|r| r.starts_with(b"..."))
        || preceded_by(s, j, b'.')
        || at(s, j + 3) == Some(b'.')
    {
        return None;
    }
    token(TokenKind::Spread, i, skip_ws(s, j + 3))
}

/// `-- ...` up to (not including) the line terminator, with leading whitespace.
fn line_comment(s: &[u8], i: usize) -> Option<Rule> {
    let j = skip_ws(s, i);
    if !s.get(j..).is_some_and(|r| r.starts_with(b"--")) {
        return None;
    }
    let mut end = j + 2;
    while at(s, end).is_some_and(|b| b != b'\n' && b != b'\r') {
        end += 1;
    }
    Some(Rule::Comment(end - i))
}

/// `/* ... */`, shortest match. Unterminated comments are not comments.
fn block_comment(s: &[u8], i: usize) -> Option<Rule> {
    let body = s.get(i..)?.strip_prefix(b"/*")?;
    let close = body.windows(2).position(|w| w == b"*/")?;
    Some(Rule::Comment(close + 4))
}
