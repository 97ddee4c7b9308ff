//! Balanced-delimiter scanning over raw source text.
//!
//! These helpers never fail: unbalanced input yields an empty argument list
//! or `None` so the caller can keep scanning the rest of the file.

/// Lexical state of the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Code,
    Str(u8),
    LineComment,
    /// Nesting depth; block comments nest.
    BlockComment(usize),
}

/// Single-pass cursor that tracks strings and comments.
///
/// `step` reports whether the byte at the current position is code (as
/// opposed to string or comment content), which is the only thing the
/// delimiter counters care about.
struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
    mode: Mode,
}

/// What the cursor saw at one position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    /// A byte of code outside strings and comments.
    Code(u8),
    /// Part of a string literal, quotes included.
    Str,
    /// Part of a comment, markers included.
    Comment,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str, start: usize) -> Self {
        Self {
            bytes: text.as_bytes(),
            pos: start,
            mode: Mode::Code,
        }
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    /// Advance over one token. Returns the token and the byte range it
    /// covered.
    fn step(&mut self) -> Option<(Token, usize, usize)> {
        let start = self.pos;
        let b = self.peek(0)?;

        let token = match self.mode {
            Mode::Code => match b {
                b'"' | b'\'' => {
                    self.mode = Mode::Str(b);
                    self.pos += 1;
                    Token::Str
                }
                b'/' if self.peek(1) == Some(b'/') => {
                    self.mode = Mode::LineComment;
                    self.pos += 2;
                    Token::Comment
                }
                b'/' if self.peek(1) == Some(b'*') => {
                    self.mode = Mode::BlockComment(1);
                    self.pos += 2;
                    Token::Comment
                }
                _ => {
                    self.pos += 1;
                    Token::Code(b)
                }
            },
            Mode::Str(quote) => {
                if b == b'\\' {
                    // skip the escaped byte, whatever it is
                    self.pos = (self.pos + 2).min(self.bytes.len());
                } else {
                    if b == quote {
                        self.mode = Mode::Code;
                    }
                    self.pos += 1;
                }
                Token::Str
            }
            Mode::LineComment => {
                if b == b'\n' {
                    self.mode = Mode::Code;
                }
                self.pos += 1;
                Token::Comment
            }
            Mode::BlockComment(depth) => {
                if b == b'*' && self.peek(1) == Some(b'/') {
                    self.mode = match depth {
                        1 => Mode::Code,
                        _ => Mode::BlockComment(depth - 1),
                    };
                    self.pos += 2;
                } else if b == b'/' && self.peek(1) == Some(b'*') {
                    self.mode = Mode::BlockComment(depth + 1);
                    self.pos += 2;
                } else {
                    self.pos += 1;
                }
                Token::Comment
            }
        };

        Some((token, start, self.pos))
    }
}

/// Extract the top-level arguments of the call whose `(` is at `open`.
///
/// Arguments are trimmed. Comments inside the list are dropped. An empty
/// list (`f()`), a missing `(` at `open`, or an unmatched `)` all produce an
/// empty vector.
pub fn extract_arguments(text: &str, open: usize) -> Vec<String> {
    if text.as_bytes().get(open) != Some(&b'(') {
        return Vec::new();
    }

    let mut cursor = Cursor::new(text, open + 1);
    let mut depth = 0usize;
    let bytes = text.as_bytes();
    let mut args = Vec::new();
    // raw bytes so multi-byte characters survive byte-wise stepping
    let mut current: Vec<u8> = Vec::new();

    while let Some((token, start, end)) = cursor.step() {
        match token {
            Token::Comment => {}
            Token::Str => current.extend_from_slice(&bytes[start..end]),
            Token::Code(b) => match b {
                b'(' | b'[' | b'{' => {
                    depth += 1;
                    current.push(b);
                }
                b')' | b']' | b'}' if depth > 0 => {
                    depth -= 1;
                    current.push(b);
                }
                b')' => {
                    let last = finish_argument(&current);
                    if !last.is_empty() || !args.is_empty() {
                        args.push(last);
                    }
                    return args;
                }
                b',' if depth == 0 => {
                    args.push(finish_argument(&current));
                    current.clear();
                }
                _ => current.push(b),
            },
        }
    }

    Vec::new()
}

/// Offset of the `}` matching the `{` at `open`.
pub fn find_matching_brace(text: &str, open: usize) -> Option<usize> {
    if text.as_bytes().get(open) != Some(&b'{') {
        return None;
    }

    let mut cursor = Cursor::new(text, open);
    let mut depth = 0usize;

    while let Some((token, start, _)) = cursor.step() {
        match token {
            Token::Code(b'{') => depth += 1,
            Token::Code(b'}') => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(start);
                }
            }
            _ => {}
        }
    }

    None
}

/// Split a bare argument string on top-level commas.
///
/// Used for element lists such as the body of `arrayOf(...)` where there is
/// no surrounding parenthesis to anchor on.
pub fn split_top_level(text: &str) -> Vec<String> {
    let wrapped = format!("({})", text);
    extract_arguments(&wrapped, 0)
}

/// Byte spans of a file covered by string literals and comments.
///
/// Pattern matches that start inside one of these spans are not code and
/// must not be taken for calls or scope blocks.
#[derive(Debug, Clone, Default)]
pub struct CodeMap {
    /// Sorted, non-overlapping `[start, end)` spans.
    spans: Vec<(usize, usize)>,
}

impl CodeMap {
    pub fn new(text: &str) -> Self {
        let mut cursor = Cursor::new(text, 0);
        let mut spans: Vec<(usize, usize)> = Vec::new();

        while let Some((token, start, end)) = cursor.step() {
            if matches!(token, Token::Code(_)) {
                continue;
            }
            match spans.last_mut() {
                Some(last) if last.1 == start => last.1 = end,
                _ => spans.push((start, end)),
            }
        }

        Self { spans }
    }

    /// Whether `offset` lies outside every string and comment.
    pub fn is_code(&self, offset: usize) -> bool {
        let idx = self.spans.partition_point(|&(start, _)| start <= offset);
        match idx.checked_sub(1).and_then(|i| self.spans.get(i)) {
            Some(&(_, end)) => offset >= end,
            None => true,
        }
    }
}

fn finish_argument(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).trim().to_string()
}
