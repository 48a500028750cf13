//! Lexer for Lox source text.
//!
//! [`Scanner`] is a fused iterator of `Result<Token>`: a lexical error is
//! yielded in place of a token and scanning carries on after it, so one pass
//! reports every bad character. [`scan`] drains it into a [`ScanResult`].
//! Exactly one `EOF` token ends the stream.
//!
//! Comments are `// ...` to end of line and `/* ... */`, which nests. Strings
//! may span lines and have no escapes. Numbers are digits with an optional
//! fraction; a trailing `.` is left for the next token.

use crate::error::{LoxError, Result};
use crate::token::{Token, TokenType};
use log::{debug, info};
use memchr::memchr;
use phf::phf_map;
use std::iter::FusedIterator;

// Reserved words, looked up by lexeme bytes.

static KEYWORDS: phf::Map<&'static [u8], TokenType> = phf_map! {
    b"and"    => TokenType::AND,
    b"break"  => TokenType::BREAK,
    b"class"  => TokenType::CLASS,
    b"else"   => TokenType::ELSE,
    b"false"  => TokenType::FALSE,
    b"fun"    => TokenType::FUN,
    b"for"    => TokenType::FOR,
    b"if"     => TokenType::IF,
    b"nil"    => TokenType::NIL,
    b"or"     => TokenType::OR,
    b"print"  => TokenType::PRINT,
    b"return" => TokenType::RETURN,
    b"super"  => TokenType::SUPER,
    b"this"   => TokenType::THIS,
    b"true"   => TokenType::TRUE,
    b"var"    => TokenType::VAR,
    b"while"  => TokenType::WHILE,
};

/// Tokens and lexical errors produced by a full scan.
#[derive(Debug)]
pub struct ScanResult {
    /// Every recognised token, always terminated by `EOF`.
    pub tokens: Vec<Token>,

    /// Lexical errors in source order.
    pub errors: Vec<LoxError>,
}

/// Scan the whole of `source`, collecting tokens and errors separately.
pub fn scan(source: &str) -> ScanResult {
    info!("Scanning {} bytes", source.len());

    let mut tokens: Vec<Token> = Vec::new();
    let mut errors: Vec<LoxError> = Vec::new();

    for item in Scanner::new(source) {
        match item {
            Ok(token) => tokens.push(token),
            Err(e) => errors.push(e),
        }
    }

    info!(
        "Scan finished: {} token(s), {} error(s)",
        tokens.len(),
        errors.len()
    );

    ScanResult { tokens, errors }
}

pub struct Scanner<'a> {
    text: &'a str,
    src: &'a [u8],
    /// First byte of the lexeme being scanned.
    start: usize,
    /// One past the last byte consumed.
    curr: usize,
    line: usize,
    done: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str) -> Self {
        debug!("Scanner created over {} bytes", text.len());

        Self {
            text,
            src: text.as_bytes(),
            start: 0,
            curr: 0,
            line: 1,
            done: false,
        }
    }

    // ───────────────────────────── cursor ───────────────────────────────────

    fn is_at_end(&self) -> bool {
        self.curr >= self.src.len()
    }

    /// Only called when not at end.
    fn advance(&mut self) -> u8 {
        let b: u8 = self.src[self.curr];
        self.curr += 1;
        b
    }

    /// Current byte, or `0` past the end.
    fn peek(&self) -> u8 {
        self.src.get(self.curr).copied().unwrap_or(0)
    }

    fn peek_next(&self) -> u8 {
        self.src.get(self.curr + 1).copied().unwrap_or(0)
    }

    fn match_byte(&mut self, expected: u8) -> bool {
        let matched: bool = self.peek() == expected && !self.is_at_end();

        if matched {
            self.curr += 1;
        }

        matched
    }

    /// Picks `double` when the next byte is `=`, consuming it.
    fn one_or_two(&mut self, single: TokenType, double: TokenType) -> TokenType {
        if self.match_byte(b'=') {
            double
        } else {
            single
        }
    }

    // ───────────────────────────── core lexing ─────────────────────────────

    /// Scan one lexeme starting at `self.start`. `Ok(None)` means whitespace
    /// or a comment was consumed and there is nothing to emit.
    fn scan_token(&mut self) -> Result<Option<TokenType>> {
        let b: u8 = self.advance();

        let token_type: TokenType = match b {
            b'(' => TokenType::LEFT_PAREN,
            b')' => TokenType::RIGHT_PAREN,
            b'{' => TokenType::LEFT_BRACE,
            b'}' => TokenType::RIGHT_BRACE,
            b',' => TokenType::COMMA,
            b'.' => TokenType::DOT,
            b'-' => TokenType::MINUS,
            b'+' => TokenType::PLUS,
            b';' => TokenType::SEMICOLON,
            b'*' => TokenType::STAR,

            b'!' => self.one_or_two(TokenType::BANG, TokenType::BANG_EQUAL),
            b'=' => self.one_or_two(TokenType::EQUAL, TokenType::EQUAL_EQUAL),
            b'<' => self.one_or_two(TokenType::LESS, TokenType::LESS_EQUAL),
            b'>' => self.one_or_two(TokenType::GREATER, TokenType::GREATER_EQUAL),

            b' ' | b'\r' | b'\t' => return Ok(None),

            b'\n' => {
                self.line += 1;
                return Ok(None);
            }

            b'/' if self.match_byte(b'/') => {
                // the newline itself is left for the line counter
                let rest: &[u8] = &self.src[self.curr..];
                self.curr += memchr(b'\n', rest).unwrap_or(rest.len());
                return Ok(None);
            }

            b'/' if self.match_byte(b'*') => {
                self.skip_block_comment()?;
                return Ok(None);
            }

            b'/' => TokenType::SLASH,

            b'"' => self.string()?,

            b'0'..=b'9' => self.number(),

            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.identifier(),

            _ => return Err(self.unexpected_character(b)),
        };

        Ok(Some(token_type))
    }

    /// Error for a stray byte. A multi-byte UTF-8 character is consumed whole
    /// so it is reported once.
    fn unexpected_character(&mut self, first: u8) -> LoxError {
        if first >= 0x80 {
            while !self.is_at_end() && (self.peek() & 0b1100_0000) == 0b1000_0000 {
                self.advance();
            }
        }

        debug!(
            "Unexpected character {:?} on line {}",
            &self.text[self.start..self.curr],
            self.line
        );

        LoxError::lex(self.line, "Unexpected character.")
    }

    /// Skip a `/* … */` comment whose opening `/*` has been consumed.
    ///
    /// Comments nest: every inner `/*` must be closed by its own `*/`. The
    /// opening line of each open comment is kept so an unterminated comment is
    /// reported where the innermost still‑open one started.
    fn skip_block_comment(&mut self) -> Result<()> {
        let mut open_lines: Vec<usize> = vec![self.line];

        while !self.is_at_end() {
            match self.advance() {
                b'\n' => self.line += 1,

                b'*' if self.match_byte(b'/') => {
                    open_lines.pop();

                    if open_lines.is_empty() {
                        return Ok(());
                    }
                }

                b'/' if self.match_byte(b'*') => open_lines.push(self.line),

                _ => {}
            }
        }

        let line: usize = open_lines.last().copied().unwrap_or(self.line);

        Err(LoxError::lex(line, "Unterminated block comment."))
    }

    /// Rest of a string literal after its opening quote.
    fn string(&mut self) -> Result<TokenType> {
        while !self.is_at_end() && self.peek() != b'"' {
            if self.advance() == b'\n' {
                self.line += 1;
            }
        }

        if self.is_at_end() {
            return Err(LoxError::lex(self.line, "Unterminated string."));
        }

        self.advance();

        let contents: &str = &self.text[self.start + 1..self.curr - 1];
        Ok(TokenType::STRING(contents.to_owned()))
    }

    fn number(&mut self) -> TokenType {
        self.skip_digits();

        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            self.advance();
            self.skip_digits();
        }

        // digits with at most one '.', always a valid f64
        let value: f64 = self.text[self.start..self.curr].parse().unwrap_or(0.0);
        TokenType::NUMBER(value)
    }

    fn skip_digits(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }
    }

    fn identifier(&mut self) -> TokenType {
        while self.peek().is_ascii_alphanumeric() || self.peek() == b'_' {
            self.advance();
        }

        KEYWORDS
            .get(&self.src[self.start..self.curr])
            .cloned()
            .unwrap_or(TokenType::IDENTIFIER)
    }
}

// ───────────────────────── Iterator implementation ─────────────────────────

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        while !self.is_at_end() {
            self.start = self.curr;

            match self.scan_token() {
                Ok(Some(token_type)) => {
                    let lexeme: &str = &self.text[self.start..self.curr];
                    return Some(Ok(Token::new(token_type, lexeme, self.line)));
                }
                Ok(None) => {}
                Err(e) => return Some(Err(e)),
            }
        }

        self.done = true;
        Some(Ok(Token::new(TokenType::EOF, "", self.line)))
    }
}

impl<'a> FusedIterator for Scanner<'a> {}
