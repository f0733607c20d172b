//! Lexical analyzer

use std::rc::Rc;

use crate::char_cursor::CharCursor;
use crate::ctx::Context;
use crate::diag::{FullParseError, ParseError, Position};
use crate::token::Token;

/// Turn source text into a sequence of tokens.
///
/// Errors are recoverable: after reporting one the scanner resumes at the
/// following character, so a single pass collects every lexical
/// diagnostic in the input.
#[derive(Debug)]
pub struct Scanner<'a> {
    cursor: CharCursor<'a>,
    line: Position,
    ctx: Rc<Context>,

    // Buffer used when scanning longer tokens.  Allocated here to reuse memory.
    buf: String,
}

impl<'a> Scanner<'a> {
    /// Creates a new scanner operating on `src`.
    pub fn new(src: &'a str, ctx: Rc<Context>) -> Scanner<'a> {
        Scanner {
            cursor: CharCursor::new(src),
            line: 1,
            ctx,
            buf: String::new(),
        }
    }

    /// Scan the next token and return it tagged with its line.
    pub fn get_token(&mut self) -> Result<(Position, Token), FullParseError> {
        self.get_raw_token().map(|token| (self.line, token))
    }

    fn get_raw_token(&mut self) -> Result<Token, FullParseError> {
        loop {
            let ch = match self.cursor.current() {
                None => return Ok(Token::Eof),
                Some(ch) => ch,
            };
            self.cursor = self.cursor.advance();
            match ch {
                '\n' => self.line += 1,
                ' ' | '\t' | '\r' => (),
                '(' => return Ok(Token::LeftParen),
                ')' => return Ok(Token::RightParen),
                '{' => return Ok(Token::LeftBrace),
                '}' => return Ok(Token::RightBrace),
                ',' => return Ok(Token::Comma),
                '.' => return Ok(Token::Dot),
                '-' => return Ok(Token::Minus),
                '+' => return Ok(Token::Plus),
                ';' => return Ok(Token::Semicolon),
                '*' => return Ok(Token::Star),
                '/' => {
                    if self.cursor.current() == Some('/') {
                        self.skip_comment();
                    } else {
                        return Ok(Token::Slash);
                    }
                }
                '=' => return Ok(self.one_or_two(Token::Equal, Token::EqualEqual)),
                '!' => return Ok(self.one_or_two(Token::Bang, Token::BangEqual)),
                '<' => return Ok(self.one_or_two(Token::Less, Token::LessEqual)),
                '>' => return Ok(self.one_or_two(Token::Greater, Token::GreaterEqual)),
                '"' => return self.scan_string(),
                '0'..='9' => return self.scan_number(ch),
                'a'..='z' | 'A'..='Z' | '_' => return Ok(self.scan_identifier(ch)),
                _ => {
                    return Err(FullParseError {
                        pos: self.line,
                        error: ParseError::BadChar(ch),
                    });
                }
            };
        }
    }

    /// Pick the two-character form when the next character is `=`.
    fn one_or_two(&mut self, single: Token, compound: Token) -> Token {
        if self.cursor.current() == Some('=') {
            self.cursor = self.cursor.advance();
            compound
        } else {
            single
        }
    }

    fn skip_comment(&mut self) {
        while let Some(ch) = self.cursor.current() {
            if ch == '\n' {
                break;
            }
            self.cursor = self.cursor.advance();
        }
    }

    /// Current character is past the opening `"`.  Strings do not span
    /// lines; the terminating newline is left for the main loop.
    fn scan_string(&mut self) -> Result<Token, FullParseError> {
        self.buf.clear();
        loop {
            match self.cursor.current() {
                Some('"') => {
                    self.cursor = self.cursor.advance();
                    return Ok(Token::Str(self.buf.clone()));
                }
                Some('\n') | None => {
                    return Err(FullParseError {
                        pos: self.line,
                        error: ParseError::UnterminatedString,
                    });
                }
                Some(ch) => {
                    self.buf.push(ch);
                    self.cursor = self.cursor.advance();
                }
            }
        }
    }

    /// Greedy over digits and `.`; the lexeme must round-trip through
    /// `f64` or the whole run is a lexical error.
    fn scan_number(&mut self, first_digit: char) -> Result<Token, FullParseError> {
        self.buf.clear();
        self.buf.push(first_digit);
        while let Some(ch) = self.cursor.current() {
            if ch.is_ascii_digit() || ch == '.' {
                self.buf.push(ch);
                self.cursor = self.cursor.advance();
            } else {
                break;
            }
        }

        let value = self.buf.parse::<f64>().map_err(|_| FullParseError {
            pos: self.line,
            error: ParseError::BadNumberLiteral(self.buf.clone()),
        })?;
        Ok(Token::Number {
            lexeme: self.buf.clone(),
            value,
        })
    }

    fn scan_identifier(&mut self, first_char: char) -> Token {
        self.buf.clear();
        self.buf.push(first_char);
        while let Some(ch) = self.cursor.current() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                self.buf.push(ch);
                self.cursor = self.cursor.advance();
            } else {
                break;
            }
        }

        let sym = self.ctx.symbol(&self.buf);
        match self.ctx.keyword(&sym) {
            Some(token) => token,
            None => Token::Identifier(sym),
        }
    }
}

impl Iterator for Scanner<'_> {
    type Item = Result<Token, FullParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.get_token() {
            Ok((_, Token::Eof)) => None,
            Ok((_, t)) => Some(Ok(t)),
            Err(e) => Some(Err(e)),
        }
    }
}

/// Scan `src` to completion.
///
/// Valid tokens and lexical diagnostics accumulate side by side; the
/// token sequence always ends with exactly one `Token::Eof`.
pub fn scan(src: &str, ctx: Rc<Context>) -> (Vec<(Position, Token)>, Vec<FullParseError>) {
    let mut scanner = Scanner::new(src, ctx);
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    loop {
        match scanner.get_token() {
            Ok((pos, Token::Eof)) => {
                tokens.push((pos, Token::Eof));
                return (tokens, errors);
            }
            Ok(entry) => tokens.push(entry),
            Err(e) => errors.push(e),
        }
    }
}
