// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
use super::{Keyword, Operator, Reader, Span, Token, TokenKind};
use std::fmt;

// ============================================================================
// Error
// ============================================================================

/// A lexical error.  The first failure is latched: every subsequent
/// request for a token reports the same error without advancing.
#[derive(Clone, Debug, PartialEq)]
pub struct Error {
    pub span: Span,
    pub message: &'static str,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} @ {}", self.message, self.span)
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

// ============================================================================
// Character classes
// ============================================================================

fn is_whitespace(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\n'
}

fn is_identifier_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

fn is_identifier_part(c: char) -> bool {
    is_identifier_start(c) || c.is_ascii_digit()
}

/// Map one or two characters onto an operator.  The flag reports
/// whether the second character was folded into a compound form (and
/// hence must be consumed by the caller).
fn operator_from_chars(first: char, second: char) -> Option<(Operator, bool)> {
    use Operator::*;
    let op = match first {
        '+' => match second {
            '+' => (PlusPlus, true),
            '=' => (PlusEquals, true),
            _ => (Plus, false),
        },
        '-' => match second {
            '-' => (MinusMinus, true),
            '=' => (MinusEquals, true),
            _ => (Minus, false),
        },
        '<' => match second {
            '<' => (Shl, true),
            '=' => (Le, true),
            _ => (Lt, false),
        },
        '>' => match second {
            '>' => (Shr, true),
            '=' => (Ge, true),
            _ => (Gt, false),
        },
        '&' => match second {
            '&' => (AndAnd, true),
            '=' => (AndEquals, true),
            _ => (And, false),
        },
        '|' => match second {
            '|' => (OrOr, true),
            '=' => (OrEquals, true),
            _ => (Or, false),
        },
        '*' => match second {
            '=' => (StarEquals, true),
            _ => (Star, false),
        },
        '/' => match second {
            '=' => (SlashEquals, true),
            _ => (Slash, false),
        },
        '=' => match second {
            '=' => (EqualsEquals, true),
            _ => (Equals, false),
        },
        _ => {
            return None;
        }
    };
    Some(op)
}

fn is_single_char_operator(c: char) -> bool {
    operator_from_chars(c, '\0').is_some()
}

/// Characters which may legally follow a numeric literal or an
/// identifier.
fn is_token_separator(c: char) -> bool {
    is_whitespace(c)
        || is_single_char_operator(c)
        || matches!(c, '(' | ')' | '{' | '}' | ',' | ';' | '\0')
}

// ============================================================================
// Tokenizer
// ============================================================================

/// Turns a character source into a lazy token stream, tracking a
/// `(line, column)` cursor and keeping a one-character lookahead.
pub struct Tokenizer<R> {
    reader: R,
    location: Span,
    lookahead: Option<char>,
    error: Option<Error>,
}

impl<R: Reader> Tokenizer<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            location: Span::default(),
            lookahead: None,
            error: None,
        }
    }

    /// The current cursor position.
    pub fn location(&self) -> Span {
        self.location
    }

    /// Produce the next token, ending with `Eof`.  After the first
    /// error every call returns that same error.
    pub fn next_token(&mut self) -> Result<Token> {
        if let Some(e) = &self.error {
            return Err(e.clone());
        }
        self.next_token_inner()
    }

    fn next_token_inner(&mut self) -> Result<Token> {
        loop {
            let location = self.location;
            let next = self.next_char();
            if next == '\0' {
                return Ok(Token::new(TokenKind::Eof, location));
            }
            if is_whitespace(next) {
                continue;
            }
            if let Some((op, consumed)) = operator_from_chars(next, self.peek_char()) {
                if consumed {
                    self.next_char();
                }
                return Ok(Token::new(TokenKind::Operator(op), location));
            }
            let kind = match next {
                ';' => Some(TokenKind::SemiColon),
                '(' => Some(TokenKind::LeftParen),
                ')' => Some(TokenKind::RightParen),
                '{' => Some(TokenKind::LeftBrace),
                '}' => Some(TokenKind::RightBrace),
                ',' => Some(TokenKind::Comma),
                _ => None,
            };
            if let Some(kind) = kind {
                return Ok(Token::new(kind, location));
            }
            if next.is_ascii_digit() {
                return self.scan_number(next, location);
            }
            if is_identifier_start(next) {
                return self.scan_identifier(next, location);
            }
            return self.fail("unknown token");
        }
    }

    /// Scan the remainder of a numeric literal whose first digit has
    /// already been consumed.  A literal containing a `.` becomes a
    /// float; a trailing `.` is completed with a zero digit.
    fn scan_number(&mut self, first: char, location: Span) -> Result<Token> {
        let mut text = String::new();
        text.push(first);
        while self.peek_char().is_ascii_digit() {
            text.push(self.next_char());
        }
        if self.peek_char() == '.' {
            text.push(self.next_char());
            while self.peek_char().is_ascii_digit() {
                text.push(self.next_char());
            }
            if !is_token_separator(self.peek_char()) {
                return self.fail("Invalid token separator after floating point number");
            }
            if text.ends_with('.') {
                text.push('0');
            }
            return match text.parse::<f64>() {
                Ok(value) => Ok(Token::new(TokenKind::Float(value), location)),
                Err(_) => self.fail("Number literal too large"),
            };
        }
        if !is_token_separator(self.peek_char()) {
            return self.fail("Invalid token separator after number");
        }
        match text.parse::<u64>() {
            Ok(value) => Ok(Token::new(TokenKind::Number(value), location)),
            Err(_) => self.fail("Number literal too large"),
        }
    }

    /// Scan an identifier or keyword whose first character has already
    /// been consumed.
    fn scan_identifier(&mut self, first: char, location: Span) -> Result<Token> {
        let mut text = String::new();
        text.push(first);
        while is_identifier_part(self.peek_char()) {
            text.push(self.next_char());
        }
        if !is_token_separator(self.peek_char()) {
            return self.fail("Invalid token separator after identifier");
        }
        let kind = match Keyword::from_str(&text) {
            Some(kw) => TokenKind::Keyword(kw),
            None => TokenKind::Identifier(text),
        };
        Ok(Token::new(kind, location))
    }

    fn peek_char(&mut self) -> char {
        match self.lookahead {
            Some(c) => c,
            None => {
                let c = self.reader.next();
                self.lookahead = Some(c);
                c
            }
        }
    }

    fn next_char(&mut self) -> char {
        let c = self.peek_char();
        self.lookahead = None;
        if c != '\0' {
            self.location.column += 1;
        }
        if c == '\n' {
            self.location.column = 0;
            self.location.line += 1;
        }
        c
    }

    /// Latch an error at the current cursor position.
    fn fail(&mut self, message: &'static str) -> Result<Token> {
        let error = Error {
            span: self.location,
            message,
        };
        self.error = Some(error.clone());
        Err(error)
    }
}

// ============================================================================
// Tests
// ============================================================================
