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
use crate::ast::Expr;
use crate::lexer::{self, Keyword, Operator, Reader, Span, Token, TokenKind, Tokenizer};
use crate::value::Value;
use std::fmt;

// ============================================================================
// Error
// ============================================================================

/// Identifies the first syntax error found in a program, together with
/// the source position the parser had reached.
#[derive(Clone, Debug, PartialEq)]
pub struct ParseError {
    pub span: Span,
    pub message: String,
}

impl ParseError {
    pub fn new(span: Span, message: &str) -> Self {
        Self {
            span,
            message: message.to_string(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "parse error @ {}: {}", self.span, self.message)
    }
}

impl std::error::Error for ParseError {}

impl From<lexer::Error> for ParseError {
    fn from(e: lexer::Error) -> ParseError {
        ParseError::new(e.span, e.message)
    }
}

pub type Result<T> = std::result::Result<T, ParseError>;

// ============================================================================
// Priorities
// ============================================================================

/// Binding priority for binary operators; higher binds tighter.  All
/// levels associate to the left.
fn priority(op: Operator) -> u32 {
    use Operator::*;
    match op {
        PlusPlus | MinusMinus => 6,
        Star | Slash => 5,
        Plus | Minus | Lt | Le | Gt | Ge => 4,
        Or | OrOr | And | AndAnd | EqualsEquals => 3,
        Shl | Shr => 2,
        Equals | PlusEquals | MinusEquals | StarEquals | SlashEquals | AndEquals | OrEquals => 1,
    }
}

// ============================================================================
// Parser
// ============================================================================

/// Builds one syntax tree from a token stream, reporting the first
/// error encountered.  Keeps a one-token pushback so the grammar can
/// be dispatched on a single token of lookahead.
pub struct Parser<R> {
    tokenizer: Tokenizer<R>,
    pushback: Option<Token>,
}

impl<R: Reader> Parser<R> {
    pub fn new(tokenizer: Tokenizer<R>) -> Self {
        Self {
            tokenizer,
            pushback: None,
        }
    }

    /// Parse a whole program: a single expression followed by the end
    /// of input.
    pub fn parse(&mut self) -> Result<Expr> {
        let root = self.parse_expression(0)?;
        let tok = self.next_token()?;
        if tok.kind != TokenKind::Eof {
            return Err(ParseError::new(
                tok.span,
                "Found unexpected token after program",
            ));
        }
        Ok(root)
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// Parse a primary expression, then fold in every following binary
    /// operator whose priority is at least `min_priority`.  The right
    /// operand is parsed one level higher, making each level
    /// left-associative.
    fn parse_expression(&mut self, min_priority: u32) -> Result<Expr> {
        let mut expr = self.parse_one_expression()?;
        loop {
            let tok = self.next_token()?;
            let op = match tok.kind {
                TokenKind::Operator(op) if priority(op) >= min_priority => op,
                _ => {
                    self.pushback = Some(tok);
                    return Ok(expr);
                }
            };
            let rhs = self.parse_expression(priority(op) + 1)?;
            expr = Expr::Binary(op, Box::new(expr), Box::new(rhs));
        }
    }

    fn parse_one_expression(&mut self) -> Result<Expr> {
        let tok = self.next_token()?;
        match tok.kind {
            TokenKind::SemiColon => Err(ParseError::new(tok.span, "Stray semicolon")),
            TokenKind::Keyword(Keyword::If) => self.parse_conditional(),
            TokenKind::Keyword(Keyword::Else) => {
                Err(ParseError::new(tok.span, "extraneous else keyword"))
            }
            TokenKind::Keyword(Keyword::For) => self.parse_for_loop(),
            TokenKind::Keyword(Keyword::While) => self.parse_while_loop(),
            TokenKind::Number(n) => Ok(Expr::Constant(Value::Integer(n as i64))),
            TokenKind::Float(x) => Ok(Expr::Constant(Value::Float(x))),
            TokenKind::LeftParen => {
                let inner = self.parse_expression(0)?;
                let tok = self.next_token()?;
                if tok.kind != TokenKind::RightParen {
                    return Err(ParseError::new(tok.span, "Unbalanced paren"));
                }
                Ok(Expr::Parenthesized(Box::new(inner)))
            }
            TokenKind::LeftBrace => self.parse_block(),
            TokenKind::Identifier(name) => self.parse_variable_or_call(name),
            TokenKind::RightParen => Err(ParseError::new(tok.span, "Unbalanced paren")),
            TokenKind::RightBrace => Err(ParseError::new(tok.span, "Unbalanced block")),
            TokenKind::Comma => Err(ParseError::new(tok.span, "Unexpected standalone comma")),
            TokenKind::Operator(op) => {
                // A prefix operator takes a single primary expression,
                // so `-5 + 6` negates only the `5`.
                let operand = self.parse_one_expression()?;
                Ok(Expr::Unary(op, Box::new(operand)))
            }
            TokenKind::Eof => Err(ParseError::new(tok.span, "Unexpected EOF")),
        }
    }

    /// Parse the body of a brace-delimited block, the opening brace
    /// having been consumed.  An expression followed by `}` becomes
    /// the block's trailing value; one followed by `;` becomes a
    /// statement.
    fn parse_block(&mut self) -> Result<Expr> {
        let mut statements = Vec::new();
        loop {
            let tok = self.next_token()?;
            if tok.kind == TokenKind::RightBrace {
                return Ok(Expr::Block(statements, None));
            }
            self.pushback = Some(tok);
            let inner = self.parse_expression(0)?;
            let tok = self.next_token()?;
            match tok.kind {
                TokenKind::RightBrace => {
                    return Ok(Expr::Block(statements, Some(Box::new(inner))));
                }
                TokenKind::SemiColon => {
                    statements.push(Expr::Statement(Box::new(inner)));
                }
                _ => {
                    return Err(ParseError::new(
                        tok.span,
                        "Unbalanced block, or expected semicolon",
                    ));
                }
            }
        }
    }

    /// Parse a variable reference or, if a `(` follows the name, a
    /// comma-separated call argument list.
    fn parse_variable_or_call(&mut self, name: String) -> Result<Expr> {
        let tok = self.next_token()?;
        if tok.kind != TokenKind::LeftParen {
            self.pushback = Some(tok);
            return Ok(Expr::Variable(name));
        }
        let mut arguments = Vec::new();
        let tok = self.next_token()?;
        if tok.kind != TokenKind::RightParen {
            self.pushback = Some(tok);
            loop {
                arguments.push(self.parse_expression(0)?);
                let tok = self.next_token()?;
                match tok.kind {
                    TokenKind::RightParen => break,
                    TokenKind::Comma => continue,
                    _ => {
                        return Err(ParseError::new(tok.span, "Expected comma after argument"));
                    }
                }
            }
        }
        Ok(Expr::Call(name, arguments))
    }

    // ========================================================================
    // Conditionals
    // ========================================================================

    fn parse_conditional(&mut self) -> Result<Expr> {
        let condition = self.parse_parenthesized_condition(
            "Expected left parenthesis after if keyword",
            "Expected right paren after if condition",
        )?;
        let body = self.parse_expression(0)?;
        let alternate = self.try_parse_else_chain()?;
        Ok(Expr::Conditional(
            Some(Box::new(condition)),
            Box::new(body),
            alternate.map(Box::new),
        ))
    }

    /// Parse the `else` chain following an `if` body, if any.  An
    /// `else if` recurses into a further chain; a bare `else` ends it
    /// with a condition-less branch.
    fn try_parse_else_chain(&mut self) -> Result<Option<Expr>> {
        let tok = self.next_token()?;
        if tok.kind != TokenKind::Keyword(Keyword::Else) {
            self.pushback = Some(tok);
            return Ok(None);
        }
        let tok = self.next_token()?;
        if tok.kind == TokenKind::Keyword(Keyword::If) {
            let condition = self.parse_parenthesized_condition(
                "Expected left parenthesis after if keyword",
                "Expected right paren after if condition",
            )?;
            let body = self.parse_expression(0)?;
            let tail = self.try_parse_else_chain()?;
            return Ok(Some(Expr::Conditional(
                Some(Box::new(condition)),
                Box::new(body),
                tail.map(Box::new),
            )));
        }
        self.pushback = Some(tok);
        let body = self.parse_expression(0)?;
        Ok(Some(Expr::Conditional(None, Box::new(body), None)))
    }

    fn parse_parenthesized_condition(
        &mut self,
        open_message: &str,
        close_message: &str,
    ) -> Result<Expr> {
        let tok = self.next_token()?;
        if tok.kind != TokenKind::LeftParen {
            return Err(ParseError::new(tok.span, open_message));
        }
        let condition = self.parse_expression(0)?;
        let tok = self.next_token()?;
        if tok.kind != TokenKind::RightParen {
            return Err(ParseError::new(tok.span, close_message));
        }
        Ok(condition)
    }

    // ========================================================================
    // Loops
    // ========================================================================

    fn parse_for_loop(&mut self) -> Result<Expr> {
        let tok = self.next_token()?;
        if tok.kind != TokenKind::LeftParen {
            return Err(ParseError::new(
                tok.span,
                "Expected left parenthesis after for keyword",
            ));
        }
        let init = self.parse_loop_clause(
            TokenKind::SemiColon,
            "Expected semicolon after for loop initializer",
        )?;
        let condition = self.parse_loop_clause(
            TokenKind::SemiColon,
            "Expected semicolon after for loop condition",
        )?;
        let after = self.parse_loop_clause(
            TokenKind::RightParen,
            "Expected right paren after for loop clauses",
        )?;
        let body = self.parse_expression(0)?;
        Ok(Expr::For(
            init.map(Box::new),
            condition.map(Box::new),
            after.map(Box::new),
            Box::new(body),
        ))
    }

    fn parse_while_loop(&mut self) -> Result<Expr> {
        let condition = self.parse_parenthesized_condition(
            "Expected left parenthesis after while keyword",
            "Expected right paren after while condition",
        )?;
        let body = self.parse_expression(0)?;
        Ok(Expr::For(
            None,
            Some(Box::new(condition)),
            None,
            Box::new(body),
        ))
    }

    /// Parse one optional loop clause, up to and including its
    /// terminator.  An immediate terminator yields an empty clause.
    fn parse_loop_clause(
        &mut self,
        terminator: TokenKind,
        message: &str,
    ) -> Result<Option<Expr>> {
        let tok = self.next_token()?;
        if tok.kind == terminator {
            return Ok(None);
        }
        self.pushback = Some(tok);
        let expr = self.parse_expression(0)?;
        let tok = self.next_token()?;
        if tok.kind != terminator {
            return Err(ParseError::new(tok.span, message));
        }
        Ok(Some(expr))
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn next_token(&mut self) -> Result<Token> {
        if let Some(tok) = self.pushback.take() {
            return Ok(tok);
        }
        Ok(self.tokenizer.next_token()?)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::StrReader;

    fn parse(input: &str) -> Result<Expr> {
        Parser::new(Tokenizer::new(StrReader::new(input))).parse()
    }

    #[test]
    fn test_01() {
        let expr = parse("1 + 2").unwrap();
        assert_eq!(
            expr,
            Expr::Binary(
                Operator::Plus,
                Box::new(Expr::Constant(Value::Integer(1))),
                Box::new(Expr::Constant(Value::Integer(2))),
            )
        );
    }

    #[test]
    fn test_02() {
        // `*` binds tighter than `+`.
        let expr = parse("1 + 6 * 5").unwrap();
        assert_eq!(
            expr,
            Expr::Binary(
                Operator::Plus,
                Box::new(Expr::Constant(Value::Integer(1))),
                Box::new(Expr::Binary(
                    Operator::Star,
                    Box::new(Expr::Constant(Value::Integer(6))),
                    Box::new(Expr::Constant(Value::Integer(5))),
                )),
            )
        );
    }

    #[test]
    fn test_03() {
        // Same-priority operators fold to the left.
        let expr = parse("1 - 2 - 3").unwrap();
        assert_eq!(
            expr,
            Expr::Binary(
                Operator::Minus,
                Box::new(Expr::Binary(
                    Operator::Minus,
                    Box::new(Expr::Constant(Value::Integer(1))),
                    Box::new(Expr::Constant(Value::Integer(2))),
                )),
                Box::new(Expr::Constant(Value::Integer(3))),
            )
        );
    }

    #[test]
    fn test_04() {
        let expr = parse("-5 + 6").unwrap();
        assert_eq!(
            expr,
            Expr::Binary(
                Operator::Plus,
                Box::new(Expr::Unary(
                    Operator::Minus,
                    Box::new(Expr::Constant(Value::Integer(5))),
                )),
                Box::new(Expr::Constant(Value::Integer(6))),
            )
        );
    }

    #[test]
    fn test_05() {
        let expr = parse("(2 + 3) * 4").unwrap();
        match expr {
            Expr::Binary(Operator::Star, lhs, _) => {
                assert!(matches!(*lhs, Expr::Parenthesized(_)));
            }
            _ => panic!("expected a product"),
        }
    }

    #[test]
    fn test_06() {
        let expr = parse("{}").unwrap();
        assert_eq!(expr, Expr::Block(Vec::new(), None));
    }

    #[test]
    fn test_07() {
        let expr = parse("{ 1; 2 }").unwrap();
        match expr {
            Expr::Block(statements, Some(last)) => {
                assert_eq!(statements.len(), 1);
                assert_eq!(*last, Expr::Constant(Value::Integer(2)));
            }
            _ => panic!("expected a block with a trailing expression"),
        }
    }

    #[test]
    fn test_08() {
        let expr = parse("pow(2, 3)").unwrap();
        match expr {
            Expr::Call(name, arguments) => {
                assert_eq!(name, "pow");
                assert_eq!(arguments.len(), 2);
            }
            _ => panic!("expected a call"),
        }
    }

    #[test]
    fn test_09() {
        let expr = parse("foo()").unwrap();
        assert_eq!(expr, Expr::Call("foo".to_string(), Vec::new()));
    }

    #[test]
    fn test_10() {
        let expr = parse("if (1) 2 else 3").unwrap();
        match expr {
            Expr::Conditional(Some(_), _, Some(alternate)) => {
                assert!(matches!(*alternate, Expr::Conditional(None, _, None)));
            }
            _ => panic!("expected a conditional with an else branch"),
        }
    }

    #[test]
    fn test_11() {
        // `else if` chains keep their conditions.
        let expr = parse("if (1) 2 else if (3) 4 else 5").unwrap();
        match expr {
            Expr::Conditional(Some(_), _, Some(alternate)) => match *alternate {
                Expr::Conditional(Some(_), _, Some(tail)) => {
                    assert!(matches!(*tail, Expr::Conditional(None, _, None)));
                }
                _ => panic!("expected a chained conditional"),
            },
            _ => panic!("expected a conditional"),
        }
    }

    #[test]
    fn test_12() {
        let expr = parse("while (1) {}").unwrap();
        assert!(matches!(expr, Expr::For(None, Some(_), None, _)));
    }

    #[test]
    fn test_13() {
        let expr = parse("for (i = 0; i; i = i + 1) {}").unwrap();
        assert!(matches!(expr, Expr::For(Some(_), Some(_), Some(_), _)));
    }

    #[test]
    fn test_14() {
        // Every loop clause may be empty.
        let expr = parse("for (;;) {}").unwrap();
        assert!(matches!(expr, Expr::For(None, None, None, _)));
    }

    #[test]
    fn test_15() {
        let e = parse(";").unwrap_err();
        assert_eq!(e.message, "Stray semicolon");
    }

    #[test]
    fn test_16() {
        let e = parse("(1").unwrap_err();
        assert_eq!(e.message, "Unbalanced paren");
    }

    #[test]
    fn test_17() {
        let e = parse("else 1").unwrap_err();
        assert_eq!(e.message, "extraneous else keyword");
    }

    #[test]
    fn test_18() {
        let e = parse("").unwrap_err();
        assert_eq!(e.message, "Unexpected EOF");
    }

    #[test]
    fn test_19() {
        let e = parse("1 1").unwrap_err();
        assert_eq!(e.message, "Found unexpected token after program");
        assert_eq!(e.span, Span::new(0, 2));
    }

    #[test]
    fn test_20() {
        let e = parse(",").unwrap_err();
        assert_eq!(e.message, "Unexpected standalone comma");
    }

    #[test]
    fn test_21() {
        // Lexical failures surface as parse errors with their span.
        let e = parse("1abc").unwrap_err();
        assert_eq!(e.message, "Invalid token separator after number");
    }

    #[test]
    fn test_22() {
        let e = parse("{ 1 2 }").unwrap_err();
        assert_eq!(e.message, "Unbalanced block, or expected semicolon");
    }

    #[test]
    fn test_23() {
        let e = parse("for (1) {}").unwrap_err();
        assert_eq!(e.message, "Expected semicolon after for loop initializer");
    }

    #[test]
    fn test_24() {
        // Assignment parses as a binary operator at the lowest level.
        let expr = parse("a = 1 + 2").unwrap();
        match expr {
            Expr::Binary(Operator::Equals, lhs, rhs) => {
                assert_eq!(*lhs, Expr::Variable("a".to_string()));
                assert!(matches!(*rhs, Expr::Binary(Operator::Plus, ..)));
            }
            _ => panic!("expected an assignment"),
        }
    }
}
