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
use crate::lexer::Operator;
use crate::value::Value;

// ============================================================================
// Expressions
// ============================================================================

/// A node of the syntax tree.  Every construct of the language is an
/// expression; each node owns its children outright and there is no
/// sharing between subtrees.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// A literal value.
    Constant(Value),
    /// A reference to a named variable.
    Variable(String),
    /// A prefix operator applied to a single operand.
    Unary(Operator, Box<Expr>),
    /// A binary operator applied to two operands.  Assignment is the
    /// `Equals` operator with a variable on the left.
    Binary(Operator, Box<Expr>, Box<Expr>),
    /// An expression wrapped in parentheses.
    Parenthesized(Box<Expr>),
    /// An expression whose value is discarded.
    Statement(Box<Expr>),
    /// A brace-delimited sequence of statements, with an optional
    /// trailing expression giving the block its value.
    Block(Vec<Expr>, Option<Box<Expr>>),
    /// A call to a built-in function.
    Call(String, Vec<Expr>),
    /// One link of an `if`/`else if`/`else` chain.  The alternate is
    /// itself a `Conditional`; a missing condition marks a terminal
    /// `else` branch.
    Conditional(Option<Box<Expr>>, Box<Expr>, Option<Box<Expr>>),
    /// A `for` loop: initializer, condition, after clause, body.  Any
    /// clause may be absent; `while` is a loop with only a condition.
    For(
        Option<Box<Expr>>,
        Option<Box<Expr>>,
        Option<Box<Expr>>,
        Box<Expr>,
    ),
}

impl Expr {
    /// The bare name of this node kind, as used by the dumper.
    pub fn name(&self) -> &'static str {
        match self {
            Expr::Constant(_) => "Constant",
            Expr::Variable(_) => "Variable",
            Expr::Unary(..) => "Unary",
            Expr::Binary(..) => "Binary",
            Expr::Parenthesized(_) => "Parenthesized",
            Expr::Statement(_) => "Statement",
            Expr::Block(..) => "Block",
            Expr::Call(..) => "Call",
            Expr::Conditional(..) => "Conditional",
            Expr::For(..) => "For",
        }
    }
}
