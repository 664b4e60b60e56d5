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
use super::Expr;
use std::fmt;

// ============================================================================
// Dumper
// ============================================================================

/// Renders a syntax tree as indented text, one node per line with two
/// spaces of indentation per level.  Intended for diagnostics and
/// golden tests.
pub struct ExprDumper<'a> {
    root: &'a Expr,
}

impl Expr {
    pub fn dump(&self) -> ExprDumper {
        ExprDumper { root: self }
    }
}

impl<'a> fmt::Display for ExprDumper<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        dump_node(f, self.root, 0)
    }
}

fn dump_node(f: &mut fmt::Formatter, expr: &Expr, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        write!(f, "  ")?;
    }
    match expr {
        Expr::Constant(value) => writeln!(f, "{} {}", expr.name(), value),
        Expr::Variable(name) => writeln!(f, "{} {}", expr.name(), name),
        Expr::Unary(op, rhs) => {
            writeln!(f, "{}({})", expr.name(), op)?;
            dump_node(f, rhs, depth + 1)
        }
        Expr::Binary(op, lhs, rhs) => {
            writeln!(f, "{}({})", expr.name(), op)?;
            dump_node(f, lhs, depth + 1)?;
            dump_node(f, rhs, depth + 1)
        }
        Expr::Parenthesized(inner) | Expr::Statement(inner) => {
            writeln!(f, "{}", expr.name())?;
            dump_node(f, inner, depth + 1)
        }
        Expr::Block(statements, last) => {
            writeln!(f, "{}", expr.name())?;
            for statement in statements {
                dump_node(f, statement, depth + 1)?;
            }
            if let Some(last) = last {
                dump_node(f, last, depth + 1)?;
            }
            Ok(())
        }
        Expr::Call(name, arguments) => {
            writeln!(f, "{}({})", expr.name(), name)?;
            for argument in arguments {
                dump_node(f, argument, depth + 1)?;
            }
            Ok(())
        }
        Expr::Conditional(condition, body, alternate) => {
            writeln!(f, "{}", expr.name())?;
            if let Some(condition) = condition {
                dump_node(f, condition, depth + 1)?;
            }
            dump_node(f, body, depth + 1)?;
            if let Some(alternate) = alternate {
                dump_node(f, alternate, depth + 1)?;
            }
            Ok(())
        }
        Expr::For(init, condition, after, body) => {
            writeln!(f, "{}", expr.name())?;
            for clause in [init, condition, after].into_iter().flatten() {
                dump_node(f, clause, depth + 1)?;
            }
            dump_node(f, body, depth + 1)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Operator;
    use crate::value::Value;

    #[test]
    fn test_01() {
        let expr = Expr::Binary(
            Operator::Plus,
            Box::new(Expr::Constant(Value::Integer(1))),
            Box::new(Expr::Variable("a".to_string())),
        );
        let expected = "Binary(Plus)\n  Constant Value(Integer, 1)\n  Variable a\n";
        assert_eq!(expr.dump().to_string(), expected);
    }

    #[test]
    fn test_02() {
        let expr = Expr::Block(
            vec![Expr::Statement(Box::new(Expr::Constant(Value::Integer(2))))],
            Some(Box::new(Expr::Constant(Value::Integer(3)))),
        );
        let expected = "Block\n  Statement\n    Constant Value(Integer, 2)\n  Constant Value(Integer, 3)\n";
        assert_eq!(expr.dump().to_string(), expected);
    }
}
