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
use crate::bytecode::BuiltinFunction;
use crate::lexer::Operator;
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// Error
// ============================================================================

/// Identifies the ways direct evaluation of a syntax tree can fail.
#[derive(Clone, Debug, PartialEq)]
pub enum EvalError {
    /// A variable was read before any assignment gave it a value.
    UnresolvedVariable(String),
    /// A call named a function which is not a known built-in.
    UnknownFunction(String),
    /// The left-hand side of an assignment was not a variable.
    InvalidAssignment,
    /// The operator has no direct evaluation.
    UnsupportedOperator(Operator),
    /// The operand types do not fit the operator.
    MismatchedTypes,
    /// Integer division with a zero divisor.
    DivisionByZero,
    /// A built-in was called with the wrong arity or argument types.
    FunctionEvaluation,
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EvalError::UnresolvedVariable(name) => write!(f, "Unresolved variable: {}", name),
            EvalError::UnknownFunction(name) => write!(f, "Unknown function: {}", name),
            EvalError::InvalidAssignment => {
                write!(f, "Assigned to something that was not a variable")
            }
            EvalError::UnsupportedOperator(op) => {
                write!(f, "Operator {} has no direct evaluation", op)
            }
            EvalError::MismatchedTypes => write!(f, "Mismatched types in binary operation"),
            EvalError::DivisionByZero => write!(f, "Division by zero"),
            EvalError::FunctionEvaluation => write!(f, "Error in function evaluation"),
        }
    }
}

impl std::error::Error for EvalError {}

pub type Result<T> = std::result::Result<T, EvalError>;

// ============================================================================
// Evaluation context
// ============================================================================

/// Evaluates syntax trees directly, without lowering them to bytecode
/// first.  Variables live in a stack of name to value scopes; blocks
/// and loops push a fresh scope for their duration.
pub struct EvalContext {
    scopes: Vec<HashMap<String, Value>>,
}

impl Default for EvalContext {
    fn default() -> Self {
        Self::new()
    }
}

impl EvalContext {
    pub fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
        }
    }

    /// Evaluate a single expression to a value.  A block without a
    /// trailing expression evaluates to `Integer(0)`.
    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Constant(value) => Ok(*value),
            Expr::Variable(name) => self
                .resolve_variable(name)
                .ok_or_else(|| EvalError::UnresolvedVariable(name.clone())),
            Expr::Unary(op, rhs) => self.evaluate_unary(*op, rhs),
            Expr::Binary(op, lhs, rhs) => self.evaluate_binary(*op, lhs, rhs),
            Expr::Parenthesized(inner) | Expr::Statement(inner) => self.evaluate(inner),
            Expr::Block(statements, last) => {
                self.scopes.push(HashMap::new());
                let result = self.evaluate_block(statements, last.as_deref());
                self.scopes.pop();
                result
            }
            Expr::Call(name, arguments) => self.evaluate_call(name, arguments),
            Expr::Conditional(condition, body, alternate) => {
                self.evaluate_conditional(condition.as_deref(), body, alternate.as_deref())
            }
            Expr::For(init, condition, after, body) => {
                self.scopes.push(HashMap::new());
                let result = self.evaluate_loop(
                    init.as_deref(),
                    condition.as_deref(),
                    after.as_deref(),
                    body,
                );
                self.scopes.pop();
                result
            }
        }
    }

    fn evaluate_block(&mut self, statements: &[Expr], last: Option<&Expr>) -> Result<Value> {
        for statement in statements {
            self.evaluate(statement)?;
        }
        match last {
            Some(last) => self.evaluate(last),
            None => Ok(Value::Integer(0)),
        }
    }

    fn evaluate_unary(&mut self, op: Operator, rhs: &Expr) -> Result<Value> {
        let value = self.evaluate(rhs)?;
        match op {
            Operator::Plus => Ok(value),
            Operator::Minus => match value {
                Value::Integer(i) => Ok(Value::Integer(i.wrapping_neg())),
                Value::Float(f) => Ok(Value::Float(-f)),
                _ => Err(EvalError::MismatchedTypes),
            },
            _ => Err(EvalError::UnsupportedOperator(op)),
        }
    }

    fn evaluate_binary(&mut self, op: Operator, lhs: &Expr, rhs: &Expr) -> Result<Value> {
        if op == Operator::Equals {
            let name = match lhs {
                Expr::Variable(name) => name,
                _ => return Err(EvalError::InvalidAssignment),
            };
            let value = self.evaluate(rhs)?;
            self.set_variable(name, value);
            return Ok(value);
        }
        let left = self.evaluate(lhs)?;
        let right = self.evaluate(rhs)?;
        match op {
            Operator::Plus | Operator::Minus | Operator::Star | Operator::Slash => {
                arithmetic(op, left, right)
            }
            Operator::EqualsEquals => Ok(Value::Bool(left.normalized() == right.normalized())),
            Operator::Lt => Ok(Value::Bool(left.normalized() < right.normalized())),
            Operator::Le => Ok(Value::Bool(left.normalized() <= right.normalized())),
            Operator::Gt => Ok(Value::Bool(left.normalized() > right.normalized())),
            Operator::Ge => Ok(Value::Bool(left.normalized() >= right.normalized())),
            Operator::AndAnd => match (left, right) {
                (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(a && b)),
                _ => Err(EvalError::MismatchedTypes),
            },
            Operator::OrOr => match (left, right) {
                (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(a || b)),
                _ => Err(EvalError::MismatchedTypes),
            },
            Operator::And => match (left, right) {
                (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(a & b)),
                _ => Err(EvalError::MismatchedTypes),
            },
            Operator::Or => match (left, right) {
                (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(a | b)),
                _ => Err(EvalError::MismatchedTypes),
            },
            Operator::Shl => match (left, right) {
                (Value::Integer(a), Value::Integer(b)) => {
                    Ok(Value::Integer(a.wrapping_shl(b as u32)))
                }
                _ => Err(EvalError::MismatchedTypes),
            },
            Operator::Shr => match (left, right) {
                (Value::Integer(a), Value::Integer(b)) => {
                    Ok(Value::Integer(a.wrapping_shr(b as u32)))
                }
                _ => Err(EvalError::MismatchedTypes),
            },
            _ => Err(EvalError::UnsupportedOperator(op)),
        }
    }

    fn evaluate_call(&mut self, name: &str, arguments: &[Expr]) -> Result<Value> {
        let function = BuiltinFunction::from_name(name)
            .ok_or_else(|| EvalError::UnknownFunction(name.to_string()))?;
        let mut values = Vec::with_capacity(arguments.len());
        for argument in arguments {
            values.push(self.evaluate(argument)?);
        }
        apply_builtin(function, &values)
    }

    fn evaluate_conditional(
        &mut self,
        condition: Option<&Expr>,
        body: &Expr,
        alternate: Option<&Expr>,
    ) -> Result<Value> {
        let condition = match condition {
            // A terminal `else` branch is just its body.
            None => return self.evaluate(body),
            Some(condition) => condition,
        };
        if truthy(self.evaluate(condition)?) {
            self.evaluate(body)
        } else {
            match alternate {
                Some(alternate) => self.evaluate(alternate),
                None => Ok(Value::Integer(0)),
            }
        }
    }

    fn evaluate_loop(
        &mut self,
        init: Option<&Expr>,
        condition: Option<&Expr>,
        after: Option<&Expr>,
        body: &Expr,
    ) -> Result<Value> {
        if let Some(init) = init {
            self.evaluate(init)?;
        }
        loop {
            if let Some(condition) = condition {
                if !truthy(self.evaluate(condition)?) {
                    return Ok(Value::Integer(0));
                }
            }
            self.evaluate(body)?;
            if let Some(after) = after {
                self.evaluate(after)?;
            }
        }
    }

    fn resolve_variable(&self, name: &str) -> Option<Value> {
        // Innermost scope wins.
        for scope in self.scopes.iter().rev() {
            if let Some(value) = scope.get(name) {
                return Some(*value);
            }
        }
        None
    }

    /// Assign to an already-visible binding if one exists in any
    /// enclosing scope; otherwise bind in the innermost scope.
    fn set_variable(&mut self, name: &str, value: Value) {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(slot) = scope.get_mut(name) {
                *slot = value;
                return;
            }
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), value);
        }
    }
}

fn truthy(value: Value) -> bool {
    match value {
        Value::Integer(i) => i != 0,
        Value::Float(f) => f != 0.0,
        Value::Bool(b) => b,
        Value::Unit => false,
    }
}

fn arithmetic(op: Operator, left: Value, right: Value) -> Result<Value> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => {
            let result = match op {
                Operator::Plus => a.wrapping_add(b),
                Operator::Minus => a.wrapping_sub(b),
                Operator::Star => a.wrapping_mul(b),
                _ => {
                    if b == 0 {
                        return Err(EvalError::DivisionByZero);
                    }
                    a.wrapping_div(b)
                }
            };
            Ok(Value::Integer(result))
        }
        (Value::Bool(_), _) | (_, Value::Bool(_)) | (Value::Unit, _) | (_, Value::Unit) => {
            Err(EvalError::MismatchedTypes)
        }
        // A mixed integer/float operation widens to float.
        (left, right) => {
            let a = left.normalized();
            let b = right.normalized();
            let result = match op {
                Operator::Plus => a + b,
                Operator::Minus => a - b,
                Operator::Star => a * b,
                _ => a / b,
            };
            Ok(Value::Float(result))
        }
    }
}

fn apply_builtin(function: BuiltinFunction, arguments: &[Value]) -> Result<Value> {
    match function {
        BuiltinFunction::Abs => match arguments {
            [Value::Integer(i)] => Ok(Value::Integer(i.wrapping_abs())),
            [Value::Float(f)] => Ok(Value::Float(f.abs())),
            _ => Err(EvalError::FunctionEvaluation),
        },
        BuiltinFunction::Cos => match arguments {
            [value @ (Value::Integer(_) | Value::Float(_))] => {
                Ok(Value::Float(value.normalized().cos()))
            }
            _ => Err(EvalError::FunctionEvaluation),
        },
        BuiltinFunction::Sin => match arguments {
            [value @ (Value::Integer(_) | Value::Float(_))] => {
                Ok(Value::Float(value.normalized().sin()))
            }
            _ => Err(EvalError::FunctionEvaluation),
        },
        BuiltinFunction::Sqrt => match arguments {
            [value @ (Value::Integer(_) | Value::Float(_))] => {
                Ok(Value::Float(value.normalized().sqrt()))
            }
            _ => Err(EvalError::FunctionEvaluation),
        },
        BuiltinFunction::Pow => match arguments {
            [Value::Integer(a), Value::Integer(b)] => {
                Ok(Value::Integer((*a as f64).powf(*b as f64) as i64))
            }
            [Value::Float(a), Value::Float(b)] => Ok(Value::Float(a.powf(*b))),
            _ => Err(EvalError::FunctionEvaluation),
        },
    }
}
