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
use super::{Bytecode, Compiler, Result};
use crate::ast::Expr;
use std::fmt;

// ============================================================================
// Program
// ============================================================================

/// A compiled program: an immutable flat sequence of bytecode cells.
/// The stream is produced once by the compiler and may be executed any
/// number of times.
#[derive(Debug)]
pub struct Program {
    bytecode: Vec<Bytecode>,
}

impl Program {
    /// Lower a syntax tree into an executable program.
    pub fn from_expr(expr: &Expr) -> Result<Program> {
        let mut compiler = Compiler::new();
        compiler.translate(expr)?;
        Ok(Program {
            bytecode: compiler.take_bytecode(),
        })
    }

    pub fn bytecode(&self) -> &[Bytecode] {
        &self.bytecode
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Program(")?;
        for cell in &self.bytecode {
            writeln!(f, "  {}", cell)?;
        }
        write!(f, ")")
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
            Box::new(Expr::Constant(Value::Integer(2))),
        );
        let program = Program::from_expr(&expr).unwrap();
        let expected = "Program(\n  Bytecode(Instruction, Load)\n  Bytecode(Value, Value(Integer, 1))\n  Bytecode(Instruction, Load)\n  Bytecode(Value, Value(Integer, 2))\n  Bytecode(Instruction, Add)\n)";
        assert_eq!(program.to_string(), expected);
    }
}
