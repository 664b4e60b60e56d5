use exl::bytecode::{Bytecode, BuiltinFunction, Instruction, Program};
use exl::lexer::{StrReader, Tokenizer};
use exl::parser::Parser;
use exl::value::Value;

use exl::bytecode::Bytecode::*;
use exl::bytecode::Instruction::*;

// ============================================================================
// Straight-line code
// ============================================================================

#[test]
fn test_constant() {
    check(
        "7",
        vec![Instruction(Load), Value(Value::Integer(7))],
    );
}

#[test]
fn test_addition() {
    check(
        "1 + 2",
        vec![
            Instruction(Load),
            Value(Value::Integer(1)),
            Instruction(Load),
            Value(Value::Integer(2)),
            Instruction(Add),
        ],
    );
}

#[test]
fn test_negation() {
    // `-x` lowers as `0.0 - x`.
    check(
        "-5",
        vec![
            Instruction(Load),
            Value(Value::Float(0.0)),
            Instruction(Load),
            Value(Value::Integer(5)),
            Instruction(Subtract),
        ],
    );
}

#[test]
fn test_parenthesized() {
    // Parentheses shape the tree but leave no trace in the stream.
    check(
        "(1 + 2) * 3",
        vec![
            Instruction(Load),
            Value(Value::Integer(1)),
            Instruction(Load),
            Value(Value::Integer(2)),
            Instruction(Add),
            Instruction(Load),
            Value(Value::Integer(3)),
            Instruction(Mul),
        ],
    );
}

// ============================================================================
// Variables and scopes
// ============================================================================

#[test]
fn test_assignment() {
    // The assigned value stays on the stack; the statement pops it.
    // Block exit clears the binding.
    check(
        "{ a = 1; a }",
        vec![
            Instruction(Load),
            Value(Value::Integer(1)),
            Instruction(StoreVar),
            LabelId(1),
            Instruction(Pop),
            Instruction(LoadVar),
            LabelId(1),
            Instruction(ClearVar),
            LabelId(1),
        ],
    );
}

#[test]
fn test_distinct_ids() {
    check(
        "{ a = 1; b = 2; }",
        vec![
            Instruction(Load),
            Value(Value::Integer(1)),
            Instruction(StoreVar),
            LabelId(1),
            Instruction(Pop),
            Instruction(Load),
            Value(Value::Integer(2)),
            Instruction(StoreVar),
            LabelId(2),
            Instruction(Pop),
            Instruction(ClearVar),
            LabelId(1),
            Instruction(ClearVar),
            LabelId(2),
        ],
    );
}

#[test]
fn test_disjoint_scopes_get_fresh_ids() {
    // The same name in two disjoint blocks is two different slots.
    check(
        "{ { a = 1; }; { a = 2; }; }",
        vec![
            Instruction(Load),
            Value(Value::Integer(1)),
            Instruction(StoreVar),
            LabelId(1),
            Instruction(Pop),
            Instruction(ClearVar),
            LabelId(1),
            Instruction(Load),
            Value(Value::Integer(2)),
            Instruction(StoreVar),
            LabelId(2),
            Instruction(Pop),
            Instruction(ClearVar),
            LabelId(2),
        ],
    );
}

// ============================================================================
// Calls
// ============================================================================

#[test]
fn test_call_arguments_reversed() {
    // Arguments are pushed in reverse source order, leaving the first
    // argument deepest.
    check(
        "pow(2, 3)",
        vec![
            Instruction(Load),
            Value(Value::Integer(3)),
            Instruction(Load),
            Value(Value::Integer(2)),
            Instruction(CallFunction),
            BuiltinFunctionId(BuiltinFunction::Pow),
            ArgumentCount(2),
        ],
    );
}

// ============================================================================
// Branches
// ============================================================================

#[test]
fn test_conditional_with_else() {
    check(
        "if (1) 2 else 3",
        vec![
            Instruction(Load),
            Value(Value::Integer(1)),
            Instruction(JumpIfZero),
            Offset(6),
            Instruction(Load),
            Value(Value::Integer(2)),
            Instruction(Jump),
            Offset(4),
            Instruction(Load),
            Value(Value::Integer(3)),
        ],
    );
}

#[test]
fn test_conditional_without_else() {
    // Without an alternate the body value is discarded, so the two
    // paths agree on stack depth.
    check(
        "if (1) 2",
        vec![
            Instruction(Load),
            Value(Value::Integer(1)),
            Instruction(JumpIfZero),
            Offset(5),
            Instruction(Load),
            Value(Value::Integer(2)),
            Instruction(Pop),
        ],
    );
}

// ============================================================================
// Loops
// ============================================================================

#[test]
fn test_while_loop() {
    check(
        "while (0) 1",
        vec![
            Instruction(Load),
            Value(Value::Integer(0)),
            Instruction(JumpIfZero),
            Offset(7),
            Instruction(Load),
            Value(Value::Integer(1)),
            Instruction(Pop),
            Instruction(Jump),
            Offset(-7),
        ],
    );
}

#[test]
fn test_for_loop_clears_induction_variable() {
    let code = lower("for (i = 0; i; i = i + 1) {}");
    // The loop ends with a backward jump followed by the clear of the
    // loop-scoped binding.
    let n = code.len();
    assert_eq!(code[n - 2], Instruction(ClearVar));
    assert_eq!(code[n - 1], LabelId(1));
    assert!(matches!(code[n - 4], Instruction(Jump)));
    assert!(matches!(code[n - 3], Offset(delta) if delta < 0));
}

// ============================================================================
// Helpers
// ============================================================================

fn lower(input: &str) -> Vec<Bytecode> {
    let tokenizer = Tokenizer::new(StrReader::new(input));
    let expr = Parser::new(tokenizer).parse().unwrap();
    let program = Program::from_expr(&expr).unwrap();
    program.bytecode().to_vec()
}

/// Check that lowering a given program produces a given cell stream.
fn check(input: &str, expected: Vec<Bytecode>) {
    assert_eq!(lower(input), expected);
}
