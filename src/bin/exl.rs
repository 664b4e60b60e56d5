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
use std::error::Error;
use std::fs;
use std::io::Read;

use clap::{arg, Arg, ArgMatches, Command};
use log::{info, LevelFilter};
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
//
use exl::ast::{EvalContext, Expr};
use exl::bytecode::Program;
use exl::lexer::{StrReader, TokenKind, Tokenizer};
use exl::parser::Parser;
use exl::vm::ExecutionContext;

fn main() -> Result<(), Box<dyn Error>> {
    // Parse command-line arguments
    let matches = Command::new("exl")
        .about("Expression Language Tool")
        .version("0.1.0")
        .subcommand_required(true)
        .arg(arg!(--verbose "Show verbose output"))
        .subcommand(
            Command::new("tokenize")
                .about("Print the token stream of a program read from stdin")
                .visible_alias("t"),
        )
        .subcommand(
            Command::new("eval")
                .about("Evaluate an expression read from stdin without compiling it")
                .visible_alias("e"),
        )
        .subcommand(
            Command::new("run")
                .about("Compile a program to bytecode and execute it")
                .arg(Arg::new("file").required(true))
                .visible_alias("r"),
        )
        .get_matches();
    // Extract top-level flags
    let verbose = matches.is_present("verbose");
    // Initialise logging
    if verbose {
        init_logging(LevelFilter::Info);
    }
    // Dispatch on outcome
    let ok = match matches.subcommand() {
        Some(("tokenize", args)) => tokenize(args),
        Some(("eval", args)) => eval(args),
        Some(("run", args)) => run(args),
        _ => unreachable!(),
    }?;
    // Determine appropriate exit code
    let exitcode = if ok { 0 } else { 1 };
    // Done
    std::process::exit(exitcode);
}

/// Print the token stream of a program, one token per line, up to the
/// end of input or the first lexical error.
fn tokenize(_args: &ArgMatches) -> Result<bool, Box<dyn Error>> {
    let input = read_stdin()?;
    let mut tokenizer = Tokenizer::new(StrReader::new(&input));
    loop {
        match tokenizer.next_token() {
            Ok(token) => {
                let done = token.kind == TokenKind::Eof;
                println!("{}", token);
                if done {
                    return Ok(true);
                }
            }
            Err(e) => {
                println!("Tokenizer error: {}", e);
                return Ok(false);
            }
        }
    }
}

/// Evaluate an expression directly over the syntax tree and print the
/// normalized numeric result.
fn eval(_args: &ArgMatches) -> Result<bool, Box<dyn Error>> {
    let input = read_stdin()?;
    let expr = match parse(&input) {
        Ok(expr) => expr,
        Err(e) => {
            println!("{}", e);
            return Ok(false);
        }
    };
    let mut ctx = EvalContext::new();
    match ctx.evaluate(&expr) {
        Ok(value) => {
            println!("{}", value.normalized());
            Ok(true)
        }
        Err(e) => {
            eprintln!("evaluation failed: {}", e);
            Ok(false)
        }
    }
}

/// Compile a given file and execute it, printing the program dump
/// followed by the final stack top (or `<unit>` for none).
fn run(args: &ArgMatches) -> Result<bool, Box<dyn Error>> {
    // Extract the file to be run.
    let filename = args.get_one::<String>("file").unwrap();
    // Read the source file
    let input = fs::read_to_string(filename)?;
    // Parse source into a syntax tree
    let expr = match parse(&input) {
        Ok(expr) => expr,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(false);
        }
    };
    // Lower the tree into a program
    let program = match Program::from_expr(&expr) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("Couldn't create program: {}", e);
            return Ok(false);
        }
    };
    info!("compiled {} bytecode cells", program.bytecode().len());
    println!("{}", program);
    // Execute against a fresh context
    let mut ctx = ExecutionContext::new();
    if let Err(e) = program.execute(&mut ctx) {
        eprintln!("program evaluation failed: {}", e);
        return Ok(false);
    }
    info!("execution ended with stack depth {}", ctx.stack_depth());
    // Report the final result
    match ctx.stack_top() {
        Some(value) => println!("{}", value),
        None => println!("<unit>"),
    }
    //
    Ok(true)
}

fn parse(input: &str) -> exl::parser::Result<Expr> {
    let tokenizer = Tokenizer::new(StrReader::new(input));
    Parser::new(tokenizer).parse()
}

fn read_stdin() -> Result<String, Box<dyn Error>> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    Ok(input)
}

/// Initialise logging using a suitable pattern.
pub fn init_logging(level: LevelFilter) {
    let encoder = PatternEncoder::new("[{l}] {m}{n}");
    //
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(encoder))
        .build();
    //
    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(level))
        .unwrap();
    //
    let _handle = log4rs::init_config(config).unwrap();
}
