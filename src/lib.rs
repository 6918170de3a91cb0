//! Flint is a Rust implementation of Lox, the scripting language from the
//! [Crafting Interpreters](https://craftinginterpreters.com/) book by Bob
//! Nystrom. Lox is dynamically typed, lexically scoped and garbage collected
//! by the host, with first-class functions, closures and single inheritance.
//! Flint is a tree-walk interpreter with a hand-written recursive descent
//! parser.
//!
//! A run goes through four stages, each of which lives in its own module:
//!
//! ## Scanning
//! The [`scanner`](scanner) turns the source string into a flat list of
//! [`tokens`](token::Token). Trivial syntax problems like an unterminated
//! string or a stray character are reported here as a
//! [`ScanError`](error::ScanError), and the scanner keeps going so that one
//! bad character does not hide the rest of them.
//!
//! ## Parsing
//! The [`parser`](parser) builds the syntax tree out of the token list.
//! [`Expressions`](expr::Expr) are pieces of code that produce a value and
//! [`statements`](stmt::Stmt) are pieces of code that have an effect.
//! Grammar mistakes are reported as a [`ParseError`](error::ParseError);
//! the parser synchronizes at statement boundaries and carries on, dropping
//! only the declaration it could not make sense of.
//!
//! ## Resolving
//! The [`resolver`](resolver) is a static pass over the finished tree that
//! pins every local variable reference to the scope that declares it, so
//! that closures capture what the source says rather than whatever is in
//! scope when they run. It also rejects the semantically invalid programs
//! that are still grammatically fine, such as `return` at the top level or
//! a class inheriting from itself, as a [`ResolveError`](error::ResolveError).
//!
//! ## Interpreting
//! The [`interpreter`](interpreter) walks the tree and executes it against
//! a chain of [`environments`](environment::Environment). Type mistakes
//! that only show up with concrete values, like adding a string to a
//! number, surface as a [`RuntimeError`](error::RuntimeError) and abort the
//! current run.
//!
//! Any error reported before interpretation starts suppresses the stages
//! after it. A script run exits with code 65 on a static error and 70 on a
//! runtime error. The prompt resets the error flags between lines but keeps
//! the globals, so state built on one line is usable on the next.

use std::io::Write;
use std::{fs, process};

pub mod ast;
pub mod class;
pub mod environment;
pub mod error;
pub mod expr;
pub mod function;
pub mod interpreter;
pub mod literal;
pub mod object;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod stmt;
pub mod token;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use ast::ASTPrinter;
use parser::Parser;
use resolver::Resolver;
use scanner::Scanner;

/// The driver that wires the stages together. Program output goes to the
/// injected writer so that callers (and tests) can capture it; diagnostics
/// always go to stderr.
#[allow(non_camel_case_types)]
pub struct flint<'a> {
    interpreter: interpreter::Interpreter<'a>,
}

impl<'a> flint<'a> {
    pub fn new(output: &'a mut dyn Write) -> Self {
        flint {
            interpreter: interpreter::Interpreter::new(output),
        }
    }

    /// Runs a script file and exits the process with 65 on a static error
    /// or 70 on a runtime error.
    pub fn run_file(&mut self, path: String) {
        let contents = fs::read_to_string(path)
            .expect("to be able to read the script file");

        self.run(&contents);

        if error::did_static_error() {
            process::exit(65);
        }
        if error::did_runtime_error() {
            process::exit(70);
        }
    }

    /// Runs the interactive prompt. Each line is a complete program
    /// fragment; the globals persist across lines while the error flags are
    /// reset, so one bad line does not poison the session. EOF or the
    /// literal line `quit` exits.
    pub fn run_prompt(&mut self) {
        let mut editor = DefaultEditor::new().expect("to be able to start the line editor");

        let history = home::home_dir().map(|dir| dir.join(".flint_history"));
        if let Some(history) = &history {
            let _ = editor.load_history(history);
        }

        loop {
            match editor.readline("> ") {
                Ok(line) => {
                    if line.trim() == "quit" {
                        break;
                    }

                    let _ = editor.add_history_entry(line.as_str());

                    self.run(&line);
                    error::reset_error();
                },
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
                Err(error) => {
                    eprintln!("Failed to read line: {error}");
                    break;
                },
            }
        }

        if let Some(history) = &history {
            let _ = editor.save_history(history);
        }
    }

    /// Scans and parses a script file, then prints the syntax tree instead
    /// of executing it. Exits with 65 if the script does not parse.
    pub fn print_ast(&mut self, path: String) {
        let contents = fs::read_to_string(path)
            .expect("to be able to read the script file");

        let mut scanner = Scanner::new(&contents);
        let tokens = scanner.scan_tokens();

        if error::did_error() {
            process::exit(65);
        }

        let mut parser = Parser::new(tokens);
        let statements = parser.parse();

        if error::did_error() {
            process::exit(65);
        }

        let mut printer = ASTPrinter;
        for statement in &statements {
            println!("{}", statement.accept(&mut printer));
        }
    }

    /// Runs a source string through all four stages. Each stage only runs
    /// if the previous ones reported no errors.
    fn run(&mut self, source: &str) {
        let mut scanner = Scanner::new(source);
        let tokens = scanner.scan_tokens();

        if error::did_error() {
            return;
        }

        let mut parser = Parser::new(tokens);
        let statements = parser.parse();

        if error::did_error() {
            return;
        }

        let mut resolver = Resolver::new(&mut self.interpreter);
        resolver.resolve(&statements);

        if error::did_error() {
            return;
        }

        self.interpreter.interpret(&statements);
    }
}
